//! Integration test harness for the MIND front-end.
//!
//! Definitions are built in memory with the AST builders and registered in
//! a fresh compilation context, so the full loader chain runs without a
//! textual parser.

use mindc::ast::error::ErrorKind;
use mindc::{
    CompilationContext, DefId, Definition, DefinitionReference, Frontend, LoadError, LoadResult,
};

/// One front-end and one compilation context over a set of definitions.
pub struct TestHarness {
    fe: Frontend,
    ctx: CompilationContext,
}

impl TestHarness {
    /// Create a harness with the default front-end.
    pub fn new(definitions: impl IntoIterator<Item = Definition>) -> Self {
        Self::with_frontend(Frontend::default(), definitions)
    }

    /// Create a harness with a custom front-end.
    pub fn with_frontend(fe: Frontend, definitions: impl IntoIterator<Item = Definition>) -> Self {
        let mut ctx = CompilationContext::default();
        for definition in definitions {
            let name = definition.name.clone();
            ctx.register_definition(name, definition);
        }
        Self { fe, ctx }
    }

    /// Load a definition through the full loader chain.
    pub fn load(&mut self, name: &str) -> LoadResult<DefId> {
        self.fe.load(name, &mut self.ctx)
    }

    /// Load a definition that is expected to load.
    ///
    /// # Panics
    ///
    /// Panics on a load error.
    pub fn load_ok(&mut self, name: &str) -> &Definition {
        match self.load(name) {
            Ok(id) => self.ctx.get(id),
            Err(err) => panic!("loading {} failed: {}", name, err),
        }
    }

    /// Load a definition that is expected to fail fatally, returning the error kind.
    ///
    /// # Panics
    ///
    /// Panics if the load succeeds or fails for another reason.
    pub fn load_fatal(&mut self, name: &str) -> (ErrorKind, String) {
        match self.load(name) {
            Err(LoadError::Fatal(error)) => (error.kind, error.message),
            Err(other) => panic!("loading {} failed unexpectedly: {}", name, other),
            Ok(_) => panic!("loading {} succeeded", name),
        }
    }

    /// Resolve a reference outside any definition.
    pub fn resolve(&mut self, reference: DefinitionReference) -> LoadResult<Option<DefId>> {
        let mut reference = reference;
        self.fe.resolve(&mut reference, None, &mut self.ctx)
    }

    pub fn get(&self, id: DefId) -> &Definition {
        self.ctx.get(id)
    }

    /// Kinds of the errors reported so far, in report order.
    pub fn error_kinds(&self) -> Vec<ErrorKind> {
        self.ctx.errors.errors().iter().map(|e| e.kind).collect()
    }

    pub fn context(&self) -> &CompilationContext {
        &self.ctx
    }
}

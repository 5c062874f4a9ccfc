//! Front-end assembly and external collaborators
//!
//! The [`Frontend`] owns the three chains (loader, reference resolver,
//! template instantiator), the annotation registry, and the collaborators
//! that live outside this crate:
//!
//! - [`Parser`] — ADL text to a raw [`Definition`]
//! - [`SourceLocator`] — definition name to source text
//! - [`IdlSignatures`] — signature subtyping for binding compatibility
//!
//! Every stage receives `&Frontend` so it can re-enter the pipeline at its
//! root (`fe.load`, `fe.resolve`), which is what makes recursive loads go
//! through the cache.

use crate::annotation::{
    AnnotationCheckerLoader, AnnotationProcessorLoader, AnnotationRegistry,
    SubComponentAnnotationLoader,
};
use crate::binding::{
    BindingChecker, BindingCheckerLoader, BindingNormalizerLoader, UnboundInterfaceCheckerLoader,
};
use crate::context::CompilationContext;
use crate::error::LoadResult;
use crate::loader::{
    AttributeCheckerLoader, CacheLoader, ExtendsLoader, GenericDefinitionLoader,
    InterfaceCheckerLoader, Loader, ParameterNormalizerLoader, SourceLoader,
    SubComponentResolverLoader,
};
use crate::membrane::{CompositeInternalInterfaceLoader, MembraneCheckerLoader};
use crate::reference::{
    BasicResolver, CachingResolver, GenericResolver, ImportResolver, ParametricResolver, Resolver,
    TypeArgumentHoistingResolver, ValueSubstitutionResolver,
};
use crate::template::{
    AnnotationProcessorInstantiator, BaseInstantiator, CachingInstantiator, InstantiationRequest,
    ParametricInstantiator,
};
use mindc_ast::error::CompileError;
use mindc_ast::{DefId, Definition, DefinitionReference, LoaderPhase};
use std::collections::{HashMap, HashSet, VecDeque};
use std::path::PathBuf;

/// Parses ADL text into a raw definition.
pub trait Parser: Send + Sync {
    /// Parse `text`, expected to define `name`. Spans must use `file_id`.
    fn parse(&self, name: &str, text: &str, file_id: u16) -> Result<Definition, CompileError>;
}

/// Source text found for a definition name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedSource {
    pub path: PathBuf,
    pub text: String,
}

/// Finds the source text of a definition by name.
pub trait SourceLocator: Send + Sync {
    fn locate(&self, name: &str) -> Option<LocatedSource>;

    fn exists(&self, name: &str) -> bool {
        self.locate(name).is_some()
    }
}

/// Signature subtyping exposed by the IDL subsystem.
pub trait IdlSignatures: Send + Sync {
    /// Whether `signature` is a strict subtype of `base`.
    fn extends(&self, signature: &str, base: &str) -> bool;
}

/// In-memory signature hierarchy.
#[derive(Debug, Clone, Default)]
pub struct StaticIdlSignatures {
    parents: HashMap<String, Vec<String>>,
}

impl StaticIdlSignatures {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: declare that `signature` directly extends `parent`.
    pub fn with(mut self, signature: impl Into<String>, parent: impl Into<String>) -> Self {
        self.parents
            .entry(signature.into())
            .or_default()
            .push(parent.into());
        self
    }
}

impl IdlSignatures for StaticIdlSignatures {
    fn extends(&self, signature: &str, base: &str) -> bool {
        let mut seen = HashSet::new();
        let mut queue: VecDeque<&str> = VecDeque::from([signature]);
        while let Some(current) = queue.pop_front() {
            if !seen.insert(current) {
                continue;
            }
            for parent in self.parents.get(current).into_iter().flatten() {
                if parent == base {
                    return true;
                }
                queue.push_back(parent);
            }
        }
        false
    }
}

type StageFactory = Box<dyn FnOnce(Box<dyn Loader>) -> Box<dyn Loader>>;

/// The assembled front-end.
pub struct Frontend {
    loader: Box<dyn Loader>,
    resolver: Box<dyn Resolver>,
    instantiator: CachingInstantiator,
    parser: Option<Box<dyn Parser>>,
    locator: Option<Box<dyn SourceLocator>>,
    idl: Box<dyn IdlSignatures>,
    annotations: AnnotationRegistry,
}

/// Configures a [`Frontend`].
pub struct FrontendBuilder {
    parser: Option<Box<dyn Parser>>,
    locator: Option<Box<dyn SourceLocator>>,
    idl: Box<dyn IdlSignatures>,
    annotations: AnnotationRegistry,
    stages: Vec<StageFactory>,
}

impl Default for FrontendBuilder {
    fn default() -> Self {
        Self {
            parser: None,
            locator: None,
            idl: Box::new(StaticIdlSignatures::new()),
            annotations: AnnotationRegistry::with_predefined(),
            stages: Vec::new(),
        }
    }
}

impl FrontendBuilder {
    pub fn parser(mut self, parser: impl Parser + 'static) -> Self {
        self.parser = Some(Box::new(parser));
        self
    }

    pub fn locator(mut self, locator: impl SourceLocator + 'static) -> Self {
        self.locator = Some(Box::new(locator));
        self
    }

    pub fn idl(mut self, idl: impl IdlSignatures + 'static) -> Self {
        self.idl = Box::new(idl);
        self
    }

    /// Replace the annotation registry (use [`AnnotationRegistry::with_predefined`]
    /// and register extra kinds on it to keep the built-in ones).
    pub fn annotations(mut self, annotations: AnnotationRegistry) -> Self {
        self.annotations = annotations;
        self
    }

    /// Add a loader stage just inside the cache, after every built-in stage.
    pub fn stage<F>(mut self, wrap: F) -> Self
    where
        F: FnOnce(Box<dyn Loader>) -> Box<dyn Loader> + 'static,
    {
        self.stages.push(Box::new(wrap));
        self
    }

    pub fn build(self) -> Frontend {
        Frontend {
            loader: default_loader_chain(self.stages),
            resolver: default_resolver_chain(),
            instantiator: default_instantiator_chain(),
            parser: self.parser,
            locator: self.locator,
            idl: self.idl,
            annotations: self.annotations,
        }
    }
}

fn default_loader_chain(stages: Vec<StageFactory>) -> Box<dyn Loader> {
    let mut loader: Box<dyn Loader> = Box::new(SourceLoader);
    loader = Box::new(AnnotationCheckerLoader::new(loader));
    loader = Box::new(AnnotationProcessorLoader::new(loader, LoaderPhase::AfterParsing));
    loader = Box::new(GenericDefinitionLoader::new(loader));
    loader = Box::new(SubComponentResolverLoader::new(loader));
    loader = Box::new(ExtendsLoader::new(loader));
    loader = Box::new(AnnotationProcessorLoader::new(loader, LoaderPhase::AfterExtends));
    loader = Box::new(SubComponentAnnotationLoader::new(loader));
    loader = Box::new(InterfaceCheckerLoader::new(loader));
    loader = Box::new(CompositeInternalInterfaceLoader::new(loader));
    loader = Box::new(MembraneCheckerLoader::new(loader));
    loader = Box::new(BindingNormalizerLoader::new(loader));
    loader = Box::new(BindingCheckerLoader::new(loader));
    loader = Box::new(UnboundInterfaceCheckerLoader::new(loader));
    loader = Box::new(ParameterNormalizerLoader::new(loader));
    loader = Box::new(AttributeCheckerLoader::new(loader));
    loader = Box::new(AnnotationProcessorLoader::new(loader, LoaderPhase::AfterChecking));
    for wrap in stages {
        loader = wrap(loader);
    }
    Box::new(CacheLoader::new(loader))
}

fn default_resolver_chain() -> Box<dyn Resolver> {
    let mut resolver: Box<dyn Resolver> = Box::new(BasicResolver);
    resolver = Box::new(ParametricResolver::new(resolver));
    resolver = Box::new(GenericResolver::new(resolver));
    resolver = Box::new(TypeArgumentHoistingResolver::new(resolver));
    resolver = Box::new(ValueSubstitutionResolver::new(resolver));
    resolver = Box::new(ImportResolver::new(resolver));
    Box::new(CachingResolver::new(resolver))
}

fn default_instantiator_chain() -> CachingInstantiator {
    let base = Box::new(BaseInstantiator);
    let parametric = Box::new(ParametricInstantiator::new(base));
    let annotations = Box::new(AnnotationProcessorInstantiator::new(parametric));
    CachingInstantiator::new(annotations)
}

impl Default for Frontend {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl Frontend {
    pub fn builder() -> FrontendBuilder {
        FrontendBuilder::default()
    }

    /// Load the definition named `name` through the full loader chain.
    pub fn load(&self, name: &str, ctx: &mut CompilationContext) -> LoadResult<DefId> {
        self.loader.load(name, self, ctx)
    }

    /// Resolve `reference` as it occurs in `encapsulating`.
    ///
    /// `Ok(None)` means the reference could not be resolved; the reason has
    /// already been reported.
    pub fn resolve(
        &self,
        reference: &mut DefinitionReference,
        encapsulating: Option<DefId>,
        ctx: &mut CompilationContext,
    ) -> LoadResult<Option<DefId>> {
        self.resolver.resolve(reference, encapsulating, self, ctx)
    }

    /// Instantiate a generic definition; identical requests share one instance.
    pub fn instantiate(
        &self,
        request: &InstantiationRequest,
        ctx: &mut CompilationContext,
    ) -> LoadResult<DefId> {
        self.instantiator.instantiate(request, self, ctx)
    }

    pub fn parser(&self) -> Option<&dyn Parser> {
        self.parser.as_deref()
    }

    pub fn locator(&self) -> Option<&dyn SourceLocator> {
        self.locator.as_deref()
    }

    pub fn idl(&self) -> &dyn IdlSignatures {
        self.idl.as_ref()
    }

    pub fn annotations(&self) -> &AnnotationRegistry {
        &self.annotations
    }

    pub fn binding_checker(&self) -> BindingChecker<'_> {
        BindingChecker::new(self.idl())
    }

    /// Whether `name` can be loaded without reporting "not found".
    pub fn definition_exists(&self, name: &str, ctx: &CompilationContext) -> bool {
        ctx.is_known(name) || self.locator().is_some_and(|locator| locator.exists(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_signatures_transitive() {
        let idl = StaticIdlSignatures::new()
            .with("a.Derived", "a.Base")
            .with("a.Base", "a.Root");

        assert!(idl.extends("a.Derived", "a.Base"));
        assert!(idl.extends("a.Derived", "a.Root"));
        assert!(!idl.extends("a.Base", "a.Derived"));
        assert!(!idl.extends("a.Root", "a.Root"));
    }

    #[test]
    fn test_static_signatures_cycle_terminates() {
        let idl = StaticIdlSignatures::new().with("a.A", "a.B").with("a.B", "a.A");
        assert!(idl.extends("a.A", "a.B"));
        assert!(!idl.extends("a.A", "a.C"));
    }

    #[test]
    fn test_definition_exists() {
        let fe = Frontend::default();
        let mut ctx = CompilationContext::default();
        assert!(!fe.definition_exists("a.P", &ctx));
        ctx.register_definition("a.P", Definition::primitive("a.P"));
        assert!(fe.definition_exists("a.P", &ctx));
    }
}

//! Interface declarations: unique names, sized collections.

use super::Loader;
use crate::context::CompilationContext;
use crate::error::LoadResult;
use crate::frontend::Frontend;
use mindc_ast::error::{CompileError, ErrorKind};
use mindc_ast::{Cardinality, DefId};
use std::collections::HashSet;

pub struct InterfaceCheckerLoader {
    next: Box<dyn Loader>,
}

impl InterfaceCheckerLoader {
    pub fn new(next: Box<dyn Loader>) -> Self {
        Self { next }
    }
}

impl Loader for InterfaceCheckerLoader {
    fn load(&self, name: &str, fe: &Frontend, ctx: &mut CompilationContext) -> LoadResult<DefId> {
        let id = self.next.load(name, fe, ctx)?;

        let mut errors = Vec::new();
        let mut seen = HashSet::new();
        for itf in &ctx.get(id).interfaces {
            if !seen.insert(itf.name.as_str()) {
                errors.push(CompileError::new(
                    ErrorKind::DuplicateName,
                    itf.span,
                    format!("duplicate interface name '{}'", itf.name),
                ));
            }
            if itf.cardinality == Cardinality::Collection(None) {
                errors.push(CompileError::new(
                    ErrorKind::InvalidInterface,
                    itf.span,
                    format!("collection interface '{}' must declare its size", itf.name),
                ));
            }
        }
        for error in errors {
            ctx.errors.log(error)?;
        }
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::SourceLoader;
    use mindc_ast::{Definition, Interface};

    #[test]
    fn test_duplicate_and_unsized_interfaces() {
        let mut ctx = CompilationContext::default();
        ctx.register_definition(
            "demo.P",
            Definition::primitive("demo.P")
                .with_interface(Interface::server("s", "demo.I"))
                .with_interface(Interface::client("s", "demo.I"))
                .with_interface(Interface::client("many", "demo.I").collection(None))
                .with_interface(Interface::client("sized", "demo.I").collection(Some(4))),
        );
        InterfaceCheckerLoader::new(Box::new(SourceLoader))
            .load("demo.P", &Frontend::default(), &mut ctx)
            .unwrap();

        let kinds: Vec<_> = ctx.errors.errors().iter().map(|e| e.kind).collect();
        assert_eq!(kinds, [ErrorKind::DuplicateName, ErrorKind::InvalidInterface]);
        assert!(ctx.errors.errors()[1].message.contains("'many'"));
    }
}

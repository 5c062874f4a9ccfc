//! Innermost layer: load the referenced name.

use super::Resolver;
use crate::context::CompilationContext;
use crate::error::{LoadError, LoadResult};
use crate::frontend::Frontend;
use mindc_ast::{DefId, DefinitionReference, Resolved};

/// Loads the referenced name through the loader chain.
///
/// A fatal error while loading the target is reported here, located at the
/// reference when the error has no location of its own.
pub struct BasicResolver;

impl Resolver for BasicResolver {
    fn resolve(
        &self,
        reference: &mut DefinitionReference,
        _encapsulating: Option<DefId>,
        fe: &Frontend,
        ctx: &mut CompilationContext,
    ) -> LoadResult<Option<DefId>> {
        match fe.load(&reference.name, ctx) {
            Ok(id) => {
                reference.resolved = Some(Resolved::new(reference.name.clone(), id));
                Ok(Some(id))
            }
            Err(LoadError::Fatal(mut error)) => {
                if error.span.is_generated() {
                    error.span = reference.span;
                }
                ctx.errors.log(error)?;
                Ok(None)
            }
            Err(other) => Err(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mindc_ast::error::ErrorKind;
    use mindc_ast::{Definition, Span};

    #[test]
    fn test_resolves_and_decorates() {
        let fe = Frontend::default();
        let mut ctx = CompilationContext::default();
        ctx.register_definition("a.P", Definition::primitive("a.P").with_source("p.c"));

        let mut reference = DefinitionReference::new("a.P");
        let id = BasicResolver.resolve(&mut reference, None, &fe, &mut ctx).unwrap();
        assert_eq!(id, reference.resolved_id());
        assert!(id.is_some());
    }

    #[test]
    fn test_missing_is_logged_at_reference() {
        let fe = Frontend::default();
        let mut ctx = CompilationContext::default();
        let span = Span::new(0, 4, 9, 2);
        let mut reference = DefinitionReference::new("a.Missing").at(span);

        let id = BasicResolver.resolve(&mut reference, None, &fe, &mut ctx).unwrap();
        assert!(id.is_none());
        let error = &ctx.errors.errors()[0];
        assert_eq!(error.kind, ErrorKind::DefinitionNotFound);
        assert_eq!(error.span, span);
    }
}

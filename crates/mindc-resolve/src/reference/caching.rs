//! Memoize reference resolution per encapsulating definition.

use super::Resolver;
use crate::context::CompilationContext;
use crate::error::LoadResult;
use crate::frontend::Frontend;
use mindc_ast::{DefId, DefinitionReference, Resolved};
use tracing::trace;

/// Returns the earlier result for a reference with the same text in the
/// same encapsulating definition. Failures are not cached.
pub struct CachingResolver {
    next: Box<dyn Resolver>,
}

impl CachingResolver {
    pub fn new(next: Box<dyn Resolver>) -> Self {
        Self { next }
    }
}

fn cache_key(
    reference: &DefinitionReference,
    encapsulating: Option<DefId>,
    ctx: &CompilationContext,
) -> String {
    let scope = encapsulating.map(|id| ctx.get(id).name.as_str()).unwrap_or("");
    format!("{}|{}", scope, reference)
}

impl Resolver for CachingResolver {
    fn resolve(
        &self,
        reference: &mut DefinitionReference,
        encapsulating: Option<DefId>,
        fe: &Frontend,
        ctx: &mut CompilationContext,
    ) -> LoadResult<Option<DefId>> {
        let key = cache_key(reference, encapsulating, ctx);
        if let Some(id) = ctx.cached_reference(&key) {
            trace!(%key, %id, "reference cache hit");
            reference.resolved = Some(Resolved::new(ctx.get(id).name.clone(), id));
            return Ok(Some(id));
        }

        let resolved = self.next.resolve(reference, encapsulating, fe, ctx)?;
        if let Some(id) = resolved {
            ctx.cache_reference(key, id);
        }
        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::BasicResolver;
    use mindc_ast::{Definition, Value};

    #[test]
    fn test_key_includes_scope_and_arguments() {
        let mut ctx = CompilationContext::default();
        let scope = ctx.alloc(Definition::composite("a.Top"));
        let reference = DefinitionReference::new("a.D").arg(Value::Number(1));

        assert_eq!(cache_key(&reference, Some(scope), &ctx), "a.Top|a.D(1)");
        assert_eq!(cache_key(&reference, None, &ctx), "|a.D(1)");
    }

    #[test]
    fn test_second_resolution_hits_cache() {
        let fe = Frontend::default();
        let mut ctx = CompilationContext::default();
        ctx.register_definition("a.P", Definition::primitive("a.P").with_source("p.c"));
        let resolver = CachingResolver::new(Box::new(BasicResolver));

        let mut first = DefinitionReference::new("a.P");
        let mut second = DefinitionReference::new("a.P");
        let a = resolver.resolve(&mut first, None, &fe, &mut ctx).unwrap();
        let b = resolver.resolve(&mut second, None, &fe, &mut ctx).unwrap();
        assert_eq!(a, b);
        assert_eq!(second.resolved_id(), a);
    }
}

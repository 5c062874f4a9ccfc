//! Share one instance per generic and argument list.

use super::{InstantiationRequest, TemplateInstantiator};
use crate::context::CompilationContext;
use crate::error::LoadResult;
use crate::frontend::Frontend;
use mindc_ast::DefId;
use tracing::{debug, trace};

/// Outermost instantiator: names the instance, reuses it when it already
/// exists, otherwise builds, registers and loads it.
pub struct CachingInstantiator {
    next: Box<dyn TemplateInstantiator>,
}

impl CachingInstantiator {
    pub fn new(next: Box<dyn TemplateInstantiator>) -> Self {
        Self { next }
    }

    pub fn instantiate(
        &self,
        request: &InstantiationRequest,
        fe: &Frontend,
        ctx: &mut CompilationContext,
    ) -> LoadResult<DefId> {
        let name = instance_name(request, ctx);
        if ctx.is_known(&name) {
            trace!(instance = %name, "template instance reused");
            return fe.load(&name, ctx);
        }

        let instance = self.next.instantiate(request, &name, fe, ctx)?;
        debug!(instance = %name, partial = request.is_partial(), "template instantiated");
        ctx.register_definition(name.clone(), instance);
        fe.load(&name, ctx)
    }
}

/// `demo.G<demo.Foo, Q>`: the generic name followed by the bound names in
/// type parameter order.
pub fn instance_name(request: &InstantiationRequest, ctx: &CompilationContext) -> String {
    let args: Vec<String> = request
        .bindings
        .values()
        .map(|binding| binding.display_name(ctx))
        .collect();
    format!("{}<{}>", ctx.get(request.generic).name, args.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::TypeBinding;
    use mindc_ast::Definition;

    #[test]
    fn test_instance_name() {
        let mut ctx = CompilationContext::default();
        let generic = ctx.alloc(Definition::composite("demo.G"));
        let foo = ctx.alloc(Definition::primitive("demo.Foo"));
        let request = InstantiationRequest {
            generic,
            bindings: [
                ("A".to_string(), TypeBinding::Definition(foo)),
                ("B".to_string(), TypeBinding::Parameter("Q".into())),
            ]
            .into_iter()
            .collect(),
            encapsulating: None,
        };

        assert_eq!(instance_name(&request, &ctx), "demo.G<demo.Foo, Q>");
        assert!(request.is_partial());
    }
}

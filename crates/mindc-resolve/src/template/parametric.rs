//! Expose the parameters of bound definitions on the instance.

use super::{InstantiationRequest, TemplateInstantiator, TypeBinding};
use crate::context::CompilationContext;
use crate::error::LoadResult;
use crate::frontend::Frontend;
use crate::reference::hoisted_name;
use mindc_ast::{Argument, Capability, Definition, FormalParameter, Value};

/// For a placeholder of type parameter `P` bound to `Foo(x)`, the instance
/// declares a formal parameter `P$x` and the sub-component becomes
/// `Foo(x=P$x)`. A reference `G<Foo(x=5)>` hoisted to `G<Foo>(P$x=5)` then
/// substitutes the value into the instance.
pub struct ParametricInstantiator {
    next: Box<dyn TemplateInstantiator>,
}

impl ParametricInstantiator {
    pub fn new(next: Box<dyn TemplateInstantiator>) -> Self {
        Self { next }
    }
}

impl TemplateInstantiator for ParametricInstantiator {
    fn instantiate(
        &self,
        request: &InstantiationRequest,
        name: &str,
        fe: &Frontend,
        ctx: &mut CompilationContext,
    ) -> LoadResult<Definition> {
        let mut instance = self.next.instantiate(request, name, fe, ctx)?;

        let placeholders: Vec<(usize, String)> = ctx
            .get(request.generic)
            .components
            .iter()
            .enumerate()
            .filter_map(|(idx, comp)| comp.type_parameter.clone().map(|param| (idx, param)))
            .collect();

        for (idx, param) in placeholders {
            let Some(TypeBinding::Definition(bound)) = request.bindings.get(&param) else {
                continue;
            };
            let bound_def = ctx.get(*bound);
            let bound_name = bound_def.name.clone();
            let formals: Vec<String> = bound_def
                .formal_parameters
                .iter()
                .map(|p| p.name.clone())
                .collect();

            for formal in formals {
                let hoisted = hoisted_name(&param, &formal);
                if instance.formal_parameter(&hoisted).is_none() {
                    instance.capabilities = instance
                        .capabilities
                        .with(Capability::FormalParameterContainer);
                    instance.formal_parameters.push(FormalParameter::new(hoisted.clone()));
                }
                if let Some(ty) = ctx.inferred_type(&bound_name, &formal) {
                    ctx.infer_type(name, &hoisted, ty);
                }
                if let Some(reference) = instance.components[idx].definition.as_mut() {
                    reference
                        .arguments
                        .push(Argument::named(formal, Value::Reference(hoisted)));
                }
            }
        }
        Ok(instance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::BaseInstantiator;
    use mindc_ast::{Component, ParameterType};

    #[test]
    fn test_bound_parameters_are_exposed() {
        let fe = Frontend::default();
        let mut ctx = CompilationContext::default();
        let generic = ctx.alloc(
            Definition::composite("demo.Template")
                .with_type_parameter("P", None)
                .with_component(Component::placeholder("x", "P")),
        );
        let foo = ctx.alloc(Definition::primitive("demo.Foo").with_parameter("x"));
        ctx.infer_type("demo.Foo", "x", ParameterType::Integer);
        let request = InstantiationRequest {
            generic,
            bindings: [("P".to_string(), TypeBinding::Definition(foo))].into_iter().collect(),
            encapsulating: None,
        };

        let name = "demo.Template<demo.Foo>";
        let instance = ParametricInstantiator::new(Box::new(BaseInstantiator))
            .instantiate(&request, name, &fe, &mut ctx)
            .unwrap();

        assert!(instance.formal_parameter("P$x").is_some());
        let x = instance.component("x").unwrap();
        assert_eq!(x.definition.as_ref().unwrap().to_string(), "demo.Foo(x=P$x)");
        assert_eq!(ctx.inferred_type(name, "P$x"), Some(ParameterType::Integer));
    }
}

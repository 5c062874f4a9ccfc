//! Copy the generic definition and bind its placeholders.

use super::{InstantiationRequest, TemplateInstantiator, TypeBinding};
use crate::context::CompilationContext;
use crate::error::LoadResult;
use crate::frontend::Frontend;
use indexmap::IndexMap;
use mindc_ast::{
    Capability, Definition, DefinitionReference, FormalTypeParameter, Resolved, TypeArgumentValue,
};

/// Innermost instantiator.
///
/// The instance is a copy of the generic definition where:
///
/// - each placeholder bound to a definition becomes a sub-component of that
///   definition, already resolved
/// - each placeholder bound to a type parameter of the encapsulating
///   definition stays a placeholder for that parameter, which the instance
///   declares instead of the original one
/// - type parameters used as type arguments of other sub-components are
///   replaced the same way, and those sub-components are resolved again
pub struct BaseInstantiator;

impl TemplateInstantiator for BaseInstantiator {
    fn instantiate(
        &self,
        request: &InstantiationRequest,
        name: &str,
        _fe: &Frontend,
        ctx: &mut CompilationContext,
    ) -> LoadResult<Definition> {
        let generic = ctx.get(request.generic);
        let mut instance = generic.clone();
        instance.name = name.to_string();
        instance.decorations.template_of = Some(generic.name.clone());

        instance.formal_type_parameters = generic
            .formal_type_parameters
            .iter()
            .filter_map(|param| match request.bindings.get(&param.name) {
                Some(TypeBinding::Parameter(renamed)) => Some(FormalTypeParameter {
                    name: renamed.clone(),
                    ..param.clone()
                }),
                _ => None,
            })
            .collect();
        instance.decorations.partially_instantiated = !instance.formal_type_parameters.is_empty();
        if !instance.decorations.partially_instantiated {
            instance.capabilities = instance
                .capabilities
                .without(Capability::FormalTypeParameterContainer);
        }

        for comp in &mut instance.components {
            if let Some(param) = comp.type_parameter.clone() {
                match request.bindings.get(&param) {
                    Some(TypeBinding::Definition(bound)) => {
                        let target = ctx.get(*bound).name.clone();
                        let resolved = Resolved::new(target.clone(), *bound);
                        let mut reference = DefinitionReference::new(target).at(comp.span);
                        reference.resolved = Some(resolved.clone());
                        comp.definition = Some(reference);
                        comp.type_parameter = None;
                        comp.resolved = Some(resolved);
                    }
                    Some(TypeBinding::Parameter(renamed)) => {
                        comp.type_parameter = Some(renamed.clone());
                    }
                    None => {}
                }
            } else if let Some(reference) = comp.definition.as_mut() {
                if substitute_type_parameters(reference, &request.bindings, ctx) {
                    reference.clear_resolution();
                    comp.resolved = None;
                }
            }
        }
        Ok(instance)
    }
}

fn substitute_type_parameters(
    reference: &mut DefinitionReference,
    bindings: &IndexMap<String, TypeBinding>,
    ctx: &CompilationContext,
) -> bool {
    let mut changed = false;
    for type_arg in &mut reference.type_arguments {
        match &mut type_arg.value {
            TypeArgumentValue::TypeParameter(param) => match bindings.get(param.as_str()) {
                Some(TypeBinding::Definition(bound)) => {
                    let target = DefinitionReference::new(ctx.get(*bound).name.clone())
                        .at(type_arg.span);
                    type_arg.value = TypeArgumentValue::Definition(target);
                    changed = true;
                }
                Some(TypeBinding::Parameter(renamed)) => {
                    *param = renamed.clone();
                    changed = true;
                }
                None => {}
            },
            TypeArgumentValue::Definition(inner) => {
                changed |= substitute_type_parameters(inner, bindings, ctx);
            }
        }
    }
    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use mindc_ast::{Component, DefId};

    fn generic() -> Definition {
        Definition::composite("demo.G")
            .with_type_parameter("P", None)
            .with_component(Component::placeholder("x", "P"))
            .with_component(Component::new(
                "y",
                DefinitionReference::new("demo.H")
                    .type_arg(TypeArgumentValue::TypeParameter("P".into())),
            ))
    }

    fn request(generic: DefId, binding: TypeBinding) -> InstantiationRequest {
        InstantiationRequest {
            generic,
            bindings: [("P".to_string(), binding)].into_iter().collect(),
            encapsulating: None,
        }
    }

    #[test]
    fn test_full_instance() {
        let fe = Frontend::default();
        let mut ctx = CompilationContext::default();
        let g = ctx.alloc(generic());
        let foo = ctx.alloc(Definition::primitive("demo.Foo"));

        let instance = BaseInstantiator
            .instantiate(&request(g, TypeBinding::Definition(foo)), "demo.G<demo.Foo>", &fe, &mut ctx)
            .unwrap();

        assert_eq!(instance.name, "demo.G<demo.Foo>");
        assert_eq!(instance.decorations.template_of.as_deref(), Some("demo.G"));
        assert!(!instance.is_generic());
        assert!(!instance.decorations.partially_instantiated);
        let x = instance.component("x").unwrap();
        assert!(!x.is_placeholder());
        assert_eq!(x.resolved_id(), Some(foo));
        let y = instance.component("y").unwrap();
        assert_eq!(y.definition.as_ref().unwrap().to_string(), "demo.H<demo.Foo>");
        assert!(y.resolved.is_none());
    }

    #[test]
    fn test_partial_instance_renames_parameter() {
        let fe = Frontend::default();
        let mut ctx = CompilationContext::default();
        let g = ctx.alloc(generic());

        let instance = BaseInstantiator
            .instantiate(&request(g, TypeBinding::Parameter("Q".into())), "demo.G<Q>", &fe, &mut ctx)
            .unwrap();

        assert!(instance.decorations.partially_instantiated);
        assert!(instance.formal_type_parameter("Q").is_some());
        assert!(instance.formal_type_parameter("P").is_none());
        assert_eq!(instance.component("x").unwrap().type_parameter.as_deref(), Some("Q"));
        assert_eq!(instance.component("y").unwrap().definition.as_ref().unwrap().to_string(), "demo.H<Q>");
    }
}

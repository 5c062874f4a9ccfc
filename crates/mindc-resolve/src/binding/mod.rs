//! Binding normalization and checking
//!
//! A binding `from → to` connects a client interface to a server interface.
//! An endpoint names either a sub-component (`x.c`) or the enclosing
//! composite (`this.s`); a `this` endpoint designates the internal interface
//! of the composite, whose role is the opposite of the external one.
//!
//! Stages, in loading order:
//!
//! 1. [`BindingNormalizerLoader`]: expand collection-to-collection bindings
//!    and reject duplicates
//! 2. [`BindingCheckerLoader`]: role, contingency, cardinality and signature
//!    compatibility of each binding
//! 3. [`UnboundInterfaceCheckerLoader`]: mandatory client interfaces left
//!    unbound

mod checker;
mod normalizer;
mod unbound;

pub use checker::{BindingChecker, BindingCheckerLoader, BoundEnd};
pub use normalizer::BindingNormalizerLoader;
pub use unbound::UnboundInterfaceCheckerLoader;

use crate::context::CompilationContext;
use mindc_ast::{DefId, Definition, Endpoint, Interface};

/// What an endpoint designates inside a definition.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum EndpointInterface {
    /// The interface, as seen from inside the definition
    Found(Interface),
    /// The sub-component did not resolve; that has been reported already
    Unresolved,
    UnknownComponent,
    UnknownInterface,
}

/// Definition whose interfaces a sub-component exposes: its resolved
/// definition, or the conformance type of a placeholder.
pub(crate) fn component_definition(def: &Definition, component: &str) -> Option<DefId> {
    let comp = def.component(component)?;
    comp.resolved_id().or_else(|| {
        comp.type_parameter
            .as_deref()
            .and_then(|param| def.formal_type_parameter(param))
            .and_then(|param| param.conforms_to.as_ref())
            .and_then(|conformance| conformance.resolved_id())
    })
}

pub(crate) fn endpoint_interface(
    def: &Definition,
    endpoint: &Endpoint,
    ctx: &CompilationContext,
) -> EndpointInterface {
    if endpoint.is_this() {
        if let Some(internal) = def.internal_interface(&endpoint.interface) {
            return EndpointInterface::Found(internal.clone());
        }
        return match def.interface(&endpoint.interface) {
            Some(external) => EndpointInterface::Found(external.dual()),
            None => EndpointInterface::UnknownInterface,
        };
    }

    if def.component(&endpoint.component).is_none() {
        return EndpointInterface::UnknownComponent;
    }
    let Some(sub) = component_definition(def, &endpoint.component) else {
        return EndpointInterface::Unresolved;
    };
    match ctx.get(sub).interface(&endpoint.interface) {
        Some(itf) => EndpointInterface::Found(itf.clone()),
        None => EndpointInterface::UnknownInterface,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mindc_ast::{Component, DefinitionReference, Resolved, THIS};

    #[test]
    fn test_endpoint_lookup() {
        let mut ctx = CompilationContext::default();
        let sub = ctx.alloc(
            Definition::primitive("demo.P").with_interface(Interface::client("c", "demo.I")),
        );
        let mut comp = Component::new("x", DefinitionReference::new("demo.P"));
        comp.resolved = Some(Resolved::new("demo.P", sub));
        let def = Definition::composite("demo.Top")
            .with_interface(Interface::server("s", "demo.I"))
            .with_component(comp)
            .with_component(Component::new("y", DefinitionReference::new("demo.Missing")));

        match endpoint_interface(&def, &Endpoint::new(THIS, "s"), &ctx) {
            EndpointInterface::Found(itf) => assert!(itf.is_client()),
            other => panic!("unexpected {:?}", other),
        }
        match endpoint_interface(&def, &Endpoint::new("x", "c"), &ctx) {
            EndpointInterface::Found(itf) => assert!(itf.is_client()),
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(
            endpoint_interface(&def, &Endpoint::new("x", "nope"), &ctx),
            EndpointInterface::UnknownInterface
        );
        assert_eq!(
            endpoint_interface(&def, &Endpoint::new("z", "c"), &ctx),
            EndpointInterface::UnknownComponent
        );
        assert_eq!(
            endpoint_interface(&def, &Endpoint::new("y", "c"), &ctx),
            EndpointInterface::Unresolved
        );
    }
}

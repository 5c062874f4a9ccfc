//! Internal interfaces of composites.

use super::controllers::INTERFACE_DELEGATOR;
use crate::context::CompilationContext;
use crate::error::LoadResult;
use crate::frontend::Frontend;
use crate::loader::Loader;
use mindc_ast::{Capability, Controller, DefId, Definition};
use tracing::trace;

/// For every external interface of a composite that is bound through
/// `this` or optional, and not already implemented by a controller, adds
/// the internal interface of opposite role and a delegator controller.
pub struct CompositeInternalInterfaceLoader {
    next: Box<dyn Loader>,
}

impl CompositeInternalInterfaceLoader {
    pub fn new(next: Box<dyn Loader>) -> Self {
        Self { next }
    }
}

fn delegated_interfaces(def: &Definition) -> Vec<String> {
    def.interfaces
        .iter()
        .filter(|itf| !def.controllers.iter().any(|c| c.implements_external(&itf.name)))
        .filter(|itf| {
            itf.is_optional()
                || def.bindings.iter().any(|b| {
                    (b.from.is_this() && b.from.interface == itf.name)
                        || (b.to.is_this() && b.to.interface == itf.name)
                })
        })
        .map(|itf| itf.name.clone())
        .collect()
}

impl Loader for CompositeInternalInterfaceLoader {
    fn load(&self, name: &str, fe: &Frontend, ctx: &mut CompilationContext) -> LoadResult<DefId> {
        let id = self.next.load(name, fe, ctx)?;
        let def = ctx.get(id);
        if !def.is_composite() {
            return Ok(id);
        }
        let delegated = delegated_interfaces(def);
        if delegated.is_empty() {
            return Ok(id);
        }

        let mut def = def
            .clone()
            .upgrade(Capability::InternalInterfaceContainer)?
            .upgrade(Capability::ControllerContainer)?;
        let mut delegator = Controller::new(INTERFACE_DELEGATOR);
        for itf_name in &delegated {
            if def.internal_interface(itf_name).is_none() {
                if let Some(external) = def.interface(itf_name) {
                    let internal = external.dual();
                    def.internal_interfaces.push(internal);
                }
            }
            delegator = delegator.external(itf_name.as_str()).internal(itf_name.as_str());
        }
        trace!(definition = %def.name, interfaces = ?delegated, "added interface delegator");
        def.controllers.push(delegator);
        ctx.replace(id, def);
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mindc_ast::{Binding, Endpoint, Interface, THIS};

    #[test]
    fn test_delegated_interfaces() {
        let mut def = Definition::composite("demo.Top")
            .with_interface(Interface::server("wired", "demo.I"))
            .with_interface(Interface::client("opt", "demo.I").optional())
            .with_interface(Interface::server("unwired", "demo.I"))
            .with_interface(Interface::server("ctrl", "demo.I"))
            .with_binding(Binding::new(Endpoint::new(THIS, "wired"), Endpoint::new("x", "s")));
        def.controllers.push(Controller::new("Custom").external("ctrl"));

        assert_eq!(delegated_interfaces(&def), vec!["wired", "opt"]);
    }

    #[test]
    fn test_loader_adds_twins_once() {
        let fe = Frontend::default();
        let mut ctx = CompilationContext::default();
        let top = Definition::composite("demo.Top")
            .with_interface(Interface::server("s", "demo.I"))
            .with_binding(Binding::new(Endpoint::new(THIS, "s"), Endpoint::new("x", "s")));
        ctx.register_definition("demo.Top", top);
        let loader = CompositeInternalInterfaceLoader::new(Box::new(crate::loader::SourceLoader));

        let id = loader.load("demo.Top", &fe, &mut ctx).unwrap();
        let id_again = loader.load("demo.Top", &fe, &mut ctx).unwrap();
        assert_eq!(id, id_again);

        let def = ctx.get(id);
        assert_eq!(def.internal_interfaces.len(), 1);
        assert!(def.internal_interfaces[0].is_client());
        assert_eq!(def.controllers.len(), 1);
        assert!(def.controllers[0].implements_external("s"));
    }
}

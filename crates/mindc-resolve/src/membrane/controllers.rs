//! Controller interfaces added to a membrane.

use crate::error::LoadResult;
use mindc_ast::{Capability, Controller, Definition, Interface};

/// Interface every membrane exposes first.
pub const COMPONENT_INTERFACE: &str = "component";

pub const LIFE_CYCLE_INTERFACE: &str = "lifeCycleController";
pub const LIFE_CYCLE_SIGNATURE: &str = "fractal.api.LifeCycleController";
pub const LIFE_CYCLE_DELEGATE: &str = "/fractal/internal/LCCdelegate.c";

pub const ATTRIBUTE_INTERFACE: &str = "attributeController";
pub const ATTRIBUTE_SIGNATURE: &str = "fractal.api.AttributeController";
pub const ATTRIBUTE_DELEGATE: &str = "/fractal/internal/ACdelegate.c";

pub const BINDING_INTERFACE: &str = "bindingController";
pub const BINDING_SIGNATURE: &str = "fractal.api.BindingController";

pub const CONTENT_INTERFACE: &str = "contentController";
pub const CONTENT_SIGNATURE: &str = "fractal.api.ContentController";

pub const FACTORY_INTERFACE: &str = "factory";
pub const FACTORY_SIGNATURE: &str = "fractal.api.Factory";
pub const ALLOCATOR_INTERFACE: &str = "allocator";
pub const ALLOCATOR_SIGNATURE: &str = "memory.api.Allocator";

/// Controller source delegating external interfaces of a composite to the
/// internal interfaces bound inside it.
pub const INTERFACE_DELEGATOR: &str = "InterfaceDelegator";
pub const CLONEABLE_CONTROLLER: &str = "CloneableController";

/// Add the controller interface `name` to `def`.
///
/// - `shared_implementation`, if any, is recorded once
/// - the server interface is added unless `def` already declares it
/// - a controller implemented by `source` is added unless a controller
///   already covers the interface
pub fn add_controller_interface(
    def: Definition,
    name: &str,
    signature: &str,
    source: &str,
    shared_implementation: Option<&str>,
) -> LoadResult<Definition> {
    let mut def = def.upgrade(Capability::InterfaceContainer)?;
    if let Some(path) = shared_implementation {
        let shared = &mut def.decorations.shared_implementations;
        if !shared.iter().any(|p| p == path) {
            shared.push(path.to_string());
        }
    }
    if def.interface(name).is_none() {
        let mut itf = Interface::server(name, signature);
        itf.controller_interface = true;
        def.interfaces.push(itf);
    }

    let mut def = def.upgrade(Capability::ControllerContainer)?;
    if !def.controllers.iter().any(|c| c.covers(name)) {
        def.controllers.push(Controller::new(source).external(name));
    }
    Ok(def)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adds_interface_and_controller_once() {
        let def = Definition::primitive("demo.P").with_source("p.c");
        let once = add_controller_interface(
            def,
            LIFE_CYCLE_INTERFACE,
            LIFE_CYCLE_SIGNATURE,
            "LifeCycleController",
            Some(LIFE_CYCLE_DELEGATE),
        )
        .unwrap();
        let twice = add_controller_interface(
            once.clone(),
            LIFE_CYCLE_INTERFACE,
            LIFE_CYCLE_SIGNATURE,
            "LifeCycleController",
            Some(LIFE_CYCLE_DELEGATE),
        )
        .unwrap();

        assert_eq!(once, twice);
        let itf = twice.interface(LIFE_CYCLE_INTERFACE).unwrap();
        assert!(itf.is_server());
        assert!(itf.controller_interface);
        assert_eq!(twice.controllers.len(), 1);
        assert!(twice.has(Capability::ControllerContainer));
        assert_eq!(twice.decorations.shared_implementations, vec![LIFE_CYCLE_DELEGATE]);
    }

    #[test]
    fn test_existing_interface_kept() {
        let def = Definition::primitive("demo.P")
            .with_interface(Interface::server(BINDING_INTERFACE, "demo.CustomBC"));
        let def = add_controller_interface(def, BINDING_INTERFACE, BINDING_SIGNATURE, "BindingController", None)
            .unwrap();
        assert_eq!(def.interfaces.len(), 1);
        assert_eq!(def.interfaces[0].signature, "demo.CustomBC");
    }
}

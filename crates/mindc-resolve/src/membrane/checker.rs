//! Check the membrane of a loaded definition.

use super::controllers::COMPONENT_INTERFACE;
use crate::context::CompilationContext;
use crate::error::{LoadError, LoadResult};
use crate::frontend::Frontend;
use crate::loader::Loader;
use mindc_ast::error::{CompileError, ErrorKind};
use mindc_ast::{DefId, Definition, Interface};

/// Checks that:
///
/// - every interface a controller refers to exists, in the external or
///   internal list as declared (fatal)
/// - every internal interface is used by some controller (fatal)
/// - every external interface is implemented by a controller, unless the
///   definition is abstract, a type, or has implementation sources (fatal)
///
/// The `component` interface, when present, is moved first.
pub struct MembraneCheckerLoader {
    next: Box<dyn Loader>,
}

impl MembraneCheckerLoader {
    pub fn new(next: Box<dyn Loader>) -> Self {
        Self { next }
    }
}

fn check_controllers(def: &Definition) -> LoadResult<()> {
    for ctrl in &def.controllers {
        for itf in &ctrl.interfaces {
            let (exists, which) = if itf.is_internal {
                (def.internal_interface(&itf.name).is_some(), "internal")
            } else {
                (def.interface(&itf.name).is_some(), "external")
            };
            if !exists {
                let span = if ctrl.span.is_generated() { def.span } else { ctrl.span };
                return Err(LoadError::fatal(
                    ErrorKind::InvalidController,
                    span,
                    format!(
                        "controller of '{}' refers to unknown {} interface '{}'",
                        def.name, which, itf.name
                    ),
                ));
            }
        }
    }
    Ok(())
}

fn unused_internal_interfaces(def: &Definition) -> Vec<&Interface> {
    def.internal_interfaces
        .iter()
        .filter(|itf| {
            !def.controllers
                .iter()
                .flat_map(|c| &c.interfaces)
                .any(|ci| ci.is_internal && ci.name == itf.name)
        })
        .collect()
}

fn check_internal_interfaces(def: &Definition) -> LoadResult<()> {
    let unused = unused_internal_interfaces(def);
    let Some(first) = unused.first() else {
        return Ok(());
    };
    let mut error = CompileError::new(
        ErrorKind::InvalidController,
        first.span,
        format!("internal interface '{}' is not used by any controller", first.name),
    );
    for itf in &unused[1..] {
        error = error.with_label(itf.span, format!("'{}' is not used either", itf.name));
    }
    Err(LoadError::Fatal(error))
}

/// External interfaces no controller implements, if the definition needs
/// its controllers to implement them.
fn unimplemented_interfaces(def: &Definition) -> Vec<&str> {
    if def.is_abstract || def.is_type() || !def.sources.is_empty() {
        return Vec::new();
    }
    def.interfaces
        .iter()
        .filter(|itf| !def.controllers.iter().any(|c| c.implements_external(&itf.name)))
        .map(|itf| itf.name.as_str())
        .collect()
}

impl Loader for MembraneCheckerLoader {
    fn load(&self, name: &str, fe: &Frontend, ctx: &mut CompilationContext) -> LoadResult<DefId> {
        let id = self.next.load(name, fe, ctx)?;
        let def = ctx.get(id);
        check_controllers(def)?;
        check_internal_interfaces(def)?;

        let missing = unimplemented_interfaces(def);
        let unimplemented = (!missing.is_empty()).then(|| {
            LoadError::fatal(
                ErrorKind::UnimplementedInterface,
                def.span,
                format!(
                    "Interfaces : {} are not implemented. Add a source file or a controller.",
                    missing.join(", ")
                ),
            )
        });
        let component_position = def
            .interfaces
            .iter()
            .position(|itf| itf.name == COMPONENT_INTERFACE);

        if let Some(fatal) = unimplemented {
            return Err(fatal);
        }
        if let Some(position) = component_position.filter(|p| *p > 0) {
            let interfaces = &mut ctx.get_mut(id).interfaces;
            let component = interfaces.remove(position);
            interfaces.insert(0, component);
        }
        Ok(id)
    }
}

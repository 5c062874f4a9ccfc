//! Mandatory client interfaces left unbound inside a composite.

use super::component_definition;
use crate::context::CompilationContext;
use crate::error::{LoadError, LoadResult};
use crate::frontend::Frontend;
use crate::loader::Loader;
use mindc_ast::error::{CompileError, ErrorKind};
use mindc_ast::{Binding, DefId, Definition, Interface, Span, THIS};
use tracing::trace;

/// Fails the load when a mandatory client interface of a composite has no
/// binding starting from it. The other unbound interfaces become labels.
///
/// Two kinds of client interfaces are checked: the internal interfaces of
/// the composite itself (the inside of its server interfaces) and the client
/// interfaces of its sub-components. A collection is bound when one binding
/// covers it without an index, or when every element of a sized collection
/// is bound. An unsized collection needs at least one binding.
pub struct UnboundInterfaceCheckerLoader {
    next: Box<dyn Loader>,
}

impl UnboundInterfaceCheckerLoader {
    pub fn new(next: Box<dyn Loader>) -> Self {
        Self { next }
    }
}

fn is_bound(interface: &Interface, component: &str, bindings: &[&Binding]) -> bool {
    let from: Vec<Option<u32>> = bindings
        .iter()
        .filter(|b| b.from.component == component && b.from.interface == interface.name)
        .map(|b| b.from.index)
        .collect();
    if from.is_empty() {
        return false;
    }
    if !interface.is_collection() || from.contains(&None) {
        return true;
    }
    match u32::try_from(interface.number_of_elements()) {
        Ok(size) => (0..size).all(|index| from.contains(&Some(index))),
        Err(_) => true,
    }
}

fn unbound(def: &Definition, ctx: &CompilationContext) -> Vec<(String, Span)> {
    let bindings: Vec<&Binding> = def.bindings.iter().collect();
    let mut missing = Vec::new();

    let internal = def
        .internal_interfaces
        .iter()
        .cloned()
        .chain(
            def.interfaces
                .iter()
                .filter(|itf| def.internal_interface(&itf.name).is_none())
                .map(Interface::dual),
        )
        .filter(|itf| itf.is_client() && itf.is_mandatory() && !itf.controller_interface);
    for itf in internal {
        if !is_bound(&itf, THIS, &bindings) {
            missing.push((format!("{}.{}", THIS, itf.name), itf.span));
        }
    }

    for component in &def.components {
        let Some(sub) = component_definition(def, &component.name) else {
            continue;
        };
        let required = ctx
            .get(sub)
            .interfaces
            .iter()
            .filter(|itf| itf.is_client() && itf.is_mandatory() && !itf.controller_interface);
        for itf in required {
            if !is_bound(itf, &component.name, &bindings) {
                missing.push((format!("{}.{}", component.name, itf.name), component.span));
            }
        }
    }
    missing
}

impl Loader for UnboundInterfaceCheckerLoader {
    fn load(&self, name: &str, fe: &Frontend, ctx: &mut CompilationContext) -> LoadResult<DefId> {
        let id = self.next.load(name, fe, ctx)?;
        let def = ctx.get(id);
        if !def.is_composite() || def.is_abstract {
            return Ok(id);
        }

        let missing = unbound(def, ctx);
        trace!(name, unbound = missing.len(), "checked client interfaces");
        let Some((endpoint, span)) = missing.first() else {
            return Ok(id);
        };
        let mut error = CompileError::new(
            ErrorKind::UnboundInterface,
            *span,
            format!("client interface '{}' of '{}' is not bound", endpoint, name),
        );
        for (endpoint, span) in &missing[1..] {
            error = error.with_label(*span, format!("'{}' is not bound either", endpoint));
        }
        Err(LoadError::Fatal(error))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::SourceLoader;
    use mindc_ast::{Component, DefinitionReference, Endpoint, Resolved};

    fn composite(ctx: &mut CompilationContext, client: Interface) -> Definition {
        let sub = ctx.alloc(Definition::primitive("demo.C").with_interface(client));
        let mut a = Component::new("a", DefinitionReference::new("demo.C"));
        a.resolved = Some(Resolved::new("demo.C", sub));
        Definition::composite("demo.Top").with_component(a)
    }

    fn errors(def: Definition, mut ctx: CompilationContext) -> Vec<String> {
        ctx.register_definition("demo.Top", def);
        let result = UnboundInterfaceCheckerLoader::new(Box::new(SourceLoader))
            .load("demo.Top", &Frontend::default(), &mut ctx);
        assert!(!ctx.errors.has_errors());
        match result {
            Ok(_) => Vec::new(),
            Err(LoadError::Fatal(error)) => {
                assert_eq!(error.kind, ErrorKind::UnboundInterface);
                std::iter::once(error.message)
                    .chain(error.labels.into_iter().map(|l| l.message))
                    .collect()
            }
            Err(other) => panic!("unexpected error {}", other),
        }
    }

    #[test]
    fn test_unbound_sub_component_client() {
        let mut ctx = CompilationContext::default();
        let def = composite(&mut ctx, Interface::client("c", "demo.I"));
        let messages = errors(def, ctx);
        assert_eq!(messages.len(), 1);
        assert!(messages[0].contains("'a.c'"));
    }

    #[test]
    fn test_bound_and_optional_clients() {
        let mut ctx = CompilationContext::default();
        let def = composite(&mut ctx, Interface::client("c", "demo.I"))
            .with_interface(Interface::client("out", "demo.I"))
            .with_binding(Binding::new(Endpoint::new("a", "c"), Endpoint::new(THIS, "out")));
        assert!(errors(def, ctx).is_empty());

        let mut ctx = CompilationContext::default();
        let def = composite(&mut ctx, Interface::client("c", "demo.I").optional());
        assert!(errors(def, ctx).is_empty());
    }

    #[test]
    fn test_internal_interface_of_server() {
        let mut ctx = CompilationContext::default();
        let def = composite(&mut ctx, Interface::client("c", "demo.I").optional())
            .with_interface(Interface::server("s", "demo.I"));
        let messages = errors(def, ctx);
        assert_eq!(messages.len(), 1);
        assert!(messages[0].contains("'this.s'"));
    }

    #[test]
    fn test_partially_bound_collection() {
        let mut ctx = CompilationContext::default();
        let def = composite(&mut ctx, Interface::client("c", "demo.I").collection(Some(2)))
            .with_interface(Interface::client("out", "demo.I").collection(Some(2)))
            .with_binding(Binding::new(
                Endpoint::indexed("a", "c", 0),
                Endpoint::indexed(THIS, "out", 0),
            ));
        assert_eq!(errors(def, ctx).len(), 1);

        let mut ctx = CompilationContext::default();
        let def = composite(&mut ctx, Interface::client("c", "demo.I").collection(None))
            .with_interface(Interface::client("out", "demo.I").collection(Some(2)))
            .with_binding(Binding::new(
                Endpoint::indexed("a", "c", 0),
                Endpoint::indexed(THIS, "out", 0),
            ));
        assert!(errors(def, ctx).is_empty());
    }
}

//! Expand collection bindings and reject duplicates.

use super::{endpoint_interface, EndpointInterface};
use crate::context::CompilationContext;
use crate::error::LoadResult;
use crate::frontend::Frontend;
use crate::loader::{rewrite, Loader};
use mindc_ast::error::{CompileError, ErrorKind};
use mindc_ast::{Binding, DefId, Definition, Endpoint, Span};
use std::collections::HashMap;

/// An unindexed binding between two collections of known size becomes one
/// indexed binding per element pair, `min(size)` in all. A mandatory client
/// collection larger than its target is left as is for the binding checker
/// to reject.
///
/// Two bindings from the same client endpoint are reported and the second
/// one is dropped.
pub struct BindingNormalizerLoader {
    next: Box<dyn Loader>,
}

impl BindingNormalizerLoader {
    pub fn new(next: Box<dyn Loader>) -> Self {
        Self { next }
    }
}

/// Number of indexed bindings `binding` expands to, if it expands.
fn expansion(def: &Definition, binding: &Binding, ctx: &CompilationContext) -> Option<u32> {
    if binding.from.index.is_some() || binding.to.index.is_some() {
        return None;
    }
    let EndpointInterface::Found(from) = endpoint_interface(def, &binding.from, ctx) else {
        return None;
    };
    let EndpointInterface::Found(to) = endpoint_interface(def, &binding.to, ctx) else {
        return None;
    };
    if !from.is_collection() || !to.is_collection() {
        return None;
    }
    let (emitted, received) = (from.number_of_elements(), to.number_of_elements());
    if emitted < 0 || received < 0 || (from.is_mandatory() && emitted > received) {
        return None;
    }
    u32::try_from(emitted.min(received)).ok()
}

fn indexed(endpoint: &Endpoint, index: u32) -> Endpoint {
    Endpoint::indexed(endpoint.component.clone(), endpoint.interface.clone(), index)
}

impl Loader for BindingNormalizerLoader {
    fn load(&self, name: &str, fe: &Frontend, ctx: &mut CompilationContext) -> LoadResult<DefId> {
        let id = self.next.load(name, fe, ctx)?;
        if ctx.get(id).bindings.is_empty() {
            return Ok(id);
        }

        rewrite(id, ctx, |def, ctx| {
            let mut normalized = Vec::with_capacity(def.bindings.len());
            for binding in &def.bindings {
                match expansion(def, binding, ctx) {
                    Some(count) => normalized.extend((0..count).map(|index| Binding {
                        from: indexed(&binding.from, index),
                        to: indexed(&binding.to, index),
                        ..binding.clone()
                    })),
                    None => normalized.push(binding.clone()),
                }
            }

            let mut first_binding: HashMap<String, Span> = HashMap::new();
            let mut kept = Vec::with_capacity(normalized.len());
            for binding in normalized {
                if let Some(first) = first_binding.get(&binding.id()) {
                    let error = CompileError::new(
                        ErrorKind::DuplicateBinding,
                        binding.span,
                        format!("interface '{}' is bound more than once", binding.from),
                    )
                    .with_label(*first, "first bound here".to_string());
                    ctx.errors.log(error)?;
                    continue;
                }
                first_binding.insert(binding.id(), binding.span);
                kept.push(binding);
            }
            def.bindings = kept;
            Ok(())
        })?;
        Ok(id)
    }
}

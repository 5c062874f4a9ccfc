//! Hoist value arguments out of type arguments.
//!
//! `G<Foo(x=5)>` is rewritten to `G<Foo>(P$x=5)` where `P` is the type
//! parameter bound to `Foo`. The template instance `G<Foo>` exposes `P$x`
//! as a formal parameter of its own, so the value ends up substituted into
//! the instance rather than into a separate copy of `Foo`.

use super::{hoisted_name, Resolver};
use crate::context::CompilationContext;
use crate::error::{LoadError, LoadResult};
use crate::frontend::Frontend;
use mindc_ast::{Argument, DefId, Definition, DefinitionReference, TypeArgumentValue};
use tracing::trace;

pub struct TypeArgumentHoistingResolver {
    next: Box<dyn Resolver>,
}

impl TypeArgumentHoistingResolver {
    pub fn new(next: Box<dyn Resolver>) -> Self {
        Self { next }
    }
}

impl Resolver for TypeArgumentHoistingResolver {
    fn resolve(
        &self,
        reference: &mut DefinitionReference,
        encapsulating: Option<DefId>,
        fe: &Frontend,
        ctx: &mut CompilationContext,
    ) -> LoadResult<Option<DefId>> {
        let needs_hoisting = reference.type_arguments.iter().any(|type_arg| {
            matches!(&type_arg.value, TypeArgumentValue::Definition(inner) if !inner.arguments.is_empty())
        });
        if needs_hoisting {
            hoist(reference, fe, ctx)?;
        }
        self.next.resolve(reference, encapsulating, fe, ctx)
    }
}

/// Peek at a definition without reporting failures; the layers that resolve
/// it for real report them.
fn peek(name: &str, fe: &Frontend, ctx: &mut CompilationContext) -> LoadResult<Option<DefId>> {
    match fe.load(name, ctx) {
        Ok(id) => Ok(Some(id)),
        Err(LoadError::Fatal(_)) => Ok(None),
        Err(other) => Err(other),
    }
}

fn hoist(
    reference: &mut DefinitionReference,
    fe: &Frontend,
    ctx: &mut CompilationContext,
) -> LoadResult<()> {
    let Some(generic) = peek(&reference.name, fe, ctx)? else {
        return Ok(());
    };
    let params: Vec<String> = ctx
        .get(generic)
        .formal_type_parameters
        .iter()
        .map(|p| p.name.clone())
        .collect();

    let mut hoisted = Vec::new();
    for (position, type_arg) in reference.type_arguments.iter_mut().enumerate() {
        let TypeArgumentValue::Definition(inner) = &mut type_arg.value else {
            continue;
        };
        if inner.arguments.is_empty() {
            continue;
        }
        let param = match &type_arg.name {
            Some(name) => Some(name.clone()),
            None => params.get(position).cloned(),
        };
        let Some(param) = param else {
            continue;
        };
        let Some(inner_names) = argument_names(inner, fe, ctx)? else {
            continue;
        };
        for (name, arg) in inner_names.into_iter().zip(inner.arguments.drain(..)) {
            let mut outer = Argument::named(hoisted_name(&param, &name), arg.value);
            outer.span = arg.span;
            hoisted.push(outer);
        }
    }

    if !hoisted.is_empty() {
        trace!(reference = %reference.name, count = hoisted.len(), "hoisted type argument values");
        reference.arguments.extend(hoisted);
    }
    Ok(())
}

/// Parameter name of each argument of `inner`, or `None` if they cannot be
/// matched to the formal parameters of its target.
fn argument_names(
    inner: &DefinitionReference,
    fe: &Frontend,
    ctx: &mut CompilationContext,
) -> LoadResult<Option<Vec<String>>> {
    if inner.has_named_arguments() {
        return Ok(Some(
            inner
                .arguments
                .iter()
                .filter_map(|arg| arg.name.clone())
                .collect(),
        ));
    }
    if inner.arguments.iter().any(|arg| arg.name.is_some()) {
        return Ok(None);
    }
    let Some(target) = peek(&inner.name, fe, ctx)? else {
        return Ok(None);
    };
    Ok(ordinal_names(ctx.get(target), inner.arguments.len()))
}

fn ordinal_names(target: &Definition, count: usize) -> Option<Vec<String>> {
    (target.formal_parameters.len() == count)
        .then(|| target.formal_parameters.iter().map(|p| p.name.clone()).collect())
}

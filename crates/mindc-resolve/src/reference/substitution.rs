//! Value substitution
//!
//! A reference that binds every formal parameter of its target to a literal
//! designates a distinct definition: a copy of the target where each use of a
//! parameter is replaced by its value. The copy is named after the target and
//! the bindings in parameter order (`demo.D1(size=10)`), registered in the
//! context and loaded through the full loader chain, so an identical
//! reference anywhere in the compilation reuses it.
//!
//! When parameter references are allowed (extends clauses), a value may also
//! name a parameter of the referencing definition; the copy then declares
//! that parameter itself so it still type-checks on its own.

use super::Resolver;
use crate::context::CompilationContext;
use crate::error::{LoadError, LoadResult};
use crate::frontend::Frontend;
use indexmap::{IndexMap, IndexSet};
use mindc_ast::{
    Capability, DefId, Definition, DefinitionReference, FormalParameter, Resolved,
    TypeArgumentValue, Value,
};
use tracing::debug;

/// Substitutes literal arguments into a copy of the resolved definition.
pub struct ValueSubstitutionResolver {
    next: Box<dyn Resolver>,
}

impl ValueSubstitutionResolver {
    pub fn new(next: Box<dyn Resolver>) -> Self {
        Self { next }
    }
}

impl Resolver for ValueSubstitutionResolver {
    fn resolve(
        &self,
        reference: &mut DefinitionReference,
        encapsulating: Option<DefId>,
        fe: &Frontend,
        ctx: &mut CompilationContext,
    ) -> LoadResult<Option<DefId>> {
        let Some(target) = self.next.resolve(reference, encapsulating, fe, ctx)? else {
            return Ok(None);
        };
        match substitute(reference, target, false, fe, ctx)? {
            Substitution::NotApplicable => Ok(Some(target)),
            Substitution::Failed => Ok(None),
            Substitution::Substituted(id) => {
                reference.resolved = Some(Resolved::new(ctx.get(id).name.clone(), id));
                Ok(Some(id))
            }
        }
    }
}

enum Substitution {
    NotApplicable,
    Substituted(DefId),
    Failed,
}

/// Substitute the arguments of `reference` into `target`.
///
/// Returns the substituted definition, or `None` when the arguments do not
/// bind every parameter to a substitutable value (or loading the copy failed,
/// which has been reported).
pub(crate) fn substitute_values(
    reference: &DefinitionReference,
    target: DefId,
    allow_references: bool,
    fe: &Frontend,
    ctx: &mut CompilationContext,
) -> LoadResult<Option<DefId>> {
    Ok(match substitute(reference, target, allow_references, fe, ctx)? {
        Substitution::Substituted(id) => Some(id),
        Substitution::NotApplicable | Substitution::Failed => None,
    })
}

fn substitute(
    reference: &DefinitionReference,
    target: DefId,
    allow_references: bool,
    fe: &Frontend,
    ctx: &mut CompilationContext,
) -> LoadResult<Substitution> {
    let def = ctx.get(target);
    if def.formal_parameters.is_empty() || reference.arguments.is_empty() {
        return Ok(Substitution::NotApplicable);
    }

    let mut bindings = IndexMap::new();
    for formal in &def.formal_parameters {
        let bound = reference
            .arguments
            .iter()
            .find(|arg| arg.name.as_deref() == Some(formal.name.as_str()));
        let Some(arg) = bound else {
            return Ok(Substitution::NotApplicable);
        };
        if !arg.value.is_literal() && !allow_references {
            return Ok(Substitution::NotApplicable);
        }
        bindings.insert(formal.name.clone(), arg.value.clone());
    }

    let name = substituted_name(&def.name, &bindings);
    if !ctx.is_known(&name) {
        let copy = substituted_copy(def, name.clone(), &bindings);
        debug!(definition = %name, "registering substituted definition");
        ctx.register_definition(name.clone(), copy);
    }

    match fe.load(&name, ctx) {
        Ok(id) => Ok(Substitution::Substituted(id)),
        Err(LoadError::Fatal(mut error)) => {
            if error.span.is_generated() {
                error.span = reference.span;
            }
            ctx.errors.log(error)?;
            Ok(Substitution::Failed)
        }
        Err(other) => Err(other),
    }
}

/// Name of `base` with `bindings` substituted: `demo.D1(size=10)`.
pub fn substituted_name(base: &str, bindings: &IndexMap<String, Value>) -> String {
    let args: Vec<String> = bindings
        .iter()
        .map(|(name, value)| format!("{}={}", name, value))
        .collect();
    format!("{}({})", base, args.join(","))
}

fn substituted_copy(
    def: &Definition,
    name: String,
    bindings: &IndexMap<String, Value>,
) -> Definition {
    let mut copy = def.clone();
    copy.decorations.substituted_from = Some(def.name.clone());
    copy.name = name;

    // Parameters of the referencing definition still used by the copy.
    let forwarded: IndexSet<String> = bindings
        .values()
        .filter_map(|value| value.reference().map(str::to_string))
        .collect();
    copy.formal_parameters = forwarded.into_iter().map(FormalParameter::new).collect();
    if copy.formal_parameters.is_empty() {
        copy.capabilities = copy
            .capabilities
            .without(Capability::FormalParameterContainer);
    }

    for attr in &mut copy.attributes {
        if let Some(value) = attr.value.as_mut() {
            substitute_value(value, bindings);
        }
    }
    for comp in &mut copy.components {
        if let Some(reference) = comp.definition.as_mut() {
            if substitute_reference(reference, bindings) {
                reference.clear_resolution();
                comp.resolved = None;
            }
        }
    }
    copy
}

fn substitute_value(value: &mut Value, bindings: &IndexMap<String, Value>) -> bool {
    let replacement = value.reference().and_then(|param| bindings.get(param));
    match replacement {
        Some(bound) => {
            *value = bound.clone();
            true
        }
        None => false,
    }
}

fn substitute_reference(
    reference: &mut DefinitionReference,
    bindings: &IndexMap<String, Value>,
) -> bool {
    let mut changed = false;
    for arg in &mut reference.arguments {
        changed |= substitute_value(&mut arg.value, bindings);
    }
    for type_arg in &mut reference.type_arguments {
        if let TypeArgumentValue::Definition(inner) = &mut type_arg.value {
            changed |= substitute_reference(inner, bindings);
        }
    }
    changed
}

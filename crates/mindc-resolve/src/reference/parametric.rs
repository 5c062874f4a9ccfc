//! Check value arguments against the formal parameters of the target.

use super::{is_hoisted, Resolver};
use crate::context::CompilationContext;
use crate::error::{LoadError, LoadResult};
use crate::frontend::Frontend;
use mindc_ast::error::{CompileError, ErrorKind};
use mindc_ast::{DefId, DefinitionReference, ParameterType, Span, Value};
use std::collections::HashSet;

/// Validates the arguments of a resolved reference.
///
/// Ordinal arguments are named after the parameter at their position, so
/// later layers only see named arguments. Any problem is reported and the
/// reference is left unresolved.
///
/// Arguments with a hoisted name (`P$x`) belong to the template instance,
/// not to the generic definition, and are skipped when the target has type
/// parameters.
pub struct ParametricResolver {
    next: Box<dyn Resolver>,
}

impl ParametricResolver {
    pub fn new(next: Box<dyn Resolver>) -> Self {
        Self { next }
    }
}

impl Resolver for ParametricResolver {
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
        let valid = check_arguments(reference, target, encapsulating, ctx)?;
        Ok(valid.then_some(target))
    }
}

fn error(ctx: &mut CompilationContext, kind: ErrorKind, span: Span, msg: String) -> LoadResult<()> {
    ctx.errors.log(CompileError::new(kind, span, msg))
}

fn check_arguments(
    reference: &mut DefinitionReference,
    target: DefId,
    encapsulating: Option<DefId>,
    ctx: &mut CompilationContext,
) -> LoadResult<bool> {
    let def = ctx.get(target);
    let target_name = def.name.clone();
    let formals: Vec<String> = def.formal_parameters.iter().map(|p| p.name.clone()).collect();
    let skip_hoisted = def.is_generic();
    let span = reference.span;

    let mut args: Vec<_> = reference
        .arguments
        .iter_mut()
        .filter(|arg| !(skip_hoisted && arg.name.as_deref().is_some_and(is_hoisted)))
        .collect();

    if formals.is_empty() {
        if args.is_empty() {
            return Ok(true);
        }
        let msg = format!("'{}' has no parameter", target_name);
        error(ctx, ErrorKind::NoSuchParameter, span, msg)?;
        return Ok(false);
    }
    if args.is_empty() {
        let msg = format!(
            "missing arguments for '{}': expected {}",
            target_name,
            formals.join(", ")
        );
        error(ctx, ErrorKind::MissingArgument, span, msg)?;
        return Ok(false);
    }

    let named = args.iter().filter(|arg| arg.name.is_some()).count();
    if named == 0 {
        if args.len() < formals.len() {
            let msg = format!(
                "missing argument for parameter '{}' of '{}'",
                formals[args.len()],
                target_name
            );
            error(ctx, ErrorKind::MissingArgument, span, msg)?;
            return Ok(false);
        }
        if args.len() > formals.len() {
            let msg = format!(
                "too many arguments for '{}': expected {}, found {}",
                target_name,
                formals.len(),
                args.len()
            );
            error(ctx, ErrorKind::TooManyArguments, span, msg)?;
            return Ok(false);
        }
        for (arg, formal) in args.iter_mut().zip(&formals) {
            arg.name = Some(formal.clone());
        }
    } else if named != args.len() {
        return Err(LoadError::malformed(
            target_name,
            format!("reference '{}' mixes ordinal and named arguments", reference_text(&args)),
        ));
    } else {
        let mut valid = true;
        let mut seen = HashSet::new();
        for arg in &args {
            let name = arg.name.as_deref().unwrap_or_default();
            if !formals.iter().any(|f| f == name) {
                let msg = format!("'{}' has no parameter named '{}'", target_name, name);
                error(ctx, ErrorKind::NoSuchParameter, arg.span, msg)?;
                valid = false;
            } else if !seen.insert(name.to_string()) {
                let msg = format!("parameter '{}' is bound twice", name);
                error(ctx, ErrorKind::DuplicateName, arg.span, msg)?;
                valid = false;
            }
        }
        for formal in &formals {
            if !seen.contains(formal) && valid {
                let msg = format!(
                    "missing argument for parameter '{}' of '{}'",
                    formal, target_name
                );
                error(ctx, ErrorKind::MissingArgument, span, msg)?;
                valid = false;
            }
        }
        if !valid {
            return Ok(false);
        }
    }

    let mut valid = true;
    let bound: Vec<(String, Value, Span)> = args
        .iter()
        .map(|arg| {
            (
                arg.name.clone().unwrap_or_default(),
                arg.value.clone(),
                arg.span,
            )
        })
        .collect();
    for (param, value, arg_span) in bound {
        let expected = ctx.inferred_type(&target_name, &param);
        match &value {
            Value::Reference(used) => {
                valid &= check_forwarded(used, expected, encapsulating, arg_span, ctx)?;
            }
            literal => {
                if let Some(ty) = expected.filter(|ty| !ty.is_compatible(literal)) {
                    let msg = format!(
                        "value {} is not compatible with parameter '{}' of type {}",
                        literal, param, ty
                    );
                    error(ctx, ErrorKind::IncompatibleArgumentValue, arg_span, msg)?;
                    valid = false;
                }
            }
        }
    }
    Ok(valid)
}

/// An argument naming a parameter of the encapsulating definition.
fn check_forwarded(
    used: &str,
    expected: Option<ParameterType>,
    encapsulating: Option<DefId>,
    span: Span,
    ctx: &mut CompilationContext,
) -> LoadResult<bool> {
    let scope = encapsulating.map(|id| ctx.get(id));
    let Some(scope) = scope.filter(|scope| scope.formal_parameter(used).is_some()) else {
        let msg = format!("undefined parameter '{}'", used);
        error(ctx, ErrorKind::UndefinedParameter, span, msg)?;
        return Ok(false);
    };
    let Some(ty) = expected else {
        return Ok(true);
    };
    let scope_name = scope.name.clone();
    match ctx.infer_type(&scope_name, used, ty) {
        Some(previous) if previous != ty => {
            let msg = format!(
                "parameter '{}' is used as {} here but as {} elsewhere",
                used, ty, previous
            );
            error(ctx, ErrorKind::IncompatibleArgumentType, span, msg)?;
            Ok(false)
        }
        _ => Ok(true),
    }
}

fn reference_text(args: &[&mut mindc_ast::Argument]) -> String {
    args.iter()
        .map(|arg| match &arg.name {
            Some(name) => format!("{}={}", name, arg.value),
            None => arg.value.to_string(),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

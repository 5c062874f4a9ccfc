//! Bind type arguments and instantiate generic definitions.

use super::{BasicResolver, Resolver};
use crate::binding::{BindingChecker, BoundEnd};
use crate::context::CompilationContext;
use crate::error::{LoadError, LoadResult};
use crate::frontend::Frontend;
use crate::template::{InstantiationRequest, TypeBinding};
use indexmap::IndexMap;
use mindc_ast::error::{CompileError, ErrorKind};
use mindc_ast::{DefId, Definition, DefinitionReference, Resolved, Span, TypeArgumentValue};
use tracing::debug;

/// Resolves `G<A, B>` to the template instance of `G` for those arguments.
///
/// Each type argument is either a definition, which must conform to the
/// type of the parameter it binds, or a type parameter of the encapsulating
/// definition, which yields a partial instance. A reference to a definition
/// without type parameters passes through unchanged.
pub struct GenericResolver {
    next: Box<dyn Resolver>,
}

impl GenericResolver {
    pub fn new(next: Box<dyn Resolver>) -> Self {
        Self { next }
    }
}

impl Resolver for GenericResolver {
    fn resolve(
        &self,
        reference: &mut DefinitionReference,
        encapsulating: Option<DefId>,
        fe: &Frontend,
        ctx: &mut CompilationContext,
    ) -> LoadResult<Option<DefId>> {
        let Some(generic) = self.next.resolve(reference, encapsulating, fe, ctx)? else {
            return Ok(None);
        };
        if !ctx.get(generic).is_generic() && reference.type_arguments.is_empty() {
            return Ok(Some(generic));
        }

        let generic_def = ctx.get(generic);
        let generic_name = generic_def.name.clone();
        let params: Vec<String> = generic_def
            .formal_type_parameters
            .iter()
            .map(|p| p.name.clone())
            .collect();
        let Some(mapping) = map_type_arguments(reference, &generic_name, &params, ctx)? else {
            return Ok(None);
        };

        let mut bindings = IndexMap::new();
        let mut valid = true;
        for (param, position) in mapping {
            match bind(reference, position, &param, generic, encapsulating, fe, ctx)? {
                Some(binding) => {
                    bindings.insert(param, binding);
                }
                None => valid = false,
            }
        }
        if !valid {
            return Ok(None);
        }

        let request = InstantiationRequest {
            generic,
            bindings,
            encapsulating,
        };
        match fe.instantiate(&request, ctx) {
            Ok(instance) => {
                let name = ctx.get(instance).name.clone();
                debug!(reference = %reference, instance = %name, "resolved to template instance");
                reference.resolved = Some(Resolved::new(name, instance));
                Ok(Some(instance))
            }
            Err(LoadError::Fatal(mut error)) => {
                if error.span.is_generated() {
                    error.span = reference.span;
                }
                ctx.errors.log(error)?;
                Ok(None)
            }
            Err(other) => Err(other),
        }
    }
}

fn invalid(ctx: &mut CompilationContext, span: Span, message: String) -> LoadResult<()> {
    ctx.errors
        .log(CompileError::new(ErrorKind::InvalidTypeArgument, span, message))
}

/// Map each type parameter of `generic` to the position of its argument.
fn map_type_arguments(
    reference: &DefinitionReference,
    generic_name: &str,
    params: &[String],
    ctx: &mut CompilationContext,
) -> LoadResult<Option<Vec<(String, usize)>>> {
    let args = &reference.type_arguments;
    let span = reference.span;

    if params.is_empty() {
        invalid(ctx, span, format!("'{}' has no type parameter", generic_name))?;
        return Ok(None);
    }
    if args.is_empty() {
        let msg = format!(
            "missing type arguments for '{}': expected {}",
            generic_name,
            params.join(", ")
        );
        invalid(ctx, span, msg)?;
        return Ok(None);
    }

    let named = args.iter().filter(|arg| arg.name.is_some()).count();
    if named == 0 {
        if args.len() != params.len() {
            let msg = if args.len() < params.len() {
                format!(
                    "missing type argument for '{}' of '{}'",
                    params[args.len()],
                    generic_name
                )
            } else {
                format!(
                    "too many type arguments for '{}': expected {}, found {}",
                    generic_name,
                    params.len(),
                    args.len()
                )
            };
            invalid(ctx, span, msg)?;
            return Ok(None);
        }
        return Ok(Some(params.iter().cloned().zip(0..).collect()));
    }
    if named != args.len() {
        return Err(LoadError::malformed(
            generic_name,
            format!("reference '{}' mixes ordinal and named type arguments", reference),
        ));
    }

    let mut mapping = Vec::new();
    let mut valid = true;
    for (position, arg) in args.iter().enumerate() {
        let name = arg.name.clone().unwrap_or_default();
        if !params.iter().any(|p| *p == name) {
            let msg = format!("'{}' has no type parameter named '{}'", generic_name, name);
            invalid(ctx, arg.span, msg)?;
            valid = false;
        } else if mapping.iter().any(|(p, _)| *p == name) {
            let msg = format!("type parameter '{}' is bound twice", name);
            invalid(ctx, arg.span, msg)?;
            valid = false;
        } else {
            mapping.push((name, position));
        }
    }
    for param in params {
        if valid && !mapping.iter().any(|(p, _)| p == param) {
            let msg = format!("missing type argument for '{}' of '{}'", param, generic_name);
            invalid(ctx, span, msg)?;
            valid = false;
        }
    }
    if !valid {
        return Ok(None);
    }
    // Instance names list arguments in parameter order.
    mapping.sort_by_key(|(p, _)| params.iter().position(|q| q == p));
    Ok(Some(mapping))
}

fn bind(
    reference: &mut DefinitionReference,
    position: usize,
    param: &str,
    generic: DefId,
    encapsulating: Option<DefId>,
    fe: &Frontend,
    ctx: &mut CompilationContext,
) -> LoadResult<Option<TypeBinding>> {
    let type_arg = &mut reference.type_arguments[position];
    let span = type_arg.span;
    let inner = match &mut type_arg.value {
        TypeArgumentValue::TypeParameter(name) => {
            let declared = encapsulating
                .is_some_and(|id| ctx.get(id).formal_type_parameter(name).is_some());
            if !declared {
                invalid(ctx, span, format!("undefined type parameter '{}'", name))?;
                return Ok(None);
            }
            return Ok(Some(TypeBinding::Parameter(name.clone())));
        }
        TypeArgumentValue::Definition(inner) => inner,
    };

    // A bare type argument names the definition itself: its value
    // arguments, if any, were hoisted onto the instance.
    let resolved = if inner.arguments.is_empty() && inner.type_arguments.is_empty() {
        BasicResolver.resolve(inner, encapsulating, fe, ctx)?
    } else {
        fe.resolve(inner, encapsulating, ctx)?
    };
    let Some(value) = resolved else {
        return Ok(None);
    };
    let value_def = ctx.get(value);
    if encapsulating.is_some() && (value_def.is_type() || value_def.is_abstract) {
        let msg = format!(
            "'{}' cannot be used as a type argument: the definition is {}",
            value_def.name,
            if value_def.is_type() { "a type" } else { "abstract" }
        );
        invalid(ctx, span, msg)?;
        return Ok(None);
    }

    let conformance = ctx
        .get(generic)
        .formal_type_parameter(param)
        .and_then(|p| p.conforms_to.as_ref())
        .and_then(|c| c.resolved_id());
    if let Some(conformance) = conformance {
        let errors = check_conformance(
            ctx.get(value),
            ctx.get(conformance),
            &fe.binding_checker(),
            span,
        );
        if !errors.is_empty() {
            for error in errors {
                ctx.errors.log(error)?;
            }
            return Ok(None);
        }
    }
    Ok(Some(TypeBinding::Definition(value)))
}

/// Check that `value` can stand in for a placeholder of type `conformance`.
///
/// Every server interface of the type must be provided by the value and be
/// bindable as if the placeholder were delegated from its composite. Every
/// mandatory client interface of the value must be declared by the type.
pub fn check_conformance(
    value: &Definition,
    conformance: &Definition,
    checker: &BindingChecker<'_>,
    span: Span,
) -> Vec<CompileError> {
    let incompatible = |detail: String| {
        CompileError::new(
            ErrorKind::IncompatibleTypeArgument,
            span,
            format!(
                "'{}' does not conform to '{}': {}",
                value.name, conformance.name, detail
            ),
        )
    };

    let mut errors = Vec::new();
    for required in conformance.interfaces.iter().filter(|i| i.is_server()) {
        let Some(provided) = value.interface(&required.name) else {
            errors.push(incompatible(format!("missing server interface '{}'", required.name)));
            continue;
        };
        let from = required.dual();
        let result = checker.check(
            &BoundEnd::new(format!("this.{}", required.name), &from, None),
            &BoundEnd::new(provided.name.clone(), provided, None),
            span,
        );
        if let Err(problems) = result {
            errors.extend(problems.into_iter().map(|p| incompatible(p.message)));
        }
    }

    for used in value.interfaces.iter().filter(|i| i.is_client()) {
        let Some(declared) = conformance.interface(&used.name) else {
            if used.is_mandatory() {
                errors.push(incompatible(format!(
                    "client interface '{}' is not declared by the type",
                    used.name
                )));
            }
            continue;
        };
        let to = declared.dual();
        let result = checker.check(
            &BoundEnd::new(used.name.clone(), used, None),
            &BoundEnd::new(format!("this.{}", declared.name), &to, None),
            span,
        );
        if let Err(problems) = result {
            errors.extend(problems.into_iter().map(|p| incompatible(p.message)));
        }
    }
    errors
}

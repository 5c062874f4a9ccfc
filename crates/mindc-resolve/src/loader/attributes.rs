//! Attribute initial values
//!
//! An attribute typed `string` takes a string literal or `null`; any other
//! type takes an integer literal. A negative literal for a type whose name
//! starts with `u` only warns. An initializer naming a formal parameter
//! must name a declared one, and the parameter's inferred type must agree
//! with the attribute type. A missing initializer gets the default value of
//! the attribute type.

use super::{rewrite, Loader};
use crate::context::CompilationContext;
use crate::error::LoadResult;
use crate::frontend::Frontend;
use mindc_ast::error::{CompileError, ErrorKind};
use mindc_ast::{DefId, ParameterType, Value};

pub struct AttributeCheckerLoader {
    next: Box<dyn Loader>,
}

impl AttributeCheckerLoader {
    pub fn new(next: Box<dyn Loader>) -> Self {
        Self { next }
    }
}

impl Loader for AttributeCheckerLoader {
    fn load(&self, name: &str, fe: &Frontend, ctx: &mut CompilationContext) -> LoadResult<DefId> {
        let id = self.next.load(name, fe, ctx)?;
        if ctx.get(id).attributes.is_empty() {
            return Ok(id);
        }

        rewrite(id, ctx, |def, ctx| {
            let def_name = def.name.clone();
            let formals: Vec<String> =
                def.formal_parameters.iter().map(|p| p.name.clone()).collect();

            for attr in &mut def.attributes {
                let ty = ParameterType::of_attribute_type(&attr.type_name);
                if attr.value.is_none() {
                    attr.value = Some(ty.default_value());
                    continue;
                }
                match &attr.value {
                    None => {}
                    Some(Value::Number(n)) => {
                        if ty == ParameterType::String {
                            ctx.errors.log(CompileError::new(
                                ErrorKind::InvalidAttribute,
                                attr.span,
                                format!(
                                    "attribute '{}' of type string cannot take {}",
                                    attr.name, n
                                ),
                            ))?;
                        } else if *n < 0 && attr.type_name.starts_with('u') {
                            ctx.errors.warn(CompileError::warning(
                                ErrorKind::InvalidAttribute,
                                attr.span,
                                format!(
                                    "unsigned attribute '{}' initialized with negative value {}",
                                    attr.name, n
                                ),
                            ));
                        }
                    }
                    Some(value @ (Value::String(_) | Value::Null)) => {
                        if ty == ParameterType::Integer {
                            ctx.errors.log(CompileError::new(
                                ErrorKind::InvalidAttribute,
                                attr.span,
                                format!(
                                    "attribute '{}' of type {} cannot take {}",
                                    attr.name, attr.type_name, value
                                ),
                            ))?;
                        }
                    }
                    Some(Value::Reference(param)) => {
                        if !formals.contains(param) {
                            ctx.errors.log(CompileError::new(
                                ErrorKind::UndefinedParameter,
                                attr.span,
                                format!(
                                    "attribute '{}' refers to undefined parameter '{}'",
                                    attr.name, param
                                ),
                            ))?;
                            continue;
                        }
                        if let Some(inferred) = ctx.infer_type(&def_name, param, ty) {
                            if inferred != ty {
                                ctx.errors.log(CompileError::new(
                                    ErrorKind::IncompatibleArgumentType,
                                    attr.span,
                                    format!(
                                        "parameter '{}' is used as {} but attribute '{}' is {}",
                                        param, inferred, attr.name, ty
                                    ),
                                ))?;
                            }
                        }
                    }
                }
            }
            Ok(())
        })?;
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::SourceLoader;
    use mindc_ast::Definition;

    fn load(definition: Definition) -> (CompilationContext, DefId) {
        let mut ctx = CompilationContext::default();
        let name = definition.name.clone();
        ctx.register_definition(name.clone(), definition);
        let id = AttributeCheckerLoader::new(Box::new(SourceLoader))
            .load(&name, &Frontend::default(), &mut ctx)
            .unwrap();
        (ctx, id)
    }

    #[test]
    fn test_default_values() {
        let (ctx, id) = load(
            Definition::primitive("demo.P")
                .with_attribute("n", "int", None)
                .with_attribute("s", "string", None),
        );
        let def = ctx.get(id);
        assert_eq!(def.attribute("n").unwrap().value, Some(Value::Number(0)));
        assert_eq!(def.attribute("s").unwrap().value, Some(Value::Null));
        assert!(!ctx.errors.has_errors());
    }

    #[test]
    fn test_literal_type_mismatch() {
        let (ctx, _) = load(
            Definition::primitive("demo.P")
                .with_attribute("s", "string", Some(Value::Number(1)))
                .with_attribute("n", "int", Some(Value::String("x".into())))
                .with_attribute("u", "uint8_t", Some(Value::Number(-1))),
        );
        let kinds: Vec<_> = ctx.errors.errors().iter().map(|e| e.kind).collect();
        assert_eq!(kinds, [ErrorKind::InvalidAttribute, ErrorKind::InvalidAttribute]);
        assert_eq!(ctx.errors.warnings().len(), 1);
    }

    #[test]
    fn test_parameter_references() {
        let (ctx, _) = load(
            Definition::primitive("demo.P")
                .with_parameter("p")
                .with_attribute("a", "int", Some(Value::Reference("p".into())))
                .with_attribute("b", "string", Some(Value::Reference("p".into())))
                .with_attribute("c", "int", Some(Value::Reference("missing".into()))),
        );
        let kinds: Vec<_> = ctx.errors.errors().iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            [ErrorKind::IncompatibleArgumentType, ErrorKind::UndefinedParameter]
        );
        assert_eq!(ctx.inferred_type("demo.P", "p"), Some(ParameterType::Integer));
    }
}

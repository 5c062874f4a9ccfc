//! Checks on generic definitions
//!
//! - formal type parameter names are unique
//! - the conformance type of a formal type parameter resolves to a Type
//! - placeholder sub-components name a declared formal type parameter

use super::{rewrite, Loader};
use crate::context::CompilationContext;
use crate::error::LoadResult;
use crate::frontend::Frontend;
use mindc_ast::error::{CompileError, ErrorKind};
use mindc_ast::DefId;
use std::collections::HashSet;

pub struct GenericDefinitionLoader {
    next: Box<dyn Loader>,
}

impl GenericDefinitionLoader {
    pub fn new(next: Box<dyn Loader>) -> Self {
        Self { next }
    }
}

impl Loader for GenericDefinitionLoader {
    fn load(&self, name: &str, fe: &Frontend, ctx: &mut CompilationContext) -> LoadResult<DefId> {
        let id = self.next.load(name, fe, ctx)?;
        let def = ctx.get(id);
        let has_placeholders = def.components.iter().any(|c| c.type_parameter.is_some());
        if !def.is_generic() && !has_placeholders {
            return Ok(id);
        }

        rewrite(id, ctx, |def, ctx| {
            let mut seen = HashSet::new();
            for param in &def.formal_type_parameters {
                if !seen.insert(param.name.clone()) {
                    ctx.errors.log(CompileError::new(
                        ErrorKind::DuplicateName,
                        param.span,
                        format!("duplicate type parameter '{}'", param.name),
                    ))?;
                }
            }

            for param in &mut def.formal_type_parameters {
                let Some(conforms_to) = param.conforms_to.as_mut() else {
                    continue;
                };
                if conforms_to.resolved_id().is_some() {
                    continue;
                }
                if let Some(type_id) = fe.resolve(conforms_to, Some(id), ctx)? {
                    if !ctx.get(type_id).is_type() {
                        ctx.errors.log(CompileError::new(
                            ErrorKind::InvalidTypeArgument,
                            conforms_to.span,
                            format!(
                                "'{}' cannot be the conformance type of '{}': it is not a type definition",
                                conforms_to.name, param.name
                            ),
                        ))?;
                    }
                }
            }

            for comp in &def.components {
                if let Some(param) = &comp.type_parameter {
                    if def.formal_type_parameter(param).is_none() {
                        ctx.errors.log(CompileError::new(
                            ErrorKind::InvalidSubComponent,
                            comp.span,
                            format!(
                                "sub-component '{}' refers to undeclared type parameter '{}'",
                                comp.name, param
                            ),
                        ))?;
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
    use mindc_ast::{Component, Definition, DefinitionReference};

    fn load(ctx: &mut CompilationContext, name: &str) -> DefId {
        GenericDefinitionLoader::new(Box::new(SourceLoader))
            .load(name, &Frontend::default(), ctx)
            .unwrap()
    }

    fn kinds(ctx: &CompilationContext) -> Vec<ErrorKind> {
        ctx.errors.errors().iter().map(|e| e.kind).collect()
    }

    #[test]
    fn test_duplicate_and_undeclared_type_parameters() {
        let mut ctx = CompilationContext::default();
        ctx.register_definition(
            "demo.G",
            Definition::composite("demo.G")
                .with_type_parameter("P", None)
                .with_type_parameter("P", None)
                .with_component(Component::placeholder("x", "Q")),
        );
        load(&mut ctx, "demo.G");
        assert_eq!(
            kinds(&ctx),
            [ErrorKind::DuplicateName, ErrorKind::InvalidSubComponent]
        );
    }

    #[test]
    fn test_conformance_must_be_a_type() {
        let mut ctx = CompilationContext::default();
        ctx.register_definition("demo.IType", Definition::type_definition("demo.IType"));
        ctx.register_definition("demo.Prim", Definition::primitive("demo.Prim"));
        ctx.register_definition(
            "demo.Good",
            Definition::composite("demo.Good")
                .with_type_parameter("P", Some(DefinitionReference::new("demo.IType")))
                .with_component(Component::placeholder("x", "P")),
        );
        ctx.register_definition(
            "demo.Bad",
            Definition::composite("demo.Bad")
                .with_type_parameter("P", Some(DefinitionReference::new("demo.Prim"))),
        );

        let good = load(&mut ctx, "demo.Good");
        assert!(kinds(&ctx).is_empty());
        let param = &ctx.get(good).formal_type_parameters[0];
        assert!(param.conforms_to.as_ref().unwrap().resolved_id().is_some());

        load(&mut ctx, "demo.Bad");
        assert_eq!(kinds(&ctx), [ErrorKind::InvalidTypeArgument]);
    }
}

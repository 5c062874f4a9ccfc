//! Formal value parameters must have distinct names.

use super::Loader;
use crate::context::CompilationContext;
use crate::error::LoadResult;
use crate::frontend::Frontend;
use mindc_ast::error::{CompileError, ErrorKind};
use mindc_ast::DefId;
use std::collections::HashSet;

pub struct ParameterNormalizerLoader {
    next: Box<dyn Loader>,
}

impl ParameterNormalizerLoader {
    pub fn new(next: Box<dyn Loader>) -> Self {
        Self { next }
    }
}

impl Loader for ParameterNormalizerLoader {
    fn load(&self, name: &str, fe: &Frontend, ctx: &mut CompilationContext) -> LoadResult<DefId> {
        let id = self.next.load(name, fe, ctx)?;

        let mut seen = HashSet::new();
        let duplicates: Vec<_> = ctx
            .get(id)
            .formal_parameters
            .iter()
            .filter(|param| !seen.insert(param.name.as_str()))
            .map(|param| {
                CompileError::new(
                    ErrorKind::DuplicateName,
                    param.span,
                    format!("duplicate parameter name '{}'", param.name),
                )
            })
            .collect();
        for error in duplicates {
            ctx.errors.log(error)?;
        }
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::SourceLoader;
    use mindc_ast::Definition;

    #[test]
    fn test_duplicate_parameter() {
        let mut ctx = CompilationContext::default();
        ctx.register_definition(
            "demo.P",
            Definition::primitive("demo.P")
                .with_parameter("a")
                .with_parameter("b")
                .with_parameter("a"),
        );
        ParameterNormalizerLoader::new(Box::new(SourceLoader))
            .load("demo.P", &Frontend::default(), &mut ctx)
            .unwrap();
        assert_eq!(ctx.errors.error_count(), 1);
        assert_eq!(ctx.errors.errors()[0].kind, ErrorKind::DuplicateName);
    }
}

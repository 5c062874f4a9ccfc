//! Resolve the definition of every sub-component
//!
//! Sub-components already resolved in this context are kept, which makes
//! the stage safe to run again on template instances and substituted
//! definitions. A Type or an abstract definition cannot be instantiated.

use super::{rewrite, Loader};
use crate::context::CompilationContext;
use crate::error::LoadResult;
use crate::frontend::Frontend;
use mindc_ast::error::{CompileError, ErrorKind};
use mindc_ast::{DefId, Resolved};
use std::collections::HashSet;
use tracing::trace;

pub struct SubComponentResolverLoader {
    next: Box<dyn Loader>,
}

impl SubComponentResolverLoader {
    pub fn new(next: Box<dyn Loader>) -> Self {
        Self { next }
    }
}

impl Loader for SubComponentResolverLoader {
    fn load(&self, name: &str, fe: &Frontend, ctx: &mut CompilationContext) -> LoadResult<DefId> {
        let id = self.next.load(name, fe, ctx)?;
        if ctx.get(id).components.is_empty() {
            return Ok(id);
        }

        rewrite(id, ctx, |def, ctx| {
            let mut names = HashSet::new();
            for comp in &def.components {
                if !names.insert(comp.name.as_str()) {
                    ctx.errors.log(CompileError::new(
                        ErrorKind::DuplicateName,
                        comp.span,
                        format!("duplicate sub-component name '{}'", comp.name),
                    ))?;
                }
            }

            for comp in &mut def.components {
                let existing = comp
                    .resolved
                    .as_ref()
                    .and_then(|r| ctx.resolved_definition(r).map(|sub| (r.name.clone(), sub)));
                if let Some((resolved_name, sub)) = existing {
                    comp.resolved = Some(Resolved::new(resolved_name, sub));
                    continue;
                }
                let Some(reference) = comp.definition.as_mut() else {
                    continue;
                };
                reference.clear_resolution();
                trace!(component = %comp.name, reference = %reference, "resolving sub-component");

                let Some(sub) = fe.resolve(reference, Some(id), ctx)? else {
                    comp.resolved = None;
                    continue;
                };
                let sub_def = ctx.get(sub);
                if sub_def.is_type() || sub_def.is_abstract {
                    let what = if sub_def.is_type() { "a type" } else { "abstract" };
                    let message = format!(
                        "sub-component '{}' cannot instantiate '{}': the definition is {}",
                        comp.name, sub_def.name, what
                    );
                    ctx.errors
                        .log(CompileError::new(ErrorKind::InvalidSubComponent, comp.span, message))?;
                    comp.resolved = None;
                    continue;
                }
                comp.resolved = Some(Resolved::new(sub_def.name.clone(), sub));
            }
            Ok(())
        })?;
        Ok(id)
    }
}

//! Definition cache and cycle detection
//!
//! Outermost stage. A name that finished loading is returned from the cache,
//! so two loads of the same name in one context yield the same handle. A
//! name requested again while it is still loading is a cycle; a chain of
//! nested loads deeper than `max_resolution_depth` is treated the same way.

use super::Loader;
use crate::context::CompilationContext;
use crate::error::{LoadError, LoadResult};
use crate::frontend::Frontend;
use mindc_ast::error::ErrorKind;
use mindc_ast::{DefId, Span};
use tracing::debug;

pub struct CacheLoader {
    next: Box<dyn Loader>,
}

impl CacheLoader {
    pub fn new(next: Box<dyn Loader>) -> Self {
        Self { next }
    }
}

impl Loader for CacheLoader {
    fn load(&self, name: &str, fe: &Frontend, ctx: &mut CompilationContext) -> LoadResult<DefId> {
        if let Some(id) = ctx.cached(name) {
            debug!(name, %id, "cache hit");
            return Ok(id);
        }

        if !ctx.begin_loading(name) {
            let mut cycle: Vec<&str> = ctx.loading_stack().skip_while(|n| *n != name).collect();
            cycle.push(name);
            return Err(LoadError::fatal(
                ErrorKind::CyclicDependency,
                Span::generated(),
                format!("cyclic dependency: {}", cycle.join(" -> ")),
            ));
        }
        if ctx.loading_depth() > ctx.options.max_resolution_depth {
            ctx.end_loading(name);
            return Err(LoadError::fatal(
                ErrorKind::CyclicDependency,
                Span::generated(),
                format!(
                    "loading '{}' exceeds the maximum resolution depth of {}",
                    name, ctx.options.max_resolution_depth
                ),
            ));
        }

        debug!(name, depth = ctx.loading_depth(), "loading");
        let result = self.next.load(name, fe, ctx);
        ctx.end_loading(name);

        let id = result?;
        ctx.cache_insert(name, id);
        Ok(id)
    }
}

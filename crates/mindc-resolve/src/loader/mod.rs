//! Loader chain
//!
//! Loading a definition by name runs a chain of stages. Each stage calls the
//! next (inner) stage first, then applies exactly one concern to the
//! definition it gets back:
//!
//! ```text
//! Cache → AP(after checking) → Attributes → Parameters → Unbound → Bindings
//!       → Normalizer → Membrane → Internal interfaces → Interfaces
//!       → AP(on sub-component) → AP(after extends) → Extends → Sub-components
//!       → Generic → AP(after parsing) → Annotation checker → Source
//! ```
//!
//! Synthetic definitions (template instances, substituted definitions) are
//! registered in the context and loaded through the same chain, so stages
//! must tolerate a definition that already went through them.

mod attributes;
mod cache;
mod extends;
mod generic;
mod interfaces;
mod parameters;
mod source;
mod subcomponents;

pub use attributes::AttributeCheckerLoader;
pub use cache::CacheLoader;
pub use extends::ExtendsLoader;
pub use generic::GenericDefinitionLoader;
pub use interfaces::InterfaceCheckerLoader;
pub use parameters::ParameterNormalizerLoader;
pub use source::SourceLoader;
pub use subcomponents::SubComponentResolverLoader;

use crate::context::CompilationContext;
use crate::error::LoadResult;
use crate::frontend::Frontend;
use mindc_ast::{DefId, Definition};

/// One link of the loader chain.
pub trait Loader {
    /// Produce the definition named `name`.
    fn load(&self, name: &str, fe: &Frontend, ctx: &mut CompilationContext) -> LoadResult<DefId>;
}

/// Run `f` on a copy of the definition behind `id` and store the copy back.
///
/// Nested loads triggered by `f` may read the slot; they see the state
/// before this stage.
pub(crate) fn rewrite<F>(id: DefId, ctx: &mut CompilationContext, f: F) -> LoadResult<()>
where
    F: FnOnce(&mut Definition, &mut CompilationContext) -> LoadResult<()>,
{
    let mut definition = ctx.get(id).clone();
    let result = f(&mut definition, ctx);
    ctx.replace(id, definition);
    result
}

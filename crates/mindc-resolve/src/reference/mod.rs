//! Definition reference resolution
//!
//! A [`DefinitionReference`] is resolved by a chain of layers, outermost
//! first:
//!
//! ```text
//! Caching → Import → ValueSubstitution → TypeArgumentHoisting → Generic
//!         → Parametric → Basic
//! ```
//!
//! Each layer delegates inward and post-processes the result. `Ok(None)`
//! means the reference could not be resolved and the reason has been logged;
//! callers leave the referencing node unresolved and carry on.

mod basic;
mod caching;
mod generic;
mod hoisting;
mod import;
mod parametric;
mod substitution;

pub use basic::BasicResolver;
pub use caching::CachingResolver;
pub use generic::{check_conformance, GenericResolver};
pub use hoisting::TypeArgumentHoistingResolver;
pub use import::ImportResolver;
pub use parametric::ParametricResolver;
pub use substitution::{substituted_name, ValueSubstitutionResolver};
pub(crate) use substitution::substitute_values;

use crate::context::CompilationContext;
use crate::error::LoadResult;
use crate::frontend::Frontend;
use mindc_ast::{DefId, DefinitionReference};

/// Separator between a type parameter name and a hoisted parameter name.
pub const HOISTED_SEPARATOR: char = '$';

/// One layer of the reference resolver chain.
pub trait Resolver {
    /// Resolve `reference` occurring in `encapsulating`.
    fn resolve(
        &self,
        reference: &mut DefinitionReference,
        encapsulating: Option<DefId>,
        fe: &Frontend,
        ctx: &mut CompilationContext,
    ) -> LoadResult<Option<DefId>>;
}

/// Name of a parameter hoisted from type parameter `type_param`.
pub fn hoisted_name(type_param: &str, param: &str) -> String {
    format!("{}{}{}", type_param, HOISTED_SEPARATOR, param)
}

/// Whether `name` is a hoisted parameter name.
pub fn is_hoisted(name: &str) -> bool {
    name.contains(HOISTED_SEPARATOR)
}

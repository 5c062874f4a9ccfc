//! Template instantiation
//!
//! A generic definition `G<P conformsto T>` contains placeholder
//! sub-components typed by its type parameters. Instantiating it for a set
//! of type arguments produces a new definition, named after the arguments
//! (`demo.G<demo.Foo>`), where each placeholder becomes a concrete
//! sub-component.
//!
//! # Chain
//!
//! | Layer | Concern |
//! |-------|---------|
//! | [`CachingInstantiator`] | instance naming, sharing, registration and loading |
//! | [`AnnotationProcessorInstantiator`] | template phases of annotation processors |
//! | [`ParametricInstantiator`] | exposes parameters of bound definitions as `P$x` |
//! | [`BaseInstantiator`] | copies the generic and binds placeholders |
//!
//! Instances are registered in the context and loaded through the loader
//! chain like any other definition.

mod annotations;
mod base;
mod caching;
mod parametric;

pub use annotations::AnnotationProcessorInstantiator;
pub use base::BaseInstantiator;
pub use caching::{instance_name, CachingInstantiator};
pub use parametric::ParametricInstantiator;

use crate::context::CompilationContext;
use crate::error::LoadResult;
use crate::frontend::Frontend;
use indexmap::IndexMap;
use mindc_ast::{DefId, Definition};

/// What a type parameter is bound to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeBinding {
    /// A concrete definition
    Definition(DefId),
    /// A type parameter of the encapsulating definition (partial instance)
    Parameter(String),
}

/// Request to instantiate `generic` with `bindings`, one per type parameter
/// in declaration order.
#[derive(Debug, Clone)]
pub struct InstantiationRequest {
    pub generic: DefId,
    pub bindings: IndexMap<String, TypeBinding>,
    pub encapsulating: Option<DefId>,
}

/// One layer of the template instantiator chain.
pub trait TemplateInstantiator {
    /// Build the instance named `name`; it is registered by the caller.
    fn instantiate(
        &self,
        request: &InstantiationRequest,
        name: &str,
        fe: &Frontend,
        ctx: &mut CompilationContext,
    ) -> LoadResult<Definition>;
}

impl TypeBinding {
    /// Name used for this binding in instance names.
    pub fn display_name(&self, ctx: &CompilationContext) -> String {
        match self {
            TypeBinding::Definition(id) => ctx.get(*id).name.clone(),
            TypeBinding::Parameter(name) => name.clone(),
        }
    }
}

impl InstantiationRequest {
    /// Whether some type parameter stays unbound in the instance.
    pub fn is_partial(&self) -> bool {
        self.bindings
            .values()
            .any(|binding| matches!(binding, TypeBinding::Parameter(_)))
    }
}

// Allow unwrap in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]

//! Loading, resolution and checking of MIND architecture definitions
//!
//! This crate turns definition names into fully loaded [`Definition`]s held
//! in a [`CompilationContext`]. A [`Frontend`] assembles three chains of
//! stages that call each other recursively:
//!
//! - the loader chain ([`loader`]): parse, merge `extends`, resolve
//!   sub-components, check interfaces, membranes, bindings, parameters and
//!   attributes, and run annotation processors at fixed phases
//! - the reference resolver chain ([`reference`]): qualify names against
//!   imports, substitute literal arguments, hoist type-argument arguments,
//!   instantiate generics and check parameter arguments
//! - the template instantiator chain ([`template`]): build and cache
//!   instances of generic definitions
//!
//! User problems are collected by the [`ErrorManager`]; [`LoadError`] only
//! drives control flow.
//!
//! [`Definition`]: mindc_ast::Definition

pub mod annotation;
pub mod binding;
pub mod context;
pub mod error;
pub mod error_manager;
pub mod frontend;
pub mod loader;
pub mod membrane;
pub mod options;
pub mod reference;
pub mod template;

pub use annotation::{AnnotationProcessor, AnnotationRegistry};
pub use binding::BindingChecker;
pub use context::CompilationContext;
pub use error::{InternalError, LoadError, LoadResult};
pub use error_manager::{ErrorManager, ErrorPolicy};
pub use frontend::{
    Frontend, FrontendBuilder, IdlSignatures, LocatedSource, Parser, SourceLocator,
    StaticIdlSignatures,
};
pub use loader::Loader;
pub use options::CompilerOptions;
pub use reference::Resolver;
pub use template::{InstantiationRequest, TemplateInstantiator, TypeBinding};

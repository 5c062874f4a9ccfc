//! # MIND ADL compiler front-end
//!
//! This crate is a facade that re-exports functionality from:
//! - `mindc-ast` - definition AST, diagnostics and foundation types
//! - `mindc-resolve` - loading, resolution, instantiation and checking
//!
//! ## Architecture
//!
//! ```text
//! mindc-ast       - AST + diagnostics
//!     ↓
//! mindc-resolve   - loader, resolver and instantiator chains
//!     ↓
//! mindc (facade)  - re-exports + compile API
//! ```
//!
//! Parsing ADL text is done by a [`Parser`] installed on the [`Frontend`];
//! definitions built in memory can be compiled without one.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use mindc::{compile, CompilerOptions, Frontend};
//!
//! let fe = Frontend::builder()
//!     .parser(my_parser)
//!     .locator(FsSourceLocator::scan(["src/adl"], "adl")?)
//!     .build();
//! let compiled = compile(&fe, &["demo.Top"], CompilerOptions::default());
//! ```

// Re-export AST and foundation types
pub use mindc_ast::{self as ast, *};

// Re-export resolve
pub use mindc_resolve as resolve;
pub use mindc_resolve::{
    AnnotationProcessor, AnnotationRegistry, BindingChecker, CompilationContext, CompilerOptions,
    ErrorManager, ErrorPolicy, Frontend, FrontendBuilder, IdlSignatures, InstantiationRequest,
    InternalError, LoadError, LoadResult, LocatedSource, Loader, Parser, Resolver, SourceLocator,
    StaticIdlSignatures, TemplateInstantiator, TypeBinding,
};

pub mod compile;

pub use compile::{
    compile, compile_definitions, compile_with_sources, deserialize_definitions, format_errors,
    serialize_definitions, CompileResultWithSources, Compiled, FsSourceLocator,
};

/// Compiler version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

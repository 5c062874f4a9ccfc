// Allow unwrap in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]

//! AST types for the MIND architecture description language
//!
//! This crate contains the definition graph (definitions, interfaces,
//! sub-components, bindings, parameters, membrane metadata and annotations),
//! the diagnostics used by every front-end stage, and the foundation types
//! they share (source spans, definition handles, capability and phase sets).
//!
//! Parsing is not done here: a parser produces [`Definition`] values, and the
//! resolution crate loads, merges and checks them.

pub mod ast;
pub mod error;
pub mod foundation;

pub use foundation::{
    AnnotationTarget, Capability, CapabilitySet, DefId, LoaderPhase, PhaseSet, SourceFile,
    SourceMap, Span, TargetSet,
};

pub use ast::*;

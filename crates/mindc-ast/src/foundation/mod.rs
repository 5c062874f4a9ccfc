//! Front-end foundation types
//!
//! Small, copyable types used across the AST and the resolution stages.

pub mod id;
pub mod sets;
pub mod span;

pub use id::DefId;
pub use sets::{AnnotationTarget, Capability, CapabilitySet, LoaderPhase, PhaseSet, TargetSet};
pub use span::{SourceFile, SourceMap, Span};

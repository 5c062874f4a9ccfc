//! Annotations: registry, checking and processing
//!
//! The parser attaches raw [`AnnotationNode`](mindc_ast::AnnotationNode)s to
//! definitions and their elements. Loading then:
//!
//! 1. binds each node to a typed [`Annotation`](mindc_ast::Annotation)
//!    through the [`AnnotationRegistry`] and checks its placement
//!    ([`AnnotationCheckerLoader`])
//! 2. runs the [`AnnotationProcessor`] of each typed annotation at the
//!    loader phases the annotation declares ([`AnnotationProcessorLoader`],
//!    [`SubComponentAnnotationLoader`], and the template instantiator)
//!
//! Processors may return a replacement definition; the walk continues
//! against the replacement.

mod checker;
pub mod predefined;
mod processor;
mod registry;

pub use checker::AnnotationCheckerLoader;
pub use processor::{
    process_definition, process_sub_components, AnnotationProcessor, AnnotationProcessorLoader,
    SubComponentAnnotationLoader,
};
pub use registry::{
    AnnotationArguments, AnnotationBuildError, AnnotationBuilder, AnnotationDescriptor,
    AnnotationParameter, AnnotationRegistry,
};

//! Definition graph of the architecture description language

pub mod annotation;
pub mod component;
pub mod definition;
pub mod display;
pub mod interface;
pub mod membrane;
pub mod merge;
pub mod node;
pub mod reference;
pub mod value;

pub use annotation::{Annotation, AnnotationArgument, AnnotationNode, AnnotationValue, Annotations};
pub use component::{Binding, Component, Endpoint, THIS};
pub use definition::{Attribute, Definition, DefinitionDecorations, DefinitionKind, Source};
pub use interface::{Cardinality, Contingency, Interface, Role};
pub use membrane::{Controller, ControllerInterface};
pub use merge::{merge_definitions, MergeError};
pub use node::NodePath;
pub use reference::{
    Argument, DefinitionReference, FormalParameter, FormalTypeParameter, Import, Resolved,
    TypeArgument, TypeArgumentValue,
};
pub use value::{ParameterType, Value};

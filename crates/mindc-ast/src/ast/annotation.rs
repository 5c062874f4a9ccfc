//! Annotation nodes attached to AST elements
//!
//! An annotation arrives from the parser as an [`AnnotationNode`]: a type
//! name plus raw argument values. The annotation checker turns each node into
//! a typed [`Annotation`] object through the registry of known kinds, and
//! stores it next to the raw node in the element's [`Annotations`] set.
//!
//! Raw nodes are serialized; typed objects are rebuilt on load.

use crate::foundation::{PhaseSet, Span, TargetSet};
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Raw annotation as written in the source, e.g. `@AttributeController(allowNoAttr=true)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationNode {
    /// Annotation type name (`Singleton`, `LifeCycleController`, ...)
    pub type_name: String,
    /// Arguments in source order
    pub arguments: Vec<AnnotationArgument>,
    /// Location of the annotation
    pub span: Span,
}

/// One `name = value` pair of an annotation.
///
/// A single unnamed argument is stored with the name `value`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationArgument {
    /// Argument name
    pub name: String,
    /// Argument value
    pub value: AnnotationValue,
}

/// Raw annotation argument value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AnnotationValue {
    /// String literal
    String(String),
    /// Integer literal
    Number(i64),
    /// Boolean literal
    Bool(bool),
    /// `null`
    Null,
    /// Nested annotation
    Annotation(Box<AnnotationNode>),
    /// `{ a, b, ... }`
    Array(Vec<AnnotationValue>),
}

/// Typed annotation object.
///
/// Implemented by every annotation kind known to the front-end. The kind
/// declares where it may appear and in which loader phases its processor
/// runs; the processor itself is looked up in the registry by [`kind`](Self::kind).
pub trait Annotation: fmt::Debug + Send + Sync + 'static {
    /// Annotation type name, unique within the registry.
    fn kind(&self) -> &'static str;

    /// Node kinds this annotation may decorate.
    fn targets(&self) -> TargetSet;

    /// Loader phases in which the processor runs.
    fn phases(&self) -> PhaseSet {
        PhaseSet::empty()
    }

    /// Whether a definition inherits this annotation from its parents.
    fn is_inherited(&self) -> bool {
        false
    }

    /// Downcasting support for processors.
    fn as_any(&self) -> &dyn Any;
}

/// Annotations attached to one AST element.
///
/// Equality and serialization only consider the raw nodes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Annotations {
    /// Raw annotation nodes in source order
    pub nodes: Vec<AnnotationNode>,
    /// Typed annotations, filled by the annotation checker
    #[serde(skip)]
    typed: Vec<Arc<dyn Annotation>>,
}

impl AnnotationNode {
    /// New annotation node without arguments.
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            arguments: Vec::new(),
            span: Span::generated(),
        }
    }

    /// Builder: add a named argument.
    pub fn with_argument(mut self, name: impl Into<String>, value: AnnotationValue) -> Self {
        self.arguments.push(AnnotationArgument {
            name: name.into(),
            value,
        });
        self
    }

    /// Look up an argument by name.
    pub fn argument(&self, name: &str) -> Option<&AnnotationValue> {
        self.arguments
            .iter()
            .find(|arg| arg.name == name)
            .map(|arg| &arg.value)
    }
}

impl Annotations {
    /// Whether no annotation is attached.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Attach a raw annotation node.
    pub fn push_node(&mut self, node: AnnotationNode) {
        self.nodes.push(node);
    }

    /// Typed annotations in attachment order.
    pub fn typed(&self) -> &[Arc<dyn Annotation>] {
        &self.typed
    }

    /// Replace the typed annotations (annotation checker output).
    pub fn set_typed(&mut self, typed: Vec<Arc<dyn Annotation>>) {
        self.typed = typed;
    }

    /// Attach an annotation produced by a processor, raw and typed.
    pub fn attach(&mut self, node: AnnotationNode, annotation: Arc<dyn Annotation>) {
        self.nodes.push(node);
        self.typed.push(annotation);
    }

    /// Whether a typed annotation of `kind` is attached.
    pub fn has(&self, kind: &str) -> bool {
        self.typed.iter().any(|a| a.kind() == kind)
            || self.nodes.iter().any(|n| n.type_name == kind)
    }

    /// Typed annotation of concrete type `A`, if attached.
    pub fn get<A: Annotation>(&self) -> Option<&A> {
        self.typed.iter().find_map(|a| a.as_any().downcast_ref::<A>())
    }

    /// Union of two annotation sets (used by node merge).
    ///
    /// Raw nodes of `other` whose type is already present are dropped.
    pub fn union(mut self, other: &Annotations) -> Annotations {
        for node in &other.nodes {
            if !self.nodes.iter().any(|n| n.type_name == node.type_name) {
                self.nodes.push(node.clone());
            }
        }
        for typed in &other.typed {
            if !self.typed.iter().any(|a| a.kind() == typed.kind()) {
                self.typed.push(Arc::clone(typed));
            }
        }
        self
    }

    /// Only the annotations that are inherited by extending definitions.
    pub fn inherited(&self) -> Annotations {
        let typed: Vec<_> = self
            .typed
            .iter()
            .filter(|a| a.is_inherited())
            .cloned()
            .collect();
        let nodes = self
            .nodes
            .iter()
            .filter(|n| typed.iter().any(|a| a.kind() == n.type_name))
            .cloned()
            .collect();
        Annotations { nodes, typed }
    }
}

impl PartialEq for Annotations {
    fn eq(&self, other: &Self) -> bool {
        self.nodes == other.nodes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::{AnnotationTarget, LoaderPhase};

    #[derive(Debug)]
    struct Marker {
        inherited: bool,
    }

    impl Annotation for Marker {
        fn kind(&self) -> &'static str {
            "Marker"
        }
        fn targets(&self) -> TargetSet {
            TargetSet::single(AnnotationTarget::Definition)
        }
        fn phases(&self) -> PhaseSet {
            PhaseSet::single(LoaderPhase::AfterChecking)
        }
        fn is_inherited(&self) -> bool {
            self.inherited
        }
        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    #[test]
    fn test_attach_and_downcast() {
        let mut set = Annotations::default();
        set.attach(AnnotationNode::new("Marker"), Arc::new(Marker { inherited: false }));

        assert!(set.has("Marker"));
        assert!(!set.has("Singleton"));
        assert!(set.get::<Marker>().is_some());
    }

    #[test]
    fn test_union_skips_present_kinds() {
        let mut a = Annotations::default();
        a.attach(AnnotationNode::new("Marker"), Arc::new(Marker { inherited: true }));
        let mut b = Annotations::default();
        b.attach(AnnotationNode::new("Marker"), Arc::new(Marker { inherited: true }));
        b.push_node(AnnotationNode::new("Other"));

        let merged = a.union(&b);
        assert_eq!(merged.nodes.len(), 2);
        assert_eq!(merged.typed().len(), 1);
    }

    #[test]
    fn test_inherited_filter() {
        let mut set = Annotations::default();
        set.attach(AnnotationNode::new("Marker"), Arc::new(Marker { inherited: false }));
        assert!(set.inherited().is_empty());
    }

    #[test]
    fn test_equality_ignores_typed() {
        let mut a = Annotations::default();
        a.push_node(AnnotationNode::new("Marker"));
        let mut b = a.clone();
        b.set_typed(vec![Arc::new(Marker { inherited: false })]);
        assert_eq!(a, b);
    }
}

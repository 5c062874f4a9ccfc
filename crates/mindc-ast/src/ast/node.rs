//! Addressing annotated nodes inside a definition
//!
//! Annotation checking and processing walk every annotated element of a
//! definition. Elements are addressed by a [`NodePath`] (a child-list index)
//! instead of a borrow, so a processor can receive the path, replace the
//! whole definition, and the walk can continue against the replacement.

use super::annotation::Annotations;
use super::definition::Definition;
use crate::foundation::AnnotationTarget;
use std::fmt;

/// Position of an annotated element within its definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodePath {
    Definition,
    Interface(usize),
    InternalInterface(usize),
    Attribute(usize),
    Component(usize),
    Binding(usize),
    Source(usize),
}

impl NodePath {
    /// Target kind used to validate annotation placement.
    pub fn target(self) -> AnnotationTarget {
        match self {
            NodePath::Definition => AnnotationTarget::Definition,
            NodePath::Interface(_) | NodePath::InternalInterface(_) => AnnotationTarget::Interface,
            NodePath::Attribute(_) => AnnotationTarget::Attribute,
            NodePath::Component(_) => AnnotationTarget::Component,
            NodePath::Binding(_) => AnnotationTarget::Binding,
            NodePath::Source(_) => AnnotationTarget::Source,
        }
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodePath::Definition => f.write_str("definition"),
            NodePath::Interface(i) => write!(f, "interface #{}", i),
            NodePath::InternalInterface(i) => write!(f, "internal interface #{}", i),
            NodePath::Attribute(i) => write!(f, "attribute #{}", i),
            NodePath::Component(i) => write!(f, "component #{}", i),
            NodePath::Binding(i) => write!(f, "binding #{}", i),
            NodePath::Source(i) => write!(f, "source #{}", i),
        }
    }
}

impl Definition {
    /// Paths of every element in depth-first order, definition first.
    pub fn node_paths(&self) -> Vec<NodePath> {
        let mut paths = vec![NodePath::Definition];
        paths.extend((0..self.interfaces.len()).map(NodePath::Interface));
        paths.extend((0..self.internal_interfaces.len()).map(NodePath::InternalInterface));
        paths.extend((0..self.attributes.len()).map(NodePath::Attribute));
        paths.extend((0..self.components.len()).map(NodePath::Component));
        paths.extend((0..self.bindings.len()).map(NodePath::Binding));
        paths.extend((0..self.sources.len()).map(NodePath::Source));
        paths
    }

    /// Annotations of the element at `path`.
    pub fn annotations_at(&self, path: NodePath) -> Option<&Annotations> {
        match path {
            NodePath::Definition => Some(&self.annotations),
            NodePath::Interface(i) => self.interfaces.get(i).map(|n| &n.annotations),
            NodePath::InternalInterface(i) => {
                self.internal_interfaces.get(i).map(|n| &n.annotations)
            }
            NodePath::Attribute(i) => self.attributes.get(i).map(|n| &n.annotations),
            NodePath::Component(i) => self.components.get(i).map(|n| &n.annotations),
            NodePath::Binding(i) => self.bindings.get(i).map(|n| &n.annotations),
            NodePath::Source(i) => self.sources.get(i).map(|n| &n.annotations),
        }
    }

    /// Mutable annotations of the element at `path`.
    pub fn annotations_at_mut(&mut self, path: NodePath) -> Option<&mut Annotations> {
        match path {
            NodePath::Definition => Some(&mut self.annotations),
            NodePath::Interface(i) => self.interfaces.get_mut(i).map(|n| &mut n.annotations),
            NodePath::InternalInterface(i) => self
                .internal_interfaces
                .get_mut(i)
                .map(|n| &mut n.annotations),
            NodePath::Attribute(i) => self.attributes.get_mut(i).map(|n| &mut n.annotations),
            NodePath::Component(i) => self.components.get_mut(i).map(|n| &mut n.annotations),
            NodePath::Binding(i) => self.bindings.get_mut(i).map(|n| &mut n.annotations),
            NodePath::Source(i) => self.sources.get_mut(i).map(|n| &mut n.annotations),
        }
    }

    /// Name of the element at `path`, for diagnostics.
    pub fn node_name(&self, path: NodePath) -> Option<String> {
        match path {
            NodePath::Definition => Some(self.name.clone()),
            NodePath::Interface(i) => self.interfaces.get(i).map(|n| n.name.clone()),
            NodePath::InternalInterface(i) => {
                self.internal_interfaces.get(i).map(|n| n.name.clone())
            }
            NodePath::Attribute(i) => self.attributes.get(i).map(|n| n.name.clone()),
            NodePath::Component(i) => self.components.get(i).map(|n| n.name.clone()),
            NodePath::Binding(i) => self.bindings.get(i).map(|n| n.to_string()),
            NodePath::Source(i) => self.sources.get(i).map(|n| n.path.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{AnnotationNode, Interface};

    #[test]
    fn test_node_paths_order() {
        let def = Definition::primitive("a.P")
            .with_interface(Interface::server("s", "a.I"))
            .with_attribute("n", "int", None)
            .with_source("p.c");

        assert_eq!(
            def.node_paths(),
            vec![
                NodePath::Definition,
                NodePath::Interface(0),
                NodePath::Attribute(0),
                NodePath::Source(0),
            ]
        );
    }

    #[test]
    fn test_annotations_at_mut() {
        let mut def = Definition::primitive("a.P").with_interface(Interface::server("s", "a.I"));
        def.annotations_at_mut(NodePath::Interface(0))
            .unwrap()
            .push_node(AnnotationNode::new("Override"));

        assert!(def.interfaces[0].annotations.has("Override"));
        assert!(def.annotations_at(NodePath::Interface(3)).is_none());
        assert_eq!(NodePath::Interface(0).target(), AnnotationTarget::Interface);
        assert_eq!(def.node_name(NodePath::Interface(0)).as_deref(), Some("s"));
    }
}

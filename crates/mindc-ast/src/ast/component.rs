//! Sub-components and bindings of composite definitions.

use super::annotation::Annotations;
use super::reference::{DefinitionReference, Resolved};
use crate::foundation::{DefId, Span};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Component name denoting the enclosing composite in a binding.
pub const THIS: &str = "this";

/// Named sub-component of a composite.
///
/// A sub-component either references a definition (`contains demo.Foo as x`)
/// or is a placeholder for a formal type parameter (`contains P as x`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    /// Sub-component name, unique within the composite
    pub name: String,
    /// Referenced definition, absent for placeholders
    pub definition: Option<DefinitionReference>,
    /// Formal type parameter this placeholder stands for
    pub type_parameter: Option<String>,
    /// Location of the declaration
    pub span: Span,
    /// Attached annotations
    pub annotations: Annotations,
    /// Resolved definition of this sub-component
    pub resolved: Option<Resolved>,
    /// Set by the lifecycle controller processor
    pub has_lifecycle_controller: bool,
}

/// One end of a binding: `component.interface[index]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Endpoint {
    /// Component name, or [`THIS`]
    pub component: String,
    /// Interface name
    pub interface: String,
    /// Collection index
    pub index: Option<u32>,
}

/// Directed edge from a client interface to a server interface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Binding {
    /// Client end
    pub from: Endpoint,
    /// Server end
    pub to: Endpoint,
    /// Location of the binding
    pub span: Span,
    /// Attached annotations
    pub annotations: Annotations,
    /// Server signature extends client signature; code generation must cast
    pub cast_required: bool,
}

impl Component {
    /// Sub-component instantiating `definition`.
    pub fn new(name: impl Into<String>, definition: DefinitionReference) -> Self {
        Self {
            name: name.into(),
            definition: Some(definition),
            type_parameter: None,
            span: Span::generated(),
            annotations: Annotations::default(),
            resolved: None,
            has_lifecycle_controller: false,
        }
    }

    /// Placeholder sub-component for formal type parameter `type_parameter`.
    pub fn placeholder(name: impl Into<String>, type_parameter: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            definition: None,
            type_parameter: Some(type_parameter.into()),
            span: Span::generated(),
            annotations: Annotations::default(),
            resolved: None,
            has_lifecycle_controller: false,
        }
    }

    /// Builder: set the source location.
    pub fn at(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Handle of the resolved definition, if resolved in this context.
    pub fn resolved_id(&self) -> Option<DefId> {
        self.resolved.as_ref().and_then(|r| r.id)
    }

    /// Whether this sub-component stands for a formal type parameter.
    pub fn is_placeholder(&self) -> bool {
        self.definition.is_none() && self.type_parameter.is_some()
    }
}

impl Endpoint {
    /// Endpoint `component.interface`.
    pub fn new(component: impl Into<String>, interface: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            interface: interface.into(),
            index: None,
        }
    }

    /// Endpoint `component.interface[index]`.
    pub fn indexed(component: impl Into<String>, interface: impl Into<String>, index: u32) -> Self {
        Self {
            index: Some(index),
            ..Self::new(component, interface)
        }
    }

    /// Whether this endpoint is on the enclosing composite.
    pub fn is_this(&self) -> bool {
        self.component == THIS
    }
}

impl Binding {
    /// New binding between two endpoints.
    pub fn new(from: Endpoint, to: Endpoint) -> Self {
        Self {
            from,
            to,
            span: Span::generated(),
            annotations: Annotations::default(),
            cast_required: false,
        }
    }

    /// Builder: set the source location.
    pub fn at(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Identifier of the client end, unique among a composite's bindings.
    pub fn id(&self) -> String {
        self.from.to_string()
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.component, self.interface)?;
        if let Some(index) = self.index {
            write!(f, "[{}]", index)?;
        }
        Ok(())
    }
}

impl fmt::Display for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.from, self.to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binding_display_and_id() {
        let binding = Binding::new(
            Endpoint::indexed("a", "c", 2),
            Endpoint::new(THIS, "s"),
        );
        assert_eq!(binding.to_string(), "a.c[2] to this.s");
        assert_eq!(binding.id(), "a.c[2]");
        assert!(binding.to.is_this());
    }

    #[test]
    fn test_placeholder() {
        let comp = Component::placeholder("x", "P");
        assert!(comp.is_placeholder());
        assert!(!Component::new("y", DefinitionReference::new("demo.Foo")).is_placeholder());
    }
}

//! Interface (port) declarations.

use super::annotation::Annotations;
use crate::foundation::Span;
use serde::{Deserialize, Serialize};

/// Direction of an interface as seen from outside the component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Requires a service (`requires`)
    Client,
    /// Provides a service (`provides`)
    Server,
}

/// Whether an interface must be bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Contingency {
    /// Must be bound (default)
    #[default]
    Mandatory,
    /// May be left unbound
    Optional,
}

/// Number of interface instances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Cardinality {
    /// Exactly one instance
    #[default]
    Singleton,
    /// `name[size]`; `None` when no size is given
    Collection(Option<u32>),
}

/// Interface declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interface {
    /// Interface name, unique within its container
    pub name: String,
    /// Client or server
    pub role: Role,
    /// IDL signature name (e.g. `fractal.api.LifeCycleController`)
    pub signature: String,
    /// Singleton or collection
    pub cardinality: Cardinality,
    /// Mandatory or optional
    pub contingency: Contingency,
    /// Location of the declaration
    pub span: Span,
    /// Attached annotations
    pub annotations: Annotations,
    /// Name of the dual interface on the other side of the membrane
    pub delegated_interface: Option<String>,
    /// Implemented by a membrane controller
    pub controller_interface: bool,
}

impl Role {
    /// The other role.
    pub fn flipped(self) -> Role {
        match self {
            Role::Client => Role::Server,
            Role::Server => Role::Client,
        }
    }
}

impl Interface {
    /// New mandatory singleton interface.
    pub fn new(name: impl Into<String>, role: Role, signature: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            role,
            signature: signature.into(),
            cardinality: Cardinality::Singleton,
            contingency: Contingency::Mandatory,
            span: Span::generated(),
            annotations: Annotations::default(),
            delegated_interface: None,
            controller_interface: false,
        }
    }

    /// New mandatory server interface.
    pub fn server(name: impl Into<String>, signature: impl Into<String>) -> Self {
        Self::new(name, Role::Server, signature)
    }

    /// New mandatory client interface.
    pub fn client(name: impl Into<String>, signature: impl Into<String>) -> Self {
        Self::new(name, Role::Client, signature)
    }

    /// Builder: make this a collection of `size` elements (`None` for unsized).
    pub fn collection(mut self, size: Option<u32>) -> Self {
        self.cardinality = Cardinality::Collection(size);
        self
    }

    /// Builder: make this interface optional.
    pub fn optional(mut self) -> Self {
        self.contingency = Contingency::Optional;
        self
    }

    /// Builder: set the source location.
    pub fn at(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Whether this is a client interface.
    pub fn is_client(&self) -> bool {
        self.role == Role::Client
    }

    /// Whether this is a server interface.
    pub fn is_server(&self) -> bool {
        self.role == Role::Server
    }

    /// Whether this interface must be bound.
    pub fn is_mandatory(&self) -> bool {
        self.contingency == Contingency::Mandatory
    }

    /// Whether this interface may stay unbound.
    pub fn is_optional(&self) -> bool {
        self.contingency == Contingency::Optional
    }

    /// Whether this is a singleton interface.
    pub fn is_singleton(&self) -> bool {
        self.cardinality == Cardinality::Singleton
    }

    /// Whether this is a collection interface.
    pub fn is_collection(&self) -> bool {
        matches!(self.cardinality, Cardinality::Collection(_))
    }

    /// Number of elements: 1 for singletons, `-1` for unsized collections.
    pub fn number_of_elements(&self) -> i64 {
        match self.cardinality {
            Cardinality::Singleton => 1,
            Cardinality::Collection(Some(size)) => i64::from(size),
            Cardinality::Collection(None) => -1,
        }
    }

    /// The internal dual of this interface: same declaration, role flipped.
    pub fn dual(&self) -> Interface {
        Interface {
            role: self.role.flipped(),
            annotations: Annotations::default(),
            delegated_interface: Some(self.name.clone()),
            controller_interface: false,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_of_elements() {
        assert_eq!(Interface::server("s", "a.I").number_of_elements(), 1);
        assert_eq!(
            Interface::server("s", "a.I").collection(Some(4)).number_of_elements(),
            4
        );
        assert_eq!(
            Interface::server("s", "a.I").collection(None).number_of_elements(),
            -1
        );
    }

    #[test]
    fn test_dual_flips_role_only() {
        let itf = Interface::client("c", "a.I").collection(Some(2)).optional();
        let dual = itf.dual();
        assert!(dual.is_server());
        assert_eq!(dual.name, "c");
        assert_eq!(dual.cardinality, Cardinality::Collection(Some(2)));
        assert!(dual.is_optional());
        assert_eq!(dual.delegated_interface.as_deref(), Some("c"));
    }
}

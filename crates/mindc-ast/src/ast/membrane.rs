//! Membrane metadata: controllers and the interfaces they implement.

use super::definition::Source;
use crate::foundation::Span;
use serde::{Deserialize, Serialize};

/// Implementation of one or more membrane interfaces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Controller {
    /// Interfaces implemented by this controller
    pub interfaces: Vec<ControllerInterface>,
    /// Implementation sources
    pub sources: Vec<Source>,
    /// Location of the controller (generated for synthesized ones)
    pub span: Span,
}

/// Reference from a controller to an interface it implements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControllerInterface {
    /// Interface name
    pub name: String,
    /// Refers to an internal interface rather than an external one
    pub is_internal: bool,
}

impl Controller {
    /// Controller implemented by a single source.
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            interfaces: Vec::new(),
            sources: vec![Source::new(source)],
            span: Span::generated(),
        }
    }

    /// Builder: add an implemented external interface.
    pub fn external(mut self, name: impl Into<String>) -> Self {
        self.interfaces.push(ControllerInterface {
            name: name.into(),
            is_internal: false,
        });
        self
    }

    /// Builder: add an implemented internal interface.
    pub fn internal(mut self, name: impl Into<String>) -> Self {
        self.interfaces.push(ControllerInterface {
            name: name.into(),
            is_internal: true,
        });
        self
    }

    /// Whether this controller implements external interface `name`.
    pub fn implements_external(&self, name: &str) -> bool {
        self.interfaces
            .iter()
            .any(|itf| !itf.is_internal && itf.name == name)
    }

    /// Whether this controller covers interface `name`, internal or external.
    pub fn covers(&self, name: &str) -> bool {
        self.interfaces.iter().any(|itf| itf.name == name)
    }
}

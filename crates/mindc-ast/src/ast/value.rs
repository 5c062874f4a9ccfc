//! Argument and attribute values.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Value bound to a formal parameter, argument, or attribute.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Value {
    /// `"text"`
    String(String),
    /// Integer literal
    Number(i64),
    /// Name of a formal parameter of the enclosing definition
    Reference(String),
    /// `null`
    Null,
}

/// Type of a formal parameter, inferred from its uses.
///
/// The first use of a parameter fixes its type; later uses must agree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParameterType {
    /// String literals and `null`
    String,
    /// Integer literals
    Integer,
}

impl Value {
    /// Whether this value is a literal (not a parameter reference).
    pub fn is_literal(&self) -> bool {
        !matches!(self, Value::Reference(_))
    }

    /// Referenced parameter name, for reference values.
    pub fn reference(&self) -> Option<&str> {
        match self {
            Value::Reference(name) => Some(name),
            _ => None,
        }
    }
}

impl ParameterType {
    /// Type of an attribute declared with `type_name`.
    ///
    /// Only `string` is a string type; every C integer type name maps to
    /// [`ParameterType::Integer`].
    pub fn of_attribute_type(type_name: &str) -> Self {
        if type_name == "string" {
            ParameterType::String
        } else {
            ParameterType::Integer
        }
    }

    /// Whether a literal value can be assigned to this type.
    ///
    /// References are never compatible here: they are checked against the
    /// inferred type of the referenced parameter instead.
    pub fn is_compatible(self, value: &Value) -> bool {
        matches!(
            (self, value),
            (ParameterType::String, Value::String(_) | Value::Null)
                | (ParameterType::Integer, Value::Number(_))
        )
    }

    /// Type inferred from a literal value.
    pub fn of_literal(value: &Value) -> Option<Self> {
        match value {
            Value::String(_) | Value::Null => Some(ParameterType::String),
            Value::Number(_) => Some(ParameterType::Integer),
            Value::Reference(_) => None,
        }
    }

    /// Default value of an uninitialized attribute of this type.
    pub fn default_value(self) -> Value {
        match self {
            ParameterType::String => Value::Null,
            ParameterType::Integer => Value::Number(0),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(text) => write!(f, "{:?}", text),
            Value::Number(n) => write!(f, "{}", n),
            Value::Reference(name) => f.write_str(name),
            Value::Null => f.write_str("null"),
        }
    }
}

impl fmt::Display for ParameterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterType::String => f.write_str("string"),
            ParameterType::Integer => f.write_str("integer"),
        }
    }
}

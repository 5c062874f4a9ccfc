//! References to definitions and their parameters
//!
//! A [`DefinitionReference`] names a definition and optionally binds its
//! formal value parameters (arguments) and formal type parameters (type
//! arguments): `demo.Buffer<T: demo.Fifo(depth=4)>(size=16)`.
//!
//! Once resolved, a reference carries a [`Resolved`] decoration: the handle
//! of the target definition in the compilation arena plus its name. Only the
//! name is serialized, so a reference read back from a bundle can be
//! re-resolved by name in a fresh context.

use super::value::Value;
use crate::foundation::{DefId, Span};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Graph-owning decoration linking a node to a resolved definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolved {
    /// Name of the resolved definition
    pub name: String,
    /// Arena handle, valid in the context that resolved it
    #[serde(skip)]
    pub id: Option<DefId>,
}

/// Reference to a definition by name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefinitionReference {
    /// Referenced name (possibly unqualified until imports are applied)
    pub name: String,
    /// Value arguments
    pub arguments: Vec<Argument>,
    /// Type arguments
    pub type_arguments: Vec<TypeArgument>,
    /// Location of the reference
    pub span: Span,
    /// Resolution result
    pub resolved: Option<Resolved>,
}

/// Value bound to a formal parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Argument {
    /// Parameter name; `None` for ordinal arguments
    pub name: Option<String>,
    /// Bound value
    pub value: Value,
    /// Location of the argument
    pub span: Span,
}

/// Definition bound to a formal type parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeArgument {
    /// Type parameter name; `None` for ordinal type arguments
    pub name: Option<String>,
    /// Bound value
    pub value: TypeArgumentValue,
    /// Location of the type argument
    pub span: Span,
}

/// What a type argument binds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TypeArgumentValue {
    /// A concrete definition, possibly with its own arguments
    Definition(DefinitionReference),
    /// A formal type parameter of the enclosing definition
    TypeParameter(String),
}

/// Formal value parameter: `primitive demo.D1(size) { ... }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormalParameter {
    /// Parameter name
    pub name: String,
    /// Location of the declaration
    pub span: Span,
}

/// Formal type parameter: `composite demo.G<P conformsto demo.IType>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormalTypeParameter {
    /// Parameter name
    pub name: String,
    /// Type the bound definition must conform to
    pub conforms_to: Option<DefinitionReference>,
    /// Location of the declaration
    pub span: Span,
}

/// `import a.b.C;` or `import a.b.*;`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Import {
    /// Package part (`a.b`)
    pub package: String,
    /// Simple name, or `*`
    pub simple_name: String,
    /// Location of the import
    pub span: Span,
}

impl Resolved {
    /// Decoration for a freshly resolved definition.
    pub fn new(name: impl Into<String>, id: DefId) -> Self {
        Self {
            name: name.into(),
            id: Some(id),
        }
    }
}

impl DefinitionReference {
    /// New reference without arguments.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arguments: Vec::new(),
            type_arguments: Vec::new(),
            span: Span::generated(),
            resolved: None,
        }
    }

    /// Builder: add an ordinal argument.
    pub fn arg(mut self, value: Value) -> Self {
        self.arguments.push(Argument {
            name: None,
            value,
            span: self.span,
        });
        self
    }

    /// Builder: add a named argument.
    pub fn named_arg(mut self, name: impl Into<String>, value: Value) -> Self {
        self.arguments.push(Argument {
            name: Some(name.into()),
            value,
            span: self.span,
        });
        self
    }

    /// Builder: add an ordinal type argument.
    pub fn type_arg(mut self, value: TypeArgumentValue) -> Self {
        self.type_arguments.push(TypeArgument {
            name: None,
            value,
            span: self.span,
        });
        self
    }

    /// Builder: add a named type argument.
    pub fn named_type_arg(mut self, name: impl Into<String>, value: TypeArgumentValue) -> Self {
        self.type_arguments.push(TypeArgument {
            name: Some(name.into()),
            value,
            span: self.span,
        });
        self
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

    /// Drop the resolution result so the reference is resolved again.
    pub fn clear_resolution(&mut self) {
        self.resolved = None;
        for type_arg in &mut self.type_arguments {
            if let TypeArgumentValue::Definition(inner) = &mut type_arg.value {
                inner.clear_resolution();
            }
        }
    }

    /// Whether every argument is named.
    pub fn has_named_arguments(&self) -> bool {
        self.arguments.iter().all(|a| a.name.is_some())
    }
}

impl Argument {
    /// New named argument.
    pub fn named(name: impl Into<String>, value: Value) -> Self {
        Self {
            name: Some(name.into()),
            value,
            span: Span::generated(),
        }
    }
}

impl FormalParameter {
    /// New formal parameter.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            span: Span::generated(),
        }
    }
}

impl FormalTypeParameter {
    /// New formal type parameter conforming to `conforms_to`.
    pub fn new(name: impl Into<String>, conforms_to: Option<DefinitionReference>) -> Self {
        Self {
            name: name.into(),
            conforms_to,
            span: Span::generated(),
        }
    }
}

impl Import {
    /// Parse `a.b.C` or `a.b.*` into an import.
    pub fn new(path: &str) -> Self {
        let (package, simple_name) = path.rsplit_once('.').unwrap_or(("", path));
        Self {
            package: package.to_string(),
            simple_name: simple_name.to_string(),
            span: Span::generated(),
        }
    }

    /// Whether this is an on-demand (`*`) import.
    pub fn is_on_demand(&self) -> bool {
        self.simple_name == "*"
    }

    /// Fully qualified name this import gives to `simple`, if it applies.
    pub fn qualify(&self, simple: &str) -> Option<String> {
        if self.is_on_demand() || self.simple_name == simple {
            Some(format!("{}.{}", self.package, simple))
        } else {
            None
        }
    }
}

impl fmt::Display for DefinitionReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if !self.type_arguments.is_empty() {
            f.write_str("<")?;
            for (idx, type_arg) in self.type_arguments.iter().enumerate() {
                if idx > 0 {
                    f.write_str(", ")?;
                }
                if let Some(name) = &type_arg.name {
                    write!(f, "{}: ", name)?;
                }
                match &type_arg.value {
                    TypeArgumentValue::Definition(inner) => write!(f, "{}", inner)?,
                    TypeArgumentValue::TypeParameter(param) => f.write_str(param)?,
                }
            }
            f.write_str(">")?;
        }
        if !self.arguments.is_empty() {
            f.write_str("(")?;
            for (idx, arg) in self.arguments.iter().enumerate() {
                if idx > 0 {
                    f.write_str(", ")?;
                }
                match &arg.name {
                    Some(name) => write!(f, "{}={}", name, arg.value)?,
                    None => write!(f, "{}", arg.value)?,
                }
            }
            f.write_str(")")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_display() {
        let reference = DefinitionReference::new("demo.G")
            .named_type_arg(
                "P",
                TypeArgumentValue::Definition(
                    DefinitionReference::new("demo.Foo").named_arg("x", Value::Number(1)),
                ),
            )
            .arg(Value::String("s".into()));
        assert_eq!(reference.to_string(), "demo.G<P: demo.Foo(x=1)>(\"s\")");
    }

    #[test]
    fn test_import_qualify() {
        let single = Import::new("a.b.C");
        assert_eq!(single.qualify("C").as_deref(), Some("a.b.C"));
        assert_eq!(single.qualify("D"), None);

        let on_demand = Import::new("a.b.*");
        assert!(on_demand.is_on_demand());
        assert_eq!(on_demand.qualify("D").as_deref(), Some("a.b.D"));
    }

    #[test]
    fn test_clear_resolution_is_recursive() {
        let mut inner = DefinitionReference::new("demo.Foo");
        inner.resolved = Some(Resolved::new("demo.Foo", DefId::new(1)));
        let mut outer = DefinitionReference::new("demo.G")
            .type_arg(TypeArgumentValue::Definition(inner));
        outer.resolved = Some(Resolved::new("demo.G<demo.Foo>", DefId::new(2)));

        outer.clear_resolution();
        assert!(outer.resolved.is_none());
        match &outer.type_arguments[0].value {
            TypeArgumentValue::Definition(inner) => assert!(inner.resolved.is_none()),
            other => panic!("unexpected type argument {:?}", other),
        }
    }
}

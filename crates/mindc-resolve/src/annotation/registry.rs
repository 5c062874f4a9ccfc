//! Known annotation kinds and argument binding.

use super::processor::AnnotationProcessor;
use indexmap::IndexMap;
use mindc_ast::{Annotation, AnnotationNode, AnnotationValue};
use std::sync::Arc;
use thiserror::Error;

/// Name given to the single unnamed argument of an annotation: `@Foo(true)`.
pub const DEFAULT_PARAMETER: &str = "value";

/// Builds a typed annotation from bound arguments.
pub type AnnotationBuilder = fn(&AnnotationArguments) -> Result<Arc<dyn Annotation>, String>;

/// Declared parameter of an annotation kind.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationParameter {
    pub name: &'static str,
    /// Value used when the argument is omitted; `None` makes it required
    pub default: Option<AnnotationValue>,
}

/// Registration entry for one annotation kind.
pub struct AnnotationDescriptor {
    pub name: &'static str,
    pub parameters: Vec<AnnotationParameter>,
    pub build: AnnotationBuilder,
    pub processor: Option<Arc<dyn AnnotationProcessor>>,
}

/// Arguments of an annotation node bound to the declared parameters.
#[derive(Debug, Clone)]
pub struct AnnotationArguments {
    kind: &'static str,
    values: IndexMap<&'static str, AnnotationValue>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnnotationBuildError {
    #[error("unknown annotation '@{0}'")]
    UnknownKind(String),

    #[error("annotation '@{kind}' has no parameter '{name}'")]
    UnknownArgument { kind: String, name: String },

    #[error("missing value for parameter '{name}' of annotation '@{kind}'")]
    MissingArgument { kind: String, name: String },

    #[error("parameter '{name}' of annotation '@{kind}' is given twice")]
    DuplicateArgument { kind: String, name: String },

    #[error("invalid annotation '@{kind}': {message}")]
    Invalid { kind: String, message: String },
}

/// Registry of annotation kinds, keyed by simple name.
#[derive(Default)]
pub struct AnnotationRegistry {
    kinds: IndexMap<&'static str, AnnotationDescriptor>,
}

impl AnnotationDescriptor {
    pub fn new(name: &'static str, build: AnnotationBuilder) -> Self {
        Self {
            name,
            parameters: Vec::new(),
            build,
            processor: None,
        }
    }

    /// Builder: declare a parameter.
    pub fn parameter(mut self, name: &'static str, default: Option<AnnotationValue>) -> Self {
        self.parameters.push(AnnotationParameter { name, default });
        self
    }

    /// Builder: set the processor run at the annotation's phases.
    pub fn processor(mut self, processor: Arc<dyn AnnotationProcessor>) -> Self {
        self.processor = Some(processor);
        self
    }
}

impl AnnotationArguments {
    pub fn kind(&self) -> &'static str {
        self.kind
    }

    pub fn get(&self, name: &str) -> Option<&AnnotationValue> {
        self.values.get(name)
    }

    /// Boolean argument `name`.
    pub fn bool(&self, name: &str) -> Result<bool, String> {
        match self.get(name) {
            Some(AnnotationValue::Bool(value)) => Ok(*value),
            Some(other) => Err(format!("'{}' must be a boolean, found {}", name, other)),
            None => Err(format!("no value for '{}'", name)),
        }
    }

    /// String argument `name`.
    pub fn string(&self, name: &str) -> Result<&str, String> {
        match self.get(name) {
            Some(AnnotationValue::String(value)) => Ok(value),
            Some(other) => Err(format!("'{}' must be a string, found {}", name, other)),
            None => Err(format!("no value for '{}'", name)),
        }
    }
}

impl AnnotationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the annotations every compilation understands.
    pub fn with_predefined() -> Self {
        let mut registry = Self::new();
        super::predefined::register_all(&mut registry);
        registry
    }

    /// Register a kind, replacing any previous kind of the same name.
    pub fn register(&mut self, descriptor: AnnotationDescriptor) {
        self.kinds.insert(descriptor.name, descriptor);
    }

    /// Descriptor for `type_name`, matched on its simple name.
    pub fn descriptor(&self, type_name: &str) -> Option<&AnnotationDescriptor> {
        let simple = type_name.rsplit('.').next().unwrap_or(type_name);
        self.kinds.get(simple)
    }

    pub fn processor(&self, kind: &str) -> Option<&dyn AnnotationProcessor> {
        self.descriptor(kind)
            .and_then(|descriptor| descriptor.processor.as_deref())
    }

    pub fn kinds(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.kinds.keys().copied()
    }

    /// Bind the arguments of `node` and build its typed annotation.
    pub fn build(&self, node: &AnnotationNode) -> Result<Arc<dyn Annotation>, AnnotationBuildError> {
        let descriptor = self
            .descriptor(&node.type_name)
            .ok_or_else(|| AnnotationBuildError::UnknownKind(node.type_name.clone()))?;
        let kind = descriptor.name;

        let mut values = IndexMap::new();
        for arg in &node.arguments {
            let name = if arg.name.is_empty() {
                DEFAULT_PARAMETER
            } else {
                arg.name.as_str()
            };
            let param = descriptor
                .parameters
                .iter()
                .find(|p| p.name == name)
                .ok_or_else(|| AnnotationBuildError::UnknownArgument {
                    kind: kind.to_string(),
                    name: name.to_string(),
                })?;
            if values.insert(param.name, arg.value.clone()).is_some() {
                return Err(AnnotationBuildError::DuplicateArgument {
                    kind: kind.to_string(),
                    name: name.to_string(),
                });
            }
        }
        for param in &descriptor.parameters {
            if values.contains_key(param.name) {
                continue;
            }
            let default = param
                .default
                .clone()
                .ok_or_else(|| AnnotationBuildError::MissingArgument {
                    kind: kind.to_string(),
                    name: param.name.to_string(),
                })?;
            values.insert(param.name, default);
        }

        let arguments = AnnotationArguments { kind, values };
        (descriptor.build)(&arguments).map_err(|message| AnnotationBuildError::Invalid {
            kind: kind.to_string(),
            message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::predefined::{AttributeController, OVERRIDE};

    #[test]
    fn test_predefined_kinds_registered() {
        let registry = AnnotationRegistry::with_predefined();
        let kinds: Vec<_> = registry.kinds().collect();
        assert!(kinds.contains(&OVERRIDE));
        assert!(kinds.contains(&"Singleton"));
        assert!(registry.descriptor("fractal.annotations.Singleton").is_some());
        assert!(registry.processor("Singleton").is_some());
        assert!(registry.processor(OVERRIDE).is_none());
    }

    #[test]
    fn test_named_argument_and_default() {
        let registry = AnnotationRegistry::with_predefined();
        let node = AnnotationNode::new("AttributeController")
            .with_argument("allowNoAttr", AnnotationValue::Bool(true));
        let annotation = registry.build(&node).unwrap();
        let typed = annotation.as_any().downcast_ref::<AttributeController>().unwrap();
        assert!(typed.allow_no_attr);

        let defaulted = registry.build(&AnnotationNode::new("AttributeController")).unwrap();
        let typed = defaulted.as_any().downcast_ref::<AttributeController>().unwrap();
        assert!(!typed.allow_no_attr);
    }

    #[test]
    fn test_build_errors() {
        let registry = AnnotationRegistry::with_predefined();
        assert_eq!(
            registry.build(&AnnotationNode::new("Nope")).unwrap_err(),
            AnnotationBuildError::UnknownKind("Nope".into())
        );
        let unknown_arg = AnnotationNode::new("Singleton").with_argument("", AnnotationValue::Null);
        assert_eq!(
            registry.build(&unknown_arg).unwrap_err(),
            AnnotationBuildError::UnknownArgument {
                kind: "Singleton".into(),
                name: "value".into()
            }
        );
        let wrong_type = AnnotationNode::new("AttributeController")
            .with_argument("allowNoAttr", AnnotationValue::Number(1));
        assert!(matches!(
            registry.build(&wrong_type),
            Err(AnnotationBuildError::Invalid { .. })
        ));
    }
}

//! Definitions: the root nodes of the ADL graph
//!
//! A [`Definition`] is a named component description. Which parts it may
//! hold is described by its [`CapabilitySet`]; its [`DefinitionKind`] is
//! derived from those capabilities:
//!
//! - **Composite** — has the `ComponentContainer` capability
//! - **Primitive** — has the `ImplementationContainer` capability
//! - **Type** — neither (interfaces only)
//!
//! Definitions never point at each other directly. Cross-definition links
//! (extends parents, sub-component definitions, template arguments) are
//! [`Resolved`](super::reference::Resolved) decorations holding a [`DefId`]
//! into the compilation arena, so replacing a definition behind its handle is
//! seen by every holder.

use super::annotation::{AnnotationNode, Annotations};
use super::component::{Binding, Component};
use super::interface::Interface;
use super::membrane::Controller;
use super::reference::{DefinitionReference, FormalParameter, FormalTypeParameter, Import};
use super::value::Value;
use crate::foundation::{Capability, CapabilitySet, DefId, Span};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Classification of a definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DefinitionKind {
    /// Interfaces only
    Type,
    /// Implemented by sources
    Primitive,
    /// Assembled from sub-components
    Composite,
}

/// Named component description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Definition {
    /// Fully qualified name (`demo.Top`, `demo.G<demo.Foo>`)
    pub name: String,
    /// Location of the definition header
    pub span: Span,
    /// Container roles exposed by this definition
    pub capabilities: CapabilitySet,
    /// Declared `abstract`
    pub is_abstract: bool,
    /// Imports used to qualify short names
    pub imports: Vec<Import>,
    /// Parents, merged by the extends stage
    pub extends: Vec<DefinitionReference>,
    /// Formal value parameters
    pub formal_parameters: Vec<FormalParameter>,
    /// Formal type parameters
    pub formal_type_parameters: Vec<FormalTypeParameter>,
    /// External interfaces
    pub interfaces: Vec<Interface>,
    /// Internal (membrane-side) interfaces
    pub internal_interfaces: Vec<Interface>,
    /// Attributes
    pub attributes: Vec<Attribute>,
    /// Sub-components
    pub components: Vec<Component>,
    /// Bindings between sub-components
    pub bindings: Vec<Binding>,
    /// Implementation sources
    pub sources: Vec<Source>,
    /// Membrane controllers
    pub controllers: Vec<Controller>,
    /// Attached annotations
    pub annotations: Annotations,
    /// Metadata set by loader stages
    pub decorations: DefinitionDecorations,
}

/// Plain metadata attached to a definition by loader stages and processors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefinitionDecorations {
    /// Parents have already been merged into this definition
    pub extends_merged: bool,
    /// Marked `@Singleton`
    pub singleton: bool,
    /// Name of the generic definition this is an instance of
    pub template_of: Option<String>,
    /// Some type parameters are still bound to enclosing type parameters
    pub partially_instantiated: bool,
    /// Name of the definition this one was produced from by value substitution
    pub substituted_from: Option<String>,
    /// Controller implementation files shared by every instance
    pub shared_implementations: Vec<String>,
}

/// Attribute declaration: `attribute int size = 10;`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    /// Attribute name
    pub name: String,
    /// C type name (`int`, `uint8_t`, `string`, ...)
    pub type_name: String,
    /// Initial value
    pub value: Option<Value>,
    /// Location of the declaration
    pub span: Span,
    /// Attached annotations
    pub annotations: Annotations,
}

/// Implementation source file: `source foo.c;`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    /// Source path or controller implementation name
    pub path: String,
    /// Location of the declaration
    pub span: Span,
    /// Attached annotations
    pub annotations: Annotations,
}

impl DefinitionKind {
    /// Capabilities a freshly declared definition of this kind exposes.
    pub fn default_capabilities(self) -> CapabilitySet {
        let base = CapabilitySet::single(Capability::InterfaceContainer);
        match self {
            DefinitionKind::Type => base,
            DefinitionKind::Primitive => base
                .with(Capability::ImplementationContainer)
                .with(Capability::AttributeContainer),
            DefinitionKind::Composite => base
                .with(Capability::ComponentContainer)
                .with(Capability::BindingContainer),
        }
    }

    /// Keyword introducing a definition of this kind.
    pub fn keyword(self) -> &'static str {
        match self {
            DefinitionKind::Type => "type",
            DefinitionKind::Primitive => "primitive",
            DefinitionKind::Composite => "composite",
        }
    }
}

impl Definition {
    /// Empty definition of the given kind.
    pub fn new(name: impl Into<String>, kind: DefinitionKind) -> Self {
        Self::with_capabilities(name, kind.default_capabilities())
    }

    /// Empty definition exposing exactly `capabilities`.
    pub fn with_capabilities(name: impl Into<String>, capabilities: CapabilitySet) -> Self {
        Self {
            name: name.into(),
            span: Span::generated(),
            capabilities,
            is_abstract: false,
            imports: Vec::new(),
            extends: Vec::new(),
            formal_parameters: Vec::new(),
            formal_type_parameters: Vec::new(),
            interfaces: Vec::new(),
            internal_interfaces: Vec::new(),
            attributes: Vec::new(),
            components: Vec::new(),
            bindings: Vec::new(),
            sources: Vec::new(),
            controllers: Vec::new(),
            annotations: Annotations::default(),
            decorations: DefinitionDecorations::default(),
        }
    }

    /// Empty primitive definition.
    pub fn primitive(name: impl Into<String>) -> Self {
        Self::new(name, DefinitionKind::Primitive)
    }

    /// Empty composite definition.
    pub fn composite(name: impl Into<String>) -> Self {
        Self::new(name, DefinitionKind::Composite)
    }

    /// Empty type definition.
    pub fn type_definition(name: impl Into<String>) -> Self {
        Self::new(name, DefinitionKind::Type)
    }

    /// Kind derived from capabilities.
    pub fn kind(&self) -> DefinitionKind {
        if self.has(Capability::ComponentContainer) {
            DefinitionKind::Composite
        } else if self.has(Capability::ImplementationContainer) {
            DefinitionKind::Primitive
        } else {
            DefinitionKind::Type
        }
    }

    /// Whether this definition has implementation sources capability.
    pub fn is_primitive(&self) -> bool {
        self.kind() == DefinitionKind::Primitive
    }

    /// Whether this definition has sub-components capability.
    pub fn is_composite(&self) -> bool {
        self.kind() == DefinitionKind::Composite
    }

    /// Whether this definition is a pure type.
    pub fn is_type(&self) -> bool {
        self.kind() == DefinitionKind::Type
    }

    /// Whether this definition exposes `capability`.
    pub fn has(&self, capability: Capability) -> bool {
        self.capabilities.contains(capability)
    }

    /// Whether this definition has formal type parameters.
    pub fn is_generic(&self) -> bool {
        !self.formal_type_parameters.is_empty()
    }

    /// External interface named `name`.
    pub fn interface(&self, name: &str) -> Option<&Interface> {
        self.interfaces.iter().find(|itf| itf.name == name)
    }

    /// Mutable external interface named `name`.
    pub fn interface_mut(&mut self, name: &str) -> Option<&mut Interface> {
        self.interfaces.iter_mut().find(|itf| itf.name == name)
    }

    /// Internal interface named `name`.
    pub fn internal_interface(&self, name: &str) -> Option<&Interface> {
        self.internal_interfaces.iter().find(|itf| itf.name == name)
    }

    /// Sub-component named `name`.
    pub fn component(&self, name: &str) -> Option<&Component> {
        self.components.iter().find(|comp| comp.name == name)
    }

    /// Attribute named `name`.
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|attr| attr.name == name)
    }

    /// Formal parameter named `name`.
    pub fn formal_parameter(&self, name: &str) -> Option<&FormalParameter> {
        self.formal_parameters.iter().find(|p| p.name == name)
    }

    /// Formal type parameter named `name`.
    pub fn formal_type_parameter(&self, name: &str) -> Option<&FormalTypeParameter> {
        self.formal_type_parameters.iter().find(|p| p.name == name)
    }

    /// Resolved handles of the sub-components, in declaration order.
    pub fn resolved_components(&self) -> impl Iterator<Item = (&Component, DefId)> {
        self.components
            .iter()
            .filter_map(|comp| comp.resolved_id().map(|id| (comp, id)))
    }

    // -- builders ---------------------------------------------------------

    fn gain(&mut self, capability: Capability) {
        self.capabilities = self.capabilities.with(capability);
    }

    /// Builder: set the source location.
    pub fn at(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Builder: declare the definition abstract.
    pub fn abstract_definition(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    /// Builder: add an import.
    pub fn with_import(mut self, import: Import) -> Self {
        self.gain(Capability::ImportContainer);
        self.imports.push(import);
        self
    }

    /// Builder: add a parent.
    pub fn with_extends(mut self, parent: DefinitionReference) -> Self {
        self.extends.push(parent);
        self
    }

    /// Builder: add a formal value parameter.
    pub fn with_parameter(mut self, name: impl Into<String>) -> Self {
        self.gain(Capability::FormalParameterContainer);
        self.formal_parameters.push(FormalParameter::new(name));
        self
    }

    /// Builder: add a formal type parameter.
    pub fn with_type_parameter(
        mut self,
        name: impl Into<String>,
        conforms_to: Option<DefinitionReference>,
    ) -> Self {
        self.gain(Capability::FormalTypeParameterContainer);
        self.formal_type_parameters
            .push(FormalTypeParameter::new(name, conforms_to));
        self
    }

    /// Builder: add an external interface.
    pub fn with_interface(mut self, interface: Interface) -> Self {
        self.gain(Capability::InterfaceContainer);
        self.interfaces.push(interface);
        self
    }

    /// Builder: add an attribute.
    pub fn with_attribute(
        mut self,
        name: impl Into<String>,
        type_name: impl Into<String>,
        value: Option<Value>,
    ) -> Self {
        self.gain(Capability::AttributeContainer);
        self.attributes.push(Attribute::new(name, type_name, value));
        self
    }

    /// Builder: add a sub-component.
    pub fn with_component(mut self, component: Component) -> Self {
        self.gain(Capability::ComponentContainer);
        self.components.push(component);
        self
    }

    /// Builder: add a binding.
    pub fn with_binding(mut self, binding: Binding) -> Self {
        self.gain(Capability::BindingContainer);
        self.bindings.push(binding);
        self
    }

    /// Builder: add an implementation source.
    pub fn with_source(mut self, path: impl Into<String>) -> Self {
        self.gain(Capability::ImplementationContainer);
        self.sources.push(Source::new(path));
        self
    }

    /// Builder: attach an annotation.
    pub fn with_annotation(mut self, annotation: AnnotationNode) -> Self {
        self.annotations.push_node(annotation);
        self
    }
}

impl Attribute {
    /// New attribute declaration.
    pub fn new(name: impl Into<String>, type_name: impl Into<String>, value: Option<Value>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            value,
            span: Span::generated(),
            annotations: Annotations::default(),
        }
    }
}

impl Source {
    /// New source declaration.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            span: Span::generated(),
            annotations: Annotations::default(),
        }
    }
}

impl fmt::Display for DefinitionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

//! Compact bitsets over small closed enums
//!
//! Three enums drive most front-end dispatch:
//!
//! - [`Capability`] — which container roles a definition exposes
//!   (interfaces, sub-components, implementation sources, ...). The kind of a
//!   definition (primitive, composite, type) is derived from these.
//! - [`LoaderPhase`] — when an annotation processor runs in the loader chain.
//! - [`AnnotationTarget`] — which node kinds an annotation may decorate.
//!
//! Each has a matching `u16` bitset with value semantics.
//!
//! # Examples
//!
//! ```
//! # use mindc_ast::foundation::sets::*;
//! let caps = CapabilitySet::empty()
//!     .with(Capability::InterfaceContainer)
//!     .with(Capability::ImplementationContainer);
//! assert!(caps.contains(Capability::ImplementationContainer));
//! assert!(!caps.contains(Capability::ComponentContainer));
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! bit_set {
    ($(#[$meta:meta])* $set:ident of $item:ident) => {
        $(#[$meta])*
        #[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
        pub struct $set(u16);

        impl $set {
            /// Create an empty set.
            pub const fn empty() -> Self {
                Self(0)
            }

            /// Create a set containing every member.
            pub const fn all() -> Self {
                Self((1 << $item::COUNT) - 1)
            }

            /// Create a set with a single member.
            pub const fn single(item: $item) -> Self {
                Self(1 << item as u16)
            }

            /// Add a member to this set.
            pub const fn with(self, item: $item) -> Self {
                Self(self.0 | (1 << item as u16))
            }

            /// Remove a member from this set.
            pub const fn without(self, item: $item) -> Self {
                Self(self.0 & !(1 << item as u16))
            }

            /// Check if this set contains a member.
            pub const fn contains(self, item: $item) -> bool {
                (self.0 & (1 << item as u16)) != 0
            }

            /// Check if this set is empty.
            pub const fn is_empty(self) -> bool {
                self.0 == 0
            }

            /// Number of members.
            pub const fn len(self) -> usize {
                self.0.count_ones() as usize
            }

            /// Compute the union of two sets.
            pub const fn union(self, other: Self) -> Self {
                Self(self.0 | other.0)
            }

            /// Check if this set is a subset of another.
            pub const fn is_subset_of(self, other: Self) -> bool {
                (self.0 & other.0) == self.0
            }

            /// Iterate over members in declaration order.
            pub fn iter(self) -> impl Iterator<Item = $item> {
                $item::ALL.iter().copied().filter(move |item| self.contains(*item))
            }
        }

        impl FromIterator<$item> for $set {
            fn from_iter<I: IntoIterator<Item = $item>>(iter: I) -> Self {
                iter.into_iter().fold(Self::empty(), Self::with)
            }
        }

        impl fmt::Display for $item {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.name())
            }
        }
    };
}

/// Container role a definition can expose.
///
/// A definition gains a role by capability upgrade (see
/// [`Definition::upgrade`](crate::ast::Definition::upgrade)); roles are never
/// removed.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Capability {
    /// Has external interfaces
    InterfaceContainer = 0,
    /// Has sub-components (composite)
    ComponentContainer = 1,
    /// Has bindings between sub-components
    BindingContainer = 2,
    /// Has attributes
    AttributeContainer = 3,
    /// Has implementation sources (primitive)
    ImplementationContainer = 4,
    /// Has formal value parameters
    FormalParameterContainer = 5,
    /// Has formal type parameters (generic)
    FormalTypeParameterContainer = 6,
    /// Has membrane controllers
    ControllerContainer = 7,
    /// Has internal (membrane-side) interfaces
    InternalInterfaceContainer = 8,
    /// Has imports
    ImportContainer = 9,
}

impl Capability {
    /// Total number of capabilities
    pub const COUNT: usize = 10;

    /// Every capability in declaration order.
    pub const ALL: [Capability; Self::COUNT] = [
        Self::InterfaceContainer,
        Self::ComponentContainer,
        Self::BindingContainer,
        Self::AttributeContainer,
        Self::ImplementationContainer,
        Self::FormalParameterContainer,
        Self::FormalTypeParameterContainer,
        Self::ControllerContainer,
        Self::InternalInterfaceContainer,
        Self::ImportContainer,
    ];

    /// Get the capability name as a static string.
    pub const fn name(self) -> &'static str {
        match self {
            Self::InterfaceContainer => "InterfaceContainer",
            Self::ComponentContainer => "ComponentContainer",
            Self::BindingContainer => "BindingContainer",
            Self::AttributeContainer => "AttributeContainer",
            Self::ImplementationContainer => "ImplementationContainer",
            Self::FormalParameterContainer => "FormalParameterContainer",
            Self::FormalTypeParameterContainer => "FormalTypeParameterContainer",
            Self::ControllerContainer => "ControllerContainer",
            Self::InternalInterfaceContainer => "InternalInterfaceContainer",
            Self::ImportContainer => "ImportContainer",
        }
    }
}

bit_set! {
    /// Bitset of capabilities (compact representation).
    CapabilitySet of Capability
}

/// Point in the loader chain at which an annotation processor runs.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum LoaderPhase {
    /// Right after the raw definition is produced
    AfterParsing = 0,
    /// After the extends merge
    AfterExtends = 1,
    /// After every structural check passed
    AfterChecking = 2,
    /// For each sub-component, with the enclosing composite as definition
    OnSubComponent = 3,
    /// After a template instance is produced
    AfterTemplateInstantiate = 4,
    /// For each instantiated placeholder sub-component of a template instance
    OnTemplateSubComponent = 5,
}

impl LoaderPhase {
    /// Total number of phases
    pub const COUNT: usize = 6;

    /// Every phase in declaration order.
    pub const ALL: [LoaderPhase; Self::COUNT] = [
        Self::AfterParsing,
        Self::AfterExtends,
        Self::AfterChecking,
        Self::OnSubComponent,
        Self::AfterTemplateInstantiate,
        Self::OnTemplateSubComponent,
    ];

    /// Get the phase name as a static string.
    pub const fn name(self) -> &'static str {
        match self {
            Self::AfterParsing => "AFTER_PARSING",
            Self::AfterExtends => "AFTER_EXTENDS",
            Self::AfterChecking => "AFTER_CHECKING",
            Self::OnSubComponent => "ON_SUB_COMPONENT",
            Self::AfterTemplateInstantiate => "AFTER_TEMPLATE_INSTANTIATE",
            Self::OnTemplateSubComponent => "ON_TEMPLATE_SUB_COMPONENT",
        }
    }
}

bit_set! {
    /// Bitset of loader phases (compact representation).
    PhaseSet of LoaderPhase
}

/// Node kind an annotation can be attached to.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum AnnotationTarget {
    /// Import declaration
    Import = 0,
    /// Definition
    Definition = 1,
    /// Interface declaration
    Interface = 2,
    /// Attribute declaration
    Attribute = 3,
    /// Sub-component declaration
    Component = 4,
    /// Implementation source
    Source = 5,
    /// Binding
    Binding = 6,
}

impl AnnotationTarget {
    /// Total number of target kinds
    pub const COUNT: usize = 7;

    /// Every target in declaration order.
    pub const ALL: [AnnotationTarget; Self::COUNT] = [
        Self::Import,
        Self::Definition,
        Self::Interface,
        Self::Attribute,
        Self::Component,
        Self::Source,
        Self::Binding,
    ];

    /// Get the target name as a static string.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Import => "import",
            Self::Definition => "definition",
            Self::Interface => "interface",
            Self::Attribute => "attribute",
            Self::Component => "component",
            Self::Source => "source",
            Self::Binding => "binding",
        }
    }
}

bit_set! {
    /// Bitset of annotation targets (compact representation).
    TargetSet of AnnotationTarget
}

//! Structural merge and capability upgrade
//!
//! Two definitions merge into one by unioning capabilities, annotations and
//! plain decorations and concatenating every child list. Scalar fields must
//! agree; a disagreement is a pipeline bug and is reported as a
//! [`MergeError`] rather than a user diagnostic.
//!
//! Upgrading a definition is a merge with an empty definition exposing only
//! the requested capability. The caller stores the result back into the
//! arena slot of the original, so every handle observes the upgrade.

use super::definition::{Definition, DefinitionDecorations};
use crate::foundation::{Capability, CapabilitySet};
use thiserror::Error;

/// Contradictory fields between two merged definitions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MergeError {
    #[error("cannot merge `{left}` with `{right}`: conflicting {field}")]
    Conflict {
        field: &'static str,
        left: String,
        right: String,
    },
}

fn merge_option(
    field: &'static str,
    left: Option<String>,
    right: Option<String>,
) -> Result<Option<String>, MergeError> {
    match (left, right) {
        (Some(l), Some(r)) if l != r => Err(MergeError::Conflict {
            field,
            left: l,
            right: r,
        }),
        (Some(l), _) => Ok(Some(l)),
        (None, r) => Ok(r),
    }
}

fn merge_decorations(
    left: DefinitionDecorations,
    right: DefinitionDecorations,
) -> Result<DefinitionDecorations, MergeError> {
    // Exhaustive destructure: adding a decoration without merge support fails to compile.
    let DefinitionDecorations {
        extends_merged,
        singleton,
        template_of,
        partially_instantiated,
        substituted_from,
        mut shared_implementations,
    } = left;
    for implementation in right.shared_implementations {
        if !shared_implementations.contains(&implementation) {
            shared_implementations.push(implementation);
        }
    }
    Ok(DefinitionDecorations {
        extends_merged: extends_merged || right.extends_merged,
        singleton: singleton || right.singleton,
        template_of: merge_option("template origin", template_of, right.template_of)?,
        partially_instantiated: partially_instantiated || right.partially_instantiated,
        substituted_from: merge_option(
            "substitution origin",
            substituted_from,
            right.substituted_from,
        )?,
        shared_implementations,
    })
}

/// Merge `overlay` into `base`.
///
/// Child lists of `overlay` are appended after those of `base`. An empty
/// name on either side adopts the other.
pub fn merge_definitions(base: Definition, overlay: Definition) -> Result<Definition, MergeError> {
    let name = match (base.name.is_empty(), overlay.name.is_empty()) {
        (true, _) => overlay.name,
        (false, true) => base.name,
        (false, false) if base.name == overlay.name => base.name,
        (false, false) => {
            return Err(MergeError::Conflict {
                field: "name",
                left: base.name,
                right: overlay.name,
            })
        }
    };
    let span = if base.span.is_generated() {
        overlay.span
    } else {
        base.span
    };

    let Definition {
        capabilities,
        is_abstract,
        mut imports,
        mut extends,
        mut formal_parameters,
        mut formal_type_parameters,
        mut interfaces,
        mut internal_interfaces,
        mut attributes,
        mut components,
        mut bindings,
        mut sources,
        mut controllers,
        annotations,
        decorations,
        ..
    } = base;

    imports.extend(overlay.imports);
    extends.extend(overlay.extends);
    formal_parameters.extend(overlay.formal_parameters);
    formal_type_parameters.extend(overlay.formal_type_parameters);
    interfaces.extend(overlay.interfaces);
    internal_interfaces.extend(overlay.internal_interfaces);
    attributes.extend(overlay.attributes);
    components.extend(overlay.components);
    bindings.extend(overlay.bindings);
    sources.extend(overlay.sources);
    controllers.extend(overlay.controllers);

    Ok(Definition {
        name,
        span,
        capabilities: capabilities.union(overlay.capabilities),
        is_abstract: is_abstract || overlay.is_abstract,
        imports,
        extends,
        formal_parameters,
        formal_type_parameters,
        interfaces,
        internal_interfaces,
        attributes,
        components,
        bindings,
        sources,
        controllers,
        annotations: annotations.union(&overlay.annotations),
        decorations: merge_decorations(decorations, overlay.decorations)?,
    })
}

impl Definition {
    /// Return this definition extended with `capability`.
    ///
    /// A definition that already exposes the capability is returned as is.
    pub fn upgrade(self, capability: Capability) -> Result<Definition, MergeError> {
        if self.has(capability) {
            return Ok(self);
        }
        let empty =
            Definition::with_capabilities(self.name.clone(), CapabilitySet::single(capability));
        merge_definitions(self, empty)
    }
}

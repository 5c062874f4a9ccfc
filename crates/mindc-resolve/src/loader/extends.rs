//! Inheritance between definitions
//!
//! Parents are resolved left to right through the reference resolver, so a
//! parent shared by several children (diamond) is loaded once and reused
//! from the cache. Parents are merged into each other left to right, then
//! the result is merged into the child.
//!
//! # Merge rules
//!
//! | element | rule |
//! |---------|------|
//! | imports, formal (type) parameters, extends | not inherited |
//! | interface | a child interface may not reuse an inherited name |
//! | attribute | may be overridden, keeping the inherited type |
//! | component | replaced by a child component of the same name |
//! | binding | replaced by a child binding from the same interface |
//! | source, controller | concatenated |
//!
//! An element marked `@Override` that overrides nothing is an error.
//! Identical elements reached through two parents are kept once.

use super::{rewrite, Loader};
use crate::annotation::predefined::OVERRIDE;
use crate::context::CompilationContext;
use crate::error::LoadResult;
use crate::frontend::Frontend;
use crate::reference::substitute_values;
use mindc_ast::error::{CompileError, ErrorKind};
use mindc_ast::{Annotations, CapabilitySet, DefId, Definition, DefinitionKind, Resolved, Span};
use tracing::debug;

pub struct ExtendsLoader {
    next: Box<dyn Loader>,
}

impl ExtendsLoader {
    pub fn new(next: Box<dyn Loader>) -> Self {
        Self { next }
    }
}

impl Loader for ExtendsLoader {
    fn load(&self, name: &str, fe: &Frontend, ctx: &mut CompilationContext) -> LoadResult<DefId> {
        let id = self.next.load(name, fe, ctx)?;
        let def = ctx.get(id);
        if def.decorations.extends_merged {
            return Ok(id);
        }
        if def.extends.is_empty() {
            ctx.get_mut(id).decorations.extends_merged = true;
            return Ok(id);
        }

        rewrite(id, ctx, |def, ctx| {
            let kind = def.kind();
            let mut parents = Vec::new();
            for reference in &mut def.extends {
                let Some(mut parent) = fe.resolve(reference, Some(id), ctx)? else {
                    continue;
                };
                if let Some(substituted) = substitute_values(reference, parent, true, fe, ctx)? {
                    parent = substituted;
                    reference.resolved = Some(Resolved::new(ctx.get(parent).name.clone(), parent));
                }

                let parent_kind = ctx.get(parent).kind();
                if let Some(reason) = kind_violation(kind, parent_kind) {
                    ctx.errors.log(CompileError::new(
                        ErrorKind::InvalidExtends,
                        reference.span,
                        format!("'{}' cannot extend '{}': {}", def.name, reference.name, reason),
                    ))?;
                    continue;
                }
                parents.push(parent);
            }

            let mut inherited: Option<Definition> = None;
            for parent in parents {
                let parent = not_inherited_removed(ctx.get(parent));
                inherited = Some(match inherited {
                    None => parent,
                    Some(acc) => inherit(parent, acc, false, ctx)?,
                });
            }

            if let Some(inherited) = inherited {
                debug!(name = %def.name, parent = %inherited.name, "merging inherited elements");
                let own = std::mem::replace(
                    def,
                    Definition::with_capabilities("", CapabilitySet::empty()),
                );
                *def = inherit(own, inherited, true, ctx)?;
            }
            def.decorations.extends_merged = true;
            Ok(())
        })?;
        Ok(id)
    }
}

fn kind_violation(child: DefinitionKind, parent: DefinitionKind) -> Option<&'static str> {
    match (child, parent) {
        (DefinitionKind::Type, DefinitionKind::Primitive) => Some("a type cannot extend a primitive"),
        (DefinitionKind::Type, DefinitionKind::Composite) => Some("a type cannot extend a composite"),
        (DefinitionKind::Primitive, DefinitionKind::Composite) => {
            Some("a primitive cannot extend a composite")
        }
        (DefinitionKind::Composite, DefinitionKind::Primitive) => {
            Some("a composite cannot extend a primitive")
        }
        _ => None,
    }
}

/// Copy of `parent` without the elements a child never inherits.
fn not_inherited_removed(parent: &Definition) -> Definition {
    let mut parent = parent.clone();
    parent.imports.clear();
    parent.formal_parameters.clear();
    parent.formal_type_parameters.clear();
    parent.extends.clear();
    parent.annotations = parent.annotations.inherited();
    parent
}

fn marked_override(annotations: &Annotations) -> bool {
    annotations.has(OVERRIDE)
}

fn override_nothing(kind: &str, name: &str, span: Span) -> CompileError {
    CompileError::new(
        ErrorKind::InvalidOverride,
        span,
        format!("{} '{}' is marked @Override but overrides nothing", kind, name),
    )
}

/// Merge `parent` into `child`; the child wins where both define an element.
///
/// `check_override` enables the `@Override` check, which only applies to
/// the real child, not to parents merged into each other.
fn inherit(
    child: Definition,
    parent: Definition,
    check_override: bool,
    ctx: &mut CompilationContext,
) -> LoadResult<Definition> {
    let mut out = child;
    out.capabilities = out.capabilities.union(parent.capabilities);

    // Interfaces
    if check_override {
        for own in &out.interfaces {
            if marked_override(&own.annotations)
                && parent.interfaces.iter().all(|i| i.name != own.name)
            {
                ctx.errors.log(override_nothing("interface", &own.name, own.span))?;
            }
        }
    }
    let mut interfaces = Vec::new();
    for itf in parent.interfaces {
        match out.interface(&itf.name) {
            Some(own) if *own == itf => {}
            Some(own) => {
                ctx.errors.log(
                    CompileError::new(
                        ErrorKind::InvalidOverride,
                        own.span,
                        format!("interface '{}' overrides an inherited interface", own.name),
                    )
                    .with_label(itf.span, "inherited interface declared here".into()),
                )?;
            }
            None => interfaces.push(itf),
        }
    }
    interfaces.append(&mut out.interfaces);
    out.interfaces = interfaces;

    let mut internal = Vec::new();
    for itf in parent.internal_interfaces {
        if out.internal_interface(&itf.name).is_none() {
            internal.push(itf);
        }
    }
    internal.append(&mut out.internal_interfaces);
    out.internal_interfaces = internal;

    // Attributes
    if check_override {
        for own in &out.attributes {
            if marked_override(&own.annotations)
                && !parent.attributes.iter().any(|a| a.name == own.name)
            {
                ctx.errors.log(override_nothing("attribute", &own.name, own.span))?;
            }
        }
    }
    let mut attributes = Vec::new();
    for attr in parent.attributes {
        match out.attribute(&attr.name) {
            Some(own) if own.type_name != attr.type_name => {
                ctx.errors.log(
                    CompileError::new(
                        ErrorKind::InvalidOverride,
                        own.span,
                        format!(
                            "attribute '{}' changes the inherited type '{}' to '{}'",
                            own.name, attr.type_name, own.type_name
                        ),
                    )
                    .with_label(attr.span, "inherited attribute declared here".into()),
                )?;
            }
            Some(_) => {}
            None => attributes.push(attr),
        }
    }
    attributes.append(&mut out.attributes);
    out.attributes = attributes;

    // Components
    if check_override {
        for own in &out.components {
            if marked_override(&own.annotations)
                && !parent.components.iter().any(|c| c.name == own.name)
            {
                ctx.errors.log(override_nothing("sub-component", &own.name, own.span))?;
            }
        }
    }
    let mut components: Vec<_> = parent
        .components
        .into_iter()
        .filter(|c| out.component(&c.name).is_none())
        .collect();
    components.append(&mut out.components);
    out.components = components;

    // Bindings, matched on the client end
    let same_from = |a: &mindc_ast::Binding, b: &mindc_ast::Binding| {
        a.from.component == b.from.component && a.from.interface == b.from.interface
    };
    if check_override {
        for own in &out.bindings {
            if marked_override(&own.annotations)
                && !parent.bindings.iter().any(|b| same_from(b, own))
            {
                ctx.errors.log(override_nothing("binding", &own.from.to_string(), own.span))?;
            }
        }
    }
    let mut bindings: Vec<_> = parent
        .bindings
        .into_iter()
        .filter(|b| !out.bindings.iter().any(|own| same_from(b, own)))
        .collect();
    bindings.append(&mut out.bindings);
    out.bindings = bindings;

    // Sources and controllers
    if check_override {
        for own in &out.sources {
            if marked_override(&own.annotations)
                && !parent.sources.iter().any(|s| s.path == own.path)
            {
                ctx.errors.log(override_nothing("source", &own.path, own.span))?;
            }
        }
    }
    let mut sources: Vec<_> = parent
        .sources
        .into_iter()
        .filter(|s| !out.sources.iter().any(|own| own.path == s.path))
        .collect();
    sources.append(&mut out.sources);
    out.sources = sources;

    let mut controllers: Vec<_> = parent
        .controllers
        .into_iter()
        .filter(|c| !out.controllers.contains(c))
        .collect();
    controllers.append(&mut out.controllers);
    out.controllers = controllers;

    out.annotations = out.annotations.union(&parent.annotations);
    for implementation in parent.decorations.shared_implementations {
        if !out.decorations.shared_implementations.contains(&implementation) {
            out.decorations.shared_implementations.push(implementation);
        }
    }
    Ok(out)
}

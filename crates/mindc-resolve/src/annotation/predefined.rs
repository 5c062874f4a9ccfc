//! Annotations understood by every compilation
//!
//! | Annotation | Phases | Effect |
//! |------------|--------|--------|
//! | `@Override` | none | marks an element that replaces an inherited one |
//! | `@Singleton` | checking, sub-component, template | at most one instance per program |
//! | `@LifeCycleController` | extends, sub-component | adds the life-cycle controller |
//! | `@AttributeController(allowNoAttr)` | extends | adds the attribute controller |
//! | `@BindingController(allowNoRequiredItf)` | extends | adds the binding controller |
//! | `@ContentController` | extends | adds the content controller (composites) |
//! | `@Cloneable` | extends | adds the factory and allocator interfaces |
//! | `@DumpAST` | checking | logs the loaded definition |
//!
//! Controller annotations and `@Singleton` are inherited through extends.

use super::processor::AnnotationProcessor;
use super::registry::{AnnotationDescriptor, AnnotationRegistry};
use crate::context::CompilationContext;
use crate::error::LoadResult;
use crate::frontend::Frontend;
use crate::membrane::controllers::*;
use mindc_ast::error::{CompileError, ErrorKind};
use mindc_ast::{
    Annotation, AnnotationNode, AnnotationTarget, AnnotationValue, Capability, Controller,
    Definition, Interface, LoaderPhase, NodePath, PhaseSet, TargetSet,
};
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

pub const OVERRIDE: &str = "Override";
pub const SINGLETON: &str = "Singleton";
pub const LIFE_CYCLE_CONTROLLER: &str = "LifeCycleController";
pub const ATTRIBUTE_CONTROLLER: &str = "AttributeController";
pub const BINDING_CONTROLLER: &str = "BindingController";
pub const CONTENT_CONTROLLER: &str = "ContentController";
pub const CLONEABLE: &str = "Cloneable";
pub const DUMP_AST: &str = "DumpAST";

fn definition_only() -> TargetSet {
    TargetSet::single(AnnotationTarget::Definition)
}

fn controller_phases() -> PhaseSet {
    PhaseSet::single(LoaderPhase::AfterExtends)
}

#[derive(Debug)]
pub struct Override;

#[derive(Debug)]
pub struct Singleton;

#[derive(Debug)]
pub struct LifeCycleController;

#[derive(Debug)]
pub struct AttributeController {
    pub allow_no_attr: bool,
}

#[derive(Debug)]
pub struct BindingController {
    pub allow_no_required_itf: bool,
}

#[derive(Debug)]
pub struct ContentController;

#[derive(Debug)]
pub struct Cloneable;

#[derive(Debug)]
pub struct DumpAst;

impl Annotation for Override {
    fn kind(&self) -> &'static str {
        OVERRIDE
    }

    fn targets(&self) -> TargetSet {
        [
            AnnotationTarget::Interface,
            AnnotationTarget::Attribute,
            AnnotationTarget::Source,
            AnnotationTarget::Component,
            AnnotationTarget::Binding,
        ]
        .into_iter()
        .collect()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Annotation for Singleton {
    fn kind(&self) -> &'static str {
        SINGLETON
    }

    fn targets(&self) -> TargetSet {
        definition_only()
    }

    fn phases(&self) -> PhaseSet {
        [
            LoaderPhase::AfterChecking,
            LoaderPhase::OnSubComponent,
            LoaderPhase::AfterTemplateInstantiate,
            LoaderPhase::OnTemplateSubComponent,
        ]
        .into_iter()
        .collect()
    }

    fn is_inherited(&self) -> bool {
        true
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Annotation for LifeCycleController {
    fn kind(&self) -> &'static str {
        LIFE_CYCLE_CONTROLLER
    }

    fn targets(&self) -> TargetSet {
        definition_only()
    }

    fn phases(&self) -> PhaseSet {
        controller_phases().with(LoaderPhase::OnSubComponent)
    }

    fn is_inherited(&self) -> bool {
        true
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

macro_rules! controller_annotation {
    ($ty:ty, $kind:expr) => {
        impl Annotation for $ty {
            fn kind(&self) -> &'static str {
                $kind
            }

            fn targets(&self) -> TargetSet {
                definition_only()
            }

            fn phases(&self) -> PhaseSet {
                controller_phases()
            }

            fn is_inherited(&self) -> bool {
                true
            }

            fn as_any(&self) -> &dyn Any {
                self
            }
        }
    };
}

controller_annotation!(AttributeController, ATTRIBUTE_CONTROLLER);
controller_annotation!(BindingController, BINDING_CONTROLLER);
controller_annotation!(ContentController, CONTENT_CONTROLLER);
controller_annotation!(Cloneable, CLONEABLE);

impl Annotation for DumpAst {
    fn kind(&self) -> &'static str {
        DUMP_AST
    }

    fn targets(&self) -> TargetSet {
        definition_only()
    }

    fn phases(&self) -> PhaseSet {
        PhaseSet::single(LoaderPhase::AfterChecking)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Register every predefined annotation in `registry`.
pub fn register_all(registry: &mut AnnotationRegistry) {
    let controllers: Arc<dyn AnnotationProcessor> = Arc::new(ControllerProcessor);

    registry.register(AnnotationDescriptor::new(OVERRIDE, |_| Ok(Arc::new(Override))));
    registry.register(
        AnnotationDescriptor::new(SINGLETON, |_| Ok(Arc::new(Singleton)))
            .processor(Arc::new(SingletonProcessor)),
    );
    registry.register(
        AnnotationDescriptor::new(LIFE_CYCLE_CONTROLLER, |_| Ok(Arc::new(LifeCycleController)))
            .processor(Arc::clone(&controllers)),
    );
    registry.register(
        AnnotationDescriptor::new(ATTRIBUTE_CONTROLLER, |args| {
            Ok(Arc::new(AttributeController {
                allow_no_attr: args.bool("allowNoAttr")?,
            }))
        })
        .parameter("allowNoAttr", Some(AnnotationValue::Bool(false)))
        .processor(Arc::clone(&controllers)),
    );
    registry.register(
        AnnotationDescriptor::new(BINDING_CONTROLLER, |args| {
            Ok(Arc::new(BindingController {
                allow_no_required_itf: args.bool("allowNoRequiredItf")?,
            }))
        })
        .parameter("allowNoRequiredItf", Some(AnnotationValue::Bool(false)))
        .processor(Arc::clone(&controllers)),
    );
    registry.register(
        AnnotationDescriptor::new(CONTENT_CONTROLLER, |_| Ok(Arc::new(ContentController)))
            .processor(Arc::clone(&controllers)),
    );
    registry.register(
        AnnotationDescriptor::new(CLONEABLE, |_| Ok(Arc::new(Cloneable))).processor(controllers),
    );
    registry.register(
        AnnotationDescriptor::new(DUMP_AST, |_| Ok(Arc::new(DumpAst)))
            .processor(Arc::new(DumpAstProcessor)),
    );
}

/// Whether `def` is a singleton, either decorated or annotated.
pub fn is_singleton(def: &Definition) -> bool {
    def.decorations.singleton || def.annotations.has(SINGLETON)
}

struct SingletonProcessor;

impl SingletonProcessor {
    /// Two sub-components instantiating the same singleton definition.
    fn check_duplicates(&self, def: &Definition, ctx: &mut CompilationContext) -> LoadResult<()> {
        let mut first_use: HashMap<String, String> = HashMap::new();
        let mut problems = Vec::new();
        for (comp, sub) in def.resolved_components() {
            let sub_def = ctx.get(sub);
            if !is_singleton(sub_def) {
                continue;
            }
            match first_use.get(&sub_def.name) {
                Some(first) => problems.push(CompileError::new(
                    ErrorKind::InvalidSingleton,
                    comp.span,
                    format!(
                        "sub-component '{}' instantiates singleton '{}' already instantiated by '{}'",
                        comp.name, sub_def.name, first
                    ),
                )),
                None => {
                    first_use.insert(sub_def.name.clone(), comp.name.clone());
                }
            }
        }
        for problem in problems {
            ctx.errors.log(problem)?;
        }
        Ok(())
    }
}

impl AnnotationProcessor for SingletonProcessor {
    fn process(
        &self,
        _annotation: &dyn Annotation,
        node: NodePath,
        definition: &Definition,
        phase: LoaderPhase,
        _fe: &Frontend,
        ctx: &mut CompilationContext,
    ) -> LoadResult<Option<Definition>> {
        match phase {
            LoaderPhase::AfterChecking | LoaderPhase::AfterTemplateInstantiate => {
                self.check_duplicates(definition, ctx)?;
                if definition.decorations.singleton {
                    return Ok(None);
                }
                let mut def = definition.clone();
                def.decorations.singleton = true;
                Ok(Some(def))
            }
            LoaderPhase::OnSubComponent | LoaderPhase::OnTemplateSubComponent => {
                if definition.annotations.has(SINGLETON) {
                    return Ok(None);
                }
                if phase == LoaderPhase::OnSubComponent {
                    let name = definition.node_name(node).unwrap_or_default();
                    let span = match node {
                        NodePath::Component(idx) => definition.components[idx].span,
                        _ => definition.span,
                    };
                    ctx.errors.warn(CompileError::warning(
                        ErrorKind::InvalidSingleton,
                        span,
                        format!(
                            "sub-component '{}' is a singleton, so '{}' becomes a singleton too",
                            name, definition.name
                        ),
                    ));
                }
                let mut def = definition.clone();
                def.annotations
                    .attach(AnnotationNode::new(SINGLETON), Arc::new(Singleton));
                Ok(Some(def))
            }
            _ => Ok(None),
        }
    }
}

struct ControllerProcessor;

impl ControllerProcessor {
    fn reject(
        &self,
        definition: &Definition,
        kind: &str,
        reason: &str,
        ctx: &mut CompilationContext,
    ) -> LoadResult<Option<Definition>> {
        ctx.errors.log(CompileError::new(
            ErrorKind::InvalidAnnotation,
            definition.span,
            format!("'@{}' on '{}': {}", kind, definition.name, reason),
        ))?;
        Ok(None)
    }

    fn cloneable(&self, definition: &Definition) -> LoadResult<Definition> {
        let mut def = definition.clone().upgrade(Capability::InterfaceContainer)?;
        if def.interface(FACTORY_INTERFACE).is_none() {
            let mut factory = Interface::server(FACTORY_INTERFACE, FACTORY_SIGNATURE);
            factory.controller_interface = true;
            def.interfaces.push(factory);
        }
        if def.interface(ALLOCATOR_INTERFACE).is_none() {
            let mut allocator = Interface::client(ALLOCATOR_INTERFACE, ALLOCATOR_SIGNATURE);
            allocator.controller_interface = true;
            def.interfaces.push(allocator);
        }
        let mut def = def.upgrade(Capability::ControllerContainer)?;
        if !def.controllers.iter().any(|c| c.covers(FACTORY_INTERFACE)) {
            def.controllers.push(
                Controller::new(CLONEABLE_CONTROLLER)
                    .external(FACTORY_INTERFACE)
                    .external(ALLOCATOR_INTERFACE),
            );
        }
        Ok(def)
    }
}

impl AnnotationProcessor for ControllerProcessor {
    fn process(
        &self,
        annotation: &dyn Annotation,
        node: NodePath,
        definition: &Definition,
        phase: LoaderPhase,
        _fe: &Frontend,
        ctx: &mut CompilationContext,
    ) -> LoadResult<Option<Definition>> {
        let any = annotation.as_any();
        if any.is::<LifeCycleController>() {
            let mut def = definition.clone();
            if let (LoaderPhase::OnSubComponent, NodePath::Component(idx)) = (phase, node) {
                def.components[idx].has_lifecycle_controller = true;
            }
            let def = add_controller_interface(
                def,
                LIFE_CYCLE_INTERFACE,
                LIFE_CYCLE_SIGNATURE,
                LIFE_CYCLE_CONTROLLER,
                Some(LIFE_CYCLE_DELEGATE),
            )?;
            return Ok(Some(def));
        }

        if let Some(controller) = any.downcast_ref::<AttributeController>() {
            if !controller.allow_no_attr && definition.attributes.is_empty() {
                let reason = "the definition has no attribute";
                return self.reject(definition, ATTRIBUTE_CONTROLLER, reason, ctx);
            }
            let def = add_controller_interface(
                definition.clone(),
                ATTRIBUTE_INTERFACE,
                ATTRIBUTE_SIGNATURE,
                ATTRIBUTE_CONTROLLER,
                Some(ATTRIBUTE_DELEGATE),
            )?;
            return Ok(Some(def));
        }

        if let Some(controller) = any.downcast_ref::<BindingController>() {
            let has_client = definition.interfaces.iter().any(Interface::is_client);
            if !controller.allow_no_required_itf && !has_client {
                return self.reject(
                    definition,
                    BINDING_CONTROLLER,
                    "the definition has no client interface",
                    ctx,
                );
            }
            let def = add_controller_interface(
                definition.clone(),
                BINDING_INTERFACE,
                BINDING_SIGNATURE,
                BINDING_CONTROLLER,
                None,
            )?;
            return Ok(Some(def));
        }

        if any.is::<ContentController>() {
            if !definition.is_composite() {
                let reason = "only composites have a content";
                return self.reject(definition, CONTENT_CONTROLLER, reason, ctx);
            }
            let def = add_controller_interface(
                definition.clone(),
                CONTENT_INTERFACE,
                CONTENT_SIGNATURE,
                CONTENT_CONTROLLER,
                None,
            )?;
            return Ok(Some(def));
        }

        if any.is::<Cloneable>() {
            return self.cloneable(definition).map(Some);
        }
        Ok(None)
    }
}

struct DumpAstProcessor;

impl AnnotationProcessor for DumpAstProcessor {
    fn process(
        &self,
        _annotation: &dyn Annotation,
        _node: NodePath,
        definition: &Definition,
        _phase: LoaderPhase,
        _fe: &Frontend,
        _ctx: &mut CompilationContext,
    ) -> LoadResult<Option<Definition>> {
        info!(definition = %definition.name, "\n{}", definition.pretty());
        Ok(None)
    }
}

//! Run annotation processors at loader phases.

use crate::context::CompilationContext;
use crate::error::{InternalError, LoadResult};
use crate::frontend::Frontend;
use crate::loader::Loader;
use mindc_ast::{Annotation, DefId, Definition, LoaderPhase, NodePath};
use std::sync::Arc;
use tracing::trace;

/// Behavior attached to an annotation kind.
pub trait AnnotationProcessor: Send + Sync {
    /// Process `annotation`, found at `node` of `definition`, during `phase`.
    ///
    /// For the sub-component phases, `annotation` decorates the definition
    /// of the sub-component at `node` and `definition` is the composite (or
    /// template instance) containing it.
    ///
    /// Returns the replacement definition, if any.
    fn process(
        &self,
        annotation: &dyn Annotation,
        node: NodePath,
        definition: &Definition,
        phase: LoaderPhase,
        fe: &Frontend,
        ctx: &mut CompilationContext,
    ) -> LoadResult<Option<Definition>>;
}

fn run(
    annotation: &Arc<dyn Annotation>,
    node: NodePath,
    definition: Definition,
    phase: LoaderPhase,
    fe: &Frontend,
    ctx: &mut CompilationContext,
) -> LoadResult<Definition> {
    let Some(processor) = fe.annotations().processor(annotation.kind()) else {
        return Err(InternalError::MissingProcessor(annotation.kind().to_string()).into());
    };
    trace!(
        definition = %definition.name,
        annotation = annotation.kind(),
        %node,
        phase = phase.name(),
        "processing annotation"
    );
    let replacement = processor.process(annotation.as_ref(), node, &definition, phase, fe, ctx)?;
    Ok(replacement.unwrap_or(definition))
}

/// Process the annotations of every element of `definition` declaring `phase`.
///
/// Elements are visited in [`Definition::node_paths`] order as of the start
/// of the walk; elements added by a processor are not visited.
pub fn process_definition(
    mut definition: Definition,
    phase: LoaderPhase,
    fe: &Frontend,
    ctx: &mut CompilationContext,
) -> LoadResult<Definition> {
    for path in definition.node_paths() {
        let typed: Vec<Arc<dyn Annotation>> = definition
            .annotations_at(path)
            .map(|a| a.typed().to_vec())
            .unwrap_or_default();
        for annotation in typed.iter().filter(|a| a.phases().contains(phase)) {
            definition = run(annotation, path, definition, phase, fe, ctx)?;
        }
    }
    Ok(definition)
}

/// Process the definition-level annotations of the sub-components at
/// `components` (indices into `definition.components`) declaring `phase`.
pub fn process_sub_components(
    mut definition: Definition,
    components: &[usize],
    phase: LoaderPhase,
    fe: &Frontend,
    ctx: &mut CompilationContext,
) -> LoadResult<Definition> {
    for &idx in components {
        let Some(sub) = definition.components.get(idx).and_then(|c| c.resolved_id()) else {
            continue;
        };
        let typed = ctx.get(sub).annotations.typed().to_vec();
        for annotation in typed.iter().filter(|a| a.phases().contains(phase)) {
            definition = run(annotation, NodePath::Component(idx), definition, phase, fe, ctx)?;
        }
    }
    Ok(definition)
}

fn has_phase(definition: &Definition, phase: LoaderPhase) -> bool {
    definition.node_paths().into_iter().any(|path| {
        definition
            .annotations_at(path)
            .is_some_and(|a| a.typed().iter().any(|t| t.phases().contains(phase)))
    })
}

/// Runs the processors declaring `phase` on the loaded definition.
pub struct AnnotationProcessorLoader {
    next: Box<dyn Loader>,
    phase: LoaderPhase,
}

impl AnnotationProcessorLoader {
    pub fn new(next: Box<dyn Loader>, phase: LoaderPhase) -> Self {
        Self { next, phase }
    }
}

impl Loader for AnnotationProcessorLoader {
    fn load(&self, name: &str, fe: &Frontend, ctx: &mut CompilationContext) -> LoadResult<DefId> {
        let id = self.next.load(name, fe, ctx)?;
        if !has_phase(ctx.get(id), self.phase) {
            return Ok(id);
        }
        let processed = process_definition(ctx.get(id).clone(), self.phase, fe, ctx)?;
        ctx.replace(id, processed);
        Ok(id)
    }
}

/// Runs the [`LoaderPhase::OnSubComponent`] processors of each resolved
/// sub-component's definition against the composite.
pub struct SubComponentAnnotationLoader {
    next: Box<dyn Loader>,
}

impl SubComponentAnnotationLoader {
    pub fn new(next: Box<dyn Loader>) -> Self {
        Self { next }
    }
}

impl Loader for SubComponentAnnotationLoader {
    fn load(&self, name: &str, fe: &Frontend, ctx: &mut CompilationContext) -> LoadResult<DefId> {
        let id = self.next.load(name, fe, ctx)?;
        let components: Vec<usize> = ctx
            .get(id)
            .components
            .iter()
            .enumerate()
            .filter(|(_, comp)| {
                comp.resolved_id().is_some_and(|sub| {
                    ctx.get(sub)
                        .annotations
                        .typed()
                        .iter()
                        .any(|a| a.phases().contains(LoaderPhase::OnSubComponent))
                })
            })
            .map(|(idx, _)| idx)
            .collect();
        if components.is_empty() {
            return Ok(id);
        }
        let processed = process_sub_components(
            ctx.get(id).clone(),
            &components,
            LoaderPhase::OnSubComponent,
            fe,
            ctx,
        )?;
        ctx.replace(id, processed);
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::{AnnotationDescriptor, AnnotationRegistry};
    use crate::error::LoadError;
    use crate::loader::SourceLoader;
    use mindc_ast::{AnnotationNode, AnnotationTarget, PhaseSet, TargetSet, Value};
    use std::any::Any;

    #[derive(Debug)]
    struct Tag;

    impl Annotation for Tag {
        fn kind(&self) -> &'static str {
            "Tag"
        }

        fn targets(&self) -> TargetSet {
            [AnnotationTarget::Definition].into_iter().collect()
        }

        fn phases(&self) -> PhaseSet {
            [LoaderPhase::AfterExtends].into_iter().collect()
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    struct TagProcessor;

    impl AnnotationProcessor for TagProcessor {
        fn process(
            &self,
            _annotation: &dyn Annotation,
            _node: NodePath,
            definition: &Definition,
            _phase: LoaderPhase,
            _fe: &Frontend,
            _ctx: &mut CompilationContext,
        ) -> LoadResult<Option<Definition>> {
            let tagged = definition
                .clone()
                .with_attribute("tagged", "int", Some(Value::Number(1)));
            Ok(Some(tagged))
        }
    }

    fn frontend(with_processor: bool) -> Frontend {
        let mut descriptor = AnnotationDescriptor::new("Tag", |_| Ok(Arc::new(Tag)));
        if with_processor {
            descriptor = descriptor.processor(Arc::new(TagProcessor));
        }
        let mut registry = AnnotationRegistry::new();
        registry.register(descriptor);
        Frontend::builder().annotations(registry).build()
    }

    fn context() -> CompilationContext {
        let mut def = Definition::primitive("demo.P");
        def.annotations.attach(AnnotationNode::new("Tag"), Arc::new(Tag));
        let mut ctx = CompilationContext::default();
        ctx.register_definition("demo.P", def);
        ctx
    }

    #[test]
    fn test_processor_runs_at_declared_phase() {
        let fe = frontend(true);
        let mut ctx = context();
        let id = AnnotationProcessorLoader::new(Box::new(SourceLoader), LoaderPhase::AfterExtends)
            .load("demo.P", &fe, &mut ctx)
            .unwrap();
        assert!(ctx.get(id).attribute("tagged").is_some());
    }

    #[test]
    fn test_other_phases_are_skipped() {
        let fe = frontend(true);
        let mut ctx = context();
        let id = AnnotationProcessorLoader::new(Box::new(SourceLoader), LoaderPhase::AfterChecking)
            .load("demo.P", &fe, &mut ctx)
            .unwrap();
        assert!(ctx.get(id).attributes.is_empty());
    }

    #[test]
    fn test_missing_processor_is_internal_error() {
        let fe = frontend(false);
        let mut ctx = context();
        let result = AnnotationProcessorLoader::new(Box::new(SourceLoader), LoaderPhase::AfterExtends)
            .load("demo.P", &fe, &mut ctx);
        assert!(matches!(
            result,
            Err(LoadError::Internal(InternalError::MissingProcessor(_)))
        ));
    }
}

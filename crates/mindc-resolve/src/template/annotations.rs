//! Run the template phases of annotation processors.

use super::{InstantiationRequest, TemplateInstantiator, TypeBinding};
use crate::annotation::{process_definition, process_sub_components};
use crate::context::CompilationContext;
use crate::error::LoadResult;
use crate::frontend::Frontend;
use mindc_ast::{Definition, LoaderPhase};

/// Outermost building layer.
///
/// Annotations of each definition bound to a placeholder are processed for
/// [`LoaderPhase::OnTemplateSubComponent`], then the annotations of the
/// instance itself for [`LoaderPhase::AfterTemplateInstantiate`].
pub struct AnnotationProcessorInstantiator {
    next: Box<dyn TemplateInstantiator>,
}

impl AnnotationProcessorInstantiator {
    pub fn new(next: Box<dyn TemplateInstantiator>) -> Self {
        Self { next }
    }
}

impl TemplateInstantiator for AnnotationProcessorInstantiator {
    fn instantiate(
        &self,
        request: &InstantiationRequest,
        name: &str,
        fe: &Frontend,
        ctx: &mut CompilationContext,
    ) -> LoadResult<Definition> {
        let instance = self.next.instantiate(request, name, fe, ctx)?;

        let bound: Vec<usize> = ctx
            .get(request.generic)
            .components
            .iter()
            .enumerate()
            .filter(|(_, comp)| {
                comp.type_parameter.as_ref().is_some_and(|param| {
                    matches!(request.bindings.get(param), Some(TypeBinding::Definition(_)))
                })
            })
            .map(|(idx, _)| idx)
            .collect();

        let instance = process_sub_components(
            instance,
            &bound,
            LoaderPhase::OnTemplateSubComponent,
            fe,
            ctx,
        )?;
        process_definition(instance, LoaderPhase::AfterTemplateInstantiate, fe, ctx)
    }
}

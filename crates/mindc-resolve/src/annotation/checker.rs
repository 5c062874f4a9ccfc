//! Bind annotation nodes to typed annotations and check their placement.

use crate::context::CompilationContext;
use crate::error::LoadResult;
use crate::frontend::Frontend;
use crate::loader::{rewrite, Loader};
use mindc_ast::error::{CompileError, ErrorKind};
use mindc_ast::DefId;
use std::collections::HashSet;

/// Builds the typed annotations of every element from its nodes.
///
/// Rejected nodes (unknown kind, bad arguments, wrong element kind, second
/// annotation of the same kind on one element) are reported and dropped.
/// Typed annotations are rebuilt from the nodes each time, so annotations
/// attached by processors survive a reload of a synthetic definition.
pub struct AnnotationCheckerLoader {
    next: Box<dyn Loader>,
}

impl AnnotationCheckerLoader {
    pub fn new(next: Box<dyn Loader>) -> Self {
        Self { next }
    }
}

impl Loader for AnnotationCheckerLoader {
    fn load(&self, name: &str, fe: &Frontend, ctx: &mut CompilationContext) -> LoadResult<DefId> {
        let id = self.next.load(name, fe, ctx)?;
        let def = ctx.get(id);
        let annotated = def
            .node_paths()
            .into_iter()
            .any(|path| def.annotations_at(path).is_some_and(|a| !a.is_empty()));
        if !annotated {
            return Ok(id);
        }

        rewrite(id, ctx, |def, ctx| {
            for path in def.node_paths() {
                let Some(annotations) = def.annotations_at(path) else {
                    continue;
                };
                let mut typed = Vec::new();
                let mut seen = HashSet::new();
                for node in &annotations.nodes {
                    let annotation = match fe.annotations().build(node) {
                        Ok(annotation) => annotation,
                        Err(err) => {
                            let error =
                                CompileError::new(ErrorKind::InvalidAnnotation, node.span, err.to_string());
                            ctx.errors.log(error)?;
                            continue;
                        }
                    };
                    let target = path.target();
                    if !annotation.targets().contains(target) {
                        ctx.errors.log(CompileError::new(
                            ErrorKind::InvalidAnnotationTarget,
                            node.span,
                            format!("annotation '@{}' cannot be applied to {}", annotation.kind(), target),
                        ))?;
                    } else if !seen.insert(annotation.kind()) {
                        ctx.errors.log(CompileError::new(
                            ErrorKind::DuplicateAnnotation,
                            node.span,
                            format!("duplicate annotation '@{}'", annotation.kind()),
                        ))?;
                    } else {
                        typed.push(annotation);
                    }
                }
                if let Some(annotations) = def.annotations_at_mut(path) {
                    annotations.set_typed(typed);
                }
            }
            Ok(())
        })?;
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::SourceLoader;
    use mindc_ast::{AnnotationNode, Definition, Interface};

    fn load(def: Definition) -> (CompilationContext, DefId) {
        let fe = Frontend::default();
        let mut ctx = CompilationContext::default();
        let name = def.name.clone();
        ctx.register_definition(name.clone(), def);
        let id = AnnotationCheckerLoader::new(Box::new(SourceLoader))
            .load(&name, &fe, &mut ctx)
            .unwrap();
        (ctx, id)
    }

    #[test]
    fn test_valid_annotations_are_typed() {
        let (ctx, id) = load(
            Definition::primitive("demo.P")
                .with_annotation(AnnotationNode::new("Singleton"))
                .with_source("p.c"),
        );
        assert!(!ctx.errors.has_errors());
        assert_eq!(ctx.get(id).annotations.typed().len(), 1);
    }

    #[test]
    fn test_rejected_annotations() {
        let mut itf = Interface::server("s", "demo.I");
        itf.annotations.push_node(AnnotationNode::new("Singleton"));
        let (ctx, id) = load(
            Definition::primitive("demo.P")
                .with_annotation(AnnotationNode::new("Unknown"))
                .with_annotation(AnnotationNode::new("DumpAST"))
                .with_annotation(AnnotationNode::new("DumpAST"))
                .with_interface(itf),
        );

        let kinds: Vec<_> = ctx.errors.errors().iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![
                ErrorKind::InvalidAnnotation,
                ErrorKind::DuplicateAnnotation,
                ErrorKind::InvalidAnnotationTarget
            ]
        );
        assert_eq!(ctx.get(id).annotations.typed().len(), 1);
        assert!(ctx.get(id).interfaces[0].annotations.typed().is_empty());
    }
}

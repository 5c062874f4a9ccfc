//! Innermost stage: produce the raw definition for a name
//!
//! Lookup order:
//!
//! 1. a definition registered in the context (template instances,
//!    substituted definitions, processor output)
//! 2. source text registered in the context, parsed with the configured parser
//! 3. the source locator, parsed with the configured parser
//!
//! Registered text that fails to parse is copied to a temporary file and the
//! diagnostic is relocated there, so the user can inspect the generated code.

use super::Loader;
use crate::context::CompilationContext;
use crate::error::{InternalError, LoadError, LoadResult};
use crate::frontend::{Frontend, LocatedSource};
use mindc_ast::error::{CompileError, ErrorKind};
use mindc_ast::{DefId, Definition, Span};
use std::io::Write;
use std::path::PathBuf;
use tracing::{debug, warn};

pub struct SourceLoader;

impl Loader for SourceLoader {
    fn load(&self, name: &str, fe: &Frontend, ctx: &mut CompilationContext) -> LoadResult<DefId> {
        if let Some(id) = ctx.registered(name) {
            debug!(name, "registered definition");
            return Ok(id);
        }

        if let Some(text) = ctx.registered_source(name).map(str::to_string) {
            let parser = fe
                .parser()
                .ok_or_else(|| InternalError::MissingParser(name.to_string()))?;
            let file_id = ctx
                .sources
                .add_file(PathBuf::from(format!("<generated {}>", name)), text.clone());
            return match parser.parse(name, &text, file_id) {
                Ok(definition) => accept(name, definition, ctx),
                Err(error) => Err(LoadError::Fatal(dump_generated(name, &text, error, ctx))),
            };
        }

        let located = fe.locator().and_then(|locator| locator.locate(name));
        match (located, fe.parser()) {
            (Some(LocatedSource { path, text }), Some(parser)) => {
                debug!(name, path = %path.display(), "parsing");
                let file_id = ctx.sources.add_file(path, text.clone());
                let definition = parser.parse(name, &text, file_id).map_err(LoadError::Fatal)?;
                accept(name, definition, ctx)
            }
            (Some(_), None) => Err(InternalError::MissingParser(name.to_string()).into()),
            (None, _) => Err(LoadError::fatal(
                ErrorKind::DefinitionNotFound,
                Span::generated(),
                format!("definition '{}' not found", name),
            )),
        }
    }
}

fn accept(name: &str, definition: Definition, ctx: &mut CompilationContext) -> LoadResult<DefId> {
    if definition.name != name {
        return Err(LoadError::fatal(
            ErrorKind::DefinitionNotFound,
            definition.span,
            format!(
                "source for '{}' defines '{}' instead",
                name, definition.name
            ),
        ));
    }
    Ok(ctx.alloc(definition))
}

/// Write the failing generated text to a temporary file and point `error` at it.
///
/// The file is removed when this returns unless `dump_generated_sources` is set.
fn dump_generated(
    name: &str,
    text: &str,
    error: CompileError,
    ctx: &mut CompilationContext,
) -> CompileError {
    let file = tempfile::Builder::new()
        .prefix("mindc-")
        .suffix(&format!(".{}", ctx.options.source_extension))
        .tempfile();
    let mut file = match file {
        Ok(file) => file,
        Err(err) => {
            warn!(name, %err, "cannot create dump file for generated source");
            return error;
        }
    };
    if let Err(err) = file.write_all(text.as_bytes()) {
        warn!(name, %err, "cannot write generated source");
        return error;
    }

    let path = file.path().to_path_buf();
    let file_id = ctx.sources.add_file(path.clone(), text.to_string());
    let mut error = error;
    error.span = error.span.relocated(file_id);

    if ctx.options.dump_generated_sources {
        match file.keep() {
            Ok(_) => error.with_note(format!("generated source kept in {}", path.display())),
            Err(err) => {
                warn!(name, %err, "cannot keep generated source");
                error
            }
        }
    } else {
        error
    }
}

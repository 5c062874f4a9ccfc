use crate::ast::error::{CompileError, DiagnosticFormatter, ErrorKind};
use crate::ast::{DefId, Definition, SourceMap, Span};
use crate::resolve::{
    CompilationContext, CompilerOptions, Frontend, LoadError, LocatedSource, SourceLocator,
};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Definitions loaded by a successful compilation.
#[derive(Debug)]
pub struct Compiled {
    /// The context holding every definition loaded along the way
    pub context: CompilationContext,
    /// Handles of the requested definitions, in request order
    pub roots: Vec<DefId>,
    /// Warnings reported while loading
    pub warnings: Vec<CompileError>,
}

impl Compiled {
    /// A loaded definition by name.
    pub fn definition(&self, name: &str) -> Option<&Definition> {
        self.context.cached(name).map(|id| self.context.get(id))
    }

    /// The requested definitions, in request order.
    pub fn roots(&self) -> impl Iterator<Item = &Definition> {
        self.roots.iter().map(|id| self.context.get(*id))
    }

    /// Every definition loaded under a name, in loading order.
    pub fn definitions(&self) -> Vec<Definition> {
        self.context
            .cached_definitions()
            .map(|(_, id)| self.context.get(id).clone())
            .collect()
    }
}

/// Outcome of a compilation together with the sources its diagnostics point into.
#[derive(Debug)]
pub struct CompileResultWithSources {
    pub result: Result<Compiled, Vec<CompileError>>,
    pub sources: SourceMap,
}

/// Loads the definitions named `names` through the front-end.
///
/// Every requested name is loaded even after a failure, so one run reports
/// every independent error it finds (unless `options.error_policy` is
/// fail-fast).
///
/// # Errors
/// Returns every error reported while loading, in report order.
pub fn compile(
    fe: &Frontend,
    names: &[&str],
    options: CompilerOptions,
) -> Result<Compiled, Vec<CompileError>> {
    run(fe, CompilationContext::new(options), names).result
}

/// Like [`compile`], after registering ADL source text for some names.
///
/// Registered text takes precedence over the front-end's source locator and
/// is parsed with its parser.
pub fn compile_with_sources<'s>(
    fe: &Frontend,
    sources: impl IntoIterator<Item = (&'s str, &'s str)>,
    names: &[&str],
    options: CompilerOptions,
) -> CompileResultWithSources {
    let mut ctx = CompilationContext::new(options);
    for (name, text) in sources {
        ctx.register_source(name, text);
    }
    run(fe, ctx, names)
}

/// Like [`compile`], after registering already built definitions.
///
/// This is how definitions produced outside a parser (tools, tests) enter
/// the pipeline; they are loaded and checked exactly like parsed ones.
pub fn compile_definitions(
    fe: &Frontend,
    definitions: impl IntoIterator<Item = Definition>,
    names: &[&str],
    options: CompilerOptions,
) -> Result<Compiled, Vec<CompileError>> {
    let mut ctx = CompilationContext::new(options);
    for definition in definitions {
        let name = definition.name.clone();
        ctx.register_definition(name, definition);
    }
    run(fe, ctx, names).result
}

fn run(fe: &Frontend, mut ctx: CompilationContext, names: &[&str]) -> CompileResultWithSources {
    let mut roots = Vec::with_capacity(names.len());
    let mut internal = Vec::new();

    for name in names {
        match fe.load(name, &mut ctx) {
            Ok(id) => roots.push(id),
            Err(LoadError::Fatal(error)) => {
                if ctx.errors.log(error).is_err() {
                    break;
                }
            }
            Err(LoadError::Aborted) => break,
            Err(LoadError::Internal(err)) => {
                internal.push(CompileError::new(
                    ErrorKind::Internal,
                    Span::generated(),
                    err.to_string(),
                ));
                break;
            }
        }
    }

    let (mut errors, warnings) = ctx.errors.drain();
    errors.extend(internal);
    let sources = ctx.sources.clone();
    if !errors.is_empty() {
        info!(errors = errors.len(), "compilation failed");
        return CompileResultWithSources {
            result: Err(errors),
            sources,
        };
    }

    info!(
        roots = roots.len(),
        definitions = ctx.definition_count(),
        "compilation finished"
    );
    CompileResultWithSources {
        result: Ok(Compiled {
            context: ctx,
            roots,
            warnings,
        }),
        sources,
    }
}

/// Serializes definitions to a MessagePack byte vector.
///
/// Resolved handles are not written; resolved names are, so a fresh context
/// can reload each target by name.
pub fn serialize_definitions(
    definitions: &[Definition],
) -> Result<Vec<u8>, rmp_serde::encode::Error> {
    rmp_serde::to_vec_named(definitions)
}

/// Deserializes definitions from a MessagePack byte slice.
pub fn deserialize_definitions(data: &[u8]) -> Result<Vec<Definition>, rmp_serde::decode::Error> {
    rmp_serde::from_slice(data)
}

/// Formats compilation errors with source context.
pub fn format_errors(errors: &[CompileError], source_map: &SourceMap) -> String {
    let formatter = DiagnosticFormatter::new(source_map);
    formatter.format_all(errors)
}

/// Source locator over directory trees of ADL files.
///
/// `a/b/C.adl` under a root holds the definition `a.b.C`. When two roots
/// provide the same name, the first root wins.
#[derive(Debug, Clone, Default)]
pub struct FsSourceLocator {
    files: BTreeMap<String, PathBuf>,
}

impl FsSourceLocator {
    /// Index every file with `extension` under `roots`.
    pub fn scan<P: AsRef<Path>>(
        roots: impl IntoIterator<Item = P>,
        extension: &str,
    ) -> Result<Self, walkdir::Error> {
        let mut files = BTreeMap::new();
        for root in roots {
            let root = root.as_ref();
            for entry in WalkDir::new(root).sort_by_file_name() {
                let entry = entry?;
                let path = entry.path();
                if !entry.file_type().is_file()
                    || path.extension().map_or(true, |ext| ext != extension)
                {
                    continue;
                }
                let Some(name) = path.strip_prefix(root).ok().and_then(definition_name) else {
                    warn!(path = %path.display(), "skipping file with an invalid definition name");
                    continue;
                };
                files.entry(name).or_insert_with(|| path.to_path_buf());
            }
        }
        debug!(files = files.len(), "indexed source roots");
        Ok(Self { files })
    }

    /// Every definition name found, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// `a/b/C.adl` → `a.b.C`
fn definition_name(relative: &Path) -> Option<String> {
    let stem = relative.with_extension("");
    let parts: Option<Vec<&str>> = stem.components().map(|c| c.as_os_str().to_str()).collect();
    let parts = parts?;
    if parts.is_empty() || parts.iter().any(|p| p.is_empty() || p.contains('.')) {
        return None;
    }
    Some(parts.join("."))
}

impl SourceLocator for FsSourceLocator {
    fn locate(&self, name: &str) -> Option<LocatedSource> {
        let path = self.files.get(name)?;
        match std::fs::read_to_string(path) {
            Ok(text) => Some(LocatedSource {
                path: path.clone(),
                text,
            }),
            Err(err) => {
                warn!(path = %path.display(), %err, "failed to read source");
                None
            }
        }
    }

    fn exists(&self, name: &str) -> bool {
        self.files.contains_key(name)
    }
}

#[cfg(test)]
mod tests;

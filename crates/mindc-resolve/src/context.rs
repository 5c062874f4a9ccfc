//! Per-compilation state
//!
//! A [`CompilationContext`] owns everything one compilation produces or
//! memoizes: the definition arena, the name cache, the set of names being
//! loaded (cycle detection), synthetic definitions and sources registered
//! for re-entry, reference and instantiation caches, inferred parameter
//! types, the source map and the error manager.
//!
//! Nothing here is global. Two contexts never share definitions.
//!
//! # Arena
//!
//! Definitions live in a `Vec` indexed by [`DefId`]. Stages that rewrite a
//! definition store the result back into the same slot with
//! [`replace`](CompilationContext::replace), so every holder of the handle
//! sees the new content.

use crate::error_manager::ErrorManager;
use crate::options::CompilerOptions;
use indexmap::{IndexMap, IndexSet};
use mindc_ast::{DefId, Definition, ParameterType, Resolved, SourceMap};
use std::collections::HashMap;
use tracing::trace;

/// State of one compilation.
#[derive(Debug)]
pub struct CompilationContext {
    pub options: CompilerOptions,
    pub errors: ErrorManager,
    pub sources: SourceMap,
    arena: Vec<Definition>,
    cache: IndexMap<String, DefId>,
    loading: IndexSet<String>,
    registered: HashMap<String, DefId>,
    registered_sources: HashMap<String, String>,
    references: HashMap<String, DefId>,
    inferred_types: HashMap<String, IndexMap<String, ParameterType>>,
}

impl Default for CompilationContext {
    fn default() -> Self {
        Self::new(CompilerOptions::default())
    }
}

impl CompilationContext {
    pub fn new(options: CompilerOptions) -> Self {
        Self {
            errors: ErrorManager::new(options.error_policy),
            options,
            sources: SourceMap::new(),
            arena: Vec::new(),
            cache: IndexMap::new(),
            loading: IndexSet::new(),
            registered: HashMap::new(),
            registered_sources: HashMap::new(),
            references: HashMap::new(),
            inferred_types: HashMap::new(),
        }
    }

    // -- arena ------------------------------------------------------------

    /// Store a definition and return its handle.
    pub fn alloc(&mut self, definition: Definition) -> DefId {
        let id = DefId::new(self.arena.len() as u32);
        trace!(%id, name = %definition.name, "alloc");
        self.arena.push(definition);
        id
    }

    /// Definition behind `id`.
    ///
    /// Handles are only produced by this context, so the slot always exists.
    pub fn get(&self, id: DefId) -> &Definition {
        &self.arena[id.index()]
    }

    /// Mutable definition behind `id`.
    pub fn get_mut(&mut self, id: DefId) -> &mut Definition {
        &mut self.arena[id.index()]
    }

    /// Replace the definition behind `id`; every holder observes the change.
    pub fn replace(&mut self, id: DefId, definition: Definition) {
        self.arena[id.index()] = definition;
    }

    /// Number of definitions allocated so far.
    pub fn definition_count(&self) -> usize {
        self.arena.len()
    }

    /// Target of a resolved decoration: the handle if valid here, else the
    /// definition cached under its name (decorations read back from a bundle).
    pub fn resolved_definition(&self, resolved: &Resolved) -> Option<DefId> {
        resolved
            .id
            .filter(|id| id.index() < self.arena.len() && self.get(*id).name == resolved.name)
            .or_else(|| self.cached(&resolved.name))
    }

    // -- name cache -------------------------------------------------------

    /// Fully loaded definition named `name`.
    pub fn cached(&self, name: &str) -> Option<DefId> {
        self.cache.get(name).copied()
    }

    pub(crate) fn cache_insert(&mut self, name: impl Into<String>, id: DefId) {
        self.cache.insert(name.into(), id);
    }

    /// Fully loaded definitions in load-completion order.
    pub fn cached_definitions(&self) -> impl Iterator<Item = (&str, DefId)> {
        self.cache.iter().map(|(name, id)| (name.as_str(), *id))
    }

    /// Whether anything is known under `name` without loading it.
    pub fn is_known(&self, name: &str) -> bool {
        self.cache.contains_key(name)
            || self.registered.contains_key(name)
            || self.registered_sources.contains_key(name)
    }

    // -- cycle detection --------------------------------------------------

    /// Mark `name` as being loaded. Returns `false` if it already is.
    pub(crate) fn begin_loading(&mut self, name: &str) -> bool {
        self.loading.insert(name.to_string())
    }

    pub(crate) fn end_loading(&mut self, name: &str) {
        self.loading.shift_remove(name);
    }

    /// Names currently being loaded, outermost first.
    pub fn loading_stack(&self) -> impl Iterator<Item = &str> {
        self.loading.iter().map(String::as_str)
    }

    pub fn loading_depth(&self) -> usize {
        self.loading.len()
    }

    // -- synthetic definitions --------------------------------------------

    /// Register an in-memory definition to be loaded through the pipeline
    /// under `name`.
    pub fn register_definition(&mut self, name: impl Into<String>, definition: Definition) -> DefId {
        let id = self.alloc(definition);
        self.registered.insert(name.into(), id);
        id
    }

    /// Handle of a registered, not yet loaded definition.
    pub fn registered(&self, name: &str) -> Option<DefId> {
        self.registered.get(name).copied()
    }

    /// Register generated source text to be parsed when `name` is loaded.
    pub fn register_source(&mut self, name: impl Into<String>, text: impl Into<String>) {
        self.registered_sources.insert(name.into(), text.into());
    }

    pub fn registered_source(&self, name: &str) -> Option<&str> {
        self.registered_sources.get(name).map(String::as_str)
    }

    // -- reference cache --------------------------------------------------

    pub(crate) fn cached_reference(&self, key: &str) -> Option<DefId> {
        self.references.get(key).copied()
    }

    pub(crate) fn cache_reference(&mut self, key: String, id: DefId) {
        self.references.insert(key, id);
    }

    // -- inferred parameter types -----------------------------------------

    /// Type inferred so far for formal parameter `param` of `definition`.
    pub fn inferred_type(&self, definition: &str, param: &str) -> Option<ParameterType> {
        self.inferred_types
            .get(definition)
            .and_then(|table| table.get(param))
            .copied()
    }

    /// Record the type of `param`; returns the previously inferred type if any.
    pub fn infer_type(
        &mut self,
        definition: &str,
        param: &str,
        ty: ParameterType,
    ) -> Option<ParameterType> {
        let table = self.inferred_types.entry(definition.to_string()).or_default();
        match table.get(param) {
            Some(existing) => Some(*existing),
            None => {
                table.insert(param.to_string(), ty);
                None
            }
        }
    }
}

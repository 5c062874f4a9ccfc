//! Source locations for diagnostics
//!
//! ADL definitions come from three places: files found by a source locator,
//! source text registered in memory by annotation processors or template
//! expansion, and ASTs built directly in code. Only the first two have text
//! to point into, so a [`Span`] may also be *generated* (no backing file).
//!
//! # Examples
//!
//! ```
//! # use mindc_ast::foundation::span::*;
//! # use std::path::PathBuf;
//! let mut map = SourceMap::new();
//! let file_id = map.add_file(PathBuf::from("demo/Top.adl"), "composite demo.Top {\n}\n".to_string());
//! let span = Span::new(file_id, 10, 18, 1);
//!
//! assert_eq!(map.snippet(&span), Some("demo.Top"));
//! assert_eq!(map.line_col(&span), Some((1, 11)));
//! assert!(map.file(&Span::generated()).is_none());
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File id used by spans that do not point into any source file.
const GENERATED_FILE: u16 = u16::MAX;

/// Compact source location reference.
///
/// Points to a byte range in a source file with cached line number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    /// Index into `SourceMap` files, or `u16::MAX` for generated nodes
    pub file_id: u16,
    /// Byte offset of start position
    pub start: u32,
    /// Byte offset of end position (exclusive)
    pub end: u32,
    /// Cached line number (1-based) for the start position
    pub start_line: u16,
}

/// Collection of all source files seen by a compilation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceMap {
    files: Vec<SourceFile>,
}

/// A single source file with line indexing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceFile {
    /// Path of this file (may be a temporary file for regenerated sources)
    pub path: PathBuf,
    /// Original source text
    pub source: String,
    /// Byte offsets of each line start, followed by an EOF sentinel
    pub line_starts: Vec<u32>,
}

impl Span {
    /// Create a new span.
    pub fn new(file_id: u16, start: u32, end: u32, start_line: u16) -> Self {
        Self {
            file_id,
            start,
            end,
            start_line,
        }
    }

    /// Span of a node synthesized in memory, with no backing text.
    pub const fn generated() -> Self {
        Self {
            file_id: GENERATED_FILE,
            start: 0,
            end: 0,
            start_line: 0,
        }
    }

    /// Zero-length span at the start of a file.
    pub fn zero(file_id: u16) -> Self {
        Self::new(file_id, 0, 0, 1)
    }

    /// Whether this span belongs to a synthesized node.
    pub fn is_generated(&self) -> bool {
        self.file_id == GENERATED_FILE
    }

    /// Check if this span is zero-length.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Length of this span in bytes (zero for malformed spans).
    pub fn len(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    /// Same byte range, relocated into another file.
    ///
    /// Used when a regenerated source is dumped to a temporary file: the
    /// diagnostic keeps its offsets but now points at the dumped copy.
    pub fn relocated(self, file_id: u16) -> Span {
        Span { file_id, ..self }
    }
}

impl Default for Span {
    fn default() -> Self {
        Self::generated()
    }
}

impl SourceMap {
    /// Create an empty source map.
    pub fn new() -> Self {
        Self { files: Vec::new() }
    }

    /// Add a source file and return its ID.
    ///
    /// A file already registered with the same path and text keeps its ID.
    /// Once every ID is taken, further files are not stored and the
    /// generated file ID is returned, so their spans carry no location.
    pub fn add_file(&mut self, path: PathBuf, source: String) -> u16 {
        if let Some(idx) = self
            .files
            .iter()
            .position(|file| file.path == path && file.source == source)
        {
            return idx as u16;
        }
        let file_id = self.files.len();
        if file_id >= GENERATED_FILE as usize {
            return GENERATED_FILE;
        }
        self.files.push(SourceFile::new(path, source));
        file_id as u16
    }

    /// Find the id of an already registered file.
    pub fn find(&self, path: &Path) -> Option<u16> {
        self.files
            .iter()
            .position(|file| file.path == path)
            .map(|idx| idx as u16)
    }

    /// Source file a span points into, if any.
    pub fn file(&self, span: &Span) -> Option<&SourceFile> {
        if span.is_generated() {
            return None;
        }
        self.files.get(span.file_id as usize)
    }

    /// File path a span points into, if any.
    pub fn file_path(&self, span: &Span) -> Option<&Path> {
        self.file(span).map(|file| file.path.as_path())
    }

    /// Source text covered by a span.
    pub fn snippet(&self, span: &Span) -> Option<&str> {
        let file = self.file(span)?;
        file.source.get(span.start as usize..span.end as usize)
    }

    /// 1-based (line, column) of a span's start.
    pub fn line_col(&self, span: &Span) -> Option<(u32, u32)> {
        self.file(span)?.line_col(span.start)
    }

    /// Number of files in this map.
    pub fn file_count(&self) -> usize {
        self.files.len()
    }
}

impl SourceFile {
    /// Create a new source file with precomputed line starts.
    pub fn new(path: PathBuf, source: String) -> Self {
        let line_starts = line_starts(&source);
        Self {
            path,
            source,
            line_starts,
        }
    }

    /// 1-based (line, column) for a byte offset, `None` past EOF.
    pub fn line_col(&self, offset: u32) -> Option<(u32, u32)> {
        if offset as usize > self.source.len() {
            return None;
        }
        let line_idx = match self.line_starts.binary_search(&offset) {
            Ok(idx) => idx,
            Err(idx) => idx.max(1) - 1,
        };
        let line = line_idx as u32 + 1;
        let col = offset - self.line_starts[line_idx] + 1;
        Some((line, col))
    }

    /// Text of a 1-based line, without its line terminator.
    pub fn line_text(&self, line: u32) -> Option<&str> {
        if line == 0 || line as usize >= self.line_starts.len() {
            return None;
        }
        let start = self.line_starts[line as usize - 1] as usize;
        let end = self.line_starts[line as usize] as usize;
        self.source
            .get(start..end)
            .map(|text| text.trim_end_matches(['\n', '\r']))
    }

    /// Number of lines in this file.
    pub fn line_count(&self) -> usize {
        self.line_starts.len().saturating_sub(1)
    }
}

/// Byte offsets of line starts, always ending with an EOF sentinel.
fn line_starts(source: &str) -> Vec<u32> {
    let mut starts: Vec<u32> = std::iter::once(0)
        .chain(
            source
                .match_indices('\n')
                .map(|(idx, _)| idx as u32 + 1),
        )
        .collect();
    let eof = source.len() as u32;
    if starts.last() != Some(&eof) {
        starts.push(eof);
    }
    starts
}

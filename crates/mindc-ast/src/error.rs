//! Compile-time diagnostics for the ADL front-end.
//!
//! Every user-facing problem found while loading, merging, instantiating or
//! checking a definition is reported as a [`CompileError`]: a located message
//! with a category, a severity, optional secondary labels and notes.
//!
//! # Design
//!
//! - `CompileError` — single diagnostic with primary and optional secondary spans
//! - `ErrorKind` — categorizes diagnostics by the check that produced them
//! - `Severity` — error, warning, or note
//! - `DiagnosticFormatter` — formats diagnostics with source snippets
//!
//! Diagnostics are plain values. Whether an error stops the pipeline is
//! decided by the error manager in the resolution crate, not here.
//!
//! # Examples
//!
//! ```
//! # use mindc_ast::error::*;
//! # use mindc_ast::foundation::Span;
//! let error = CompileError::new(
//!     ErrorKind::MissingArgument,
//!     Span::generated(),
//!     "missing argument for parameter 'size' of 'demo.D1'".to_string(),
//! );
//! assert_eq!(error.kind.name(), "missing argument");
//! ```

use crate::foundation::{SourceMap, Span};
use std::fmt;

/// Compilation diagnostic with source location and message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileError {
    /// Category of this diagnostic
    pub kind: ErrorKind,
    /// Severity level
    pub severity: Severity,
    /// Primary source location
    pub span: Span,
    /// Primary message
    pub message: String,
    /// Additional labeled spans
    pub labels: Vec<Label>,
    /// Additional notes or hints
    pub notes: Vec<String>,
}

/// Category of front-end diagnostic.
///
/// # Invariant
///
/// The discriminant values must match the ERROR_KIND_NAMES array indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ErrorKind {
    // Loading
    /// Source text could not be parsed
    Syntax = 0,
    /// No definition with that name could be located
    DefinitionNotFound = 1,
    /// A definition depends on itself while it is being loaded
    CyclicDependency = 2,

    // Extends
    /// Incompatible kinds in an extends clause
    InvalidExtends = 3,
    /// Illegal override of an inherited element
    InvalidOverride = 4,
    /// Two elements share a name in the same scope
    DuplicateName = 5,

    // Value parameters
    /// A formal parameter has no argument
    MissingArgument = 6,
    /// More ordinal arguments than formal parameters
    TooManyArguments = 7,
    /// A named argument matches no formal parameter
    NoSuchParameter = 8,
    /// A reference names a parameter the enclosing definition lacks
    UndefinedParameter = 9,
    /// Argument kind disagrees with the inferred parameter type
    IncompatibleArgumentType = 10,
    /// Literal value disagrees with the inferred parameter type
    IncompatibleArgumentValue = 11,

    // Type parameters
    /// Malformed or unknown type argument
    InvalidTypeArgument = 12,
    /// Type argument does not conform to the type parameter
    IncompatibleTypeArgument = 13,

    // Structure
    /// Sub-component refers to something that cannot be instantiated
    InvalidSubComponent = 14,

    // Bindings
    /// Endpoint lookup or role failure
    InvalidBinding = 15,
    /// Singleton bound to collection, or collection sizes disagree
    BindingCardinality = 16,
    /// Mandatory interface bound to an optional one
    MandatoryToOptional = 17,
    /// Interface signatures are not compatible
    IncompatibleSignature = 18,
    /// The same client endpoint is bound twice
    DuplicateBinding = 19,
    /// Mandatory client interface left unbound
    UnboundInterface = 20,

    // Declarations
    /// Interface declaration error
    InvalidInterface = 21,
    /// Attribute declaration or value error
    InvalidAttribute = 22,

    // Membrane
    /// Controller refers to a missing or misplaced interface
    InvalidController = 23,
    /// External interface implemented by neither controller nor source
    UnimplementedInterface = 24,

    // Annotations
    /// Unknown annotation kind or malformed arguments
    InvalidAnnotation = 25,
    /// Annotation attached to a node kind it does not support
    InvalidAnnotationTarget = 26,
    /// The same annotation kind appears twice on a node
    DuplicateAnnotation = 27,
    /// Singleton definition instantiated more than once
    InvalidSingleton = 28,

    // Generic
    /// Internal compiler error (bug in compiler)
    Internal = 29,
}

/// Human-readable names for error kinds.
///
/// Index matches ErrorKind discriminant.
const ERROR_KIND_NAMES: &[&str] = &[
    "syntax error",               // 0: Syntax
    "definition not found",       // 1: DefinitionNotFound
    "cyclic dependency",          // 2: CyclicDependency
    "invalid extends",            // 3: InvalidExtends
    "invalid override",           // 4: InvalidOverride
    "duplicate name",             // 5: DuplicateName
    "missing argument",           // 6: MissingArgument
    "too many arguments",         // 7: TooManyArguments
    "no such parameter",          // 8: NoSuchParameter
    "undefined parameter",        // 9: UndefinedParameter
    "incompatible argument type", // 10: IncompatibleArgumentType
    "incompatible argument value", // 11: IncompatibleArgumentValue
    "invalid type argument",      // 12: InvalidTypeArgument
    "incompatible type argument", // 13: IncompatibleTypeArgument
    "invalid sub-component",      // 14: InvalidSubComponent
    "invalid binding",            // 15: InvalidBinding
    "binding cardinality mismatch", // 16: BindingCardinality
    "mandatory to optional binding", // 17: MandatoryToOptional
    "incompatible signature",     // 18: IncompatibleSignature
    "duplicate binding",          // 19: DuplicateBinding
    "unbound interface",          // 20: UnboundInterface
    "invalid interface",          // 21: InvalidInterface
    "invalid attribute",          // 22: InvalidAttribute
    "invalid controller",         // 23: InvalidController
    "unimplemented interface",    // 24: UnimplementedInterface
    "invalid annotation",         // 25: InvalidAnnotation
    "invalid annotation target",  // 26: InvalidAnnotationTarget
    "duplicate annotation",       // 27: DuplicateAnnotation
    "invalid singleton",          // 28: InvalidSingleton
    "internal compiler error",    // 29: Internal
];

/// Diagnostic severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    /// Informational note (not an error)
    Note,
    /// Warning (definition is valid but suspicious)
    Warning,
    /// Error (the definition cannot be used)
    Error,
}

/// Secondary labeled span in a diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label {
    /// Source location
    pub span: Span,
    /// Label text
    pub message: String,
}

impl CompileError {
    /// Creates a new error diagnostic.
    pub fn new(kind: ErrorKind, span: Span, message: String) -> Self {
        Self::with_severity(kind, Severity::Error, span, message)
    }

    /// Creates a new warning diagnostic.
    pub fn warning(kind: ErrorKind, span: Span, message: String) -> Self {
        Self::with_severity(kind, Severity::Warning, span, message)
    }

    /// Creates a new note diagnostic.
    pub fn note(kind: ErrorKind, span: Span, message: String) -> Self {
        Self::with_severity(kind, Severity::Note, span, message)
    }

    fn with_severity(kind: ErrorKind, severity: Severity, span: Span, message: String) -> Self {
        Self {
            kind,
            severity,
            span,
            message,
            labels: Vec::new(),
            notes: Vec::new(),
        }
    }

    /// Adds a secondary labeled span (e.g. "first declared here").
    pub fn with_label(mut self, span: Span, message: String) -> Self {
        self.labels.push(Label { span, message });
        self
    }

    /// Adds a note or hint.
    pub fn with_note(mut self, note: String) -> Self {
        self.notes.push(note);
        self
    }

    /// Whether this diagnostic is an error (as opposed to a warning or note).
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl ErrorKind {
    /// Returns a human-readable name for this error kind.
    pub fn name(self) -> &'static str {
        ERROR_KIND_NAMES[self as usize]
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Note => write!(f, "note"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}: {}", self.severity, self.kind.name(), self.message)
    }
}

impl std::error::Error for CompileError {}

/// Result type for operations reporting a single diagnostic.
pub type CompileResult<T> = Result<T, CompileError>;

/// Formats diagnostics with source code context.
///
/// Diagnostics on generated nodes have no file to point into and are printed
/// with a `<generated>` location.
///
/// # Examples
///
/// ```
/// # use mindc_ast::error::*;
/// # use mindc_ast::foundation::{Span, SourceMap};
/// # use std::path::PathBuf;
/// let mut sources = SourceMap::new();
/// let file_id = sources.add_file(
///     PathBuf::from("demo/Top.adl"),
///     "composite demo.Top {\n  contains Missing as m;\n}".to_string(),
/// );
/// let error = CompileError::new(
///     ErrorKind::DefinitionNotFound,
///     Span::new(file_id, 32, 39, 2),
///     "definition 'Missing' not found".to_string(),
/// );
/// let formatted = DiagnosticFormatter::new(&sources).format(&error);
/// assert!(formatted.contains("demo/Top.adl:2:12"));
/// ```
pub struct DiagnosticFormatter<'a> {
    sources: &'a SourceMap,
}

impl<'a> DiagnosticFormatter<'a> {
    /// Creates a new diagnostic formatter.
    pub fn new(sources: &'a SourceMap) -> Self {
        Self { sources }
    }

    /// Formats a diagnostic as a string with source context.
    pub fn format(&self, error: &CompileError) -> String {
        let mut output = format!(
            "{}: {}: {}\n",
            error.severity,
            error.kind.name(),
            error.message
        );

        match (self.sources.file(&error.span), self.sources.line_col(&error.span)) {
            (Some(file), Some((line, col))) => {
                output.push_str(&format!("  --> {}:{}:{}\n", file.path.display(), line, col));
                if let Some(text) = file.line_text(line) {
                    output.push_str("   |\n");
                    output.push_str(&format!("{:3} | {}\n", line, text));
                    let width = (error.span.len() as usize)
                        .min(text.len().saturating_sub(col as usize - 1))
                        .max(1);
                    output.push_str(&format!(
                        "   | {}{}\n",
                        " ".repeat(col as usize - 1),
                        "^".repeat(width)
                    ));
                }
            }
            _ => output.push_str("  --> <generated>\n"),
        }

        for label in &error.labels {
            output.push_str(&format!("   = note: {}\n", label.message));
            if let (Some(path), Some((line, col))) = (
                self.sources.file_path(&label.span),
                self.sources.line_col(&label.span),
            ) {
                output.push_str(&format!("     at {}:{}:{}\n", path.display(), line, col));
            }
        }

        for note in &error.notes {
            output.push_str(&format!("   = help: {}\n", note));
        }

        output
    }

    /// Formats multiple diagnostics, separated by blank lines.
    pub fn format_all(&self, errors: &[CompileError]) -> String {
        errors
            .iter()
            .map(|e| self.format(e))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

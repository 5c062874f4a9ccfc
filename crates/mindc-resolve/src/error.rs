//! Pipeline control-flow errors
//!
//! User problems are [`CompileError`] values routed through the
//! [`ErrorManager`](crate::ErrorManager). The types here only decide how a
//! load unwinds:
//!
//! - [`LoadError::Fatal`] — the current definition cannot be produced; the
//!   caller that asked for it logs the diagnostic once and carries on
//! - [`LoadError::Aborted`] — the error policy stops the whole compilation
//! - [`LoadError::Internal`] — a contract violation inside the front-end

use mindc_ast::error::{CompileError, ErrorKind};
use mindc_ast::{Capability, MergeError, Span};
use thiserror::Error;

/// Contract violation inside the front-end (never a user error).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InternalError {
    #[error("merge failed: {0}")]
    Merge(#[from] MergeError),

    #[error("definition '{definition}' lacks the {capability} capability")]
    MissingCapability {
        definition: String,
        capability: Capability,
    },

    #[error("no parser configured to load registered source '{0}'")]
    MissingParser(String),

    #[error("malformed node in '{definition}': {detail}")]
    MalformedNode { definition: String, detail: String },

    #[error("no processor registered for annotation '{0}'")]
    MissingProcessor(String),
}

/// Why a load did not produce a definition.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LoadError {
    #[error("{}", .0.message)]
    Fatal(CompileError),

    #[error("compilation aborted")]
    Aborted,

    #[error("internal compiler error: {0}")]
    Internal(#[from] InternalError),
}

/// Result of a loader, resolver or instantiator step.
pub type LoadResult<T> = Result<T, LoadError>;

impl LoadError {
    /// Fatal user error for the current definition.
    pub fn fatal(kind: ErrorKind, span: Span, message: impl Into<String>) -> Self {
        LoadError::Fatal(CompileError::new(kind, span, message.into()))
    }

    /// Malformed-node internal error.
    pub fn malformed(definition: impl Into<String>, detail: impl Into<String>) -> Self {
        LoadError::Internal(InternalError::MalformedNode {
            definition: definition.into(),
            detail: detail.into(),
        })
    }

    /// Whether this is a fatal user error of `kind`.
    pub fn is_fatal_kind(&self, kind: ErrorKind) -> bool {
        matches!(self, LoadError::Fatal(e) if e.kind == kind)
    }
}

impl From<MergeError> for LoadError {
    fn from(err: MergeError) -> Self {
        LoadError::Internal(InternalError::Merge(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_kind() {
        let err = LoadError::fatal(ErrorKind::DefinitionNotFound, Span::generated(), "x");
        assert!(err.is_fatal_kind(ErrorKind::DefinitionNotFound));
        assert!(!err.is_fatal_kind(ErrorKind::Syntax));
        assert!(!LoadError::Aborted.is_fatal_kind(ErrorKind::Syntax));
    }

    #[test]
    fn test_internal_messages() {
        let err: LoadError = InternalError::MissingParser("demo.Gen".into()).into();
        assert_eq!(
            err.to_string(),
            "internal compiler error: no parser configured to load registered source 'demo.Gen'"
        );
    }
}

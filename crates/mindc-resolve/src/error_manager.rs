//! Central accumulation of diagnostics
//!
//! Every stage reports user problems here. The manager keeps them in report
//! order, drops exact duplicates (the same definition can be reached through
//! several references), and applies the [`ErrorPolicy`]:
//!
//! ```text
//! ctx.errors.log(err)?;   // Collect: Ok(()), FailFast: Err(Aborted)
//! ```

use crate::error::{LoadError, LoadResult};
use mindc_ast::error::{CompileError, Severity};
use serde::Deserialize;
use tracing::{debug, warn};

/// Whether a user error stops compilation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorPolicy {
    /// Keep going and report every independent error
    #[default]
    Collect,
    /// Abort at the first error
    FailFast,
}

/// Diagnostics gathered during one compilation.
#[derive(Debug, Default)]
pub struct ErrorManager {
    policy: ErrorPolicy,
    errors: Vec<CompileError>,
    warnings: Vec<CompileError>,
}

impl ErrorManager {
    pub fn new(policy: ErrorPolicy) -> Self {
        Self {
            policy,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn policy(&self) -> ErrorPolicy {
        self.policy
    }

    /// Record a diagnostic of any severity.
    ///
    /// Returns `Err(LoadError::Aborted)` when an error is recorded under
    /// [`ErrorPolicy::FailFast`].
    pub fn log(&mut self, error: CompileError) -> LoadResult<()> {
        if error.severity != Severity::Error {
            self.warn(error);
            return Ok(());
        }
        if self.errors.contains(&error) {
            return Ok(());
        }
        debug!(kind = error.kind.name(), "{}", error.message);
        self.errors.push(error);
        match self.policy {
            ErrorPolicy::Collect => Ok(()),
            ErrorPolicy::FailFast => Err(LoadError::Aborted),
        }
    }

    /// Record a warning. Warnings never abort.
    pub fn warn(&mut self, warning: CompileError) {
        if self.warnings.contains(&warning) {
            return;
        }
        warn!(kind = warning.kind.name(), "{}", warning.message);
        self.warnings.push(warning);
    }

    /// Record the diagnostic carried by a fatal load error; pass other errors through.
    pub fn absorb(&mut self, err: LoadError) -> LoadResult<()> {
        match err {
            LoadError::Fatal(error) => self.log(error),
            other => Err(other),
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    pub fn errors(&self) -> &[CompileError] {
        &self.errors
    }

    pub fn warnings(&self) -> &[CompileError] {
        &self.warnings
    }

    /// Take every recorded diagnostic, errors first.
    pub fn drain(&mut self) -> (Vec<CompileError>, Vec<CompileError>) {
        (
            std::mem::take(&mut self.errors),
            std::mem::take(&mut self.warnings),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mindc_ast::error::ErrorKind;
    use mindc_ast::Span;

    fn error(message: &str) -> CompileError {
        CompileError::new(ErrorKind::InvalidBinding, Span::generated(), message.into())
    }

    #[test]
    fn test_collect_keeps_going() {
        let mut manager = ErrorManager::new(ErrorPolicy::Collect);
        assert!(manager.log(error("a")).is_ok());
        assert!(manager.log(error("b")).is_ok());
        assert_eq!(manager.error_count(), 2);
    }

    #[test]
    fn test_fail_fast_aborts() {
        let mut manager = ErrorManager::new(ErrorPolicy::FailFast);
        assert_eq!(manager.log(error("a")), Err(LoadError::Aborted));
        assert!(manager.has_errors());
    }

    #[test]
    fn test_duplicates_dropped() {
        let mut manager = ErrorManager::default();
        manager.log(error("a")).unwrap();
        manager.log(error("a")).unwrap();
        assert_eq!(manager.errors().len(), 1);
    }

    #[test]
    fn test_warnings_never_abort() {
        let mut manager = ErrorManager::new(ErrorPolicy::FailFast);
        let warning =
            CompileError::warning(ErrorKind::InvalidAttribute, Span::generated(), "w".into());
        assert!(manager.log(warning).is_ok());
        assert!(!manager.has_errors());
        assert_eq!(manager.warnings().len(), 1);
    }

    #[test]
    fn test_absorb_passes_internal_errors() {
        let mut manager = ErrorManager::default();
        let fatal = LoadError::Fatal(error("fatal"));
        assert!(manager.absorb(fatal).is_ok());
        assert_eq!(manager.absorb(LoadError::Aborted), Err(LoadError::Aborted));
        assert_eq!(manager.error_count(), 1);
    }
}

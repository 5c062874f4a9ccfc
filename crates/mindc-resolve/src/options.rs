//! Compiler configuration

use crate::error_manager::ErrorPolicy;
use serde::Deserialize;

/// Options for one compilation.
///
/// Deserializable so tools can read them from a JSON file; every field has
/// a default.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CompilerOptions {
    /// Whether the first user error aborts compilation
    pub error_policy: ErrorPolicy,
    /// Keep the temporary copy of regenerated sources that failed to parse
    pub dump_generated_sources: bool,
    /// Deepest nested load before reporting a cyclic dependency
    pub max_resolution_depth: usize,
    /// File extension of ADL sources
    pub source_extension: String,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            error_policy: ErrorPolicy::Collect,
            dump_generated_sources: false,
            max_resolution_depth: 256,
            source_extension: "adl".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = CompilerOptions::default();
        assert_eq!(options.error_policy, ErrorPolicy::Collect);
        assert_eq!(options.max_resolution_depth, 256);
        assert_eq!(options.source_extension, "adl");
        assert!(!options.dump_generated_sources);
    }
}

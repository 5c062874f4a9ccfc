//! MIND tools
//!
//! CLI tools for working with MIND architecture definitions.

use tracing_subscriber::{fmt, EnvFilter};

/// Initialize logging with a default filter.
///
/// Use `RUST_LOG` environment variable to override the default filter.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,mindc_resolve=info,mindc_tools=debug"));

    fmt().with_env_filter(filter).with_target(false).init();
}

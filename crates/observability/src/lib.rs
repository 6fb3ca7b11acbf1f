//! Process-wide tracing setup shared by every binary in the workspace.

/// Tracing configuration (filters, output format).
pub mod tracing;

pub use self::tracing::{LogFormat, TracingConfig};

/// Initialize tracing with JSON output and `RUST_LOG` filtering (default `info`).
///
/// Safe to call multiple times; subsequent calls are no-ops.
pub fn init() {
    self::tracing::init(&TracingConfig::default());
}

/// Initialize tracing with an explicit configuration.
pub fn init_with(config: &TracingConfig) {
    self::tracing::init(config);
}

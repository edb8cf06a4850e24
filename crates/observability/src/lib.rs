//! Tracing and logging setup shared by every binary and test harness.

/// Initialize process-wide logging with the default configuration.
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    self::tracing::init_with(&LogConfig::default());
}

pub use self::tracing::{LogConfig, LogFormat, UnknownLogFormat, init_with};

/// Tracing configuration (filters, layers).
pub mod tracing;

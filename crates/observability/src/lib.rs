//! Tracing and logging (shared setup).

/// Initialize process-wide tracing with the default configuration.
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init(&tracing::TracingConfig::from_env());
}

/// Tracing subscriber configuration (filters, output format).
pub mod tracing;

/// Injectable logging collaborator used by repositories and services.
pub mod logging;

pub use logging::{CatalogLogger, LogLevel, LogRecord, RecordingLogger, SharedLogger, TracingLogger};

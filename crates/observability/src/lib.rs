//! Tracing and logging (shared setup).

pub use self::tracing::{LogFormat, UnknownLogFormat};

/// Initialize process-wide observability (tracing/logging).
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init(format: LogFormat) {
    self::tracing::init(format);
}

/// Tracing configuration (filters, layers).
pub mod tracing;

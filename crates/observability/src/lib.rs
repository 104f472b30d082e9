//! Tracing and logging (shared setup).

/// Initialize process-wide logging.
///
/// Safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init();
}

/// Subscriber configuration (filter, output format).
pub mod tracing;

pub use crate::tracing::LogFormat;

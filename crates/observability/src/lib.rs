//! Tracing and logging setup shared by every binary in the workspace.

/// Tracing configuration (filters, output format).
pub mod tracing;

pub use crate::tracing::{LogFormat, ParseLogFormatError};

/// Initialize process-wide tracing/logging.
///
/// Safe to call multiple times; subsequent calls are no-ops.
pub fn init(format: LogFormat) {
    crate::tracing::init(format);
}

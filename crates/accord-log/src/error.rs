//! Log error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur reading or writing a log.
///
/// Unparseable lines are not errors; see [`ReadReport`](crate::ReadReport).
#[derive(Debug, Error)]
pub enum LogError {
    /// The log file could not be opened, read or written.
    #[error("log storage unavailable at {}: {source}", path.display())]
    Storage {
        /// Path of the log file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A record could not be serialized.
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Result type for log operations.
pub type LogResult<T> = Result<T, LogError>;

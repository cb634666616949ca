//! Learning error types.

use accord_log::LogError;
use std::path::PathBuf;

/// Errors that can occur while learning from approvals.
#[derive(Debug, thiserror::Error)]
pub enum LearningError {
    /// Reading or writing an approval or outcome log failed.
    #[error(transparent)]
    Log(#[from] LogError),

    /// The assistant settings file could not be read, parsed or written.
    #[error("settings file {}: {message}", path.display())]
    Rules {
        /// Path of the settings file.
        path: PathBuf,
        /// What went wrong.
        message: String,
    },

    /// The threshold file could not be read or written.
    #[error("threshold store {}: {source}", path.display())]
    Thresholds {
        /// Path of the threshold file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The interactive review step failed.
    #[error("review failed: {0}")]
    Review(String),

    /// A record could not be serialized.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl LearningError {
    /// Whether this is a log storage failure, after which the caller should
    /// skip learning for the current cycle.
    #[must_use]
    pub fn is_storage_unavailable(&self) -> bool {
        matches!(self, Self::Log(LogError::Storage { .. }))
    }
}

/// Result type for learning operations.
pub type LearningResult<T> = Result<T, LearningError>;

//! The approval event log.

use chrono::{DateTime, Duration, Utc};
use std::path::Path;
use tracing::debug;

use crate::entry::ApprovalEntry;
use crate::error::LogResult;
use crate::jsonl::JsonlFile;

/// Entries returned by a windowed query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApprovalQuery {
    /// Matching entries, oldest first.
    pub entries: Vec<ApprovalEntry>,
    /// Corrupt lines skipped while reading.
    pub skipped: usize,
}

/// Append-only log of approved permissions.
#[derive(Debug, Clone)]
pub struct ApprovalLog {
    file: JsonlFile,
}

impl ApprovalLog {
    /// Open the log at `path`. The file need not exist yet.
    #[must_use]
    pub fn open(path: impl AsRef<Path>) -> Self {
        Self {
            file: JsonlFile::new(path.as_ref()),
        }
    }

    /// Path of the log file.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Durably append one entry.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the write fails. The write is not retried.
    pub fn append(&self, entry: &ApprovalEntry) -> LogResult<()> {
        self.file.append(entry)?;
        debug!(permission = %entry.permission_string, session = %entry.session_id, "recorded approval");
        Ok(())
    }

    /// Entries from the last `window_days` days, optionally limited to one
    /// project, oldest first.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the log exists but cannot be read.
    pub fn query(&self, window_days: u32, project: Option<&Path>) -> LogResult<ApprovalQuery> {
        self.query_at(window_days, project, Utc::now())
    }

    /// [`ApprovalLog::query`] against an explicit reference time.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the log exists but cannot be read.
    pub fn query_at(
        &self,
        window_days: u32,
        project: Option<&Path>,
        now: DateTime<Utc>,
    ) -> LogResult<ApprovalQuery> {
        let window = Duration::days(i64::from(window_days));
        let mut entries = Vec::new();

        let report = self.file.scan(|entry: ApprovalEntry| {
            if entry.timestamp.is_within(window, now)
                && project.is_none_or(|p| entry.is_in_project(p))
            {
                entries.push(entry);
            }
        })?;

        // Appends are usually chronological already; the stable sort keeps
        // file order among equal timestamps.
        entries.sort_by_key(|e| e.timestamp);

        Ok(ApprovalQuery {
            entries,
            skipped: report.skipped,
        })
    }

    /// Number of entries in the last `window_days` days.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the log exists but cannot be read.
    pub fn count(&self, window_days: u32) -> LogResult<usize> {
        let window = Duration::days(i64::from(window_days));
        let now = Utc::now();
        let mut count: usize = 0;
        self.file.scan(|entry: ApprovalEntry| {
            if entry.timestamp.is_within(window, now) {
                count = count.saturating_add(1);
            }
        })?;
        Ok(count)
    }
}

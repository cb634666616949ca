//! The suggestion outcome (feedback) log.

use std::path::Path;

use crate::entry::SuggestionOutcome;
use crate::error::LogResult;
use crate::jsonl::JsonlFile;

/// Outcomes read back from the feedback log.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OutcomeHistory {
    /// Outcomes in the order they were recorded.
    pub outcomes: Vec<SuggestionOutcome>,
    /// Corrupt lines skipped while reading.
    pub skipped: usize,
}

impl OutcomeHistory {
    /// The most recent `limit` outcomes, still oldest first.
    #[must_use]
    pub fn recent(&self, limit: usize) -> &[SuggestionOutcome] {
        let start = self.outcomes.len().saturating_sub(limit);
        self.outcomes.get(start..).unwrap_or_default()
    }

    /// Fraction of accepted outcomes, or `None` with no history.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn acceptance_rate(&self) -> Option<f64> {
        if self.outcomes.is_empty() {
            return None;
        }
        let accepted = self.outcomes.iter().filter(|o| o.accepted).count();
        Some(accepted as f64 / self.outcomes.len() as f64)
    }
}

/// Append-only log of accept/reject decisions.
#[derive(Debug, Clone)]
pub struct OutcomeLog {
    file: JsonlFile,
}

impl OutcomeLog {
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

    /// Append one decision.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the write fails.
    pub fn append(&self, outcome: &SuggestionOutcome) -> LogResult<()> {
        self.file.append(outcome)
    }

    /// Read the whole history, skipping corrupt lines.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the log exists but cannot be read.
    pub fn load(&self) -> LogResult<OutcomeHistory> {
        let (outcomes, report) = self.file.read_all()?;
        Ok(OutcomeHistory {
            outcomes,
            skipped: report.skipped,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_missing_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let log = OutcomeLog::open(dir.path().join("outcomes.jsonl"));
        let history = log.load().unwrap();
        assert!(history.outcomes.is_empty());
        assert_eq!(history.acceptance_rate(), None);
    }

    #[test]
    fn test_append_load_and_rate() {
        let dir = tempfile::tempdir().unwrap();
        let log = OutcomeLog::open(dir.path().join("outcomes.jsonl"));
        log.append(&SuggestionOutcome::new("git_read_only", true, 0.9))
            .unwrap();
        log.append(&SuggestionOutcome::new("test_runner", false, 0.75).with_rule("Bash(pytest:*)"))
            .unwrap();

        let history = log.load().unwrap();
        assert_eq!(history.outcomes.len(), 2);
        assert_eq!(history.acceptance_rate(), Some(0.5));
        assert_eq!(
            history.outcomes[1].proposed_rule.as_deref(),
            Some("Bash(pytest:*)")
        );
    }

    #[test]
    fn test_recent_window() {
        let history = OutcomeHistory {
            outcomes: (0..5)
                .map(|i| SuggestionOutcome::new(format!("c{i}"), true, 0.8))
                .collect(),
            skipped: 0,
        };
        let recent: Vec<_> = history
            .recent(2)
            .iter()
            .map(|o| o.suggestion_category_id.as_str())
            .collect();
        assert_eq!(recent, vec!["c3", "c4"]);
        assert_eq!(history.recent(10).len(), 5);
    }
}

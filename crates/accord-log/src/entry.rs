//! Record types written to the logs.

use accord_core::{Permission, SessionId, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// One approved permission.
///
/// Entries are immutable once written. Use the builder methods before
/// appending; nothing in this crate edits or removes a stored entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApprovalEntry {
    /// When the user approved the permission.
    pub timestamp: Timestamp,
    /// The exact approved permission string.
    pub permission_string: String,
    /// Assistant session the approval belongs to.
    pub session_id: SessionId,
    /// Working directory of the session, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_path: Option<PathBuf>,
    /// Free-form metadata supplied by the recording hook.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub context: BTreeMap<String, serde_json::Value>,
}

impl ApprovalEntry {
    /// Create an entry stamped with the current time.
    #[must_use]
    pub fn new(permission_string: impl Into<String>, session_id: impl Into<SessionId>) -> Self {
        Self {
            timestamp: Timestamp::now(),
            permission_string: permission_string.into(),
            session_id: session_id.into(),
            project_path: None,
            context: BTreeMap::new(),
        }
    }

    /// Override the approval time.
    #[must_use]
    pub fn at(mut self, timestamp: impl Into<Timestamp>) -> Self {
        self.timestamp = timestamp.into();
        self
    }

    /// Attach the project directory.
    #[must_use]
    pub fn with_project(mut self, project_path: impl Into<PathBuf>) -> Self {
        self.project_path = Some(project_path.into());
        self
    }

    /// Attach a context value.
    #[must_use]
    pub fn with_context(
        mut self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Parse the permission string.
    #[must_use]
    pub fn permission(&self) -> Permission {
        Permission::parse(&self.permission_string)
    }

    /// Whether the entry was recorded in `project`.
    #[must_use]
    pub fn is_in_project(&self, project: &Path) -> bool {
        self.project_path.as_deref() == Some(project)
    }
}

/// A user's decision on one surfaced suggestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestionOutcome {
    /// Category of the suggested pattern.
    pub suggestion_category_id: String,
    /// Whether the user accepted the suggestion.
    pub accepted: bool,
    /// Confidence the pattern had when it was shown.
    pub confidence_at_suggestion_time: f64,
    /// Rule that was proposed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proposed_rule: Option<String>,
    /// When the decision was made.
    #[serde(default)]
    pub decided_at: Timestamp,
}

impl SuggestionOutcome {
    /// Create an outcome stamped with the current time.
    #[must_use]
    pub fn new(category_id: impl Into<String>, accepted: bool, confidence: f64) -> Self {
        Self {
            suggestion_category_id: category_id.into(),
            accepted,
            confidence_at_suggestion_time: confidence,
            proposed_rule: None,
            decided_at: Timestamp::now(),
        }
    }

    /// Attach the proposed rule.
    #[must_use]
    pub fn with_rule(mut self, rule: impl Into<String>) -> Self {
        self.proposed_rule = Some(rule.into());
        self
    }

    /// Override the decision time.
    #[must_use]
    pub fn at(mut self, timestamp: impl Into<Timestamp>) -> Self {
        self.decided_at = timestamp.into();
        self
    }
}

//! Prelude module - commonly used types for convenient import.
//!
//! Use `use accord_log::prelude::*;` to import all essential types.

// Errors
pub use crate::{LogError, LogResult};

// Records
pub use crate::{ApprovalEntry, SuggestionOutcome};

// Logs
pub use crate::{ApprovalLog, ApprovalQuery, OutcomeHistory, OutcomeLog};

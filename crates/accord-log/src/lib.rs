//! Accord Log - Append-only, line-delimited JSON logs.
//!
//! This crate provides:
//! - [`ApprovalLog`]: every permission the user approved, one JSON object per line
//! - [`OutcomeLog`]: accept/reject feedback on surfaced suggestions
//! - A corruption-tolerant reader shared by both
//!
//! # Durability Model
//!
//! Records are written with a single `write_all` of a complete,
//! newline-terminated line on a file opened in append mode, so a reader never
//! observes half of one record spliced into another. A crash can still leave
//! a truncated final line; readers skip any line that fails to parse and
//! report how many they skipped instead of failing the whole read.
//!
//! I/O failures (missing permissions, full disk) are never swallowed: they
//! surface as [`LogError::Storage`] so callers can decide whether to skip
//! learning for the current cycle.
//!
//! # Example
//!
//! ```
//! use accord_log::{ApprovalEntry, ApprovalLog};
//!
//! let dir = tempfile::tempdir().unwrap();
//! let log = ApprovalLog::open(dir.path().join("approvals.jsonl"));
//!
//! log.append(&ApprovalEntry::new("git status", "session-1")).unwrap();
//!
//! let recent = log.query(30, None).unwrap();
//! assert_eq!(recent.entries.len(), 1);
//! assert_eq!(recent.skipped, 0);
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod approval;
mod entry;
mod error;
mod jsonl;
mod outcome;

pub use approval::{ApprovalLog, ApprovalQuery};
pub use entry::{ApprovalEntry, SuggestionOutcome};
pub use error::{LogError, LogResult};
pub use jsonl::{JsonlFile, ReadReport};
pub use outcome::{OutcomeHistory, OutcomeLog};

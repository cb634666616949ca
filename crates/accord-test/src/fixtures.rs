//! Fixtures pinned to a fixed reference instant.
//!
//! Detection depends on "now", so every fixture is expressed relative to
//! [`reference_now`] and tests pass that same instant to the engine.

use std::path::Path;

use accord_learning::ThresholdConfig;
use accord_log::{ApprovalEntry, SuggestionOutcome};
use chrono::{DateTime, TimeDelta, TimeZone, Utc};

/// Session id used by every fixture entry.
pub const TEST_SESSION: &str = "test-session";

/// The fixed "now" of all fixtures: 2026-03-01T12:00:00Z.
///
/// # Panics
///
/// Never in practice; the instant is a valid UTC time.
#[must_use]
pub fn reference_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0)
        .single()
        .expect("valid reference instant")
}

/// `days` days before [`reference_now`]. Negative values are in the future.
///
/// # Panics
///
/// Panics if the offset overflows the calendar.
#[must_use]
pub fn days_ago(days: i64) -> DateTime<Utc> {
    reference_now()
        .checked_sub_signed(TimeDelta::days(days))
        .expect("offset within calendar range")
}

/// An approval of `permission` made `days` days before the reference instant.
#[must_use]
pub fn approval(permission: &str, days: i64) -> ApprovalEntry {
    ApprovalEntry::new(permission, TEST_SESSION).at(days_ago(days))
}

/// Like [`approval`], recorded in `project`.
#[must_use]
pub fn approval_in(permission: &str, project: &Path, days: i64) -> ApprovalEntry {
    approval(permission, days).with_project(project)
}

/// One approval per `(permission, days_ago)` pair.
#[must_use]
pub fn approvals(pairs: &[(&str, i64)]) -> Vec<ApprovalEntry> {
    pairs.iter().map(|(p, d)| approval(p, *d)).collect()
}

/// Thresholds with a 30-day window.
#[must_use]
pub fn test_thresholds(min_occurrences: u32, confidence_threshold: f64) -> ThresholdConfig {
    ThresholdConfig {
        min_occurrences,
        confidence_threshold,
        analysis_window_days: 30,
    }
}

/// `total` outcomes for `category`, the first `accepted` of them accepted.
#[must_use]
pub fn outcomes(category: &str, total: usize, accepted: usize) -> Vec<SuggestionOutcome> {
    (0..total)
        .map(|i| SuggestionOutcome::new(category, i < accepted, 0.8).at(reference_now()))
        .collect()
}

//! Confidence scoring for detected patterns.
//!
//! ```text
//! base        = occurrences / total approvals in the window
//! consistency = (repeats of the most common exact string / occurrences) * 0.2
//! recency     = 0.1 if last seen within 7 days, else 0
//! confidence  = min(1.0, base + consistency + recency)
//! ```
//!
//! The bonuses together add at most 0.3, so a pattern that is rare in the
//! window cannot reach a sensible threshold on bonuses alone.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use accord_core::Timestamp;

/// Weight of the consistency bonus.
pub const CONSISTENCY_WEIGHT: f64 = 0.2;
/// Bonus for patterns seen recently.
pub const RECENCY_BONUS: f64 = 0.1;
/// How recent "recently" is.
pub const RECENCY_WINDOW_DAYS: i64 = 7;

/// Evidence for one pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatternSignals {
    /// Matching approvals.
    pub occurrences: usize,
    /// All approvals in the analysis window.
    pub total_in_window: usize,
    /// Repeats of the single most common exact permission string.
    pub max_variant_repeats: usize,
    /// Most recent matching approval.
    pub last_seen: Timestamp,
}

/// A confidence score and the terms it was built from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ConfidenceBreakdown {
    /// Frequency term.
    pub base: f64,
    /// Consistency term.
    pub consistency_bonus: f64,
    /// Recency term.
    pub recency_bonus: f64,
    /// Final score in `[0, 1]`.
    pub confidence: f64,
}

/// Score a pattern.
///
/// Returns `None` when there is nothing to score: an empty window or a
/// pattern with no occurrences.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn score(signals: &PatternSignals, now: DateTime<Utc>) -> Option<ConfidenceBreakdown> {
    if signals.total_in_window == 0 || signals.occurrences == 0 {
        return None;
    }

    let occurrences = signals.occurrences as f64;
    let base = (occurrences / signals.total_in_window as f64).min(1.0);

    let repeats = signals.max_variant_repeats.min(signals.occurrences) as f64;
    let consistency_bonus = (repeats / occurrences) * CONSISTENCY_WEIGHT;

    let recency_bonus = if signals
        .last_seen
        .is_within(Duration::days(RECENCY_WINDOW_DAYS), now)
    {
        RECENCY_BONUS
    } else {
        0.0
    };

    let confidence = (base + consistency_bonus + recency_bonus).clamp(0.0, 1.0);

    Some(ConfidenceBreakdown {
        base,
        consistency_bonus,
        recency_bonus,
        confidence,
    })
}

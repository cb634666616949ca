//! Threshold calibration from accept/reject feedback.
//!
//! When users reject most suggestions the bar goes up; when they accept
//! nearly all of them it comes down. One direction is applied per call, and
//! the result always lies within the policy's bounds.

use accord_log::SuggestionOutcome;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::threshold::{
    CONFIDENCE_CEILING, CONFIDENCE_FLOOR, MIN_OCCURRENCES_CEILING, MIN_OCCURRENCES_FLOOR,
    ThresholdConfig, round4,
};

/// Tuning for [`MetaCalibrator`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationPolicy {
    /// Whether calibration runs at all.
    pub enabled: bool,
    /// How many of the most recent outcomes to consider.
    pub history_window: usize,
    /// Confidence change per adjustment.
    pub step: f64,
    /// Lowest confidence threshold calibration will produce.
    pub min_confidence: f64,
    /// Highest confidence threshold calibration will produce.
    pub max_confidence: f64,
    /// Highest `min_occurrences` calibration will produce.
    pub max_min_occurrences: u32,
    /// Tighten when the acceptance rate is below this.
    pub tighten_below: f64,
    /// Relax when the acceptance rate is above this.
    pub relax_above: f64,
}

impl Default for CalibrationPolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            history_window: 50,
            step: 0.05,
            min_confidence: CONFIDENCE_FLOOR,
            max_confidence: CONFIDENCE_CEILING,
            max_min_occurrences: MIN_OCCURRENCES_CEILING,
            tighten_below: 0.5,
            relax_above: 0.9,
        }
    }
}

/// Direction of a calibration step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Adjustment {
    /// Thresholds raised after low acceptance.
    Tightened,
    /// Confidence threshold lowered after high acceptance.
    Relaxed,
    /// No change.
    Unchanged,
}

/// What a calibration run saw and did.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CalibrationReport {
    /// Thresholds for the next run.
    pub thresholds: ThresholdConfig,
    /// Acceptance rate over the considered outcomes, if any.
    pub acceptance_rate: Option<f64>,
    /// Outcomes considered.
    pub sample_size: usize,
    /// Direction applied.
    pub adjustment: Adjustment,
}

/// Adjusts thresholds from historical outcomes.
#[derive(Debug, Clone, Default)]
pub struct MetaCalibrator {
    policy: CalibrationPolicy,
}

impl MetaCalibrator {
    /// Calibrator with the given policy.
    #[must_use]
    pub fn new(policy: CalibrationPolicy) -> Self {
        Self { policy }
    }

    /// The policy in use.
    #[must_use]
    pub fn policy(&self) -> &CalibrationPolicy {
        &self.policy
    }

    /// Thresholds for the next run.
    ///
    /// With no outcomes `current` is returned unchanged.
    #[must_use]
    pub fn adjust(&self, outcomes: &[SuggestionOutcome], current: ThresholdConfig) -> ThresholdConfig {
        self.assess(outcomes, current).thresholds
    }

    /// Calibrate and report the acceptance rate and direction.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn assess(&self, outcomes: &[SuggestionOutcome], current: ThresholdConfig) -> CalibrationReport {
        let start = outcomes.len().saturating_sub(self.policy.history_window);
        let window = outcomes.get(start..).unwrap_or_default();

        if window.is_empty() {
            debug!("no outcome history, thresholds unchanged");
            return CalibrationReport {
                thresholds: current,
                acceptance_rate: None,
                sample_size: 0,
                adjustment: Adjustment::Unchanged,
            };
        }

        let accepted = window.iter().filter(|o| o.accepted).count();
        let rate = accepted as f64 / window.len() as f64;

        if !self.policy.enabled {
            debug!(rate, "calibration disabled");
            return CalibrationReport {
                thresholds: current,
                acceptance_rate: Some(rate),
                sample_size: window.len(),
                adjustment: Adjustment::Unchanged,
            };
        }

        let (min_conf, max_conf) = self.confidence_bounds();
        let max_occ = self
            .policy
            .max_min_occurrences
            .clamp(MIN_OCCURRENCES_FLOOR, MIN_OCCURRENCES_CEILING);

        let mut next = current;
        let adjustment = if rate < self.policy.tighten_below {
            next.confidence_threshold = current.confidence_threshold + self.policy.step;
            next.min_occurrences = current.min_occurrences.saturating_add(1);
            Adjustment::Tightened
        } else if rate > self.policy.relax_above {
            next.confidence_threshold = current.confidence_threshold - self.policy.step;
            Adjustment::Relaxed
        } else {
            Adjustment::Unchanged
        };

        next.confidence_threshold = if next.confidence_threshold.is_finite() {
            round4(next.confidence_threshold.clamp(min_conf, max_conf))
        } else {
            min_conf
        };
        next.min_occurrences = next.min_occurrences.clamp(MIN_OCCURRENCES_FLOOR, max_occ);

        info!(
            rate,
            sample_size = window.len(),
            ?adjustment,
            confidence_threshold = next.confidence_threshold,
            min_occurrences = next.min_occurrences,
            "calibrated thresholds"
        );

        CalibrationReport {
            thresholds: next,
            acceptance_rate: Some(rate),
            sample_size: window.len(),
            adjustment,
        }
    }

    /// Policy confidence bounds, kept inside the global bounds and ordered.
    fn confidence_bounds(&self) -> (f64, f64) {
        let lo = self
            .policy
            .min_confidence
            .clamp(CONFIDENCE_FLOOR, CONFIDENCE_CEILING);
        let hi = self
            .policy
            .max_confidence
            .clamp(CONFIDENCE_FLOOR, CONFIDENCE_CEILING);
        if lo <= hi { (lo, hi) } else { (hi, lo) }
    }
}

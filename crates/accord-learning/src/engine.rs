//! One learning cycle end to end.
//!
//! ```text
//! approvals.jsonl -> PatternDetector -> SuggestionFilter -> reviewer
//!                                                              |
//! thresholds <- MetaCalibrator <- outcomes.jsonl <-------------+
//! ```
//!
//! The engine never holds thresholds itself: callers load them, pass them
//! in by value, and persist whatever calibration returns.

use accord_core::Timestamp;
use accord_log::{ApprovalLog, OutcomeLog};
use chrono::{DateTime, Utc};
use std::path::Path;
use tracing::info;

use crate::calibrator::{CalibrationPolicy, CalibrationReport, MetaCalibrator};
use crate::catalog::PatternCatalog;
use crate::detector::{DetectedPattern, PatternDetector};
use crate::error::LearningResult;
use crate::filter::{DEFAULT_MAX_SUGGESTIONS, PatternSuggestion, SuggestionFilter};
use crate::review::{ReviewDecision, SuggestionReviewer};
use crate::rules::RuleLookup;
use crate::threshold::ThresholdConfig;

/// Result of one analysis run.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisReport {
    /// Thresholds the run used.
    pub thresholds: ThresholdConfig,
    /// Approvals in the window.
    pub total_approvals: usize,
    /// Corrupt log lines skipped.
    pub skipped_records: usize,
    /// Every pattern that met `min_occurrences`, best first.
    pub detected: Vec<DetectedPattern>,
    /// Patterns that passed filtering, best first.
    pub suggestions: Vec<PatternSuggestion>,
}

/// Per-category counts over a window, for reporting.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowStats {
    /// Approvals in the window.
    pub total_approvals: usize,
    /// Corrupt log lines skipped.
    pub skipped_records: usize,
    /// Matching approvals per category, in catalog order.
    pub category_matches: Vec<(&'static str, usize)>,
}

/// Ties the logs, catalog and calibration policy together.
#[derive(Debug, Clone)]
pub struct LearningEngine {
    approvals: ApprovalLog,
    outcomes: OutcomeLog,
    catalog: PatternCatalog,
    calibrator: MetaCalibrator,
    max_suggestions: usize,
}

impl LearningEngine {
    /// Engine over the given logs with the built-in catalog.
    #[must_use]
    pub fn new(approvals: ApprovalLog, outcomes: OutcomeLog) -> Self {
        Self {
            approvals,
            outcomes,
            catalog: PatternCatalog::builtin(),
            calibrator: MetaCalibrator::default(),
            max_suggestions: DEFAULT_MAX_SUGGESTIONS,
        }
    }

    /// Use a different catalog.
    #[must_use]
    pub fn with_catalog(mut self, catalog: PatternCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Use a different calibration policy.
    #[must_use]
    pub fn with_policy(mut self, policy: CalibrationPolicy) -> Self {
        self.calibrator = MetaCalibrator::new(policy);
        self
    }

    /// Cap suggestions per run.
    #[must_use]
    pub fn with_max_suggestions(mut self, max: usize) -> Self {
        self.max_suggestions = max;
        self
    }

    /// The approval log.
    #[must_use]
    pub fn approvals(&self) -> &ApprovalLog {
        &self.approvals
    }

    /// The outcome log.
    #[must_use]
    pub fn outcomes(&self) -> &OutcomeLog {
        &self.outcomes
    }

    /// Detect and filter patterns in the current window.
    ///
    /// # Errors
    ///
    /// Returns an error if the approval log cannot be read.
    pub fn analyze<R: RuleLookup + ?Sized>(
        &self,
        thresholds: ThresholdConfig,
        project: Option<&Path>,
        configured: &R,
        now: DateTime<Utc>,
    ) -> LearningResult<AnalysisReport> {
        let detector = PatternDetector::new(self.catalog.clone(), thresholds);
        let detection = detector.detect_patterns(
            &self.approvals,
            thresholds.analysis_window_days,
            project,
            now,
        )?;

        let suggestions = SuggestionFilter::new(thresholds)
            .with_max_suggestions(self.max_suggestions)
            .apply(&detection.patterns, configured);

        info!(
            approvals = detection.total_in_window,
            detected = detection.patterns.len(),
            suggestions = suggestions.len(),
            "analysis complete"
        );

        Ok(AnalysisReport {
            thresholds,
            total_approvals: detection.total_in_window,
            skipped_records: detection.skipped_records,
            detected: detection.patterns,
            suggestions,
        })
    }

    /// Hand suggestions to `reviewer` and record the decisions.
    ///
    /// Returns the decisions as recorded.
    ///
    /// # Errors
    ///
    /// Returns an error if the reviewer fails or the outcome log cannot be
    /// written.
    pub fn review(
        &self,
        suggestions: &[PatternSuggestion],
        reviewer: &mut dyn SuggestionReviewer,
        now: DateTime<Utc>,
    ) -> LearningResult<Vec<ReviewDecision>> {
        if suggestions.is_empty() {
            return Ok(Vec::new());
        }
        let decisions = reviewer.review(suggestions)?;
        self.record_decisions(&decisions, now)?;
        Ok(decisions)
    }

    /// Append one outcome per decision and return the accepted rules.
    ///
    /// # Errors
    ///
    /// Returns an error if the outcome log cannot be written.
    pub fn record_decisions(
        &self,
        decisions: &[ReviewDecision],
        now: DateTime<Utc>,
    ) -> LearningResult<Vec<String>> {
        let decided_at = Timestamp::from_datetime(now);
        for decision in decisions {
            self.outcomes.append(&decision.to_outcome(decided_at))?;
        }
        let accepted: Vec<String> = decisions
            .iter()
            .filter(|d| d.accepted)
            .map(|d| d.suggestion.proposed_rule.clone())
            .collect();
        info!(
            decisions = decisions.len(),
            accepted = accepted.len(),
            "recorded review outcomes"
        );
        Ok(accepted)
    }

    /// Calibrate `current` from the outcome history.
    ///
    /// # Errors
    ///
    /// Returns an error if the outcome log cannot be read.
    pub fn calibrate(&self, current: ThresholdConfig) -> LearningResult<CalibrationReport> {
        let history = self.outcomes.load()?;
        Ok(self.calibrator.assess(&history.outcomes, current))
    }

    /// Category match counts over the last `window_days`, ignoring thresholds.
    ///
    /// # Errors
    ///
    /// Returns an error if the approval log cannot be read.
    pub fn window_stats(&self, window_days: u32, now: DateTime<Utc>) -> LearningResult<WindowStats> {
        let query = self.approvals.query_at(window_days, None, now)?;
        let detector = PatternDetector::new(self.catalog.clone(), ThresholdConfig::default());
        Ok(WindowStats {
            total_approvals: query.entries.len(),
            skipped_records: query.skipped,
            category_matches: detector.match_counts(&query.entries),
        })
    }
}

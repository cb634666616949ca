//! Thresholds, de-duplication and presentation.

use serde::Serialize;
use tracing::debug;

use accord_core::Permission;

use crate::detector::DetectedPattern;
use crate::rules::RuleLookup;
use crate::threshold::ThresholdConfig;

/// Default cap on suggestions per run.
pub const DEFAULT_MAX_SUGGESTIONS: usize = 5;
/// Cap on near-miss examples per suggestion.
pub const MAX_NEAR_MISSES: usize = 3;

/// A detected pattern ready to show to the user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatternSuggestion {
    /// The underlying pattern.
    pub pattern: DetectedPattern,
    /// Human-readable summary.
    pub description: String,
    /// Rule to add if accepted.
    pub proposed_rule: String,
    /// Distinct approved permissions the pattern matched.
    pub would_allow: Vec<String>,
    /// Related permissions the rule would not cover.
    pub would_still_ask: Vec<String>,
    /// Estimated reduction in prompts.
    pub impact_estimate: String,
}

impl PatternSuggestion {
    /// Category of the suggested pattern.
    #[must_use]
    pub fn category_id(&self) -> &str {
        &self.pattern.category_id
    }

    /// Confidence of the suggested pattern.
    #[must_use]
    pub fn confidence(&self) -> f64 {
        self.pattern.confidence
    }
}

/// Turns detected patterns into suggestions.
#[derive(Debug, Clone)]
pub struct SuggestionFilter {
    thresholds: ThresholdConfig,
    max_suggestions: usize,
}

impl SuggestionFilter {
    /// Filter with the thresholds of the current run.
    #[must_use]
    pub fn new(thresholds: ThresholdConfig) -> Self {
        Self {
            thresholds,
            max_suggestions: DEFAULT_MAX_SUGGESTIONS,
        }
    }

    /// Override the per-run suggestion cap.
    #[must_use]
    pub fn with_max_suggestions(mut self, max: usize) -> Self {
        self.max_suggestions = max;
        self
    }

    /// Whether a pattern passes thresholds and is not already configured.
    #[must_use]
    pub fn passes<R: RuleLookup + ?Sized>(&self, pattern: &DetectedPattern, configured: &R) -> bool {
        let min = usize::try_from(self.thresholds.min_occurrences).unwrap_or(usize::MAX);
        if pattern.occurrences < min {
            return false;
        }
        if pattern.confidence < self.thresholds.confidence_threshold {
            debug!(
                category = %pattern.category_id,
                confidence = pattern.confidence,
                threshold = self.thresholds.confidence_threshold,
                "below confidence threshold"
            );
            return false;
        }
        let rule = pattern.proposed_rule.to_string();
        if configured.contains_rule(&rule) {
            debug!(category = %pattern.category_id, %rule, "rule already configured");
            return false;
        }
        true
    }

    /// Filter, rank and cap `patterns`.
    ///
    /// Ranking is confidence then occurrences, both descending; equal
    /// patterns keep their input order.
    #[must_use]
    pub fn apply<R: RuleLookup + ?Sized>(
        &self,
        patterns: &[DetectedPattern],
        configured: &R,
    ) -> Vec<PatternSuggestion> {
        let mut surviving: Vec<&DetectedPattern> = patterns
            .iter()
            .filter(|p| self.passes(p, configured))
            .collect();

        surviving.sort_by(|a, b| {
            b.confidence
                .total_cmp(&a.confidence)
                .then_with(|| b.occurrences.cmp(&a.occurrences))
        });
        surviving.truncate(self.max_suggestions);

        surviving.into_iter().map(to_suggestion).collect()
    }
}

fn to_suggestion(pattern: &DetectedPattern) -> PatternSuggestion {
    let would_allow: Vec<String> = pattern
        .distinct_permissions()
        .into_iter()
        .map(str::to_owned)
        .collect();

    let would_still_ask: Vec<String> = pattern
        .near_miss_candidates
        .iter()
        .filter(|candidate| !pattern.proposed_rule.covers(&Permission::parse(candidate)))
        .take(MAX_NEAR_MISSES)
        .cloned()
        .collect();

    let projects = match pattern.distinct_projects.len() {
        0 => String::new(),
        1 => " in 1 project".to_owned(),
        n => format!(" across {n} projects"),
    };
    let description = format!(
        "{}: approved {} time{}{projects} ({} distinct)",
        pattern.title,
        pattern.occurrences,
        if pattern.occurrences == 1 { "" } else { "s" },
        would_allow.len(),
    );

    PatternSuggestion {
        description,
        proposed_rule: pattern.proposed_rule.to_string(),
        would_allow,
        would_still_ask,
        impact_estimate: impact_estimate(pattern.occurrences, pattern.total_in_window),
        pattern: pattern.clone(),
    }
}

/// `"~45% fewer prompts"`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn impact_estimate(occurrences: usize, total: usize) -> String {
    if total == 0 {
        return "~0% fewer prompts".to_owned();
    }
    let percent = (occurrences as f64 / total as f64 * 100.0).round();
    format!("~{percent:.0}% fewer prompts")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::PatternCatalog;
    use crate::detector::PatternDetector;
    use accord_log::ApprovalEntry;
    use chrono::{DateTime, Duration, Utc};
    use std::collections::HashSet;

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-03-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn at(permission: &str, days_ago: i64) -> ApprovalEntry {
        ApprovalEntry::new(permission, "s").at(now() - Duration::days(days_ago))
    }

    fn thresholds(min_occurrences: u32, confidence_threshold: f64) -> ThresholdConfig {
        ThresholdConfig {
            min_occurrences,
            confidence_threshold,
            analysis_window_days: 30,
        }
    }

    fn detect(entries: &[ApprovalEntry], min: u32) -> Vec<DetectedPattern> {
        PatternDetector::new(PatternCatalog::builtin(), thresholds(min, 0.5)).detect(entries, now())
    }

    fn git_window() -> Vec<ApprovalEntry> {
        vec![
            at("git status", 9),
            at("git push", 6),
            at("git log", 5),
            at("git diff", 1),
        ]
    }

    #[test]
    fn test_surfaces_passing_pattern() {
        let patterns = detect(&git_window(), 3);
        let suggestions = SuggestionFilter::new(thresholds(3, 0.5)).apply(&patterns, &HashSet::<String>::new());
        let git = suggestions
            .iter()
            .find(|s| s.category_id() == "git_read_only")
            .unwrap();
        assert_eq!(git.would_allow, vec!["git status", "git log", "git diff"]);
        assert_eq!(git.would_still_ask[0], "git push");
        assert!(git.would_still_ask.len() <= MAX_NEAR_MISSES);
        assert_eq!(git.impact_estimate, "~75% fewer prompts");
        assert!(git.description.starts_with("Read-only git commands: approved 3 times"));
    }

    #[test]
    fn test_below_confidence_threshold_filtered() {
        let patterns = detect(&git_window(), 3);
        let git = patterns
            .iter()
            .find(|p| p.category_id == "git_read_only")
            .unwrap()
            .clone();
        let threshold = git.confidence + 0.01;
        let filter = SuggestionFilter::new(thresholds(3, threshold));
        assert!(!filter.passes(&git, &HashSet::<String>::new()));
    }

    #[test]
    fn test_already_configured_rule_excluded() {
        let patterns = detect(&git_window(), 3);
        let git_rule = patterns
            .iter()
            .find(|p| p.category_id == "git_read_only")
            .unwrap()
            .proposed_rule
            .to_string();
        let configured: HashSet<String> = [git_rule].into_iter().collect();
        let suggestions = SuggestionFilter::new(thresholds(3, 0.5)).apply(&patterns, &configured);
        assert!(suggestions.iter().all(|s| s.category_id() != "git_read_only"));
    }

    #[test]
    fn test_near_misses_covered_by_rule_removed() {
        // `git commit` is a near miss for read-only git but is matched by the
        // safe set, so only `git push` is left to ask about there.
        let entries = vec![
            at("git commit -m x", 8),
            at("git status", 7),
            at("git log", 6),
            at("git diff", 5),
            at("git push", 4),
        ];
        let patterns = detect(&entries, 3);
        let suggestions = SuggestionFilter::new(thresholds(3, 0.5)).apply(&patterns, &HashSet::<String>::new());
        let safe = suggestions
            .iter()
            .find(|s| s.category_id() == "git_all_safe")
            .unwrap();
        assert!(!safe.would_still_ask.iter().any(|s| s.starts_with("git commit")));
        assert_eq!(safe.would_still_ask[0], "git push");
    }

    #[test]
    fn test_observed_destructive_git_stays_visible() {
        let entries = vec![
            at("git status", 9),
            at("git log", 8),
            at("git diff", 7),
            at("git tag -d v1", 2),
            at("git checkout -f main", 1),
        ];
        let patterns = detect(&entries, 3);
        let suggestions = SuggestionFilter::new(thresholds(3, 0.5)).apply(&patterns, &HashSet::<String>::new());
        let safe = suggestions
            .iter()
            .find(|s| s.category_id() == "git_all_safe")
            .unwrap();
        assert_eq!(safe.would_still_ask[..2], ["git checkout -f main".to_owned(), "git tag -d v1".to_owned()]);
        assert!(!safe.proposed_rule.contains("checkout"));
        assert!(!safe.proposed_rule.contains("tag"));
    }

    #[test]
    fn test_cap_and_order() {
        let mut entries = Vec::new();
        for (i, cmd) in ["git status", "cargo test", "ruff check", "rg x", "git add ."]
            .iter()
            .enumerate()
        {
            for day in 0..=i64::try_from(i).unwrap() {
                entries.push(at(cmd, day));
            }
        }
        let patterns = detect(&entries, 1);
        assert!(patterns.len() > 2);

        let suggestions = SuggestionFilter::new(thresholds(1, 0.0))
            .with_max_suggestions(2)
            .apply(&patterns, &HashSet::<String>::new());
        assert_eq!(suggestions.len(), 2);
        assert!(suggestions[0].confidence() >= suggestions[1].confidence());
        assert_eq!(suggestions[0].pattern, patterns[0]);
    }

    #[test]
    fn test_filter_is_idempotent() {
        let patterns = detect(&git_window(), 3);
        let filter = SuggestionFilter::new(thresholds(3, 0.5));
        assert_eq!(
            filter.apply(&patterns, &HashSet::<String>::new()),
            filter.apply(&patterns, &HashSet::<String>::new())
        );
    }

    #[test]
    fn test_impact_estimate() {
        assert_eq!(impact_estimate(45, 100), "~45% fewer prompts");
        assert_eq!(impact_estimate(1, 3), "~33% fewer prompts");
        assert_eq!(impact_estimate(0, 0), "~0% fewer prompts");
    }
}

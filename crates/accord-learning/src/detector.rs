//! Matching approvals against the catalog.

use accord_core::{Permission, Timestamp};
use accord_log::{ApprovalEntry, ApprovalLog};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::catalog::{
    Gate, PatternCatalog, PatternCategory, RuleRecipe, all_file_tools, is_write_tool,
};
use crate::error::LearningResult;
use crate::rule::ProposedRule;
use crate::scorer::{self, ConfidenceBreakdown, PatternSignals};
use crate::threshold::ThresholdConfig;

/// The result of matching the window against one category.
///
/// Built fresh on every run; confidence is never cached between runs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectedPattern {
    /// Category that matched.
    pub category_id: String,
    /// Human-readable category name.
    pub title: String,
    /// Number of matching approvals.
    pub occurrences: usize,
    /// Matching approvals, most recent last.
    #[serde(skip)]
    pub matching_entries: Vec<ApprovalEntry>,
    /// Projects the matches were approved in.
    pub distinct_projects: BTreeSet<PathBuf>,
    /// Confidence in `[0, 1]`.
    pub confidence: f64,
    /// Terms of the confidence score.
    pub breakdown: ConfidenceBreakdown,
    /// Time of the most recent match.
    pub last_seen: Timestamp,
    /// Rule generalizing the matches.
    pub proposed_rule: ProposedRule,
    /// Approvals in the window, matched or not.
    pub total_in_window: usize,
    /// Related approvals and risky neighbours the category did not match,
    /// in presentation order. Not yet checked against the proposed rule.
    #[serde(skip)]
    pub near_miss_candidates: Vec<String>,
}

impl DetectedPattern {
    /// Distinct matched permission strings in first-seen order.
    #[must_use]
    pub fn distinct_permissions(&self) -> Vec<&str> {
        let mut seen = BTreeSet::new();
        self.matching_entries
            .iter()
            .map(|e| e.permission_string.as_str())
            .filter(|p| seen.insert(*p))
            .collect()
    }
}

/// Output of one detection run over the log.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Detection {
    /// Patterns that met `min_occurrences`, best first.
    pub patterns: Vec<DetectedPattern>,
    /// Approvals in the window.
    pub total_in_window: usize,
    /// Corrupt log lines skipped while reading.
    pub skipped_records: usize,
}

/// Runs every category of a catalog over a window of approvals.
#[derive(Debug, Clone)]
pub struct PatternDetector {
    catalog: PatternCatalog,
    thresholds: ThresholdConfig,
}

/// One approval matched by a category.
struct Hit<'a> {
    entry: &'a ApprovalEntry,
    permission: Permission,
    alternative: String,
}

impl PatternDetector {
    /// Detector over `catalog` using the thresholds of the current run.
    #[must_use]
    pub fn new(catalog: PatternCatalog, thresholds: ThresholdConfig) -> Self {
        Self {
            catalog,
            thresholds,
        }
    }

    /// The catalog in use.
    #[must_use]
    pub fn catalog(&self) -> &PatternCatalog {
        &self.catalog
    }

    /// Query the last `window_days` of the log and detect patterns in it.
    ///
    /// # Errors
    ///
    /// Returns an error if the log exists but cannot be read.
    pub fn detect_patterns(
        &self,
        log: &ApprovalLog,
        window_days: u32,
        project: Option<&Path>,
        now: DateTime<Utc>,
    ) -> LearningResult<Detection> {
        let query = log.query_at(window_days, project, now)?;
        let patterns = self.detect(&query.entries, now);
        info!(
            window_days,
            approvals = query.entries.len(),
            skipped = query.skipped,
            patterns = patterns.len(),
            "pattern detection complete"
        );
        Ok(Detection {
            patterns,
            total_in_window: query.entries.len(),
            skipped_records: query.skipped,
        })
    }

    /// Detect patterns in an already-windowed set of approvals.
    ///
    /// An empty window yields no patterns. Categories are evaluated
    /// independently, so one approval may count towards several.
    #[must_use]
    pub fn detect(&self, entries: &[ApprovalEntry], now: DateTime<Utc>) -> Vec<DetectedPattern> {
        if entries.is_empty() {
            debug!("empty analysis window, nothing to detect");
            return Vec::new();
        }

        let mut ordered: Vec<&ApprovalEntry> = entries.iter().collect();
        ordered.sort_by_key(|e| e.timestamp);

        let mut patterns: Vec<DetectedPattern> = self
            .catalog
            .categories()
            .iter()
            .filter_map(|category| self.detect_category(category, &ordered, now))
            .collect();

        patterns.sort_by(|a, b| {
            b.confidence
                .total_cmp(&a.confidence)
                .then_with(|| b.occurrences.cmp(&a.occurrences))
        });
        patterns
    }

    /// Matching approvals per category, ignoring thresholds.
    #[must_use]
    pub fn match_counts(&self, entries: &[ApprovalEntry]) -> Vec<(&'static str, usize)> {
        self.catalog
            .categories()
            .iter()
            .map(|category| {
                let count = entries
                    .iter()
                    .filter(|e| category.matches(&e.permission(), e.project_path.as_deref()))
                    .count();
                (category.id, count)
            })
            .collect()
    }

    fn detect_category(
        &self,
        category: &PatternCategory,
        entries: &[&ApprovalEntry],
        now: DateTime<Utc>,
    ) -> Option<DetectedPattern> {
        let mut hits: Vec<Hit<'_>> = entries
            .iter()
            .copied()
            .filter_map(|entry| {
                let permission = entry.permission();
                let alternative = category.classify(&permission, entry.project_path.as_deref())?;
                Some(Hit {
                    entry,
                    permission,
                    alternative,
                })
            })
            .collect();

        let root = if category.is_project_scoped() {
            let root = dominant_project(&hits)?;
            hits.retain(|h| h.entry.project_path.as_deref() == Some(root.as_path()));
            Some(root)
        } else {
            None
        };

        let min = usize::try_from(self.thresholds.min_occurrences).unwrap_or(usize::MAX);
        if hits.len() < min {
            debug!(
                category = category.id,
                occurrences = hits.len(),
                min_occurrences = min,
                "below min_occurrences"
            );
            return None;
        }

        if let Gate::BroadAccess { min_targets } = category.gate
            && !has_broad_access(&hits, min_targets)
        {
            debug!(category = category.id, "not enough distinct file targets");
            return None;
        }

        let last_seen = hits.last()?.entry.timestamp;
        let signals = PatternSignals {
            occurrences: hits.len(),
            total_in_window: entries.len(),
            max_variant_repeats: max_variant_repeats(&hits),
            last_seen,
        };
        let breakdown = scorer::score(&signals, now)?;

        let proposed_rule = propose_rule(category, &hits, root.as_deref())?;
        let near_miss_candidates = near_miss_candidates(category, entries, &hits);

        debug!(
            category = category.id,
            occurrences = hits.len(),
            confidence = breakdown.confidence,
            rule = %proposed_rule,
            "pattern detected"
        );

        Some(DetectedPattern {
            category_id: category.id.to_owned(),
            title: category.title.to_owned(),
            occurrences: hits.len(),
            distinct_projects: hits
                .iter()
                .filter_map(|h| h.entry.project_path.clone())
                .collect(),
            confidence: breakdown.confidence,
            breakdown,
            last_seen,
            proposed_rule,
            total_in_window: entries.len(),
            near_miss_candidates,
            matching_entries: hits.iter().map(|h| h.entry.clone()).collect(),
        })
    }
}

/// Project root with the most matches; ties go to the lexicographically
/// smallest path.
fn dominant_project(hits: &[Hit<'_>]) -> Option<PathBuf> {
    let mut counts: BTreeMap<&Path, usize> = BTreeMap::new();
    for hit in hits {
        if let Some(root) = hit.entry.project_path.as_deref() {
            let count = counts.entry(root).or_default();
            *count = count.saturating_add(1);
        }
    }
    // Iteration is ascending, and max_by_key keeps the last maximum, so
    // iterate in reverse to prefer the smallest path on ties.
    counts
        .into_iter()
        .rev()
        .max_by_key(|(_, count)| *count)
        .map(|(root, _)| root.to_path_buf())
}

fn has_broad_access(hits: &[Hit<'_>], min_targets: usize) -> bool {
    let targets: BTreeSet<(&str, &str)> = hits
        .iter()
        .map(|h| (h.permission.tool(), h.permission.argument()))
        .collect();
    let writes = hits.iter().any(|h| is_write_tool(h.permission.tool()));
    let reads = hits.iter().any(|h| !is_write_tool(h.permission.tool()));
    targets.len() >= min_targets && reads && writes
}

fn max_variant_repeats(hits: &[Hit<'_>]) -> usize {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for hit in hits {
        let count = counts
            .entry(hit.entry.permission_string.as_str())
            .or_default();
        *count = count.saturating_add(1);
    }
    counts.into_values().max().unwrap_or(0)
}

fn propose_rule(
    category: &PatternCategory,
    hits: &[Hit<'_>],
    root: Option<&Path>,
) -> Option<ProposedRule> {
    let observed = || hits.iter().map(|h| h.alternative.as_str());
    match category.recipe {
        RuleRecipe::FixedVocabulary { stem, vocabulary } => {
            Some(ProposedRule::command_prefix(Some(stem), vocabulary()))
        },
        RuleRecipe::Observed => Some(ProposedRule::command_prefix(None, observed())),
        RuleRecipe::ProjectTools => Some(ProposedRule::subtree(observed(), root?)),
        RuleRecipe::AllFileTools => Some(ProposedRule::subtree(all_file_tools(), root?)),
    }
}

/// Related approvals the category rejected, most recent first, followed by
/// the category's static examples.
fn near_miss_candidates(
    category: &PatternCategory,
    entries: &[&ApprovalEntry],
    hits: &[Hit<'_>],
) -> Vec<String> {
    if category.family.is_none() && category.near_misses.is_empty() {
        return Vec::new();
    }

    let root = hits.first().and_then(|h| h.entry.project_path.as_deref());
    let project = if category.is_project_scoped() { root } else { None };

    let observed = entries.iter().rev().filter(|entry| {
        let permission = entry.permission();
        let scope = project.or(entry.project_path.as_deref());
        category.is_related(&permission, scope)
            && !category.matches(&permission, entry.project_path.as_deref())
    });

    let mut seen = BTreeSet::new();
    observed
        .map(|e| e.permission_string.clone())
        .chain(category.near_misses.iter().map(|s| (*s).to_owned()))
        .filter(|s| seen.insert(s.clone()))
        .collect()
}

#[cfg(test)]
#[path = "detector_tests.rs"]
mod tests;

//! Analyze command - show suggestions for the current window.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use accord_learning::{AnalysisReport, ConfiguredRules, LearningEngine, PatternSuggestion};
use anyhow::Result;
use chrono::Utc;
use serde::Serialize;
use tracing::warn;

use crate::context::AppContext;
use crate::formatter::print_json;
use crate::theme::Theme;

/// Arguments shared by `accord analyze` and `accord review`.
#[derive(Debug, Clone, Default)]
pub(crate) struct AnalyzeArgs {
    pub(crate) days: Option<u32>,
    pub(crate) project: Option<PathBuf>,
    pub(crate) settings: Option<PathBuf>,
}

impl AnalyzeArgs {
    /// Project directory made absolute, so it compares against logged paths.
    pub(crate) fn project(&self) -> Option<PathBuf> {
        self.project
            .as_ref()
            .map(|p| std::path::absolute(p).unwrap_or_else(|_| p.clone()))
    }
}

/// Everything a run over the log produced.
pub(crate) struct Analysis {
    pub(crate) engine: LearningEngine,
    pub(crate) rules: ConfiguredRules,
    pub(crate) report: AnalysisReport,
}

#[derive(Serialize)]
struct AnalyzeOutput<'a> {
    window_days: u32,
    total_approvals: usize,
    skipped_records: usize,
    configured_rules: usize,
    settings_path: Option<&'a Path>,
    suggestions: &'a [PatternSuggestion],
}

#[derive(Serialize)]
struct SkippedOutput {
    skipped: bool,
    reason: String,
}

/// Print suggestions without recording anything.
pub(crate) fn run_analyze(ctx: &AppContext, args: &AnalyzeArgs) -> Result<()> {
    let Some(analysis) = analyze(ctx, args)? else {
        return Ok(());
    };
    let report = &analysis.report;

    if ctx.format.is_json() {
        return print_json(&AnalyzeOutput {
            window_days: report.thresholds.analysis_window_days,
            total_approvals: report.total_approvals,
            skipped_records: report.skipped_records,
            configured_rules: analysis.rules.len(),
            settings_path: analysis.rules.path(),
            suggestions: &report.suggestions,
        });
    }

    print_summary(report);
    if report.suggestions.is_empty() {
        println!("{}", Theme::info("No suggestions"));
        return Ok(());
    }
    for (i, suggestion) in report.suggestions.iter().enumerate() {
        println!("{}", render_suggestion(i.saturating_add(1), suggestion));
    }
    println!(
        "{}",
        Theme::dimmed("Run `accord review` to accept or reject these suggestions.")
    );
    Ok(())
}

/// Run one analysis, or report that learning was skipped.
///
/// Returns `None` when the approval log is unavailable; the caller should
/// end the cycle without error.
pub(crate) fn analyze(ctx: &AppContext, args: &AnalyzeArgs) -> Result<Option<Analysis>> {
    let mut thresholds = ctx.threshold_store().load()?;
    if let Some(days) = args.days {
        thresholds.analysis_window_days = days;
    }

    let project = args.project();
    let rules = ctx.configured_rules(args.settings.as_deref(), project.as_deref())?;
    let engine = ctx.engine();

    match engine.analyze(thresholds, project.as_deref(), &rules, Utc::now()) {
        Ok(report) => Ok(Some(Analysis {
            engine,
            rules,
            report,
        })),
        Err(e) if e.is_storage_unavailable() => {
            warn!(error = %e, "approval log unavailable, skipping learning");
            report_skipped(ctx, &e.to_string())?;
            Ok(None)
        },
        Err(e) => Err(e.into()),
    }
}

fn report_skipped(ctx: &AppContext, reason: &str) -> Result<()> {
    if ctx.format.is_json() {
        return print_json(&SkippedOutput {
            skipped: true,
            reason: reason.to_owned(),
        });
    }
    println!(
        "{}",
        Theme::warning(&format!("Learning skipped for this cycle: {reason}"))
    );
    Ok(())
}

fn print_summary(report: &AnalysisReport) {
    let t = &report.thresholds;
    println!("\n{}", Theme::header("Permission Suggestions"));
    println!(
        "{}",
        Theme::kv(
            "Window",
            &format!(
                "{} days, {} approvals",
                t.analysis_window_days, report.total_approvals
            )
        )
    );
    println!(
        "{}",
        Theme::kv(
            "Thresholds",
            &format!(
                "min occurrences {}, confidence {:.2}",
                t.min_occurrences, t.confidence_threshold
            )
        )
    );
    if report.skipped_records > 0 {
        println!(
            "{}",
            Theme::warning(&format!(
                "{} corrupt log records skipped",
                report.skipped_records
            ))
        );
    }
    println!("{}", Theme::separator());
}

/// Multi-line display of one suggestion.
pub(crate) fn render_suggestion(index: usize, suggestion: &PatternSuggestion) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{index}. {} (confidence {})",
        Theme::header(&suggestion.pattern.title),
        Theme::confidence(suggestion.confidence())
    );
    let _ = writeln!(out, "   {}", suggestion.description);
    let _ = writeln!(out, "   {}", Theme::kv("Rule", &Theme::rule(&suggestion.proposed_rule)));
    let _ = writeln!(out, "   {}", Theme::kv("Would allow", ""));
    for permission in &suggestion.would_allow {
        let _ = writeln!(out, "     + {permission}");
    }
    if !suggestion.would_still_ask.is_empty() {
        let _ = writeln!(out, "   {}", Theme::kv("Would still ask", ""));
        for permission in &suggestion.would_still_ask {
            let _ = writeln!(out, "     - {}", Theme::dimmed(permission));
        }
    }
    let _ = write!(out, "   {}", Theme::kv("Impact", &suggestion.impact_estimate));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use accord_learning::{PatternCatalog, PatternDetector, SuggestionFilter, ThresholdConfig};
    use accord_log::ApprovalEntry;
    use std::collections::HashSet;

    fn git_suggestion() -> PatternSuggestion {
        let now = Utc::now();
        let entries: Vec<_> = ["git status", "git log", "git diff", "git status"]
            .iter()
            .map(|p| ApprovalEntry::new(*p, "s1").at(now))
            .collect();
        let thresholds = ThresholdConfig::default();
        let patterns = PatternDetector::new(PatternCatalog::builtin(), thresholds).detect(&entries, now);
        SuggestionFilter::new(thresholds)
            .apply(&patterns, &HashSet::<String>::new())
            .remove(0)
    }

    #[test]
    fn test_render_suggestion() {
        colored::control::set_override(false);
        let suggestion = git_suggestion();
        let text = render_suggestion(1, &suggestion);
        assert!(text.starts_with("1. "));
        assert!(text.contains(&suggestion.proposed_rule));
        assert!(text.contains("+ git status"));
        assert!(text.contains(&suggestion.impact_estimate));
    }

    #[test]
    fn test_project_made_absolute() {
        let args = AnalyzeArgs {
            project: Some(PathBuf::from("app")),
            ..AnalyzeArgs::default()
        };
        assert!(args.project().unwrap().is_absolute());
        assert!(AnalyzeArgs::default().project().is_none());
    }
}

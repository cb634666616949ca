//! Review command - accept or reject suggestions and close the loop.

use accord_learning::{CalibrationReport, ReviewDecision, SuggestionReviewer};
use anyhow::Result;
use chrono::Utc;
use serde::Serialize;

use super::analyze::{AnalyzeArgs, analyze};
use super::calibrate::print_report;
use crate::context::AppContext;
use crate::formatter::print_json;
use crate::reviewer::TerminalReviewer;
use crate::theme::Theme;

#[derive(Serialize)]
struct DecisionOutput<'a> {
    category_id: &'a str,
    proposed_rule: &'a str,
    confidence: f64,
    accepted: bool,
}

#[derive(Serialize)]
struct ReviewOutput<'a> {
    dry_run: bool,
    decisions: Vec<DecisionOutput<'a>>,
    rules_added: usize,
    calibration: Option<CalibrationReport>,
}

/// Review suggestions interactively on the terminal.
pub(crate) fn run_review(ctx: &AppContext, args: &AnalyzeArgs, dry_run: bool) -> Result<()> {
    review_with(ctx, args, dry_run, &mut TerminalReviewer)
}

/// One full cycle: analyze, review, record, apply, calibrate.
///
/// With `dry_run`, decisions are collected but nothing is written.
pub(crate) fn review_with(
    ctx: &AppContext,
    args: &AnalyzeArgs,
    dry_run: bool,
    reviewer: &mut dyn SuggestionReviewer,
) -> Result<()> {
    let Some(mut analysis) = analyze(ctx, args)? else {
        return Ok(());
    };
    let suggestions = &analysis.report.suggestions;
    if suggestions.is_empty() {
        if ctx.format.is_json() {
            return print_json(&ReviewOutput {
                dry_run,
                decisions: Vec::new(),
                rules_added: 0,
                calibration: None,
            });
        }
        println!("{}", Theme::info("No suggestions to review"));
        return Ok(());
    }

    let now = Utc::now();
    let decisions: Vec<ReviewDecision> = if dry_run {
        reviewer.review(suggestions)?
    } else {
        analysis.engine.review(suggestions, reviewer, now)?
    };
    let accepted: Vec<&str> = decisions
        .iter()
        .filter(|d| d.accepted)
        .map(|d| d.suggestion.proposed_rule.as_str())
        .collect();

    let (rules_added, calibration) = if dry_run {
        (0, None)
    } else {
        let added = if accepted.is_empty() {
            0
        } else {
            analysis.rules.apply(&accepted)?
        };
        // Calibrate the persisted thresholds, not a --days override.
        let store = ctx.threshold_store();
        let report = analysis.engine.calibrate(store.load()?)?;
        store.save(&report.thresholds)?;
        (added, Some(report))
    };

    if ctx.format.is_json() {
        return print_json(&ReviewOutput {
            dry_run,
            decisions: decisions
                .iter()
                .map(|d| DecisionOutput {
                    category_id: d.suggestion.category_id(),
                    proposed_rule: &d.suggestion.proposed_rule,
                    confidence: d.suggestion.confidence(),
                    accepted: d.accepted,
                })
                .collect(),
            rules_added,
            calibration,
        });
    }

    println!("{}", Theme::separator());
    let rejected = decisions.len().saturating_sub(accepted.len());
    println!(
        "{}",
        Theme::kv(
            "Reviewed",
            &format!("{} accepted, {rejected} rejected", accepted.len())
        )
    );
    if dry_run {
        for rule in &accepted {
            println!("  {} {}", Theme::dimmed("would add"), Theme::rule(rule));
        }
        println!("{}", Theme::info("Dry run: nothing was recorded or applied"));
        return Ok(());
    }

    if rules_added > 0 {
        let target = analysis
            .rules
            .path()
            .map_or_else(String::new, |p| format!(" to {}", p.display()));
        println!(
            "{}",
            Theme::success(&format!("Added {rules_added} rule(s){target}"))
        );
    }
    if let Some(report) = &calibration {
        print_report(report);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formatter::OutputFormat;
    use accord_config::Config;
    use accord_core::AccordHome;
    use accord_learning::PatternSuggestion;
    use accord_log::{ApprovalEntry, ApprovalLog};
    use std::path::Path;

    fn context(dir: &Path) -> AppContext {
        let ctx = AppContext::new(
            AccordHome::from_path(dir.join("home")),
            Config::default(),
            OutputFormat::Json,
        );
        ctx.ensure_home().unwrap();
        let log = ApprovalLog::open(&ctx.storage.approval_log);
        for permission in ["git status", "git log", "git diff", "git status"] {
            log.append(&ApprovalEntry::new(permission, "s1")).unwrap();
        }
        ctx
    }

    fn args(dir: &Path) -> AnalyzeArgs {
        AnalyzeArgs {
            settings: Some(dir.join("settings.json")),
            ..AnalyzeArgs::default()
        }
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(dir.path());

        review_with(&ctx, &args(dir.path()), true, &mut |_: &PatternSuggestion| true).unwrap();

        assert!(!ctx.storage.outcome_log.exists());
        assert!(!ctx.storage.thresholds.exists());
        assert!(!dir.path().join("settings.json").exists());
    }

    #[test]
    fn test_review_applies_and_calibrates() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(dir.path());

        review_with(&ctx, &args(dir.path()), false, &mut |_: &PatternSuggestion| true).unwrap();

        let settings = std::fs::read_to_string(dir.path().join("settings.json")).unwrap();
        assert!(settings.contains("Bash(git"));
        let history = ctx.engine().outcomes().load().unwrap();
        assert!(!history.outcomes.is_empty());
        assert!(history.outcomes.iter().all(|o| o.accepted));
        assert!(ctx.storage.thresholds.exists());
    }

    #[test]
    fn test_rejected_suggestions_not_applied() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(dir.path());

        review_with(&ctx, &args(dir.path()), false, &mut |_: &PatternSuggestion| false).unwrap();

        assert!(!dir.path().join("settings.json").exists());
        let history = ctx.engine().outcomes().load().unwrap();
        assert!(history.outcomes.iter().all(|o| !o.accepted));
    }
}

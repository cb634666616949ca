//! Stats command - approval volume and review feedback.

use anyhow::Result;
use chrono::Utc;
use colored::Colorize;
use serde::Serialize;

use crate::context::AppContext;
use crate::formatter::print_json;
use crate::theme::Theme;

#[derive(Serialize)]
struct CategoryCount {
    category_id: &'static str,
    matches: usize,
}

#[derive(Serialize)]
struct StatsOutput {
    window_days: u32,
    total_approvals: usize,
    skipped_records: usize,
    categories: Vec<CategoryCount>,
    outcomes: usize,
    skipped_outcomes: usize,
    acceptance_rate: Option<f64>,
}

/// Summarize the approval window and the outcome history.
pub(crate) fn show_stats(ctx: &AppContext, days: Option<u32>) -> Result<()> {
    let window_days = match days {
        Some(days) => days,
        None => ctx.threshold_store().load()?.analysis_window_days,
    };
    let engine = ctx.engine();
    let window = engine.window_stats(window_days, Utc::now())?;
    let history = engine.outcomes().load()?;

    let output = StatsOutput {
        window_days,
        total_approvals: window.total_approvals,
        skipped_records: window.skipped_records,
        categories: window
            .category_matches
            .iter()
            .map(|&(category_id, matches)| CategoryCount {
                category_id,
                matches,
            })
            .collect(),
        outcomes: history.outcomes.len(),
        skipped_outcomes: history.skipped,
        acceptance_rate: history.acceptance_rate(),
    };

    if ctx.format.is_json() {
        return print_json(&output);
    }

    println!("\n{}", Theme::header("Approval Statistics"));
    println!(
        "{}",
        Theme::kv(
            "Approvals",
            &format!("{} in the last {window_days} days", output.total_approvals)
        )
    );
    if output.skipped_records > 0 {
        println!(
            "{}",
            Theme::warning(&format!("{} corrupt records skipped", output.skipped_records))
        );
    }
    println!("{}", Theme::separator());
    println!("{:<24} {:>8}", "CATEGORY".dimmed(), "MATCHES".dimmed());
    for category in &output.categories {
        println!("{:<24} {:>8}", category.category_id, category.matches);
    }
    println!("{}", Theme::separator());
    println!(
        "{}",
        Theme::kv(
            "Review outcomes",
            &format!(
                "{} ({} accepted)",
                output.outcomes,
                Theme::rate(output.acceptance_rate)
            )
        )
    );
    Ok(())
}

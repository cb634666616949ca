//! Thresholds command - inspect or reset the persisted thresholds.

use accord_learning::ThresholdConfig;
use anyhow::Result;
use serde::Serialize;

use crate::context::AppContext;
use crate::formatter::print_json;
use crate::theme::Theme;

#[derive(Serialize)]
struct ThresholdsOutput<'a> {
    path: String,
    #[serde(flatten)]
    thresholds: &'a ThresholdConfig,
}

/// Show the thresholds the next run will use.
pub(crate) fn show_thresholds(ctx: &AppContext) -> Result<()> {
    let store = ctx.threshold_store();
    let thresholds = store.load()?;
    print_thresholds(ctx, &store.path().display().to_string(), &thresholds, "Current Thresholds")
}

/// Replace the persisted thresholds with the configured initial values.
pub(crate) fn reset_thresholds(ctx: &AppContext) -> Result<()> {
    ctx.ensure_home()?;
    let store = ctx.threshold_store();
    let thresholds = store.reset()?;
    if !ctx.format.is_json() {
        println!("{}", Theme::success("Thresholds reset"));
    }
    print_thresholds(ctx, &store.path().display().to_string(), &thresholds, "Thresholds")
}

fn print_thresholds(
    ctx: &AppContext,
    path: &str,
    thresholds: &ThresholdConfig,
    title: &str,
) -> Result<()> {
    if ctx.format.is_json() {
        return print_json(&ThresholdsOutput {
            path: path.to_owned(),
            thresholds,
        });
    }
    println!("\n{}", Theme::header(title));
    println!(
        "{}",
        Theme::kv("Min occurrences", &thresholds.min_occurrences.to_string())
    );
    println!(
        "{}",
        Theme::kv(
            "Confidence threshold",
            &format!("{:.2}", thresholds.confidence_threshold)
        )
    );
    println!(
        "{}",
        Theme::kv(
            "Analysis window",
            &format!("{} days", thresholds.analysis_window_days)
        )
    );
    println!("{}", Theme::dimmed(path));
    Ok(())
}

//! Calibrate command - adjust thresholds from review outcomes.

use accord_learning::{Adjustment, CalibrationReport};
use anyhow::Result;
use serde::Serialize;

use crate::context::AppContext;
use crate::formatter::print_json;
use crate::theme::Theme;

#[derive(Serialize)]
struct CalibrateOutput<'a> {
    dry_run: bool,
    #[serde(flatten)]
    report: &'a CalibrationReport,
}

/// Calibrate the persisted thresholds; with `dry_run`, only show the result.
pub(crate) fn run_calibrate(ctx: &AppContext, dry_run: bool) -> Result<()> {
    let store = ctx.threshold_store();
    let current = store.load()?;
    let report = ctx.engine().calibrate(current)?;

    if !dry_run {
        ctx.ensure_home()?;
        store.save(&report.thresholds)?;
    }

    if ctx.format.is_json() {
        return print_json(&CalibrateOutput {
            dry_run,
            report: &report,
        });
    }

    println!("\n{}", Theme::header("Threshold Calibration"));
    println!(
        "{}",
        Theme::kv(
            "Before",
            &format!(
                "min occurrences {}, confidence {:.2}",
                current.min_occurrences, current.confidence_threshold
            )
        )
    );
    print_report(&report);
    if dry_run {
        println!("{}", Theme::info("Dry run: thresholds not saved"));
    }
    Ok(())
}

/// Print what a calibration run saw and did.
pub(crate) fn print_report(report: &CalibrationReport) {
    println!(
        "{}",
        Theme::kv(
            "Acceptance",
            &format!(
                "{} over {} outcome(s)",
                Theme::rate(report.acceptance_rate),
                report.sample_size
            )
        )
    );
    let direction = match report.adjustment {
        Adjustment::Tightened => "tightened",
        Adjustment::Relaxed => "relaxed",
        Adjustment::Unchanged => "unchanged",
    };
    let t = &report.thresholds;
    println!(
        "{}",
        Theme::kv(
            "Thresholds",
            &format!(
                "{direction}: min occurrences {}, confidence {:.2}",
                t.min_occurrences, t.confidence_threshold
            )
        )
    );
}

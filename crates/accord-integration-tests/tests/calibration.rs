//! Meta-calibration against a persisted outcome log and threshold file.

#![allow(clippy::arithmetic_side_effects)]

use accord_learning::{
    Adjustment, CalibrationPolicy, LearningEngine, ThresholdConfig, ThresholdStore,
};
use accord_log::SuggestionOutcome;
use accord_test::{TestHome, outcomes, reference_now};

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn low_acceptance_tightens_both_thresholds() {
    let home = TestHome::new();
    home.record_outcomes(&outcomes("git_read_only", 10, 2));

    let report = home.engine().calibrate(ThresholdConfig::default()).unwrap();

    assert_eq!(report.adjustment, Adjustment::Tightened);
    assert_eq!(report.sample_size, 10);
    assert!(close(report.acceptance_rate.unwrap(), 0.2));
    assert!(close(report.thresholds.confidence_threshold, 0.75));
    assert_eq!(report.thresholds.min_occurrences, 4);
    assert_eq!(report.thresholds.analysis_window_days, 30);
}

#[test]
fn high_acceptance_relaxes_confidence_only() {
    let home = TestHome::new();
    home.record_outcomes(&outcomes("test_runner", 10, 10));

    let report = home.engine().calibrate(ThresholdConfig::default()).unwrap();

    assert_eq!(report.adjustment, Adjustment::Relaxed);
    assert!(close(report.thresholds.confidence_threshold, 0.65));
    assert_eq!(report.thresholds.min_occurrences, 3);
}

#[test]
fn relaxing_is_floored() {
    let home = TestHome::new();
    home.record_outcomes(&outcomes("test_runner", 10, 10));
    let floor = ThresholdConfig {
        confidence_threshold: 0.5,
        ..ThresholdConfig::default()
    };

    let report = home.engine().calibrate(floor).unwrap();
    assert!(close(report.thresholds.confidence_threshold, 0.5));
}

#[test]
fn no_history_returns_input_exactly() {
    let home = TestHome::new();
    let current = ThresholdConfig {
        min_occurrences: 5,
        confidence_threshold: 0.8123,
        analysis_window_days: 12,
    };

    let report = home.engine().calibrate(current).unwrap();
    assert_eq!(report.thresholds, current);
    assert_eq!(report.adjustment, Adjustment::Unchanged);
    assert!(report.acceptance_rate.is_none());
}

#[test]
fn middling_acceptance_changes_nothing() {
    let home = TestHome::new();
    home.record_outcomes(&outcomes("git_all_safe", 10, 7));

    let report = home.engine().calibrate(ThresholdConfig::default()).unwrap();
    assert_eq!(report.adjustment, Adjustment::Unchanged);
    assert_eq!(report.thresholds, ThresholdConfig::default());
}

#[test]
fn disabled_policy_reports_without_adjusting() {
    let home = TestHome::new();
    home.record_outcomes(&outcomes("git_read_only", 10, 0));
    let engine = LearningEngine::new(home.approval_log(), home.outcome_log()).with_policy(
        CalibrationPolicy {
            enabled: false,
            ..CalibrationPolicy::default()
        },
    );

    let report = engine.calibrate(ThresholdConfig::default()).unwrap();
    assert_eq!(report.thresholds, ThresholdConfig::default());
    assert!(close(report.acceptance_rate.unwrap(), 0.0));
}

#[test]
fn only_the_most_recent_history_counts() {
    let home = TestHome::new();
    // 60 rejections followed by 50 acceptances: the default window of 50
    // only sees the acceptances.
    home.record_outcomes(&outcomes("git_read_only", 60, 0));
    home.record_outcomes(&outcomes("git_read_only", 50, 50));

    let report = home.engine().calibrate(ThresholdConfig::default()).unwrap();
    assert_eq!(report.sample_size, 50);
    assert_eq!(report.adjustment, Adjustment::Relaxed);
}

#[test]
fn repeated_calibration_stays_in_bounds() {
    let home = TestHome::new();
    let store = home.threshold_store();
    home.record_outcomes(&outcomes("git_read_only", 20, 0));

    for _ in 0..25 {
        let report = home.engine().calibrate(store.load().unwrap()).unwrap();
        store.save(&report.thresholds).unwrap();
    }
    let tightened = store.load().unwrap();
    assert!(close(tightened.confidence_threshold, 0.95));
    assert_eq!(tightened.min_occurrences, 6);

    home.record_outcomes(&outcomes("git_read_only", 50, 50));
    for _ in 0..25 {
        let report = home.engine().calibrate(store.load().unwrap()).unwrap();
        store.save(&report.thresholds).unwrap();
    }
    let relaxed = store.load().unwrap();
    assert!(close(relaxed.confidence_threshold, 0.5));
    // Relaxing never lowers min_occurrences.
    assert_eq!(relaxed.min_occurrences, 6);
}

#[test]
fn corrupt_outcome_lines_are_skipped() {
    let home = TestHome::new();
    home.record_outcomes(&outcomes("git_read_only", 4, 4));
    let path = home.home().outcome_log_path();
    let mut contents = std::fs::read_to_string(&path).unwrap();
    contents.push_str("{\"suggestion_category_id\": \"git_re\n");
    std::fs::write(&path, contents).unwrap();
    home.record_outcomes(&[SuggestionOutcome::new("git_read_only", true, 0.9).at(reference_now())]);

    let history = home.outcome_log().load().unwrap();
    assert_eq!(history.outcomes.len(), 5);
    assert_eq!(history.skipped, 1);

    let report = home.engine().calibrate(ThresholdConfig::default()).unwrap();
    assert_eq!(report.sample_size, 5);
}

#[test]
fn tampered_threshold_file_is_clamped() {
    let home = TestHome::new();
    let path = home.home().thresholds_path();
    std::fs::write(
        &path,
        r#"{"min_occurrences": 40, "confidence_threshold": 0.1, "analysis_window_days": 0}"#,
    )
    .unwrap();

    let loaded = ThresholdStore::new(&path, ThresholdConfig::default())
        .load()
        .unwrap();
    assert_eq!(loaded.min_occurrences, 6);
    assert!(close(loaded.confidence_threshold, 0.5));
    assert_eq!(loaded.analysis_window_days, 1);
}

//! Configuration layering feeding the learning defaults.

use accord_config::{Config, ConfigError, ConfigLayer};
use accord_learning::{ThresholdConfig, ThresholdStore};
use accord_test::TestHome;

fn write(path: &std::path::Path, contents: &str) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, contents).unwrap();
}

#[test]
fn workspace_config_seeds_initial_thresholds() {
    let home = TestHome::new();
    let project = home.project("app");
    write(
        &home.home().config_path(),
        "[learning]\nmin_occurrences = 4\nconfidence_threshold = 0.8\n",
    );
    write(
        &project.join(".accord").join("config.toml"),
        "[learning]\nanalysis_window_days = 14\n",
    );

    let resolved = Config::load_with_home(Some(project.as_path()), home.home().root()).unwrap();
    let learning = &resolved.config.learning;
    assert_eq!(resolved.loaded_files.len(), 2);
    assert_eq!(
        resolved.field_sources.get("learning.analysis_window_days"),
        Some(&ConfigLayer::Workspace)
    );

    let initial = ThresholdConfig {
        min_occurrences: learning.min_occurrences,
        confidence_threshold: learning.confidence_threshold,
        analysis_window_days: learning.analysis_window_days,
    };
    let store = ThresholdStore::new(home.home().thresholds_path(), initial);

    // Nothing persisted yet: the configured values apply.
    assert_eq!(store.load().unwrap(), initial);

    // After a save, the persisted values win over config.
    let calibrated = ThresholdConfig {
        confidence_threshold: 0.85,
        ..initial
    };
    store.save(&calibrated).unwrap();
    assert_eq!(store.load().unwrap(), calibrated);
    assert_eq!(store.reset().unwrap(), initial);
}

#[test]
fn out_of_range_config_is_rejected() {
    let home = TestHome::new();
    write(
        &home.home().config_path(),
        "[calibration]\nmax_confidence = 1.5\n",
    );

    let err = Config::load_with_home(None, home.home().root()).unwrap_err();
    assert!(matches!(err, ConfigError::ValidationError { .. }));
}

//! Bridge from `accord_config::Config` to domain types.

use std::path::{Path, PathBuf};

use accord_config::Config;
use accord_core::AccordHome;
use accord_learning::{CalibrationPolicy, ThresholdConfig};
use accord_telemetry::{FileRotation, LogConfig, LogFormat};

/// Resolved storage locations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct StoragePaths {
    pub(crate) approval_log: PathBuf,
    pub(crate) outcome_log: PathBuf,
    pub(crate) thresholds: PathBuf,
}

/// Convert the `[logging]` section to a telemetry [`LogConfig`].
pub(crate) fn to_log_config(cfg: &Config) -> LogConfig {
    let format = match cfg.logging.format.as_str() {
        "pretty" => LogFormat::Pretty,
        "json" => LogFormat::Json,
        "full" => LogFormat::Full,
        _ => LogFormat::Compact,
    };

    let mut log_config = LogConfig::new(cfg.logging.level.to_ascii_lowercase()).with_format(format);
    for directive in &cfg.logging.directives {
        log_config = log_config.with_directive(directive);
    }
    if let Some(dir) = &cfg.logging.file_dir {
        log_config = log_config.with_file_logging(expand_home(dir), FileRotation::Daily);
    }
    log_config
}

/// Initial thresholds from the `[learning]` section.
pub(crate) fn to_threshold_config(cfg: &Config) -> ThresholdConfig {
    ThresholdConfig {
        min_occurrences: cfg.learning.min_occurrences,
        confidence_threshold: cfg.learning.confidence_threshold,
        analysis_window_days: cfg.learning.analysis_window_days,
    }
}

/// Calibration policy from the `[calibration]` section.
pub(crate) fn to_calibration_policy(cfg: &Config) -> CalibrationPolicy {
    let c = &cfg.calibration;
    CalibrationPolicy {
        enabled: c.enabled,
        history_window: c.history_window,
        step: c.step,
        min_confidence: c.min_confidence,
        max_confidence: c.max_confidence,
        max_min_occurrences: c.max_min_occurrences,
        tighten_below: c.tighten_below,
        relax_above: c.relax_above,
    }
}

/// Storage paths, honouring `[storage]` overrides.
pub(crate) fn to_storage_paths(cfg: &Config, home: &AccordHome) -> StoragePaths {
    let pick = |overridden: Option<&str>, default: PathBuf| overridden.map_or(default, expand_home);
    let s = &cfg.storage;
    StoragePaths {
        approval_log: pick(s.approval_log.as_deref(), home.approval_log_path()),
        outcome_log: pick(s.outcome_log.as_deref(), home.outcome_log_path()),
        thresholds: pick(s.thresholds.as_deref(), home.thresholds_path()),
    }
}

/// The assistant settings file holding configured rules.
///
/// An explicit path wins, then `[rules] settings_path`, then the project's
/// `.claude/settings.local.json`, then `~/.claude/settings.json`.
pub(crate) fn settings_path(cfg: &Config, explicit: Option<&Path>, project: Option<&Path>) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    if let Some(path) = &cfg.rules.settings_path {
        return expand_home(path);
    }
    if let Some(project) = project {
        return project.join(".claude").join("settings.local.json");
    }
    user_home().map_or_else(
        || PathBuf::from(".claude").join("settings.json"),
        |home| home.join(".claude").join("settings.json"),
    )
}

/// Expand a leading `~/` to the user's home directory.
pub(crate) fn expand_home(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), user_home()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}

fn user_home() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.home_dir().to_path_buf())
}

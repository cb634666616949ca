//! Post-merge configuration validation.
//!
//! Config files are authored input, so out-of-range values are rejected
//! here rather than clamped.

use crate::error::{ConfigError, ConfigResult};
use crate::types::Config;

/// Bounds for persisted and configured thresholds.
const MIN_OCCURRENCES_RANGE: (u32, u32) = (1, 6);
const CONFIDENCE_RANGE: (f64, f64) = (0.5, 0.95);
const WINDOW_DAYS_RANGE: (u32, u32) = (1, 365);

const LOG_LEVELS: &[&str] = &["error", "warn", "info", "debug", "trace"];
const LOG_FORMATS: &[&str] = &["pretty", "compact", "json", "full"];

/// Validate a fully-merged and deserialized configuration.
///
/// # Errors
///
/// Returns the first validation error found.
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_learning(config)?;
    validate_calibration(config)?;
    validate_storage(config)?;
    validate_logging(config)?;
    Ok(())
}

fn invalid(field: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError {
        field: field.to_owned(),
        message: message.into(),
    }
}

fn check_confidence(field: &str, value: f64) -> ConfigResult<()> {
    let (lo, hi) = CONFIDENCE_RANGE;
    if !(lo..=hi).contains(&value) {
        return Err(invalid(
            field,
            format!("{value} is out of range; must be between {lo} and {hi}"),
        ));
    }
    Ok(())
}

fn check_rate(field: &str, value: f64) -> ConfigResult<()> {
    if !(0.0..=1.0).contains(&value) {
        return Err(invalid(
            field,
            format!("{value} is out of range; must be between 0.0 and 1.0"),
        ));
    }
    Ok(())
}

fn validate_learning(config: &Config) -> ConfigResult<()> {
    let l = &config.learning;

    let (lo, hi) = MIN_OCCURRENCES_RANGE;
    if !(lo..=hi).contains(&l.min_occurrences) {
        return Err(invalid(
            "learning.min_occurrences",
            format!("{} is out of range; must be between {lo} and {hi}", l.min_occurrences),
        ));
    }

    check_confidence("learning.confidence_threshold", l.confidence_threshold)?;

    let (lo, hi) = WINDOW_DAYS_RANGE;
    if !(lo..=hi).contains(&l.analysis_window_days) {
        return Err(invalid(
            "learning.analysis_window_days",
            format!(
                "{} is out of range; must be between {lo} and {hi}",
                l.analysis_window_days
            ),
        ));
    }

    if l.max_suggestions == 0 {
        return Err(invalid("learning.max_suggestions", "must be at least 1"));
    }
    Ok(())
}

fn validate_calibration(config: &Config) -> ConfigResult<()> {
    let c = &config.calibration;

    if c.history_window == 0 {
        return Err(invalid("calibration.history_window", "must be at least 1"));
    }
    if !(c.step > 0.0 && c.step <= 0.5) {
        return Err(invalid(
            "calibration.step",
            format!("{} is out of range; must be in (0.0, 0.5]", c.step),
        ));
    }

    check_confidence("calibration.min_confidence", c.min_confidence)?;
    check_confidence("calibration.max_confidence", c.max_confidence)?;
    if c.min_confidence > c.max_confidence {
        return Err(invalid(
            "calibration.min_confidence",
            "must not exceed calibration.max_confidence",
        ));
    }

    let (lo, hi) = MIN_OCCURRENCES_RANGE;
    if !(lo..=hi).contains(&c.max_min_occurrences) {
        return Err(invalid(
            "calibration.max_min_occurrences",
            format!(
                "{} is out of range; must be between {lo} and {hi}",
                c.max_min_occurrences
            ),
        ));
    }

    check_rate("calibration.tighten_below", c.tighten_below)?;
    check_rate("calibration.relax_above", c.relax_above)?;
    if c.tighten_below > c.relax_above {
        return Err(invalid(
            "calibration.tighten_below",
            "must not exceed calibration.relax_above",
        ));
    }
    Ok(())
}

fn validate_storage(config: &Config) -> ConfigResult<()> {
    let s = &config.storage;
    let paths = [
        ("storage.approval_log", &s.approval_log),
        ("storage.outcome_log", &s.outcome_log),
        ("storage.thresholds", &s.thresholds),
        ("rules.settings_path", &config.rules.settings_path),
    ];
    for (field, path) in paths {
        if path.as_deref().is_some_and(|p| p.trim().is_empty()) {
            return Err(invalid(field, "path must not be empty"));
        }
    }
    Ok(())
}

fn validate_logging(config: &Config) -> ConfigResult<()> {
    let l = &config.logging;
    if !LOG_LEVELS.contains(&l.level.to_ascii_lowercase().as_str()) {
        return Err(invalid(
            "logging.level",
            format!(
                "unknown level '{}'; expected one of: {}",
                l.level,
                LOG_LEVELS.join(", ")
            ),
        ));
    }
    if !LOG_FORMATS.contains(&l.format.as_str()) {
        return Err(invalid(
            "logging.format",
            format!(
                "unknown format '{}'; expected one of: {}",
                l.format,
                LOG_FORMATS.join(", ")
            ),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field_of(result: ConfigResult<()>) -> String {
        match result {
            Err(ConfigError::ValidationError { field, .. }) => field,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_defaults_valid() {
        assert!(validate(&Config::default()).is_ok());
    }

    #[test]
    fn test_min_occurrences_bounds() {
        let mut config = Config::default();
        config.learning.min_occurrences = 0;
        assert_eq!(field_of(validate(&config)), "learning.min_occurrences");
        config.learning.min_occurrences = 7;
        assert_eq!(field_of(validate(&config)), "learning.min_occurrences");
        config.learning.min_occurrences = 6;
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_confidence_bounds() {
        let mut config = Config::default();
        config.learning.confidence_threshold = 0.99;
        assert_eq!(field_of(validate(&config)), "learning.confidence_threshold");
        config.learning.confidence_threshold = f64::NAN;
        assert_eq!(field_of(validate(&config)), "learning.confidence_threshold");
    }

    #[test]
    fn test_window_bounds() {
        let mut config = Config::default();
        config.learning.analysis_window_days = 0;
        assert_eq!(field_of(validate(&config)), "learning.analysis_window_days");
    }

    #[test]
    fn test_calibration_ordering() {
        let mut config = Config::default();
        config.calibration.min_confidence = 0.9;
        config.calibration.max_confidence = 0.6;
        assert_eq!(field_of(validate(&config)), "calibration.min_confidence");

        let mut config = Config::default();
        config.calibration.tighten_below = 0.95;
        assert_eq!(field_of(validate(&config)), "calibration.tighten_below");
    }

    #[test]
    fn test_calibration_step() {
        let mut config = Config::default();
        config.calibration.step = 0.0;
        assert_eq!(field_of(validate(&config)), "calibration.step");
    }

    #[test]
    fn test_empty_path_rejected() {
        let mut config = Config::default();
        config.storage.approval_log = Some("  ".to_owned());
        assert_eq!(field_of(validate(&config)), "storage.approval_log");
    }

    #[test]
    fn test_logging() {
        let mut config = Config::default();
        config.logging.level = "DEBUG".to_owned();
        assert!(validate(&config).is_ok());
        config.logging.level = "loud".to_owned();
        assert_eq!(field_of(validate(&config)), "logging.level");

        let mut config = Config::default();
        config.logging.format = "xml".to_owned();
        assert_eq!(field_of(validate(&config)), "logging.format");
    }
}

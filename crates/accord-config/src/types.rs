//! Configuration types for accord.
//!
//! These types mirror the learning crate's knobs without depending on it;
//! the CLI converts them at startup. Every struct implements [`Default`]
//! with the same values as `defaults.toml`, so a bare `[section]` header
//! produces a working configuration.

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Initial thresholds and suggestion limits.
    pub learning: LearningSection,
    /// Threshold calibration from review outcomes.
    pub calibration: CalibrationSection,
    /// Overrides for where logs and thresholds live.
    pub storage: StorageSection,
    /// Where already-configured permission rules are read from.
    pub rules: RulesSection,
    /// Logging level, format, and per-crate directives.
    pub logging: LoggingSection,
}

// ---------------------------------------------------------------------------
// LearningSection
// ---------------------------------------------------------------------------

/// Thresholds used until calibration has persisted its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LearningSection {
    /// Matches a category needs before it is considered.
    pub min_occurrences: u32,
    /// Confidence a pattern needs to be suggested.
    pub confidence_threshold: f64,
    /// Days of approval history to analyze.
    pub analysis_window_days: u32,
    /// Most suggestions shown per run.
    pub max_suggestions: usize,
}

impl Default for LearningSection {
    fn default() -> Self {
        Self {
            min_occurrences: 3,
            confidence_threshold: 0.7,
            analysis_window_days: 30,
            max_suggestions: 5,
        }
    }
}

// ---------------------------------------------------------------------------
// CalibrationSection
// ---------------------------------------------------------------------------

/// How thresholds move in response to accept/reject feedback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationSection {
    /// Whether calibration runs after review.
    pub enabled: bool,
    /// Most recent outcomes considered.
    pub history_window: usize,
    /// Confidence change per adjustment.
    pub step: f64,
    /// Lowest confidence threshold calibration may set.
    pub min_confidence: f64,
    /// Highest confidence threshold calibration may set.
    pub max_confidence: f64,
    /// Highest `min_occurrences` calibration may set.
    pub max_min_occurrences: u32,
    /// Acceptance rate below which thresholds tighten.
    pub tighten_below: f64,
    /// Acceptance rate above which thresholds relax.
    pub relax_above: f64,
}

impl Default for CalibrationSection {
    fn default() -> Self {
        Self {
            enabled: true,
            history_window: 50,
            step: 0.05,
            min_confidence: 0.5,
            max_confidence: 0.95,
            max_min_occurrences: 6,
            tighten_below: 0.5,
            relax_above: 0.9,
        }
    }
}

// ---------------------------------------------------------------------------
// StorageSection
// ---------------------------------------------------------------------------

/// Optional path overrides. Unset paths live under the accord home.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSection {
    /// Approval log (JSON lines).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approval_log: Option<String>,
    /// Suggestion outcome log (JSON lines).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome_log: Option<String>,
    /// Persisted thresholds (JSON).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thresholds: Option<String>,
}

// ---------------------------------------------------------------------------
// RulesSection
// ---------------------------------------------------------------------------

/// Assistant settings file holding `permissions.allow`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesSection {
    /// Settings file to read configured rules from and apply accepted
    /// rules to. When unset the CLI picks one based on the project.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settings_path: Option<String>,
}

// ---------------------------------------------------------------------------
// LoggingSection
// ---------------------------------------------------------------------------

/// Log output settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Level filter (`error`, `warn`, `info`, `debug`, `trace`).
    pub level: String,
    /// Output format (`pretty`, `compact`, `json`, `full`).
    pub format: String,
    /// Extra filter directives such as `accord_learning=debug`.
    pub directives: Vec<String>,
    /// Write logs to rolling files in this directory instead of stderr.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_dir: Option<String>,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "warn".to_owned(),
            format: "compact".to_owned(),
            directives: Vec::new(),
            file_dir: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_sections_use_defaults() {
        let config: Config = toml::from_str("[learning]\n[calibration]\n[logging]\n").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_partial_section() {
        let config: Config = toml::from_str(
            r#"
            [learning]
            min_occurrences = 4

            [rules]
            settings_path = "/home/u/.claude/settings.json"
        "#,
        )
        .unwrap();
        assert_eq!(config.learning.min_occurrences, 4);
        assert!((config.learning.confidence_threshold - 0.7).abs() < f64::EPSILON);
        assert_eq!(
            config.rules.settings_path.as_deref(),
            Some("/home/u/.claude/settings.json")
        );
    }

    #[test]
    fn test_unset_paths_not_serialized() {
        let toml_str = toml::to_string(&Config::default()).unwrap();
        assert!(!toml_str.contains("approval_log"));
        assert!(!toml_str.contains("settings_path"));
        assert!(toml_str.contains("min_occurrences = 3"));
    }
}

//! Detection thresholds and their persistence between runs.

use serde::{Deserialize, Serialize};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::{LearningError, LearningResult};

/// Smallest allowed `min_occurrences`.
pub const MIN_OCCURRENCES_FLOOR: u32 = 1;
/// Largest allowed `min_occurrences`.
pub const MIN_OCCURRENCES_CEILING: u32 = 6;
/// Smallest allowed `confidence_threshold`.
pub const CONFIDENCE_FLOOR: f64 = 0.5;
/// Largest allowed `confidence_threshold`.
pub const CONFIDENCE_CEILING: f64 = 0.95;
/// Smallest allowed analysis window.
pub const WINDOW_DAYS_FLOOR: u32 = 1;
/// Largest allowed analysis window.
pub const WINDOW_DAYS_CEILING: u32 = 365;

/// Tunable parameters controlling detection.
///
/// Passed by value into each analysis run and returned by value from
/// calibration. Nothing mutates a `ThresholdConfig` in place mid-run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdConfig {
    /// Minimum matching approvals before a category is reported.
    pub min_occurrences: u32,
    /// Minimum confidence before a pattern is surfaced.
    pub confidence_threshold: f64,
    /// How far back to look, in days.
    pub analysis_window_days: u32,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            min_occurrences: 3,
            confidence_threshold: 0.7,
            analysis_window_days: 30,
        }
    }
}

impl ThresholdConfig {
    /// Whether every field lies within its bounds.
    #[must_use]
    pub fn is_within_bounds(&self) -> bool {
        (MIN_OCCURRENCES_FLOOR..=MIN_OCCURRENCES_CEILING).contains(&self.min_occurrences)
            && (CONFIDENCE_FLOOR..=CONFIDENCE_CEILING).contains(&self.confidence_threshold)
            && (WINDOW_DAYS_FLOOR..=WINDOW_DAYS_CEILING).contains(&self.analysis_window_days)
    }

    /// Clamp every field into its bounds, warning about each change.
    ///
    /// A non-finite confidence falls back to the default.
    #[must_use]
    pub fn clamped(self) -> Self {
        let min_occurrences = self
            .min_occurrences
            .clamp(MIN_OCCURRENCES_FLOOR, MIN_OCCURRENCES_CEILING);
        if min_occurrences != self.min_occurrences {
            warn!(
                value = self.min_occurrences,
                clamped = min_occurrences,
                "min_occurrences out of bounds"
            );
        }

        let confidence_threshold = if self.confidence_threshold.is_finite() {
            self.confidence_threshold
                .clamp(CONFIDENCE_FLOOR, CONFIDENCE_CEILING)
        } else {
            Self::default().confidence_threshold
        };
        if confidence_threshold.to_bits() != self.confidence_threshold.to_bits() {
            warn!(
                value = self.confidence_threshold,
                clamped = confidence_threshold,
                "confidence_threshold out of bounds"
            );
        }

        let analysis_window_days = self
            .analysis_window_days
            .clamp(WINDOW_DAYS_FLOOR, WINDOW_DAYS_CEILING);
        if analysis_window_days != self.analysis_window_days {
            warn!(
                value = self.analysis_window_days,
                clamped = analysis_window_days,
                "analysis_window_days out of bounds"
            );
        }

        Self {
            min_occurrences,
            confidence_threshold,
            analysis_window_days,
        }
    }
}

/// Round to four decimal places so repeated steps do not drift.
pub(crate) fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

/// Load-before, save-after persistence for [`ThresholdConfig`].
#[derive(Debug, Clone)]
pub struct ThresholdStore {
    path: PathBuf,
    initial: ThresholdConfig,
}

impl ThresholdStore {
    /// Store at `path`, falling back to `initial` when nothing is persisted.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, initial: ThresholdConfig) -> Self {
        Self {
            path: path.into(),
            initial,
        }
    }

    /// Path of the threshold file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Values used when nothing is persisted.
    #[must_use]
    pub fn initial(&self) -> ThresholdConfig {
        self.initial
    }

    /// Load the persisted thresholds.
    ///
    /// A missing file yields the initial values. A file that does not parse
    /// is logged and ignored. Out-of-range values are clamped.
    ///
    /// # Errors
    ///
    /// Returns [`LearningError::Thresholds`] if the file exists but cannot be read.
    pub fn load(&self) -> LearningResult<ThresholdConfig> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no persisted thresholds, using initial values");
                return Ok(self.initial.clamped());
            },
            Err(source) => {
                return Err(LearningError::Thresholds {
                    path: self.path.clone(),
                    source,
                });
            },
        };

        match serde_json::from_str::<ThresholdConfig>(&raw) {
            Ok(config) => Ok(config.clamped()),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "ignoring unparseable threshold file");
                Ok(self.initial.clamped())
            },
        }
    }

    /// Persist `thresholds` atomically.
    ///
    /// # Errors
    ///
    /// Returns [`LearningError::Thresholds`] if the file cannot be written.
    pub fn save(&self, thresholds: &ThresholdConfig) -> LearningResult<()> {
        let json = serde_json::to_string_pretty(thresholds)
            .map_err(|e| LearningError::Serialization(e.to_string()))?;
        write_atomic(&self.path, json.as_bytes()).map_err(|source| LearningError::Thresholds {
            path: self.path.clone(),
            source,
        })?;
        debug!(path = %self.path.display(), ?thresholds, "saved thresholds");
        Ok(())
    }

    /// Delete the persisted thresholds and return the initial values.
    ///
    /// # Errors
    ///
    /// Returns [`LearningError::Thresholds`] if the file exists but cannot be removed.
    pub fn reset(&self) -> LearningResult<ThresholdConfig> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {},
            Err(e) if e.kind() == ErrorKind::NotFound => {},
            Err(source) => {
                return Err(LearningError::Thresholds {
                    path: self.path.clone(),
                    source,
                });
            },
        }
        Ok(self.initial.clamped())
    }
}

/// Write `contents` to a temp file beside `path` and rename it into place.
pub(crate) fn write_atomic(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(contents)?;
    tmp.write_all(b"\n")?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_within_bounds() {
        let config = ThresholdConfig::default();
        assert_eq!(config.min_occurrences, 3);
        assert!((config.confidence_threshold - 0.7).abs() < f64::EPSILON);
        assert_eq!(config.analysis_window_days, 30);
        assert!(config.is_within_bounds());
    }

    #[test]
    fn test_clamped() {
        let config = ThresholdConfig {
            min_occurrences: 0,
            confidence_threshold: 1.5,
            analysis_window_days: 1000,
        }
        .clamped();
        assert_eq!(config.min_occurrences, 1);
        assert!((config.confidence_threshold - 0.95).abs() < f64::EPSILON);
        assert_eq!(config.analysis_window_days, 365);

        let nan = ThresholdConfig {
            confidence_threshold: f64::NAN,
            ..ThresholdConfig::default()
        }
        .clamped();
        assert!((nan.confidence_threshold - 0.7).abs() < f64::EPSILON);
    }

    #[test]
    fn test_clamped_is_identity_within_bounds() {
        let config = ThresholdConfig {
            min_occurrences: 4,
            confidence_threshold: 0.85,
            analysis_window_days: 14,
        };
        assert_eq!(config.clamped(), config);
    }

    #[test]
    fn test_round4() {
        assert!((round4(0.7 + 0.05 + 0.05) - 0.8).abs() < 1e-12);
        assert!((round4(0.123_456) - 0.1235).abs() < 1e-12);
    }

    #[test]
    fn test_store_missing_returns_initial() {
        let dir = tempfile::tempdir().unwrap();
        let initial = ThresholdConfig {
            min_occurrences: 2,
            ..ThresholdConfig::default()
        };
        let store = ThresholdStore::new(dir.path().join("thresholds.json"), initial);
        assert_eq!(store.load().unwrap(), initial);
    }

    #[test]
    fn test_store_save_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = ThresholdStore::new(dir.path().join("state/thresholds.json"), ThresholdConfig::default());
        let tuned = ThresholdConfig {
            min_occurrences: 4,
            confidence_threshold: 0.8,
            analysis_window_days: 14,
        };
        store.save(&tuned).unwrap();
        assert_eq!(store.load().unwrap(), tuned);
    }

    #[test]
    fn test_store_clamps_tampered_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("thresholds.json");
        std::fs::write(
            &path,
            r#"{"min_occurrences": 99, "confidence_threshold": 0.1, "analysis_window_days": 0}"#,
        )
        .unwrap();
        let loaded = ThresholdStore::new(&path, ThresholdConfig::default())
            .load()
            .unwrap();
        assert_eq!(loaded.min_occurrences, 6);
        assert!((loaded.confidence_threshold - 0.5).abs() < f64::EPSILON);
        assert_eq!(loaded.analysis_window_days, 1);
    }

    #[test]
    fn test_store_partial_file_uses_field_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("thresholds.json");
        std::fs::write(&path, r#"{"min_occurrences": 5}"#).unwrap();
        let loaded = ThresholdStore::new(&path, ThresholdConfig::default())
            .load()
            .unwrap();
        assert_eq!(loaded.min_occurrences, 5);
        assert_eq!(loaded.analysis_window_days, 30);
    }

    #[test]
    fn test_store_unparseable_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("thresholds.json");
        std::fs::write(&path, "not json").unwrap();
        let store = ThresholdStore::new(&path, ThresholdConfig::default());
        assert_eq!(store.load().unwrap(), ThresholdConfig::default());
    }

    #[test]
    fn test_store_reset() {
        let dir = tempfile::tempdir().unwrap();
        let store = ThresholdStore::new(dir.path().join("thresholds.json"), ThresholdConfig::default());
        store
            .save(&ThresholdConfig {
                min_occurrences: 6,
                ..ThresholdConfig::default()
            })
            .unwrap();
        assert_eq!(store.reset().unwrap(), ThresholdConfig::default());
        assert!(!store.path().exists());
        // Resetting twice is fine.
        assert_eq!(store.reset().unwrap(), ThresholdConfig::default());
    }
}

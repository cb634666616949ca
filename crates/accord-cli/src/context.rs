//! Per-invocation state shared by every command.

use std::path::{Path, PathBuf};

use accord_config::Config;
use accord_core::AccordHome;
use accord_learning::{ConfiguredRules, LearningEngine, ThresholdStore};
use accord_log::{ApprovalLog, OutcomeLog};
use anyhow::{Context, Result};

use crate::config_bridge::{self, StoragePaths};
use crate::formatter::OutputFormat;

/// Resolved home, configuration and output mode.
pub(crate) struct AppContext {
    pub(crate) home: AccordHome,
    pub(crate) config: Config,
    pub(crate) storage: StoragePaths,
    pub(crate) format: OutputFormat,
}

impl AppContext {
    /// Build the context from an already-loaded configuration.
    pub(crate) fn new(home: AccordHome, config: Config, format: OutputFormat) -> Self {
        let storage = config_bridge::to_storage_paths(&config, &home);
        Self {
            home,
            config,
            storage,
            format,
        }
    }

    /// Create the home directory if it does not exist yet.
    pub(crate) fn ensure_home(&self) -> Result<()> {
        self.home
            .ensure()
            .with_context(|| format!("failed to create {}", self.home.root().display()))
    }

    /// Learning engine over the configured logs.
    pub(crate) fn engine(&self) -> LearningEngine {
        LearningEngine::new(
            ApprovalLog::open(&self.storage.approval_log),
            OutcomeLog::open(&self.storage.outcome_log),
        )
        .with_policy(config_bridge::to_calibration_policy(&self.config))
        .with_max_suggestions(self.config.learning.max_suggestions)
    }

    /// Threshold store seeded from the `[learning]` section.
    pub(crate) fn threshold_store(&self) -> ThresholdStore {
        ThresholdStore::new(
            &self.storage.thresholds,
            config_bridge::to_threshold_config(&self.config),
        )
    }

    /// Rules already present in the assistant settings file.
    pub(crate) fn configured_rules(
        &self,
        explicit: Option<&Path>,
        project: Option<&Path>,
    ) -> Result<ConfiguredRules> {
        let path = self.settings_path(explicit, project);
        ConfiguredRules::load(&path)
            .with_context(|| format!("failed to read rules from {}", path.display()))
    }

    /// Settings file path for the given overrides.
    pub(crate) fn settings_path(&self, explicit: Option<&Path>, project: Option<&Path>) -> PathBuf {
        config_bridge::settings_path(&self.config, explicit, project)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_uses_storage_paths() {
        let dir = tempfile::tempdir().unwrap();
        let home = AccordHome::from_path(dir.path());
        let ctx = AppContext::new(home, Config::default(), OutputFormat::Pretty);

        let engine = ctx.engine();
        assert_eq!(engine.approvals().path(), dir.path().join("approvals.jsonl"));
        assert_eq!(engine.outcomes().path(), dir.path().join("outcomes.jsonl"));
        assert_eq!(ctx.threshold_store().path(), dir.path().join("thresholds.json"));
    }

    #[test]
    fn test_configured_rules_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = AppContext::new(
            AccordHome::from_path(dir.path()),
            Config::default(),
            OutputFormat::Json,
        );
        let settings = dir.path().join("settings.json");
        let rules = ctx.configured_rules(Some(settings.as_path()), None).unwrap();
        assert!(rules.is_empty());
        assert_eq!(rules.path(), Some(settings.as_path()));
    }
}

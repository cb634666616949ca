//! Test harness helpers.

use std::io::Write;
use std::path::{Path, PathBuf};

use accord_core::AccordHome;
use accord_learning::{ConfiguredRules, LearningEngine, ThresholdConfig, ThresholdStore};
use accord_log::{ApprovalEntry, ApprovalLog, OutcomeLog, SuggestionOutcome};
use tempfile::TempDir;
use tracing_subscriber::EnvFilter;

/// Set up logging for tests. Safe to call from every test.
pub fn setup_test_logging(filter: &str) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_test_writer()
        .try_init();
}

/// An accord home in a temporary directory, removed on drop.
///
/// Also hosts an assistant settings file at `.claude/settings.json` and any
/// number of project directories.
#[derive(Debug)]
pub struct TestHome {
    dir: TempDir,
    home: AccordHome,
}

impl Default for TestHome {
    fn default() -> Self {
        Self::new()
    }
}

impl TestHome {
    /// Create an empty home.
    ///
    /// # Panics
    ///
    /// Panics if the temporary directory cannot be created.
    #[must_use]
    pub fn new() -> Self {
        let dir = TempDir::with_prefix("accord-test").expect("Failed to create temp directory");
        let home = AccordHome::from_path(dir.path().join("home"));
        home.ensure().expect("Failed to create accord home");
        Self { dir, home }
    }

    /// The accord home layout.
    #[must_use]
    pub fn home(&self) -> &AccordHome {
        &self.home
    }

    /// Root of the temporary directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// The approval log.
    #[must_use]
    pub fn approval_log(&self) -> ApprovalLog {
        ApprovalLog::open(self.home.approval_log_path())
    }

    /// The outcome log.
    #[must_use]
    pub fn outcome_log(&self) -> OutcomeLog {
        OutcomeLog::open(self.home.outcome_log_path())
    }

    /// Threshold store starting from the defaults.
    #[must_use]
    pub fn threshold_store(&self) -> ThresholdStore {
        ThresholdStore::new(self.home.thresholds_path(), ThresholdConfig::default())
    }

    /// Currently persisted thresholds.
    ///
    /// # Panics
    ///
    /// Panics if the threshold file cannot be read.
    #[must_use]
    pub fn thresholds(&self) -> ThresholdConfig {
        self.threshold_store().load().expect("Failed to load thresholds")
    }

    /// Engine over this home's logs.
    #[must_use]
    pub fn engine(&self) -> LearningEngine {
        LearningEngine::new(self.approval_log(), self.outcome_log())
    }

    /// Append approvals to the log.
    ///
    /// # Panics
    ///
    /// Panics if the log cannot be written.
    pub fn record(&self, entries: &[ApprovalEntry]) {
        let log = self.approval_log();
        for entry in entries {
            log.append(entry).expect("Failed to append approval");
        }
    }

    /// Append outcomes to the log.
    ///
    /// # Panics
    ///
    /// Panics if the log cannot be written.
    pub fn record_outcomes(&self, outcomes: &[SuggestionOutcome]) {
        let log = self.outcome_log();
        for outcome in outcomes {
            log.append(outcome).expect("Failed to append outcome");
        }
    }

    /// Append a raw line to the approval log, e.g. a corrupt record.
    ///
    /// # Panics
    ///
    /// Panics if the log cannot be written.
    pub fn append_raw_approval_line(&self, line: &str) {
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.home.approval_log_path())
            .expect("Failed to open approval log");
        writeln!(file, "{line}").expect("Failed to write approval log");
    }

    /// Create a project directory and return its path.
    ///
    /// # Panics
    ///
    /// Panics if the directory cannot be created.
    #[must_use]
    pub fn project(&self, name: &str) -> PathBuf {
        let path = self.dir.path().join("projects").join(name);
        std::fs::create_dir_all(&path).expect("Failed to create project directory");
        path
    }

    /// Path of the assistant settings file.
    #[must_use]
    pub fn settings_path(&self) -> PathBuf {
        self.dir.path().join(".claude").join("settings.json")
    }

    /// Write a settings file whose allow list is `rules`.
    ///
    /// # Panics
    ///
    /// Panics if the file cannot be written.
    pub fn write_settings(&self, rules: &[&str]) {
        let path = self.settings_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create settings directory");
        }
        let settings = serde_json::json!({ "permissions": { "allow": rules } });
        std::fs::write(&path, settings.to_string()).expect("Failed to write settings");
    }

    /// Rules configured in the settings file.
    ///
    /// # Panics
    ///
    /// Panics if the settings file is invalid.
    #[must_use]
    pub fn configured_rules(&self) -> ConfiguredRules {
        ConfiguredRules::load(self.settings_path()).expect("Failed to load settings")
    }
}

//! Directory layout for accord state.
//!
//! Global state lives at `~/.accord/` (or `$ACCORD_HOME`):
//!
//! ```text
//! ~/.accord/                  (AccordHome)
//! ├── logs/                     (rolling diagnostic log files)
//! ├── approvals.jsonl           (append-only approval events)
//! ├── outcomes.jsonl            (append-only accept/reject feedback)
//! ├── thresholds.json           (calibrated detection thresholds)
//! └── config.toml               (user configuration)
//!
//! <project>/.accord/          (workspace layer)
//! └── config.toml               (project configuration overrides)
//! ```

use std::io;
use std::path::{Path, PathBuf};

/// Environment variable overriding the home directory.
pub const HOME_ENV: &str = "ACCORD_HOME";

/// Name of the per-project directory.
pub const WORKSPACE_DIR: &str = ".accord";

/// Global accord home directory (`~/.accord/` or `$ACCORD_HOME`).
#[derive(Debug, Clone)]
pub struct AccordHome {
    root: PathBuf,
}

impl AccordHome {
    /// Resolve the home directory.
    ///
    /// Checks `$ACCORD_HOME` first, then falls back to `$HOME/.accord/`.
    ///
    /// # Errors
    ///
    /// Returns an error if `$ACCORD_HOME` is relative, or if neither
    /// variable is set.
    pub fn resolve() -> io::Result<Self> {
        let root = if let Ok(custom) = std::env::var(HOME_ENV) {
            let p = PathBuf::from(&custom);
            if !p.is_absolute() {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    "ACCORD_HOME must be an absolute path",
                ));
            }
            p
        } else {
            let home = std::env::var("HOME").map_err(|_| {
                io::Error::new(
                    io::ErrorKind::NotFound,
                    "neither ACCORD_HOME nor HOME environment variable is set",
                )
            })?;
            PathBuf::from(home).join(WORKSPACE_DIR)
        };

        Ok(Self { root })
    }

    /// Create from an explicit path (useful for testing).
    #[must_use]
    pub fn from_path(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Ensure the directory structure exists with owner-only permissions.
    ///
    /// # Errors
    ///
    /// Returns an error if directory creation or permission setting fails.
    pub fn ensure(&self) -> io::Result<()> {
        std::fs::create_dir_all(self.logs_dir())?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o700);
            std::fs::set_permissions(self.root(), perms.clone())?;
            std::fs::set_permissions(self.logs_dir(), perms)?;
        }
        Ok(())
    }

    /// Root directory path.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Diagnostic logs directory (`~/.accord/logs/`).
    #[must_use]
    pub fn logs_dir(&self) -> PathBuf {
        self.root.join("logs")
    }

    /// Approval event log.
    #[must_use]
    pub fn approval_log_path(&self) -> PathBuf {
        self.root.join("approvals.jsonl")
    }

    /// Suggestion outcome log.
    #[must_use]
    pub fn outcome_log_path(&self) -> PathBuf {
        self.root.join("outcomes.jsonl")
    }

    /// Persisted detection thresholds.
    #[must_use]
    pub fn thresholds_path(&self) -> PathBuf {
        self.root.join("thresholds.json")
    }

    /// User configuration file.
    #[must_use]
    pub fn config_path(&self) -> PathBuf {
        self.root.join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout() {
        let home = AccordHome::from_path("/tmp/accord-home");
        assert_eq!(home.root(), Path::new("/tmp/accord-home"));
        assert_eq!(
            home.approval_log_path(),
            PathBuf::from("/tmp/accord-home/approvals.jsonl")
        );
        assert_eq!(
            home.outcome_log_path(),
            PathBuf::from("/tmp/accord-home/outcomes.jsonl")
        );
        assert_eq!(
            home.thresholds_path(),
            PathBuf::from("/tmp/accord-home/thresholds.json")
        );
        assert_eq!(home.logs_dir(), PathBuf::from("/tmp/accord-home/logs"));
    }

    #[test]
    fn test_ensure_creates_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let home = AccordHome::from_path(dir.path().join("home"));
        home.ensure().unwrap();
        assert!(home.logs_dir().is_dir());

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(home.root()).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o700);
        }
    }
}

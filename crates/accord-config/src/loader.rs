//! Config file discovery and layered loading.
//!
//! Implements the `Config::load()` algorithm:
//! 1. Parse `defaults.toml` → base
//! 2. Merge `{accord home}/config.toml` (user)
//! 3. Merge `{workspace}/.accord/config.toml` (workspace)
//! 4. Apply env var fallbacks for fields no file set
//! 5. Deserialize merged tree → `Config`
//! 6. Validate
//! 7. Return `ResolvedConfig`

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::env::{apply_env_fallbacks, collect_env_vars};
use crate::error::{ConfigError, ConfigResult};
use crate::merge::{ConfigLayer, FieldSources, deep_merge_tracking, record_leaves};
use crate::show::ResolvedConfig;
use crate::types::Config;
use crate::validate;

/// Embedded default configuration.
const DEFAULTS_TOML: &str = include_str!("defaults.toml");

/// Maximum allowed config file size (1 MiB).
const MAX_CONFIG_FILE_SIZE: u64 = 1_048_576;

/// Environment variable that relocates the accord home directory.
pub const HOME_ENV: &str = "ACCORD_HOME";

/// Directory name of the home and workspace config directories.
pub const CONFIG_DIR: &str = ".accord";

/// File name of every config layer.
pub const CONFIG_FILE: &str = "config.toml";

/// Load the configuration with layered file precedence.
///
/// `workspace_root` is the project the command runs against; if `None`,
/// the workspace layer is skipped. `home_override` replaces the accord home
/// directory (normally `$ACCORD_HOME` or `~/.accord`).
///
/// # Errors
///
/// Returns a [`ConfigError`] if any config file is unreadable, oversized or
/// malformed, or if the merged configuration fails validation.
pub fn load(workspace_root: Option<&Path>, home_override: Option<&Path>) -> ConfigResult<ResolvedConfig> {
    let env_vars = collect_env_vars();

    // 1. Embedded defaults.
    let mut merged: toml::Value =
        toml::from_str(DEFAULTS_TOML).map_err(|e| ConfigError::ParseError {
            path: "<embedded defaults>".to_owned(),
            source: e,
        })?;

    let mut field_sources = FieldSources::new();
    let mut loaded_files = Vec::new();
    record_leaves(&merged, "", ConfigLayer::Defaults, &mut field_sources);

    // 2. User config.
    let home = match home_override {
        Some(h) => h.to_path_buf(),
        None => home_dir(env_vars.get(HOME_ENV).map(String::as_str))?,
    };
    let user_path = home.join(CONFIG_FILE);
    if let Some(overlay) = try_load_file(&user_path)? {
        deep_merge_tracking(&mut merged, &overlay, "", ConfigLayer::User, &mut field_sources);
        info!(path = %user_path.display(), "loaded user config");
        loaded_files.push(user_path.display().to_string());
    }

    // 3. Workspace config.
    if let Some(ws_root) = workspace_root {
        let ws_path = workspace_config_path(ws_root);
        if let Some(overlay) = try_load_file(&ws_path)? {
            deep_merge_tracking(
                &mut merged,
                &overlay,
                "",
                ConfigLayer::Workspace,
                &mut field_sources,
            );
            info!(path = %ws_path.display(), "loaded workspace config");
            loaded_files.push(ws_path.display().to_string());
        }
    }

    // 4. Env var fallbacks.
    let env_count = apply_env_fallbacks(&mut merged, &mut field_sources, &env_vars);
    if env_count > 0 {
        debug!(count = env_count, "applied environment variable fallbacks");
    }

    // 5. Deserialize.
    let config: Config =
        merged
            .try_into()
            .map_err(|e: toml::de::Error| ConfigError::ParseError {
                path: "<merged config>".to_owned(),
                source: e,
            })?;

    // 6. Validate.
    validate::validate(&config)?;

    Ok(ResolvedConfig {
        config,
        field_sources,
        loaded_files,
    })
}

/// Load a config from a single file (no layering). Unset fields take their
/// defaults.
///
/// # Errors
///
/// Returns a [`ConfigError`] if the file cannot be read, parsed, or fails
/// validation.
pub fn load_file(path: &Path) -> ConfigResult<Config> {
    let overlay = try_load_file(path)?.ok_or_else(|| ConfigError::ReadError {
        path: path.display().to_string(),
        source: std::io::Error::from(std::io::ErrorKind::NotFound),
    })?;

    let config: Config = overlay.try_into().map_err(|e| ConfigError::ParseError {
        path: path.display().to_string(),
        source: e,
    })?;
    validate::validate(&config)?;
    Ok(config)
}

/// Resolve the accord home: `explicit` (normally `$ACCORD_HOME`) or
/// `~/.accord`.
///
/// # Errors
///
/// Returns [`ConfigError::NoHomeDir`] if neither is available.
pub fn home_dir(explicit: Option<&str>) -> ConfigResult<PathBuf> {
    if let Some(dir) = explicit.filter(|d| !d.trim().is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    directories::BaseDirs::new()
        .map(|d| d.home_dir().join(CONFIG_DIR))
        .ok_or(ConfigError::NoHomeDir)
}

/// `{workspace}/.accord/config.toml`.
#[must_use]
pub fn workspace_config_path(workspace_root: &Path) -> PathBuf {
    workspace_root.join(CONFIG_DIR).join(CONFIG_FILE)
}

/// Try to load a file, returning `None` if it doesn't exist.
///
/// Reads once and checks the size afterwards, so there is no window between
/// a metadata check and the read.
fn try_load_file(path: &Path) -> ConfigResult<Option<toml::Value>> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "config file not found, skipping");
            return Ok(None);
        },
        Err(e) => {
            return Err(ConfigError::ReadError {
                path: path.display().to_string(),
                source: e,
            });
        },
    };

    let size = u64::try_from(content.len()).unwrap_or(u64::MAX);
    if size > MAX_CONFIG_FILE_SIZE {
        return Err(ConfigError::FileTooLarge {
            path: path.display().to_string(),
            size,
            limit: MAX_CONFIG_FILE_SIZE,
        });
    }

    let value: toml::Value = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
        path: path.display().to_string(),
        source: e,
    })?;

    Ok(Some(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(path: &Path, content: &str) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    #[test]
    fn test_defaults_deserialize_to_config() {
        let config: Config = toml::from_str(DEFAULTS_TOML).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_without_files() {
        let home = tempfile::tempdir().unwrap();
        let resolved = load(None, Some(home.path())).unwrap();
        assert_eq!(resolved.config.learning, Config::default().learning);
        assert!(resolved.loaded_files.is_empty());
        assert_eq!(
            resolved.field_sources.get("learning.min_occurrences"),
            Some(&ConfigLayer::Defaults)
        );
    }

    #[test]
    fn test_workspace_overrides_user() {
        let home = tempfile::tempdir().unwrap();
        let project = tempfile::tempdir().unwrap();
        write(
            &home.path().join(CONFIG_FILE),
            "[learning]\nmin_occurrences = 4\nmax_suggestions = 8\n",
        );
        write(
            &workspace_config_path(project.path()),
            "[learning]\nmin_occurrences = 2\n",
        );

        let resolved = load(Some(project.path()), Some(home.path())).unwrap();
        assert_eq!(resolved.config.learning.min_occurrences, 2);
        assert_eq!(resolved.config.learning.max_suggestions, 8);
        assert_eq!(resolved.loaded_files.len(), 2);
        assert_eq!(
            resolved.field_sources.get("learning.min_occurrences"),
            Some(&ConfigLayer::Workspace)
        );
        assert_eq!(
            resolved.field_sources.get("learning.max_suggestions"),
            Some(&ConfigLayer::User)
        );
    }

    #[test]
    fn test_invalid_file_value_rejected() {
        let home = tempfile::tempdir().unwrap();
        write(
            &home.path().join(CONFIG_FILE),
            "[learning]\nconfidence_threshold = 0.2\n",
        );
        let err = load(None, Some(home.path())).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError { .. }));
    }

    #[test]
    fn test_malformed_file() {
        let home = tempfile::tempdir().unwrap();
        write(&home.path().join(CONFIG_FILE), "[learning\n");
        let err = load(None, Some(home.path())).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn test_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("c.toml");
        write(&path, "[calibration]\nenabled = false\n");
        let config = load_file(&path).unwrap();
        assert!(!config.calibration.enabled);
        assert_eq!(config.learning, Config::default().learning);
    }

    #[test]
    fn test_load_file_nonexistent() {
        let result = load_file(Path::new("/nonexistent/config.toml"));
        assert!(matches!(result, Err(ConfigError::ReadError { .. })));
    }

    #[test]
    fn test_home_dir_explicit() {
        assert_eq!(home_dir(Some("/data/accord")).unwrap(), PathBuf::from("/data/accord"));
    }

    #[test]
    fn test_oversized_config_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let file_path = dir.path().join("huge.toml");
        let data = "x = \"".to_owned() + &"a".repeat(1_100_000) + "\"";
        std::fs::write(&file_path, data).unwrap();

        let result = try_load_file(&file_path);
        assert!(matches!(result, Err(ConfigError::FileTooLarge { .. })));
    }
}

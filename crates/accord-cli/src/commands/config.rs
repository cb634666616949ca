//! CLI handlers for the `accord config` subcommand.

use std::path::Path;

use accord_config::env::env_fallbacks;
use accord_config::{ConfigResult, ResolvedConfig, ShowFormat};
use anyhow::Result;
use clap::ValueEnum;

use crate::config_bridge::{self, StoragePaths};
use crate::theme::Theme;

/// Output format for `config show`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum ConfigFormat {
    /// TOML annotated with the layer each value came from.
    #[default]
    Toml,
    /// Plain JSON.
    Json,
}

impl From<ConfigFormat> for ShowFormat {
    fn from(format: ConfigFormat) -> Self {
        match format {
            ConfigFormat::Toml => Self::Toml,
            ConfigFormat::Json => Self::Json,
        }
    }
}

/// Show the resolved configuration with source annotations.
pub(crate) fn show_config(
    resolved: &ResolvedConfig,
    format: ConfigFormat,
    section: Option<&str>,
) -> Result<()> {
    let output = resolved.show(format.into(), section).map_err(|_| match section {
        Some(name) => anyhow::anyhow!("unknown config section '{name}'"),
        None => anyhow::anyhow!("failed to format config"),
    })?;
    println!("{output}");
    Ok(())
}

/// Report whether the configuration loads and validates.
pub(crate) fn validate_config(loaded: &ConfigResult<ResolvedConfig>) -> Result<()> {
    match loaded {
        Ok(resolved) => {
            println!("{}", Theme::success("Configuration is valid"));
            if !resolved.loaded_files.is_empty() {
                println!("\nLoaded files:");
                for path in &resolved.loaded_files {
                    println!("  - {path}");
                }
            }
            Ok(())
        },
        Err(e) => anyhow::bail!("configuration error: {e}"),
    }
}

/// Show every config file consulted, the env fallbacks and storage paths.
#[allow(clippy::unnecessary_wraps)]
pub(crate) fn show_paths(
    home: &Path,
    workspace: Option<&Path>,
    storage: Option<&StoragePaths>,
) -> Result<()> {
    println!("Configuration files checked (lowest precedence first):\n");
    for (i, path) in ResolvedConfig::config_paths(home, workspace)
        .iter()
        .enumerate()
    {
        let status = if Path::new(path).exists() {
            "found"
        } else {
            "not found"
        };
        println!("  {}. {path}  [{status}]", i.saturating_add(1));
    }

    println!("\nEnvironment variable fallbacks:");
    for (var, field) in env_fallbacks() {
        println!("  {var:<28} -> {field}");
    }

    if let Some(storage) = storage {
        println!("\nStorage:");
        println!("  {}", Theme::kv("approvals", &storage.approval_log.display().to_string()));
        println!("  {}", Theme::kv("outcomes", &storage.outcome_log.display().to_string()));
        println!("  {}", Theme::kv("thresholds", &storage.thresholds.display().to_string()));
    }
    Ok(())
}

/// Storage paths for `config paths`, when the config loaded.
pub(crate) fn storage_for(
    loaded: &ConfigResult<ResolvedConfig>,
    home: &accord_core::AccordHome,
) -> Option<StoragePaths> {
    loaded
        .as_ref()
        .ok()
        .map(|r| config_bridge::to_storage_paths(&r.config, home))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_format_conversion() {
        assert_eq!(ShowFormat::from(ConfigFormat::Toml), ShowFormat::Toml);
        assert_eq!(ShowFormat::from(ConfigFormat::Json), ShowFormat::Json);
    }

    #[test]
    fn test_unknown_section_is_error() {
        let home = tempfile::tempdir().unwrap();
        let resolved = accord_config::Config::load_with_home(None, home.path()).unwrap();
        assert!(show_config(&resolved, ConfigFormat::Json, Some("nope")).is_err());
        assert!(show_config(&resolved, ConfigFormat::Toml, Some("learning")).is_ok());
    }

    #[test]
    fn test_validate_reports_error() {
        let home = tempfile::tempdir().unwrap();
        std::fs::write(
            home.path().join("config.toml"),
            "[learning]\nmin_occurrences = 0\n",
        )
        .unwrap();
        let loaded = accord_config::Config::load_with_home(None, home.path());
        assert!(validate_config(&loaded).is_err());
    }
}

//! Source-annotated display for `accord config show`.

use std::fmt::{self, Write as _};
use std::path::Path;

use crate::loader::{CONFIG_FILE, workspace_config_path};
use crate::merge::FieldSources;
use crate::types::Config;

/// A resolved configuration together with source annotations.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// The final merged configuration.
    pub config: Config,
    /// Dotted field path → which layer set the value.
    pub field_sources: FieldSources,
    /// Config files that were loaded, lowest precedence first.
    pub loaded_files: Vec<String>,
}

/// Output format for `config show`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShowFormat {
    /// TOML with inline comments showing the source of each value.
    Toml,
    /// JSON (for programmatic consumption).
    Json,
}

impl ResolvedConfig {
    /// Render the resolved config, optionally only one `section`.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails or `section` does not exist.
    pub fn show(&self, format: ShowFormat, section: Option<&str>) -> Result<String, fmt::Error> {
        match format {
            ShowFormat::Toml => self.show_toml(section),
            ShowFormat::Json => {
                let val = self.section_value(section)?;
                serde_json::to_string_pretty(&val).map_err(|_| fmt::Error)
            },
        }
    }

    fn section_value(&self, section: Option<&str>) -> Result<toml::Value, fmt::Error> {
        let val = toml::Value::try_from(&self.config).map_err(|_| fmt::Error)?;
        match section {
            Some(name) => val.get(name).cloned().ok_or(fmt::Error),
            None => Ok(val),
        }
    }

    fn show_toml(&self, section: Option<&str>) -> Result<String, fmt::Error> {
        let val = self.section_value(section)?;
        let toml_str = toml::to_string_pretty(&val).map_err(|_| fmt::Error)?;

        let mut output = String::new();
        output.push_str("# Resolved accord configuration\n");
        output.push_str("# Source annotations: [defaults] [user] [workspace] [env]\n");
        if !self.loaded_files.is_empty() {
            output.push_str("#\n# Loaded files (lowest precedence first):\n");
            for (i, path) in self.loaded_files.iter().enumerate() {
                writeln!(output, "#   {}. {path}", i.saturating_add(1))?;
            }
        }
        output.push('\n');

        let mut table = section.unwrap_or("").to_owned();
        for line in toml_str.lines() {
            let trimmed = line.trim();
            if let Some(header) = trimmed.strip_prefix('[').and_then(|h| h.strip_suffix(']')) {
                header.clone_into(&mut table);
            }
            match self.annotate(trimmed, &table) {
                Some(layer) => writeln!(output, "{line}  # [{layer}]")?,
                None => writeln!(output, "{line}")?,
            }
        }
        Ok(output)
    }

    /// Source of a `key = value` line inside `table`.
    fn annotate(&self, line: &str, table: &str) -> Option<String> {
        if line.is_empty() || line.starts_with('#') || line.starts_with('[') {
            return None;
        }
        let key = line.split('=').next()?.trim();
        let path = if table.is_empty() {
            key.to_owned()
        } else {
            format!("{table}.{key}")
        };
        self.field_sources.get(&path).map(ToString::to_string)
    }

    /// Every config file consulted during loading, lowest precedence first.
    #[must_use]
    pub fn config_paths(home: &Path, workspace_root: Option<&Path>) -> Vec<String> {
        let mut paths = vec![home.join(CONFIG_FILE).display().to_string()];
        match workspace_root {
            Some(ws) => paths.push(workspace_config_path(ws).display().to_string()),
            None => paths.push("{workspace}/.accord/config.toml".to_owned()),
        }
        paths
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merge::ConfigLayer;

    fn resolved(sources: FieldSources) -> ResolvedConfig {
        ResolvedConfig {
            config: Config::default(),
            field_sources: sources,
            loaded_files: vec!["/home/u/.accord/config.toml".to_owned()],
        }
    }

    #[test]
    fn test_show_toml_annotates_sources() {
        let mut sources = FieldSources::new();
        sources.insert("learning.min_occurrences".to_owned(), ConfigLayer::User);
        sources.insert("logging.level".to_owned(), ConfigLayer::Environment);

        let output = resolved(sources).show(ShowFormat::Toml, None).unwrap();
        assert!(output.contains("Resolved accord configuration"));
        assert!(output.contains("1. /home/u/.accord/config.toml"));
        assert!(output.contains("min_occurrences = 3  # [user]"));
        assert!(output.contains("level = \"warn\"  # [env]"));
    }

    #[test]
    fn test_show_json_default() {
        let output = resolved(FieldSources::new())
            .show(ShowFormat::Json, None)
            .unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed["learning"]["analysis_window_days"], 30);
    }

    #[test]
    fn test_show_section() {
        let output = resolved(FieldSources::new())
            .show(ShowFormat::Toml, Some("calibration"))
            .unwrap();
        assert!(output.contains("history_window = 50"));
        assert!(!output.contains("min_occurrences = 3"));
    }

    #[test]
    fn test_show_unknown_section() {
        assert!(
            resolved(FieldSources::new())
                .show(ShowFormat::Json, Some("nope"))
                .is_err()
        );
    }

    #[test]
    fn test_config_paths() {
        let paths = ResolvedConfig::config_paths(
            Path::new("/home/u/.accord"),
            Some(Path::new("/home/u/project")),
        );
        assert_eq!(
            paths,
            vec![
                "/home/u/.accord/config.toml".to_owned(),
                "/home/u/project/.accord/config.toml".to_owned(),
            ]
        );
    }
}

//! Rules already present in the assistant's settings.

use serde_json::{Map, Value};
use std::collections::{BTreeSet, HashSet};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::{LearningError, LearningResult};
use crate::threshold::write_atomic;

/// Set-membership query over applied permission rules.
pub trait RuleLookup {
    /// Whether `rule` is already configured.
    fn contains_rule(&self, rule: &str) -> bool;
}

impl RuleLookup for HashSet<String> {
    fn contains_rule(&self, rule: &str) -> bool {
        self.contains(rule)
    }
}

impl RuleLookup for BTreeSet<String> {
    fn contains_rule(&self, rule: &str) -> bool {
        self.contains(rule)
    }
}

impl RuleLookup for [String] {
    fn contains_rule(&self, rule: &str) -> bool {
        self.iter().any(|r| r == rule)
    }
}

/// The `permissions.allow` list of a settings file.
///
/// ```json
/// { "permissions": { "allow": ["Bash(git status)", "Read(/src/**)"] } }
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConfiguredRules {
    path: Option<PathBuf>,
    rules: BTreeSet<String>,
}

impl ConfiguredRules {
    /// No configured rules and no backing file.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// An in-memory set of rules.
    #[must_use]
    pub fn from_rules<I, S>(rules: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            path: None,
            rules: rules.into_iter().map(Into::into).collect(),
        }
    }

    /// Read the rules from a settings file. A missing file has no rules.
    ///
    /// # Errors
    ///
    /// Returns [`LearningError::Rules`] if the file cannot be read or is not
    /// valid settings JSON.
    pub fn load(path: impl Into<PathBuf>) -> LearningResult<Self> {
        let path = path.into();
        let rules = match read_settings(&path)? {
            Some(settings) => allow_list(&settings)
                .map_err(|message| rules_err(&path, message))?
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_owned)
                .collect(),
            None => {
                debug!(path = %path.display(), "settings file not found, no configured rules");
                BTreeSet::new()
            },
        };
        Ok(Self {
            path: Some(path),
            rules,
        })
    }

    /// Backing settings file, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Configured rules in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(String::as_str)
    }

    /// Number of configured rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether no rules are configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Add `rules` to the settings file's allow list and to this set.
    ///
    /// Other keys in the file are preserved. Rules already present are
    /// skipped. Returns how many rules were added.
    ///
    /// # Errors
    ///
    /// Returns [`LearningError::Rules`] if there is no backing file or it
    /// cannot be read, parsed or written.
    pub fn apply<S: AsRef<str>>(&mut self, rules: &[S]) -> LearningResult<usize> {
        let Some(path) = self.path.clone() else {
            return Err(LearningError::Rules {
                path: PathBuf::new(),
                message: "no settings file to apply rules to".to_owned(),
            });
        };

        let mut settings = read_settings(&path)?.unwrap_or_else(|| Value::Object(Map::new()));
        let allow = allow_list_mut(&mut settings).map_err(|message| rules_err(&path, message))?;

        let mut added: usize = 0;
        for rule in rules {
            let rule = rule.as_ref();
            let present = allow.iter().any(|v| v.as_str() == Some(rule));
            if !present {
                allow.push(Value::String(rule.to_owned()));
                added = added.saturating_add(1);
            }
            self.rules.insert(rule.to_owned());
        }

        if added > 0 {
            let json = serde_json::to_string_pretty(&settings)
                .map_err(|e| LearningError::Serialization(e.to_string()))?;
            write_atomic(&path, json.as_bytes()).map_err(|e| rules_err(&path, e.to_string()))?;
            info!(path = %path.display(), added, "applied permission rules");
        }
        Ok(added)
    }
}

impl RuleLookup for ConfiguredRules {
    fn contains_rule(&self, rule: &str) -> bool {
        self.rules.contains(rule)
    }
}

fn rules_err(path: &Path, message: impl Into<String>) -> LearningError {
    LearningError::Rules {
        path: path.to_path_buf(),
        message: message.into(),
    }
}

fn read_settings(path: &Path) -> LearningResult<Option<Value>> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(rules_err(path, e.to_string())),
    };
    if raw.trim().is_empty() {
        return Ok(None);
    }
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|e| rules_err(path, format!("invalid JSON: {e}")))
}

fn allow_list(settings: &Value) -> Result<&[Value], String> {
    let Some(object) = settings.as_object() else {
        return Err("settings must be a JSON object".to_owned());
    };
    match object.get("permissions").and_then(|p| p.get("allow")) {
        None => Ok(&[]),
        Some(Value::Array(items)) => Ok(items),
        Some(_) => Err("permissions.allow must be an array".to_owned()),
    }
}

fn allow_list_mut(settings: &mut Value) -> Result<&mut Vec<Value>, String> {
    let object = settings
        .as_object_mut()
        .ok_or_else(|| "settings must be a JSON object".to_owned())?;
    let permissions = object
        .entry("permissions")
        .or_insert_with(|| Value::Object(Map::new()))
        .as_object_mut()
        .ok_or_else(|| "permissions must be an object".to_owned())?;
    permissions
        .entry("allow")
        .or_insert_with(|| Value::Array(Vec::new()))
        .as_array_mut()
        .ok_or_else(|| "permissions.allow must be an array".to_owned())
}

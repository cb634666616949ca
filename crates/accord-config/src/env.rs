//! Environment variable fallbacks.
//!
//! Env vars are **fallback**, not override: they only fill fields that no
//! config file set.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::merge::{ConfigLayer, FieldSources};

/// Mapping from environment variable name to config field path.
struct EnvMapping {
    var_name: &'static str,
    field_path: &'static str,
    kind: ValueKind,
}

#[derive(Clone, Copy)]
enum ValueKind {
    Integer,
    Float,
    String,
}

/// All supported `ACCORD_*` env var mappings.
const ENV_MAPPINGS: &[EnvMapping] = &[
    EnvMapping {
        var_name: "ACCORD_LOG_LEVEL",
        field_path: "logging.level",
        kind: ValueKind::String,
    },
    EnvMapping {
        var_name: "ACCORD_MIN_OCCURRENCES",
        field_path: "learning.min_occurrences",
        kind: ValueKind::Integer,
    },
    EnvMapping {
        var_name: "ACCORD_CONFIDENCE_THRESHOLD",
        field_path: "learning.confidence_threshold",
        kind: ValueKind::Float,
    },
    EnvMapping {
        var_name: "ACCORD_ANALYSIS_WINDOW_DAYS",
        field_path: "learning.analysis_window_days",
        kind: ValueKind::Integer,
    },
    EnvMapping {
        var_name: "ACCORD_SETTINGS_PATH",
        field_path: "rules.settings_path",
        kind: ValueKind::String,
    },
];

/// Every `(env var, field path)` fallback pair.
pub fn env_fallbacks() -> impl Iterator<Item = (&'static str, &'static str)> {
    ENV_MAPPINGS.iter().map(|m| (m.var_name, m.field_path))
}

/// Apply environment variable fallbacks to fields that were **not** set by
/// any config file layer.
///
/// Values that do not parse as the field's type are ignored with a
/// warning. Returns the number of env vars applied.
pub fn apply_env_fallbacks<S: ::std::hash::BuildHasher>(
    merged: &mut toml::Value,
    sources: &mut FieldSources,
    env_vars: &HashMap<String, String, S>,
) -> usize {
    let mut count: usize = 0;

    for mapping in ENV_MAPPINGS {
        if sources.get(mapping.field_path).is_some_and(|l| l.is_file()) {
            continue;
        }
        let Some(raw) = env_vars.get(mapping.var_name) else {
            continue;
        };
        let Some(value) = coerce(mapping.kind, raw) else {
            warn!(
                var = mapping.var_name,
                value = %raw,
                "ignoring environment variable with invalid value"
            );
            continue;
        };

        debug!(
            var = mapping.var_name,
            field = mapping.field_path,
            "applying env var fallback"
        );
        set_field(merged, mapping.field_path, value);
        sources.insert(mapping.field_path.to_owned(), ConfigLayer::Environment);
        count = count.saturating_add(1);
    }

    count
}

fn coerce(kind: ValueKind, raw: &str) -> Option<toml::Value> {
    let raw = raw.trim();
    match kind {
        ValueKind::Integer => raw.parse::<i64>().ok().map(toml::Value::Integer),
        ValueKind::Float => raw.parse::<f64>().ok().map(toml::Value::Float),
        ValueKind::String if raw.is_empty() => None,
        ValueKind::String => Some(toml::Value::String(raw.to_owned())),
    }
}

/// Set `section.key` in the tree, creating the section table if needed.
fn set_field(root: &mut toml::Value, path: &str, value: toml::Value) {
    let Some((section, key)) = path.split_once('.') else {
        return;
    };
    let Some(root) = root.as_table_mut() else {
        return;
    };
    let table = root
        .entry(section)
        .or_insert_with(|| toml::Value::Table(toml::map::Map::new()));
    if let Some(table) = table.as_table_mut() {
        table.insert(key.to_owned(), value);
    }
}

/// Collect all current environment variables into a map.
#[must_use]
pub fn collect_env_vars() -> HashMap<String, String> {
    std::env::vars().collect()
}

//! Output mode selection and JSON rendering.

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::Serialize;

/// Output format mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Human-readable, coloured.
    #[default]
    Pretty,
    /// One JSON document on stdout.
    Json,
}

impl OutputFormat {
    /// Whether JSON output was requested.
    pub(crate) fn is_json(self) -> bool {
        self == Self::Json
    }
}

/// Print `value` as pretty JSON on stdout.
pub(crate) fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("failed to encode output")?;
    println!("{json}");
    Ok(())
}

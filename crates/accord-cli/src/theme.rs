//! CLI theme and styling.

use colored::Colorize;

/// CLI theme configuration.
pub(crate) struct Theme;

impl Theme {
    /// Format a header.
    pub(crate) fn header(text: &str) -> String {
        format!("{}", text.bold().cyan())
    }

    /// Format a success message.
    pub(crate) fn success(text: &str) -> String {
        format!("{} {}", "✓".green(), text)
    }

    /// Format a warning message.
    pub(crate) fn warning(text: &str) -> String {
        format!("{} {}", "!".yellow(), text.yellow())
    }

    /// Format an info message.
    pub(crate) fn info(text: &str) -> String {
        format!("{} {}", "i".blue(), text)
    }

    /// Format a dimmed message.
    pub(crate) fn dimmed(text: &str) -> String {
        format!("{}", text.dimmed())
    }

    /// Format a separator line.
    pub(crate) fn separator() -> String {
        "━".repeat(50).dimmed().to_string()
    }

    /// Format a key-value pair.
    pub(crate) fn kv(key: &str, value: &str) -> String {
        format!("{}: {}", key.bold(), value)
    }

    /// Format a proposed permission rule.
    pub(crate) fn rule(rule: &str) -> String {
        format!("{}", rule.bold().green())
    }

    /// Format a confidence score, coloured by strength.
    pub(crate) fn confidence(value: f64) -> String {
        let text = format!("{value:.2}");
        if value >= 0.85 {
            text.green().to_string()
        } else if value >= 0.7 {
            text.yellow().to_string()
        } else {
            text.red().to_string()
        }
    }

    /// Format an acceptance rate as a percentage.
    pub(crate) fn rate(rate: Option<f64>) -> String {
        match rate {
            Some(r) => format!("{:.0}%", r * 100.0),
            None => "n/a".dimmed().to_string(),
        }
    }
}

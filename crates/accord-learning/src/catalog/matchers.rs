//! Predicates over shell commands, one per built-in category.
//!
//! Each classifier returns the rule alternative a command falls under
//! (`"status"`, `"cargo test"`, `"rg"`), or `None` when it does not belong
//! to the category. Subcommands are compared as whole tokens, so `git
//! statuses` or `git push-status` never pass for `git status`. Compound
//! lines (`git status && rm -rf ~`) belong to no category.
//!
//! Proposed rules are prefix grants, so a category only accepts forms that
//! stay safe whatever arguments follow them. Anything its rule would cover,
//! the classifier accepts too.

use accord_core::ShellCommand;

/// Read-only git subcommands accepted with any arguments.
pub const GIT_READ_ONLY: &[&str] = &[
    "blame",
    "describe",
    "diff",
    "log",
    "ls-files",
    "rev-parse",
    "shortlog",
    "show",
    "status",
];

/// Flags that keep `git branch` a listing command.
const GIT_BRANCH_LIST_FLAGS: &[&str] = &[
    "--list",
    "-l",
    "-a",
    "--all",
    "-r",
    "--remotes",
    "-v",
    "-vv",
    "--verbose",
    "--show-current",
];

/// Rule alternative proposed for `git branch` listings.
pub const GIT_BRANCH_LIST: &str = "branch --list";

/// Non-destructive git subcommands beyond the read-only set, safe with any
/// arguments.
///
/// `checkout`, `switch`, `rebase`, `tag`, `restore` and `remote` are left
/// out: each has a destructive flag (`-f`, `--onto`, `-d`, `--worktree`,
/// `remove`) that a prefix rule cannot exclude.
pub const GIT_SAFE_WRITES: &[&str] = &["add", "commit", "fetch", "merge", "pull"];

/// Safe git forms that need a specific second token.
pub const GIT_SAFE_QUALIFIED: &[&str] = &["stash list", "stash show", "worktree list"];

/// Test runner invocations, longest prefix wins.
pub const TEST_RUNNERS: &[&str] = &[
    "cargo nextest",
    "cargo test",
    "go test",
    "jest",
    "make test",
    "nix flake check",
    "npm run test",
    "npm test",
    "pnpm test",
    "pytest",
    "python -m pytest",
    "python3 -m pytest",
    "uv run pytest",
    "vitest",
    "yarn test",
];

/// Linters and formatters.
pub const LINTERS_FORMATTERS: &[&str] = &[
    "alejandra",
    "black",
    "cargo clippy",
    "cargo fmt",
    "eslint",
    "flake8",
    "gofmt",
    "isort",
    "mypy",
    "nixfmt",
    "prettier",
    "pylint",
    "ruff",
    "rustfmt",
    "shellcheck",
    "statix",
];

/// Modern replacements for legacy Unix tools.
pub const MODERN_CLI_TOOLS: &[&str] = &[
    "bat", "btm", "delta", "duf", "dust", "eza", "exa", "fd", "fzf", "hyperfine", "jq", "procs",
    "rg", "sd", "tokei", "yq", "zoxide",
];

fn arg(command: &ShellCommand, index: usize) -> Option<&str> {
    command.args().get(index).map(String::as_str)
}

/// The command, if it runs a single program.
fn simple(command: &ShellCommand) -> Option<&ShellCommand> {
    (!command.is_compound()).then_some(command)
}

fn is_git(command: &ShellCommand) -> bool {
    command.program() == Some("git")
}

/// Classify a read-only git command.
#[must_use]
pub fn git_read_only(command: &ShellCommand) -> Option<String> {
    let command = simple(command)?;
    if !is_git(command) {
        return None;
    }
    let sub = arg(command, 0)?;

    if GIT_READ_ONLY.contains(&sub) {
        return Some(sub.to_owned());
    }

    if sub == "branch" {
        let rest = command.args().get(1..).unwrap_or_default();
        // `--list` excludes every other branch mode, so git rejects
        // `--list -D` instead of deleting.
        let listing = rest.first().is_some_and(|a| a == "--list")
            || rest
                .iter()
                .all(|a| GIT_BRANCH_LIST_FLAGS.contains(&a.as_str()));
        return listing.then(|| GIT_BRANCH_LIST.to_owned());
    }

    None
}

/// Classify a non-destructive git command, read-only ones included.
#[must_use]
pub fn git_all_safe(command: &ShellCommand) -> Option<String> {
    if let Some(read_only) = git_read_only(command) {
        return Some(read_only);
    }
    let command = simple(command)?;
    if !is_git(command) {
        return None;
    }

    let sub = arg(command, 0)?;
    if GIT_SAFE_WRITES.contains(&sub) {
        return Some(sub.to_owned());
    }

    let qualified = format!("{sub} {}", arg(command, 1)?);
    GIT_SAFE_QUALIFIED
        .contains(&qualified.as_str())
        .then_some(qualified)
}

/// Rule alternatives covering every safe git command.
#[must_use]
pub fn git_all_safe_vocabulary() -> Vec<&'static str> {
    GIT_READ_ONLY
        .iter()
        .chain(std::iter::once(&GIT_BRANCH_LIST))
        .chain(GIT_SAFE_WRITES)
        .chain(GIT_SAFE_QUALIFIED)
        .copied()
        .collect()
}

/// Rule alternatives covering every read-only git command.
#[must_use]
pub fn git_read_only_vocabulary() -> Vec<&'static str> {
    GIT_READ_ONLY
        .iter()
        .chain(std::iter::once(&GIT_BRANCH_LIST))
        .copied()
        .collect()
}

/// Find the longest entry of `table` the command starts with.
fn longest_prefix(command: &ShellCommand, table: &[&'static str]) -> Option<String> {
    let command = simple(command)?;
    table
        .iter()
        .filter(|entry| {
            let prefix: Vec<&str> = entry.split_whitespace().collect();
            command.starts_with(&prefix)
        })
        .max_by_key(|entry| entry.split_whitespace().count())
        .map(|entry| (*entry).to_owned())
}

/// Classify a test runner invocation.
#[must_use]
pub fn test_runner(command: &ShellCommand) -> Option<String> {
    longest_prefix(command, TEST_RUNNERS)
}

/// Classify a linter or formatter invocation.
#[must_use]
pub fn linter_formatter(command: &ShellCommand) -> Option<String> {
    longest_prefix(command, LINTERS_FORMATTERS)
}

/// Classify a modern CLI tool invocation.
#[must_use]
pub fn modern_cli_tool(command: &ShellCommand) -> Option<String> {
    let program = simple(command)?.program()?;
    MODERN_CLI_TOOLS
        .contains(&program)
        .then(|| program.to_owned())
}

/// Whether the command runs one of the programs named in `table`.
fn runs_program_from(command: &ShellCommand, table: &[&str]) -> bool {
    command.program().is_some_and(|program| {
        table
            .iter()
            .any(|entry| entry.split_whitespace().next() == Some(program))
    })
}

/// Family of git near misses: any git command.
#[must_use]
pub fn git_family(command: &ShellCommand) -> bool {
    is_git(command)
}

/// Family of test runner near misses: programs that can run tests.
#[must_use]
pub fn test_runner_family(command: &ShellCommand) -> bool {
    runs_program_from(command, TEST_RUNNERS)
}

/// Family of linter near misses: programs that can lint or format.
#[must_use]
pub fn linter_formatter_family(command: &ShellCommand) -> bool {
    runs_program_from(command, LINTERS_FORMATTERS)
}

#[cfg(test)]
#[path = "matchers_tests.rs"]
mod tests;

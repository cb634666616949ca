//! Generalized permission rules proposed from detected patterns.
//!
//! Rules use the assistant's own permission syntax with two extensions:
//!
//! - `{a,b}` alternation, in the tool position or the argument
//! - a trailing `:*` on shell rules, meaning "this command prefix with any
//!   further arguments"
//!
//! ```text
//! Bash(git {diff,log,status}:*)
//! Bash(cargo test:*)
//! {Edit,Read}(/home/user/project/**)
//! ```

use accord_core::Permission;
use accord_core::permission::SHELL_TOOL;
use globset::{GlobBuilder, GlobMatcher};
use serde::{Serialize, Serializer};
use std::fmt;
use std::path::{Component, Path, PathBuf};

/// What a rule's argument matches.
#[derive(Debug, Clone, PartialEq, Eq)]
enum RuleTarget {
    /// Shell commands starting with `stem` followed by one of `alternatives`,
    /// compared token by token.
    CommandPrefix {
        stem: Vec<String>,
        alternatives: Vec<Vec<String>>,
    },
    /// Any path under `root`.
    Subtree { root: PathBuf },
}

/// A rule proposed to replace a family of individual approvals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProposedRule {
    tools: Vec<String>,
    target: RuleTarget,
}

impl ProposedRule {
    /// Shell prefix rule, e.g. `Bash(git {diff,log}:*)`.
    ///
    /// `stem` is the shared leading command (`git`), if any. Alternatives are
    /// sorted and de-duplicated so the rendering is stable between runs.
    #[must_use]
    pub fn command_prefix<I, S>(stem: Option<&str>, alternatives: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut alternatives: Vec<Vec<String>> = alternatives
            .into_iter()
            .map(|alt| tokenize(alt.as_ref()))
            .filter(|alt| !alt.is_empty())
            .collect();
        alternatives.sort();
        alternatives.dedup();

        Self {
            tools: vec![SHELL_TOOL.to_owned()],
            target: RuleTarget::CommandPrefix {
                stem: stem.map(tokenize).unwrap_or_default(),
                alternatives,
            },
        }
    }

    /// File rule covering `tools` on everything under `root`, e.g.
    /// `{Edit,Read}(/home/user/project/**)`.
    #[must_use]
    pub fn subtree<I, S>(tools: I, root: impl Into<PathBuf>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut tools: Vec<String> = tools.into_iter().map(Into::into).collect();
        tools.sort();
        tools.dedup();
        Self {
            tools,
            target: RuleTarget::Subtree { root: root.into() },
        }
    }

    /// Tools the rule applies to.
    #[must_use]
    pub fn tools(&self) -> &[String] {
        &self.tools
    }

    /// Whether an approval of `permission` would be auto-approved by this rule.
    #[must_use]
    pub fn covers(&self, permission: &Permission) -> bool {
        if !self.tools.iter().any(|t| t == permission.tool()) {
            return false;
        }

        match &self.target {
            RuleTarget::CommandPrefix { stem, alternatives } => {
                let Some(command) = permission.command().filter(|c| !c.is_compound()) else {
                    return false;
                };
                let mut tokens: Vec<&str> = Vec::with_capacity(command.tokens().len());
                if let Some(program) = command.program() {
                    tokens.push(program);
                }
                tokens.extend(command.args().iter().map(String::as_str));

                let Some(rest) = strip_tokens(&tokens, stem) else {
                    return false;
                };
                if alternatives.is_empty() {
                    return true;
                }
                alternatives
                    .iter()
                    .any(|alt| strip_tokens(rest, alt).is_some())
            },
            RuleTarget::Subtree { root } => {
                let Some(path) = permission.path().filter(|_| !permission.is_shell_expanded())
                else {
                    return false;
                };
                let absolute = if path.is_relative() {
                    root.join(path)
                } else {
                    path.to_path_buf()
                };
                matches_subtree(root, &absolute)
            },
        }
    }
}

/// Remove `prefix` from the front of `tokens`, whole tokens only.
fn strip_tokens<'a>(tokens: &'a [&'a str], prefix: &[String]) -> Option<&'a [&'a str]> {
    if prefix.len() > tokens.len() {
        return None;
    }
    let (head, rest) = tokens.split_at(prefix.len());
    head.iter()
        .zip(prefix)
        .all(|(a, b)| *a == b.as_str())
        .then_some(rest)
}

fn tokenize(s: &str) -> Vec<String> {
    s.split_whitespace().map(str::to_owned).collect()
}

/// Check that `path` lies under `root`, with path traversal protection.
fn matches_subtree(root: &Path, path: &Path) -> bool {
    if path
        .components()
        .any(|c| matches!(c, Component::ParentDir))
    {
        return false;
    }

    subtree_matcher(root).is_some_and(|m| m.is_match(path))
}

fn subtree_matcher(root: &Path) -> Option<GlobMatcher> {
    let root = root.to_str()?.trim_end_matches('/');
    let pattern = format!("{}/**", globset::escape(root));
    GlobBuilder::new(&pattern)
        .literal_separator(true)
        .build()
        .ok()
        .map(|glob| glob.compile_matcher())
}

fn write_group(f: &mut fmt::Formatter<'_>, items: &[String]) -> fmt::Result {
    match items {
        [single] => f.write_str(single),
        _ => write!(f, "{{{}}}", items.join(",")),
    }
}

impl fmt::Display for ProposedRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_group(f, &self.tools)?;
        f.write_str("(")?;
        match &self.target {
            RuleTarget::CommandPrefix { stem, alternatives } => {
                let stem = stem.join(" ");
                let alternatives: Vec<String> =
                    alternatives.iter().map(|alt| alt.join(" ")).collect();
                f.write_str(&stem)?;
                if !stem.is_empty() && !alternatives.is_empty() {
                    f.write_str(" ")?;
                }
                if !alternatives.is_empty() {
                    write_group(f, &alternatives)?;
                }
                f.write_str(":*")?;
            },
            RuleTarget::Subtree { root } => {
                write!(f, "{}/**", root.display().to_string().trim_end_matches('/'))?;
            },
        }
        f.write_str(")")
    }
}

impl Serialize for ProposedRule {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

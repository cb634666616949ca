//! The registry of pattern categories.
//!
//! A category is a named predicate over permission strings plus the recipe
//! for the rule it proposes. The built-in set is a fixed table iterated
//! uniformly by the detector; adding a category is one more entry in
//! [`PatternCatalog::builtin`].

pub mod matchers;

use accord_core::permission::FILE_TOOLS;
use accord_core::{FileAccess, Permission, ShellCommand};
use std::path::Path;

/// Categories whose proposed rule lists a fixed vocabulary.
type Vocabulary = fn() -> Vec<&'static str>;

/// How a category recognises a permission.
#[derive(Debug, Clone, Copy)]
pub enum Matcher {
    /// Shell commands. The classifier returns the rule alternative the
    /// command falls under. Compound lines never reach it.
    Shell(fn(&ShellCommand) -> Option<String>),
    /// File tools targeting a path under the approval's project root.
    ProjectFiles,
}

/// How a category turns its matches into a rule.
#[derive(Debug, Clone, Copy)]
pub enum RuleRecipe {
    /// `Bash(<stem> {<vocabulary>}:*)` with the full vocabulary, so the rule
    /// does not change as more commands are observed.
    FixedVocabulary {
        /// Shared leading command.
        stem: &'static str,
        /// Every alternative the category accepts.
        vocabulary: Vocabulary,
    },
    /// `Bash({<observed>}:*)` over the alternatives actually observed.
    Observed,
    /// The observed file tools rooted at the project.
    ProjectTools,
    /// Every file tool rooted at the project.
    AllFileTools,
}

/// Extra evidence a category needs beyond `min_occurrences`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    /// No extra requirement.
    None,
    /// At least this many distinct `(tool, path)` targets, including both a
    /// read and a write.
    BroadAccess {
        /// Minimum distinct targets.
        min_targets: usize,
    },
}

/// A named pattern category.
#[derive(Debug, Clone, Copy)]
pub struct PatternCategory {
    /// Stable identifier, recorded in outcomes.
    pub id: &'static str,
    /// Short human-readable name.
    pub title: &'static str,
    /// Predicate over permissions.
    pub matcher: Matcher,
    /// Rule construction.
    pub recipe: RuleRecipe,
    /// Additional evidence required.
    pub gate: Gate,
    /// Related commands the category deliberately does not match, used for
    /// near-miss examples. `None` when there is no natural notion of one.
    pub family: Option<fn(&Permission, Option<&Path>) -> bool>,
    /// Illustrative risky neighbours shown after observed near misses.
    pub near_misses: &'static [&'static str],
}

impl PatternCategory {
    /// Classify a permission approved in `project`.
    ///
    /// Returns the rule alternative for shell categories and the tool name
    /// for file categories.
    #[must_use]
    pub fn classify(&self, permission: &Permission, project: Option<&Path>) -> Option<String> {
        match self.matcher {
            Matcher::Shell(classify) => {
                let command = permission.command().filter(|c| !c.is_compound())?;
                classify(&command)
            },
            Matcher::ProjectFiles => {
                let root = project?;
                permission
                    .is_under(root)
                    .then(|| permission.tool().to_owned())
            },
        }
    }

    /// Whether the category matches a permission approved in `project`.
    #[must_use]
    pub fn matches(&self, permission: &Permission, project: Option<&Path>) -> bool {
        self.classify(permission, project).is_some()
    }

    /// Whether the permission is related to this category, matched or not.
    #[must_use]
    pub fn is_related(&self, permission: &Permission, project: Option<&Path>) -> bool {
        self.family.is_some_and(|family| family(permission, project))
    }

    /// Whether matches are pooled per project root rather than globally.
    #[must_use]
    pub fn is_project_scoped(&self) -> bool {
        matches!(self.matcher, Matcher::ProjectFiles)
    }
}

fn git_family(permission: &Permission, _project: Option<&Path>) -> bool {
    permission
        .command()
        .is_some_and(|c| matchers::git_family(&c))
}

fn test_runner_family(permission: &Permission, _project: Option<&Path>) -> bool {
    permission
        .command()
        .is_some_and(|c| matchers::test_runner_family(&c))
}

fn linter_formatter_family(permission: &Permission, _project: Option<&Path>) -> bool {
    permission
        .command()
        .is_some_and(|c| matchers::linter_formatter_family(&c))
}

/// File tool calls that land outside the project root.
fn outside_project(permission: &Permission, project: Option<&Path>) -> bool {
    project.is_some_and(|root| permission.path().is_some() && !permission.is_under(root))
}

/// Every file tool name.
#[must_use]
pub fn all_file_tools() -> Vec<&'static str> {
    FILE_TOOLS.iter().map(|(name, _)| *name).collect()
}

/// Whether `tool` writes.
#[must_use]
pub fn is_write_tool(tool: &str) -> bool {
    FILE_TOOLS
        .iter()
        .any(|(name, access)| *name == tool && *access == FileAccess::Write)
}

/// The fixed set of categories evaluated on one run.
#[derive(Debug, Clone)]
pub struct PatternCatalog {
    categories: Vec<PatternCategory>,
}

impl Default for PatternCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl PatternCatalog {
    /// The built-in categories.
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            categories: vec![
                PatternCategory {
                    id: "git_read_only",
                    title: "Read-only git commands",
                    matcher: Matcher::Shell(matchers::git_read_only),
                    recipe: RuleRecipe::FixedVocabulary {
                        stem: "git",
                        vocabulary: matchers::git_read_only_vocabulary,
                    },
                    gate: Gate::None,
                    family: Some(git_family),
                    near_misses: &["git push", "git reset --hard", "git clean -fd"],
                },
                PatternCategory {
                    id: "git_all_safe",
                    title: "Non-destructive git commands",
                    matcher: Matcher::Shell(matchers::git_all_safe),
                    recipe: RuleRecipe::FixedVocabulary {
                        stem: "git",
                        vocabulary: matchers::git_all_safe_vocabulary,
                    },
                    gate: Gate::None,
                    family: Some(git_family),
                    near_misses: &["git push --force", "git reset --hard", "git branch -D main"],
                },
                PatternCategory {
                    id: "test_runner",
                    title: "Test runner invocations",
                    matcher: Matcher::Shell(matchers::test_runner),
                    recipe: RuleRecipe::Observed,
                    gate: Gate::None,
                    family: Some(test_runner_family),
                    near_misses: &["cargo publish", "npm publish", "pip install -e ."],
                },
                PatternCategory {
                    id: "linter_formatter",
                    title: "Linters and formatters",
                    matcher: Matcher::Shell(matchers::linter_formatter),
                    recipe: RuleRecipe::Observed,
                    gate: Gate::None,
                    family: Some(linter_formatter_family),
                    near_misses: &["cargo publish", "npm publish", "rm -rf node_modules"],
                },
                PatternCategory {
                    id: "modern_cli_tools",
                    title: "Modern CLI tools",
                    matcher: Matcher::Shell(matchers::modern_cli_tool),
                    recipe: RuleRecipe::Observed,
                    gate: Gate::None,
                    family: None,
                    near_misses: &["rm -rf build", "curl -fsSL https://example.com/install.sh"],
                },
                PatternCategory {
                    id: "file_operations",
                    title: "File operations in the project",
                    matcher: Matcher::ProjectFiles,
                    recipe: RuleRecipe::ProjectTools,
                    gate: Gate::None,
                    family: Some(outside_project),
                    near_misses: &["Write(/etc/hosts)", "Edit(/etc/profile)", "Read(/var/log/auth.log)"],
                },
                PatternCategory {
                    id: "project_full_access",
                    title: "Full file access to the project",
                    matcher: Matcher::ProjectFiles,
                    recipe: RuleRecipe::AllFileTools,
                    gate: Gate::BroadAccess { min_targets: 5 },
                    family: None,
                    near_misses: &[],
                },
            ],
        }
    }

    /// A catalog of custom categories.
    #[must_use]
    pub fn new(categories: Vec<PatternCategory>) -> Self {
        Self { categories }
    }

    /// Categories in evaluation order.
    #[must_use]
    pub fn categories(&self) -> &[PatternCategory] {
        &self.categories
    }

    /// Look up a category by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&PatternCategory> {
        self.categories.iter().find(|c| c.id == id)
    }

    /// Number of categories.
    #[must_use]
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    /// Whether the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

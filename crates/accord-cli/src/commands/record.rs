//! Record command - append one approval to the log.

use std::io::Read;
use std::path::PathBuf;

use accord_core::SessionId;
use accord_log::{ApprovalEntry, ApprovalLog};
use anyhow::{Context, Result, bail};
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::context::AppContext;
use crate::formatter::print_json;
use crate::theme::Theme;

/// Environment variable carrying the assistant's session ID.
const SESSION_ENV: &str = "ACCORD_SESSION_ID";

/// Arguments for `accord record`.
pub(crate) struct RecordArgs {
    pub(crate) permission: Option<String>,
    pub(crate) session: Option<String>,
    pub(crate) project: Option<PathBuf>,
    pub(crate) context: Vec<String>,
    pub(crate) from_hook: bool,
}

/// Payload an assistant permission hook writes to stdin.
#[derive(Debug, Deserialize)]
struct HookPayload {
    #[serde(default)]
    session_id: Option<String>,
    #[serde(default)]
    cwd: Option<PathBuf>,
    tool_name: String,
    #[serde(default)]
    tool_input: Value,
}

/// Append an approval built from the arguments or a hook payload on stdin.
pub(crate) fn run_record(ctx: &AppContext, args: RecordArgs) -> Result<()> {
    record_from(ctx, args, &mut std::io::stdin())
}

/// Append an approval, reading a hook payload from `input` in hook mode.
///
/// In hook mode every failure is logged and swallowed: a hook must never
/// block the assistant.
fn record_from(ctx: &AppContext, args: RecordArgs, input: &mut dyn Read) -> Result<()> {
    let from_hook = args.from_hook;
    let entry = if from_hook {
        match read_hook(input, args.session) {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %format!("{e:#}"), "hook payload ignored");
                return Ok(());
            },
        }
    } else {
        entry_from_args(args)?
    };

    if let Err(e) = append(ctx, &entry) {
        if from_hook {
            warn!(error = %format!("{e:#}"), "approval not recorded");
            return Ok(());
        }
        return Err(e);
    }

    if ctx.format.is_json() {
        print_json(&entry)?;
    } else if !from_hook {
        println!(
            "{}",
            Theme::success(&format!("Recorded {}", entry.permission_string))
        );
    }
    Ok(())
}

fn append(ctx: &AppContext, entry: &ApprovalEntry) -> Result<()> {
    ctx.ensure_home()?;
    ApprovalLog::open(&ctx.storage.approval_log).append(entry)?;
    Ok(())
}

fn entry_from_args(args: RecordArgs) -> Result<ApprovalEntry> {
    let Some(permission) = args.permission.filter(|p| !p.trim().is_empty()) else {
        bail!("a permission string is required unless --from-hook is given");
    };

    let mut entry = ApprovalEntry::new(permission.trim(), session_id(args.session));
    if let Some(project) = args.project {
        let project = std::path::absolute(&project).unwrap_or(project);
        entry = entry.with_project(project);
    }
    for pair in &args.context {
        let (key, value) = parse_context(pair)?;
        entry = entry.with_context(key, value);
    }
    Ok(entry)
}

fn read_hook(input: &mut dyn Read, session: Option<String>) -> Result<ApprovalEntry> {
    let mut raw = String::new();
    input
        .read_to_string(&mut raw)
        .context("failed to read hook payload from stdin")?;
    entry_from_hook(&raw, session)
}

/// Build an entry from a hook payload.
fn entry_from_hook(raw: &str, session: Option<String>) -> Result<ApprovalEntry> {
    let payload: HookPayload =
        serde_json::from_str(raw).context("hook payload is not valid JSON")?;

    let permission = hook_permission(&payload.tool_name, &payload.tool_input);
    let mut entry = ApprovalEntry::new(permission, session_id(session.or(payload.session_id)))
        .with_context("tool_name", payload.tool_name);
    if let Some(cwd) = payload.cwd {
        entry = entry.with_project(cwd);
    }
    Ok(entry)
}

/// Permission string for a tool call, e.g. `Bash(git status)`.
fn hook_permission(tool_name: &str, tool_input: &Value) -> String {
    let key = match tool_name {
        "Bash" => "command",
        "Read" | "Write" | "Edit" | "MultiEdit" => "file_path",
        "NotebookEdit" => "notebook_path",
        "Glob" | "Grep" => "pattern",
        "WebFetch" => "url",
        "WebSearch" => "query",
        _ => "",
    };
    let argument = tool_input.get(key).and_then(Value::as_str).unwrap_or("");
    format!("{tool_name}({})", argument.trim())
}

/// Split `key=value`. Values that parse as JSON keep their type.
fn parse_context(pair: &str) -> Result<(String, Value)> {
    let Some((key, value)) = pair.split_once('=') else {
        bail!("invalid context '{pair}': expected key=value");
    };
    let key = key.trim();
    if key.is_empty() {
        bail!("invalid context '{pair}': empty key");
    }
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_owned()));
    Ok((key.to_owned(), value))
}

fn session_id(explicit: Option<String>) -> SessionId {
    explicit
        .or_else(|| std::env::var(SESSION_ENV).ok())
        .filter(|s| !s.trim().is_empty())
        .map_or_else(SessionId::new, SessionId::from)
}

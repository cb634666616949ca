//! Accord CLI - learn permission rules from approval history.
//!
//! Records approvals as the assistant asks for them, then turns recurring
//! approvals into rule suggestions that can be reviewed and applied.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

use std::path::PathBuf;

use accord_config::Config;
use accord_core::AccordHome;
use accord_telemetry::{LogConfig, setup_logging};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

mod commands;
mod config_bridge;
mod context;
mod formatter;
mod reviewer;
mod theme;

use commands::analyze::AnalyzeArgs;
use commands::config::ConfigFormat;
use commands::record::RecordArgs;
use commands::{analyze, calibrate, config, record, review, stats, thresholds};
use context::AppContext;
use formatter::OutputFormat;

/// Accord - learn permission rules from what you keep approving
#[derive(Parser)]
#[command(name = "accord")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Pretty)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Record an approved permission
    Record {
        /// Permission string, e.g. `Bash(git status)` or `Read(/src/lib.rs)`
        #[arg(required_unless_present = "from_hook")]
        permission: Option<String>,
        /// Session ID (defaults to $ACCORD_SESSION_ID or a new ID)
        #[arg(long)]
        session: Option<String>,
        /// Project directory the approval was given in
        #[arg(long)]
        project: Option<PathBuf>,
        /// Extra context as key=value (repeatable)
        #[arg(long = "context", value_name = "KEY=VALUE")]
        context: Vec<String>,
        /// Read an assistant hook payload from stdin
        #[arg(long, conflicts_with = "permission")]
        from_hook: bool,
    },

    /// Show permission rule suggestions
    Analyze {
        #[command(flatten)]
        window: WindowArgs,
    },

    /// Accept or reject suggestions and apply accepted rules
    Review {
        #[command(flatten)]
        window: WindowArgs,
        /// Collect decisions without recording or applying anything
        #[arg(long)]
        dry_run: bool,
    },

    /// Adjust thresholds from review outcomes
    Calibrate {
        /// Show the result without saving it
        #[arg(long)]
        dry_run: bool,
    },

    /// Inspect or reset detection thresholds
    Thresholds {
        #[command(subcommand)]
        command: ThresholdCommands,
    },

    /// Show approval and review statistics
    Stats {
        /// Analysis window in days (defaults to the current threshold)
        #[arg(long)]
        days: Option<u32>,
    },

    /// View configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Args)]
struct WindowArgs {
    /// Analysis window in days (defaults to the current threshold)
    #[arg(long)]
    days: Option<u32>,
    /// Only consider approvals given in this project
    #[arg(long)]
    project: Option<PathBuf>,
    /// Assistant settings file holding configured rules
    #[arg(long)]
    settings: Option<PathBuf>,
}

impl From<WindowArgs> for AnalyzeArgs {
    fn from(args: WindowArgs) -> Self {
        Self {
            days: args.days,
            project: args.project,
            settings: args.settings,
        }
    }
}

#[derive(Subcommand)]
enum ThresholdCommands {
    /// Show the current thresholds
    Show,
    /// Reset thresholds to the configured initial values
    Reset,
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show resolved configuration with source annotations
    Show {
        /// Output format
        #[arg(short, long, value_enum, default_value_t = ConfigFormat::Toml)]
        format: ConfigFormat,
        /// Show only a specific section (e.g. learning, calibration)
        #[arg(short, long)]
        section: Option<String>,
    },
    /// Validate the current configuration
    Validate,
    /// Show config file paths being checked
    Paths,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let home = AccordHome::resolve().context("could not resolve the accord home directory")?;
    let workspace_root = std::env::current_dir().ok();
    let loaded = Config::load_with_home(workspace_root.as_deref(), home.root());

    // Set up logging from config, with --verbose override.
    let mut log_config = match &loaded {
        Ok(resolved) => config_bridge::to_log_config(&resolved.config),
        Err(_) => LogConfig::default(),
    };
    if cli.verbose {
        "debug".clone_into(&mut log_config.level);
    }
    if let Err(e) = setup_logging(&log_config) {
        eprintln!("Failed to initialize logging: {e}");
    }

    // Config commands must work even when the config does not load.
    let command = match cli.command {
        Commands::Config { command } => {
            return handle_config(command, &home, workspace_root.as_deref(), &loaded);
        },
        command => command,
    };

    let resolved = loaded.context("failed to load configuration")?;
    let ctx = AppContext::new(home, resolved.config, cli.format);

    match command {
        Commands::Record {
            permission,
            session,
            project,
            context,
            from_hook,
        } => record::run_record(
            &ctx,
            RecordArgs {
                permission,
                session,
                project,
                context,
                from_hook,
            },
        ),
        Commands::Analyze { window } => analyze::run_analyze(&ctx, &window.into()),
        Commands::Review { window, dry_run } => review::run_review(&ctx, &window.into(), dry_run),
        Commands::Calibrate { dry_run } => calibrate::run_calibrate(&ctx, dry_run),
        Commands::Thresholds { command } => match command {
            ThresholdCommands::Show => thresholds::show_thresholds(&ctx),
            ThresholdCommands::Reset => thresholds::reset_thresholds(&ctx),
        },
        Commands::Stats { days } => stats::show_stats(&ctx, days),
        Commands::Config { .. } => unreachable!("config commands are handled above"),
    }
}

fn handle_config(
    command: ConfigCommands,
    home: &AccordHome,
    workspace_root: Option<&std::path::Path>,
    loaded: &accord_config::ConfigResult<accord_config::ResolvedConfig>,
) -> Result<()> {
    match command {
        ConfigCommands::Show { format, section } => {
            let resolved = loaded
                .as_ref()
                .map_err(|e| anyhow::anyhow!("failed to load configuration: {e}"))?;
            config::show_config(resolved, format, section.as_deref())
        },
        ConfigCommands::Validate => config::validate_config(loaded),
        ConfigCommands::Paths => config::show_paths(
            home.root(),
            workspace_root,
            config::storage_for(loaded, home).as_ref(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_record_requires_permission_or_hook() {
        assert!(Cli::try_parse_from(["accord", "record"]).is_err());
        assert!(Cli::try_parse_from(["accord", "record", "--from-hook"]).is_ok());
        assert!(Cli::try_parse_from(["accord", "record", "git status"]).is_ok());
        assert!(Cli::try_parse_from(["accord", "record", "git status", "--from-hook"]).is_err());
    }

    #[test]
    fn test_global_format_flag() {
        let cli = Cli::try_parse_from(["accord", "stats", "--format", "json"]).unwrap();
        assert_eq!(cli.format, OutputFormat::Json);
        assert!(Cli::try_parse_from(["accord", "stats", "--format", "xml"]).is_err());
    }

    #[test]
    fn test_review_flags() {
        let cli = Cli::try_parse_from([
            "accord", "review", "--days", "14", "--project", "/p", "--dry-run",
        ])
        .unwrap();
        match cli.command {
            Commands::Review { window, dry_run } => {
                assert!(dry_run);
                let args = AnalyzeArgs::from(window);
                assert_eq!(args.days, Some(14));
                assert_eq!(args.project, Some(PathBuf::from("/p")));
            },
            _ => panic!("expected review"),
        }
    }
}

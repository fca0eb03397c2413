//! git-air CLI - automatic git synchronization
//!
//! Discovers every git working tree below a directory, then commits, pushes
//! and pulls them on a fixed interval.

mod commands;
mod console;

use std::ffi::OsString;
use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};
use gitair_core::{CliOverrides, Config, SyncSettings};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::{StatusArgs, WatchArgs};

/// Git Air: automatic git synchronization for every repository under a directory
#[derive(Parser, Debug)]
#[command(name = "git-air")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Check interval in minutes (0.5-30)
    #[arg(short, long, global = true, value_name = "MINS", allow_hyphen_values = true)]
    interval: Option<String>,

    /// Force monorepo mode, also `-mr` (auto-detects if not set)
    #[arg(short = 'm', long = "monorepo", visible_alias = "mr", global = true)]
    monorepo: bool,

    /// Use generated commit messages, also `-ai` (timestamps on error)
    #[arg(short = 'a', long = "ai-commits", visible_alias = "ai", global = true)]
    ai_commits: bool,

    /// Directory to search for repositories (defaults to current directory)
    #[arg(short, long, global = true)]
    root: Option<PathBuf>,

    /// Config file (defaults to ~/.config/git-air/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(flatten)]
    watch: WatchArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show version information
    Version,

    /// Show discovered repositories and their state
    #[command(visible_alias = "st")]
    Status(StatusArgs),

    /// Show current configuration
    Config,
}

impl Cli {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            interval: self.interval.clone(),
            force_composite: self.monorepo,
            ai_commits: self.ai_commits,
            root: self.root.clone(),
        }
    }
}

/// Single-dash long spellings accepted for compatibility, e.g. `git-air -i 5 -mr`
const LEGACY_FLAGS: &[(&str, &str)] = &[("-mr", "--monorepo"), ("-ai", "--ai-commits")];

/// Rewrite legacy single-dash flags before clap sees them
///
/// Only exact matches are rewritten, and nothing after a `--` separator.
fn normalize_args<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    let mut after_separator = false;
    args.into_iter()
        .map(|arg| {
            if after_separator {
                return arg;
            }
            if arg == "--" {
                after_separator = true;
                return arg;
            }
            LEGACY_FLAGS
                .iter()
                .find(|(legacy, _)| arg == *legacy)
                .map(|(_, long)| OsString::from(*long))
                .unwrap_or(arg)
        })
        .collect()
}

/// Print the error and usage, then exit before any work starts
fn usage_error(err: gitair_core::Error) -> ! {
    eprintln!("Error: {}\n", err);
    let _ = Cli::command().print_help();
    std::process::exit(1);
}

fn init_tracing(verbose: bool) {
    let default_directive = if verbose {
        "gitair_core=debug,git_air=debug"
    } else {
        "error"
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn print_config(config: &Config, settings: &SyncSettings) {
    println!("Git Air Configuration");
    println!("=====================");
    println!();
    println!("Sync Settings:");
    println!("  interval: {} minutes", config.sync.interval_minutes);
    println!("  pull interval: {}s", settings.pull_interval.as_secs_f64());
    let mode = if config.sync.force_composite {
        "forced"
    } else {
        "auto-detect"
    };
    println!("  monorepo mode: {}", mode);
    println!("  root: {}", config.sync.root.display());
    println!();
    println!("Commit Messages:");
    println!("  generated: {}", config.message.enabled);
    println!("  command: {}", config.message.command);
    println!("  timeout: {}s", config.message.timeout.as_secs_f64());
    println!("  max diff: {} chars", config.message.max_diff_chars);
    println!();
    println!("Git:");
    println!("  program: {}", config.git.program);
    println!("  default branch: {}", config.git.default_branch);
    println!();
    if let Some(path) = Config::default_config_path() {
        println!("Config file: {}", path.display());
        if path.exists() {
            println!("  (exists)");
        } else {
            println!("  (not found - using defaults)");
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse_from(normalize_args(std::env::args_os()));
    init_tracing(cli.verbose);

    if matches!(cli.command, Some(Commands::Version)) {
        println!("git-air {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let config = Config::load_with_overrides(cli.config.as_deref(), cli.overrides())
        .unwrap_or_else(|e| usage_error(e));
    let settings = config.validate().unwrap_or_else(|e| usage_error(e));

    if cli.verbose {
        tracing::info!(
            interval = ?settings.check_interval,
            force_composite = settings.force_composite,
            messages = settings.messages.is_some(),
            "Configuration loaded"
        );
    }

    match cli.command {
        // Printed before configuration is loaded.
        Some(Commands::Version) => {}
        Some(Commands::Status(args)) => {
            args.execute(&settings)?;
        }
        Some(Commands::Config) => {
            print_config(&config, &settings);
        }
        None => {
            cli.watch.execute(settings).await?;
        }
    }

    Ok(())
}

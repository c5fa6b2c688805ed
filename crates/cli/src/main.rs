//! Retain CLI - retain command

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cmd;

/// Retain - Tiered retention for timestamped backup files
#[derive(Parser)]
#[command(name = "retain")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file (default: search ./, ~/.retain/, /etc/retain/)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply the retention policy, deleting backups it does not keep
    #[command(long_about = "Apply the retention policy to the backup directory.\n\n\
        Tiers are applied from hourly to yearly. Each tier keeps the newest backup of \
        its most recent periods; everything no tier keeps is deleted.")]
    Prune {
        /// Log what would be deleted without deleting anything
        #[arg(short, long)]
        dry_run: bool,

        /// Log level (trace, debug, info, warn, error)
        #[arg(short, long)]
        log_level: Option<String>,

        /// Backup directory (overrides the configuration)
        #[arg(long)]
        directory: Option<PathBuf>,
    },
    /// Show what the retention policy would keep and delete
    Plan {
        /// Print the plan as JSON
        #[arg(long)]
        json: bool,

        /// Backup directory (overrides the configuration)
        #[arg(long)]
        directory: Option<PathBuf>,
    },
    /// Inspect configuration
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show the effective configuration
    Show,
    /// Show which configuration file is used
    Path,
    /// Check the configuration and exit
    Validate,
    /// Print an example configuration file
    Example,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = cli.config.as_deref();

    match cli.command {
        Commands::Prune {
            dry_run,
            log_level,
            directory,
        } => cmd::prune::run(config, dry_run, log_level, directory).await,
        Commands::Plan { json, directory } => cmd::plan::run(config, json, directory).await,
        Commands::Config(subcmd) => match subcmd {
            ConfigCommands::Show => cmd::config::run_show(config).await,
            ConfigCommands::Path => cmd::config::run_path(config).await,
            ConfigCommands::Validate => cmd::config::run_validate(config).await,
            ConfigCommands::Example => cmd::config::run_example().await,
        },
    }
}

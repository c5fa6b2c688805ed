//! Configuration commands
//!
//! Inspect which file is used and what the effective settings are.

use anyhow::{Context, Result};
use cli_lib::settings::{self, Overrides};
use cli_lib::util;
use owo_colors::OwoColorize;
use std::path::Path;

/// Show the effective configuration, after environment overrides
pub async fn run_show(config: Option<&Path>) -> Result<()> {
    let loaded = settings::load(config, &Overrides::default()).context("Failed to load config")?;

    println!("{}", "Retention Configuration".bold());
    println!("{}: {}\n", "Location".dimmed(), loaded.source.display().dimmed());

    let rendered =
        toml::to_string_pretty(&loaded.settings).context("Failed to render configuration")?;
    println!("{}", rendered.trim_end());

    println!(
        "\n{}: {}",
        "Retention horizon".dimmed(),
        util::format_horizon(loaded.policy.horizon())
    );

    Ok(())
}

/// Show which configuration file would be used
pub async fn run_path(config: Option<&Path>) -> Result<()> {
    if let Some(path) = config {
        if !path.is_file() {
            anyhow::bail!("Configuration file not found: {}", path.display());
        }
        println!("{}", path.display());
        return Ok(());
    }

    match settings::find_config_file() {
        Some(path) => println!("{}", path.display()),
        None => {
            println!("{}", "No configuration file found".yellow());
            println!("{}", "Searched:".dimmed());
            for dir in settings::search_dirs() {
                println!("  {}", dir.display());
            }
            println!(
                "\n{}",
                "Run 'retain config example > retention-policy.yaml' to create one".dimmed()
            );
        }
    }

    Ok(())
}

/// Check the configuration, failing on the first problem
pub async fn run_validate(config: Option<&Path>) -> Result<()> {
    let loaded = settings::load(config, &Overrides::default()).context("Invalid configuration")?;

    // The pattern must compile too
    super::open_catalog(&loaded.settings)?;

    println!(
        "{} Configuration is valid: {}",
        "✓".green(),
        loaded.source.display()
    );
    for (tier, count) in loaded.policy.tiers() {
        println!("  {}  {}", format!("{:<8}", tier).cyan(), count);
    }

    if !loaded.settings.directory().is_dir() {
        println!(
            "{} Backup directory does not exist: {}",
            "Warning:".yellow().bold(),
            loaded.settings.directory().display()
        );
    }

    Ok(())
}

/// Print an example configuration file
pub async fn run_example() -> Result<()> {
    print!("{}", settings::example_config());
    Ok(())
}

//! Show the retention decision for every backup without deleting anything

use anyhow::{Context, Result};
use catalog::CancellationToken;
use cli_lib::settings::{self, Overrides};
use cli_lib::{logging, util};
use owo_colors::OwoColorize;
use policy::{evaluate, Decision, RetentionPolicy};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Machine-readable plan
#[derive(Serialize)]
struct PlanReport<'a> {
    directory: &'a Path,
    file_pattern: &'a str,
    policy: &'a RetentionPolicy,
    horizon_seconds: i64,
    total_files: usize,
    delete_count: usize,
    delete_bytes: u64,
    decisions: Vec<Decision<'a>>,
}

pub async fn run(config: Option<&Path>, json: bool, directory: Option<PathBuf>) -> Result<()> {
    // 1. Load configuration
    let overrides = Overrides {
        directory,
        ..Overrides::default()
    };
    let loaded = settings::load(config, &overrides).context("Failed to load config")?;
    let _guard = logging::init(&loaded.settings.log_level, loaded.settings.log_file.as_deref())?;

    // 2. Scan the backup directory
    let catalog = super::open_catalog(&loaded.settings)?;
    let cancel = CancellationToken::new();
    let interrupt = util::cancel_on_ctrl_c(cancel.clone());

    let files = tokio::task::spawn_blocking(move || catalog.list_files(&cancel))
        .await
        .context("Scan task failed")?
        .context("Failed to list files")?;
    interrupt.abort();

    // 3. Evaluate
    let plan = evaluate(&files, &loaded.policy);
    let directory = loaded.settings.directory();

    // 4. Display
    if json {
        let report = PlanReport {
            directory,
            file_pattern: &loaded.settings.file_pattern,
            policy: &loaded.policy,
            horizon_seconds: loaded.policy.horizon().num_seconds(),
            total_files: plan.total_files(),
            delete_count: plan.delete_count(),
            delete_bytes: plan.delete_bytes(),
            decisions: plan.decisions(),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{}", "Retention Plan".bold());
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!(
        "{}: {}   {}: {}",
        "Directory".dimmed(),
        directory.display(),
        "Horizon".dimmed(),
        util::format_horizon(loaded.policy.horizon())
    );
    println!();

    if files.is_empty() {
        println!("{}", "No backup files found".dimmed());
        return Ok(());
    }

    for decision in plan.decisions() {
        let verdict = format!("{:<34}", decision.verdict.to_string());
        let verdict = if decision.verdict.is_delete() {
            verdict.red().to_string()
        } else {
            verdict.green().to_string()
        };

        println!(
            "{}  {}  {}",
            util::format_timestamp(decision.record.timestamp()).dimmed(),
            verdict,
            util::display_relative(decision.record.path(), directory)
        );
    }

    println!();
    println!(
        "{} retained, {} to delete ({})",
        (plan.total_files() - plan.delete_count()).to_string().green(),
        plan.delete_count().to_string().yellow(),
        util::format_size(plan.delete_bytes())
    );

    Ok(())
}

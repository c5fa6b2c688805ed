//! Apply the retention policy

use anyhow::{Context, Result};
use catalog::{CancellationToken, Catalog, CatalogError, DeleteReport, Executor};
use cli_lib::settings::{self, Overrides};
use cli_lib::{logging, util};
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use policy::{evaluate, RetentionPlan, RetentionPolicy, Tier};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub async fn run(
    config: Option<&Path>,
    dry_run: bool,
    log_level: Option<String>,
    directory: Option<PathBuf>,
) -> Result<()> {
    // 1. Load configuration (file, environment, flags)
    let overrides = Overrides {
        dry_run,
        log_level,
        directory,
    };
    let loaded = settings::load(config, &overrides).context("Failed to load config")?;

    // 2. Initialize logging
    let _guard = logging::init(&loaded.settings.log_level, loaded.settings.log_file.as_deref())?;

    info!(
        source = %loaded.source.display(),
        directory = %loaded.settings.directory().display(),
        pattern = %loaded.settings.file_pattern,
        dry_run = loaded.settings.dry_run,
        horizon = %util::format_horizon(loaded.policy.horizon()),
        "loaded configuration"
    );

    if loaded.policy.retains_nothing() {
        warn!("every retention count is zero, all matching backups will be deleted");
    }

    // 3. Build catalog and executor
    let catalog = super::open_catalog(&loaded.settings)?;
    let executor = Executor::new(loaded.settings.dry_run);
    let policy = loaded.policy;

    // 4. Scan, decide and delete off the async runtime, stopping on Ctrl-C
    let cancel = CancellationToken::new();
    let interrupt = util::cancel_on_ctrl_c(cancel.clone());

    let outcome = tokio::task::spawn_blocking(move || prune(&catalog, &policy, &executor, &cancel))
        .await
        .context("Prune task failed")?;
    interrupt.abort();

    // 5. Display results
    match outcome? {
        Some((plan, report)) => display_summary(loaded.settings.directory(), &plan, &report),
        None => println!("{}", "No backup files found".dimmed()),
    }

    Ok(())
}

/// Blocking part of the command; `None` when there was nothing to evaluate
fn prune(
    catalog: &Catalog,
    policy: &RetentionPolicy,
    executor: &Executor,
    cancel: &CancellationToken,
) -> Result<Option<(RetentionPlan, DeleteReport)>> {
    let files = catalog
        .list_files(cancel)
        .map_err(interrupted)
        .context("Failed to list files")?;

    if files.is_empty() {
        info!(directory = %catalog.directory().display(), "no backup files found");
        return Ok(None);
    }

    let plan = evaluate(&files, policy);

    info!(
        total_files = plan.total_files(),
        files_to_delete = plan.delete_count(),
        hourly_retained = plan.retained_count(Tier::Hourly),
        daily_retained = plan.retained_count(Tier::Daily),
        weekly_retained = plan.retained_count(Tier::Weekly),
        monthly_retained = plan.retained_count(Tier::Monthly),
        yearly_retained = plan.retained_count(Tier::Yearly),
        "retention policy summary"
    );

    let to_delete = plan.to_delete();
    let progress = progress_bar(to_delete.len(), executor.is_dry_run());

    let report = executor
        .execute_with(&to_delete, cancel, |_| progress.inc(1))
        .map_err(interrupted)
        .context("Failed to delete files")?;
    progress.finish_and_clear();

    Ok(Some((plan, report)))
}

/// Report cancellation as an interruption rather than a failure
fn interrupted(err: CatalogError) -> anyhow::Error {
    if err.is_cancelled() {
        anyhow::anyhow!("Interrupted")
    } else {
        err.into()
    }
}

fn progress_bar(len: usize, dry_run: bool) -> ProgressBar {
    if dry_run || len == 0 {
        return ProgressBar::hidden();
    }

    let bar = ProgressBar::new(len as u64);
    bar.set_style(
        ProgressStyle::with_template("{spinner} Deleting [{bar:30}] {pos}/{len}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> "),
    );
    bar
}

fn display_summary(directory: &Path, plan: &RetentionPlan, report: &DeleteReport) {
    let title = if report.dry_run {
        "Retention Plan (dry run)"
    } else {
        "Retention Applied"
    };

    println!("{}", title.green().bold());
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!();
    println!("Directory:      {}", directory.display());
    println!("Backups found:  {}", plan.total_files());
    println!();

    println!("{}", "Retained".bold());
    for outcome in &plan.tiers {
        println!(
            "  {}  {}",
            format!("{:<8}", outcome.tier).cyan(),
            outcome.selected.len()
        );
    }
    println!();

    if plan.delete_count() == 0 {
        println!("{}", "Nothing to delete - every backup is retained".dimmed());
    } else if report.dry_run {
        println!("Would delete:   {}", report.files().to_string().yellow());
        println!("Space to free:  {}", util::format_size(report.bytes()).green());
    } else {
        println!("Deleted:        {}", report.files().to_string().yellow());
        println!("Space freed:    {}", util::format_size(report.bytes()).green());
    }

    if !report.is_clean() {
        println!();
        println!(
            "{} {} file(s) could not be deleted:",
            "Warning:".yellow().bold(),
            report.failures.len()
        );
        for failure in &report.failures {
            println!(
                "  {} {}",
                util::display_relative(&failure.path, directory).red(),
                failure.error.dimmed()
            );
        }
    }
}

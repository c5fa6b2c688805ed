//! `retain prune` workflows

use crate::common::BackupDir;
use crate::retain;
use anyhow::Result;
use std::fs;

const STAMPS: [&str; 4] = [
    "2024-03-15-12-00",
    "2024-03-15-11-00",
    "2024-03-15-10-00",
    "2024-03-14-00-00",
];

#[test]
fn test_prune_deletes_backups_outside_retention() -> Result<()> {
    let dir = BackupDir::with_backups(&STAMPS)?;
    dir.write_config([2, 1, 0, 0, 0])?;

    // Config found in the working directory
    let result = retain!(dir.root(), "prune").assert_success()?;

    assert!(result.contains_stdout("Deleted:"));
    assert!(!dir.has_backup("backup-2024-03-14-00-00.tar.gz"));
    assert_eq!(
        dir.remaining()?,
        [
            "backup-2024-03-15-10-00.tar.gz",
            "backup-2024-03-15-11-00.tar.gz",
            "backup-2024-03-15-12-00.tar.gz",
        ]
    );
    Ok(())
}

#[test]
fn test_dry_run_keeps_every_file() -> Result<()> {
    let dir = BackupDir::with_backups(&STAMPS)?;
    let config = dir.write_config([2, 1, 0, 0, 0])?;
    let config = config.to_string_lossy();

    let result = retain!(dir.root(), "-c", &config, "prune", "--dry-run").assert_success()?;

    assert!(result.contains_stdout("Would delete:"));
    assert!(result.contains_stderr("would delete file"));
    assert_eq!(dir.remaining()?.len(), 4);
    Ok(())
}

#[test]
fn test_dry_run_from_environment() -> Result<()> {
    let dir = BackupDir::with_backups(&STAMPS)?;
    dir.write_config([1, 0, 0, 0, 0])?;

    retain!(dir.root(), "prune")
        .env("RETAIN_DRY_RUN", "true")
        .assert_success()?;

    assert_eq!(dir.remaining()?.len(), 4);
    Ok(())
}

#[test]
fn test_older_backup_in_same_hour_is_superseded() -> Result<()> {
    let dir = BackupDir::with_backups(&["2024-03-15-12-00", "2024-03-15-12-30"])?;
    dir.write_config([1, 0, 0, 0, 0])?;

    retain!(dir.root(), "prune").assert_success()?;

    assert_eq!(dir.remaining()?, ["backup-2024-03-15-12-30.tar.gz"]);
    Ok(())
}

#[test]
fn test_tiers_keep_one_backup_per_period() -> Result<()> {
    // Two backups a day for a week, plus one from the previous month
    let mut stamps = Vec::new();
    for day in 1..=7 {
        stamps.push(format!("2024-05-{:02}-06-00", day));
        stamps.push(format!("2024-05-{:02}-18-00", day));
    }
    stamps.push("2024-04-10-00-00".to_string());
    let stamps: Vec<&str> = stamps.iter().map(String::as_str).collect();

    let dir = BackupDir::with_backups(&stamps)?;
    dir.write_config([2, 3, 0, 2, 0])?;

    retain!(dir.root(), "prune").assert_success()?;

    // hourly: 05-07 18:00 and 06:00; daily: newest of 05-06, 05-05, 05-04;
    // monthly: newest left in May, then April
    assert_eq!(
        dir.remaining()?,
        [
            "backup-2024-04-10-00-00.tar.gz",
            "backup-2024-05-03-18-00.tar.gz",
            "backup-2024-05-04-18-00.tar.gz",
            "backup-2024-05-05-18-00.tar.gz",
            "backup-2024-05-06-18-00.tar.gz",
            "backup-2024-05-07-06-00.tar.gz",
            "backup-2024-05-07-18-00.tar.gz",
        ]
    );
    Ok(())
}

#[test]
fn test_non_matching_files_are_never_touched() -> Result<()> {
    let dir = BackupDir::with_backups(&STAMPS)?;
    dir.add_backup("notes.txt", b"keep")?;
    dir.add_backup("backup-2024-13-01-00-00.tar.gz", b"bad month")?;
    dir.write_config([0, 0, 0, 0, 0])?;

    let result = retain!(dir.root(), "prune").assert_success()?;

    assert!(result.contains_stderr("every retention count is zero"));
    assert_eq!(
        dir.remaining()?,
        ["backup-2024-13-01-00-00.tar.gz", "notes.txt"]
    );
    Ok(())
}

#[test]
fn test_empty_directory() -> Result<()> {
    let dir = BackupDir::new()?;
    dir.write_config([1, 1, 1, 1, 1])?;

    let result = retain!(dir.root(), "prune").assert_success()?;

    assert!(result.contains_stdout("No backup files found"));
    Ok(())
}

#[test]
fn test_directory_flag_overrides_config() -> Result<()> {
    let dir = BackupDir::with_backups(&STAMPS)?;
    let config = format!(
        "retention:\n  hourly: 1\nfile_pattern: \"{}\"\ndirectory: \"/nonexistent/backups\"\n",
        crate::common::fixtures::PATTERN
    );
    dir.write_raw_config("retention-policy.yaml", &config)?;
    let backups = dir.backups();
    let backups = backups.to_string_lossy();

    retain!(dir.root(), "prune", "--directory", &backups).assert_success()?;

    assert_eq!(dir.remaining()?, ["backup-2024-03-15-12-00.tar.gz"]);
    Ok(())
}

#[test]
fn test_negative_retention_is_rejected() -> Result<()> {
    let dir = BackupDir::with_backups(&STAMPS)?;
    dir.write_config([1, -1, 0, 0, 0])?;

    let result = retain!(dir.root(), "prune").assert_failure()?;

    assert!(result.contains_stderr("daily retention must be non-negative"));
    assert_eq!(dir.remaining()?.len(), 4);
    Ok(())
}

#[test]
fn test_missing_config_file() -> Result<()> {
    let dir = BackupDir::with_backups(&STAMPS)?;

    let result = retain!(dir.root(), "-c", "missing.yaml", "prune").assert_failure()?;

    assert!(result.contains_stderr("Failed to load config"));
    assert_eq!(dir.remaining()?.len(), 4);
    Ok(())
}

#[test]
fn test_logs_to_file() -> Result<()> {
    let dir = BackupDir::with_backups(&STAMPS)?;
    let log_path = dir.root().join("logs").join("retain.log");
    let config = format!(
        "retention:\n  hourly: 2\n  daily: 1\nfile_pattern: \"{}\"\ndirectory: \"{}\"\nlog_file: \"{}\"\n",
        crate::common::fixtures::PATTERN,
        dir.backups().display(),
        log_path.display()
    );
    dir.write_raw_config("retention-policy.yaml", &config)?;

    let result = retain!(dir.root(), "prune").assert_success()?;

    let log = fs::read_to_string(&log_path)?;
    assert!(log.contains("retention policy summary"));
    assert!(log.contains("deleted file"));
    assert!(!result.contains_stderr("retention policy summary"));
    Ok(())
}

#[test]
fn test_debug_log_level_flag() -> Result<()> {
    let dir = BackupDir::with_backups(&STAMPS)?;
    dir.write_config([2, 1, 0, 0, 0])?;

    let result = retain!(dir.root(), "prune", "-d", "-l", "debug").assert_success()?;

    assert!(result.contains_stderr("listed backup files"));
    Ok(())
}

//! Temporary backup directories for integration tests

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Pattern used by [`BackupDir::with_backups`]
pub const PATTERN: &str = "backup-{year}-{month}-{day}-{hour}-{minute}.tar.gz";

/// Temporary workspace holding a `backups/` directory and a config file
pub struct BackupDir {
    temp_dir: TempDir,
}

impl BackupDir {
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        fs::create_dir(temp_dir.path().join("backups"))?;
        Ok(Self { temp_dir })
    }

    /// Workspace with one backup per `YYYY-MM-DD-HH-MM` stamp
    pub fn with_backups(stamps: &[&str]) -> Result<Self> {
        let dir = Self::new()?;
        for stamp in stamps {
            dir.add_backup(&format!("backup-{}.tar.gz", stamp), b"backup data")?;
        }
        Ok(dir)
    }

    /// Workspace root (working directory for commands)
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// The backup directory
    pub fn backups(&self) -> PathBuf {
        self.root().join("backups")
    }

    /// Create a file inside the backup directory
    pub fn add_backup(&self, relative: &str, contents: &[u8]) -> Result<PathBuf> {
        let path = self.backups().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, contents)?;
        Ok(path)
    }

    pub fn has_backup(&self, relative: &str) -> bool {
        self.backups().join(relative).exists()
    }

    /// Backup file names left on disk, sorted
    pub fn remaining(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(self.backups())? {
            names.push(entry?.file_name().to_string_lossy().into_owned());
        }
        names.sort();
        Ok(names)
    }

    /// Write `retention-policy.yaml` in the workspace root
    ///
    /// `counts` is hourly, daily, weekly, monthly, yearly.
    pub fn write_config(&self, counts: [i64; 5]) -> Result<PathBuf> {
        let [hourly, daily, weekly, monthly, yearly] = counts;
        let contents = format!(
            "retention:\n  hourly: {}\n  daily: {}\n  weekly: {}\n  monthly: {}\n  yearly: {}\n\
             file_pattern: \"{}\"\n\
             directory: \"{}\"\n\
             log_level: \"info\"\n",
            hourly,
            daily,
            weekly,
            monthly,
            yearly,
            PATTERN,
            self.backups().display()
        );
        self.write_raw_config("retention-policy.yaml", &contents)
    }

    /// Write an arbitrary config file in the workspace root
    pub fn write_raw_config(&self, name: &str, contents: &str) -> Result<PathBuf> {
        let path = self.root().join(name);
        fs::write(&path, contents)?;
        Ok(path)
    }
}

//! Configuration loading and validation
//!
//! Settings are layered, later sources winning:
//! 1. Configuration file (YAML, TOML or JSON, chosen by extension)
//! 2. Environment variables prefixed `RETAIN_` (`__` separates nested keys,
//!    e.g. `RETAIN_RETENTION__HOURLY=6`)
//! 3. Command line flags
//!
//! Without an explicit `--config`, the file `retention-policy.<ext>` is
//! looked up in the current directory, then `~/.retain/`, then `/etc/retain/`.

use policy::{RetentionPolicy, Tier};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Base name of the configuration file
pub const CONFIG_NAME: &str = "retention-policy";

/// Recognized configuration file extensions, in lookup order
pub const CONFIG_EXTENSIONS: [&str; 4] = ["yaml", "yml", "toml", "json"];

/// Prefix for environment overrides
pub const ENV_PREFIX: &str = "RETAIN";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no retention-policy configuration file found (searched {})", display_dirs(.searched))]
    NotFound { searched: Vec<PathBuf> },

    #[error("failed to read config: {0}")]
    Load(#[from] config::ConfigError),

    #[error("{tier} retention must be non-negative")]
    NegativeRetention { tier: Tier },

    #[error("file pattern must be specified")]
    MissingFilePattern,

    #[error("directory must be specified")]
    MissingDirectory,
}

fn display_dirs(dirs: &[PathBuf]) -> String {
    dirs.iter()
        .map(|d| d.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Keep-counts as written in the file
///
/// Signed so that a negative value is reported by name instead of failing
/// deserialization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetentionCounts {
    #[serde(default)]
    pub hourly: i64,
    #[serde(default)]
    pub daily: i64,
    #[serde(default)]
    pub weekly: i64,
    #[serde(default)]
    pub monthly: i64,
    #[serde(default)]
    pub yearly: i64,
}

impl RetentionCounts {
    fn count(&self, tier: Tier) -> i64 {
        match tier {
            Tier::Hourly => self.hourly,
            Tier::Daily => self.daily,
            Tier::Weekly => self.weekly,
            Tier::Monthly => self.monthly,
            Tier::Yearly => self.yearly,
        }
    }

    /// Convert to a policy, rejecting negative counts
    pub fn to_policy(&self) -> Result<RetentionPolicy, ConfigError> {
        let checked = |tier: Tier| {
            usize::try_from(self.count(tier)).map_err(|_| ConfigError::NegativeRetention { tier })
        };

        Ok(RetentionPolicy::new(
            checked(Tier::Hourly)?,
            checked(Tier::Daily)?,
            checked(Tier::Weekly)?,
            checked(Tier::Monthly)?,
            checked(Tier::Yearly)?,
        ))
    }
}

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub retention: RetentionCounts,

    /// Filename pattern with `{year}`-style placeholders
    #[serde(default)]
    pub file_pattern: String,

    /// Directory holding the backups
    #[serde(default)]
    pub directory: String,

    /// Log deletions without performing them
    #[serde(default)]
    pub dry_run: bool,

    /// trace, debug, info, warn or error
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Write logs to this file instead of stderr
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Settings {
    /// Check the settings and derive the retention policy
    pub fn validate(&self) -> Result<RetentionPolicy, ConfigError> {
        let policy = self.retention.to_policy()?;

        if self.file_pattern.is_empty() {
            return Err(ConfigError::MissingFilePattern);
        }

        if self.directory.is_empty() {
            return Err(ConfigError::MissingDirectory);
        }

        Ok(policy)
    }

    pub fn directory(&self) -> &Path {
        Path::new(&self.directory)
    }
}

/// Values given on the command line, applied over file and environment
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    /// Only ever turns dry-run on
    pub dry_run: bool,
    pub log_level: Option<String>,
    pub directory: Option<PathBuf>,
}

/// Validated settings with where they came from
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub settings: Settings,
    pub policy: RetentionPolicy,
    pub source: PathBuf,
}

/// Directories searched for a configuration file, in order
pub fn search_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![PathBuf::from(".")];
    if let Some(home) = dirs::home_dir() {
        dirs.push(home.join(".retain"));
    }
    dirs.push(PathBuf::from("/etc/retain"));
    dirs
}

/// First configuration file found in the search directories
pub fn find_config_file() -> Option<PathBuf> {
    search_dirs().into_iter().find_map(|dir| {
        CONFIG_EXTENSIONS
            .iter()
            .map(|ext| dir.join(format!("{}.{}", CONFIG_NAME, ext)))
            .find(|candidate| candidate.is_file())
    })
}

/// Load, layer and validate the configuration
pub fn load(explicit: Option<&Path>, overrides: &Overrides) -> Result<LoadedConfig, ConfigError> {
    let source = match explicit {
        Some(path) => path.to_path_buf(),
        None => find_config_file().ok_or_else(|| ConfigError::NotFound {
            searched: search_dirs(),
        })?,
    };

    let mut builder = config::Config::builder()
        .add_source(config::File::from(source.as_path()))
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

    if overrides.dry_run {
        builder = builder.set_override("dry_run", true)?;
    }
    if let Some(level) = &overrides.log_level {
        builder = builder.set_override("log_level", level.as_str())?;
    }
    if let Some(directory) = &overrides.directory {
        builder = builder.set_override("directory", directory.to_string_lossy().into_owned())?;
    }

    let settings: Settings = builder.build()?.try_deserialize()?;
    let policy = settings.validate()?;

    Ok(LoadedConfig {
        settings,
        policy,
        source,
    })
}

/// Example configuration file
pub fn example_config() -> &'static str {
    r#"# retention-policy.yaml

# How many distinct periods to keep one backup for. Tiers are applied from
# hourly to yearly; a backup kept by one tier is not counted again by the
# next. Zero disables a tier.
retention:
  hourly: 24
  daily: 7
  weekly: 4
  monthly: 12
  yearly: 3

# Regular expression matched against paths relative to `directory`.
# Placeholders: {year} {month} {day} {hour} {minute}
file_pattern: "backup-{year}-{month}-{day}-{hour}-{minute}.tar.gz"

directory: "/var/backups"

# Only log what would be deleted
dry_run: false

# trace, debug, info, warn or error
log_level: "info"

# Optional: write logs to a file instead of stderr
# log_file: "/var/log/retain.log"
"#
}

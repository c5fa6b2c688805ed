//! CLI command implementations

pub mod config;
pub mod plan;
pub mod prune;

use anyhow::{Context, Result};
use catalog::{Catalog, FilePattern};
use cli_lib::settings::Settings;

/// Catalog for the configured directory and pattern
fn open_catalog(settings: &Settings) -> Result<Catalog> {
    let pattern = FilePattern::compile(&settings.file_pattern)
        .context("Failed to initialize file catalog")?;
    Ok(Catalog::new(settings.directory(), pattern))
}

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use common::SortOrder;
use config::{Config, Environment, File};
use serde::Deserialize;

/// Settings for the report host.
///
/// Layered as defaults, then `ledgerscope.toml` (or the file given on the
/// command line), then `LEDGERSCOPE_*` environment variables. A `.env` file
/// is loaded into the environment first.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Snapshot file to read when none is given on the command line.
    pub snapshot_path: Option<PathBuf>,
    /// Display order of statement cycles.
    pub statement_sort_order: SortOrder,
    /// How far past "now" recurring payments are expanded.
    pub horizon_days: u64,
    /// Tracing filter used when `RUST_LOG` is not set.
    pub log_filter: String,
}

/// Initialize application settings
pub fn load_settings(config_file: Option<&Path>) -> Result<Settings> {
    dotenvy::dotenv().ok();

    let builder = Config::builder()
        .set_default("statement_sort_order", "older")?
        .set_default("horizon_days", compute::recurrence::DEFAULT_HORIZON_DAYS)?
        .set_default("log_filter", "ledgerscope=info,compute=info")?;

    let builder = match config_file {
        Some(path) => builder.add_source(File::from(path).required(true)),
        None => builder.add_source(File::with_name("ledgerscope").required(false)),
    };

    builder
        .add_source(Environment::with_prefix("LEDGERSCOPE"))
        .build()
        .context("Failed to read settings")?
        .try_deserialize()
        .context("Invalid settings")
}

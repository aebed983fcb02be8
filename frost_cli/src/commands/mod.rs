//! Subcommand implementations

pub mod calc;
pub mod history;
pub mod reference;

use anyhow::{Context, Result};

use frost_core::config::FrostConfig;
use frost_core::history::HistoryStore;

/// Open the history file named by the configuration.
pub(crate) fn open_history(config: &FrostConfig) -> Result<HistoryStore> {
    let path = config
        .storage
        .history_path()
        .context("No home directory found; set [storage] history_path in the config")?;
    Ok(HistoryStore::open(&path)?)
}

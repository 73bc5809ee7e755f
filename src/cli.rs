//! Shared helpers for the command-line binaries.

use crate::blockchain::Ledger;
use crate::config::{load_config_from, Config};
use crate::error::Result;
use crate::persistence::JsonFileStore;
use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Installs the fmt subscriber. `RUST_LOG` wins over `default_level`.
pub fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Ledger over the JSON store named in `config`.
pub fn open_ledger(config: &Config) -> Ledger {
    let store = JsonFileStore::new(&config.storage.path);
    Ledger::new(Box::new(store), config.genesis_secret())
}

pub fn load_ledger_from_config(config_path: impl AsRef<Path>) -> Result<(Config, Ledger)> {
    let config = load_config_from(config_path)?;
    let ledger = open_ledger(&config);
    Ok((config, ledger))
}

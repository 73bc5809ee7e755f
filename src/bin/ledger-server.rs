#![forbid(unsafe_code)]
//! HTTP server for LedgerChain

use clap::Parser;
use ledgerchain::api::{run_api_server, ApiState};
use ledgerchain::cli::{init_tracing, load_ledger_from_config};
use ledgerchain::config::DEFAULT_CONFIG_PATH;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing("info");

    let (config, ledger) = load_ledger_from_config(&cli.config)?;
    let addr = config.api_addr()?;

    let loaded = ledger.len();
    tracing::info!(path = %config.storage.path, blocks = loaded, "ledger opened");

    run_api_server(ApiState::new(ledger), addr).await
}

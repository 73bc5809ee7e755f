#![forbid(unsafe_code)]
//! Command-line access to a LedgerChain store

use clap::{Parser, Subcommand};
use colored::*;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, ContentArrangement, Table};
use ledgerchain::blockchain::{GenesisSecret, Ledger, Verification};
use ledgerchain::cli::{init_tracing, load_ledger_from_config};
use ledgerchain::config::DEFAULT_CONFIG_PATH;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Appends a block to the ledger
    Append {
        /// Label of the entry
        name: String,
        /// Numeric value of the entry
        #[arg(allow_negative_numbers = true)]
        amount: f64,
    },
    /// Lists every block in append order
    List,
    /// Looks up a block by id after verifying everything before it
    Find {
        id: String,
    },
    /// Verifies every hash link of the chain
    Verify,
    /// Prints a freshly generated genesis secret
    Secret,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing("warn");

    match cli.command {
        Commands::Secret => {
            println!("{}", GenesisSecret::generate().expose());
        }
        Commands::Append { name, amount } => {
            let ledger = open_ledger(&cli.config)?;
            let block = ledger.append(&name, amount)?;
            println!("{}", "Block appended".bright_green().bold());
            println!("  id:        {}", block.id.bright_white());
            println!("  timestamp: {}", block.timestamp);
            println!("  link_hash: {}", block.link_hash.bright_black());
        }
        Commands::List => {
            let chain = open_ledger(&cli.config)?.load();
            if chain.is_empty() {
                println!("{}", "The ledger is empty.".yellow());
                return Ok(());
            }

            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec![
                    Cell::new("#").add_attribute(Attribute::Bold),
                    Cell::new("Id").add_attribute(Attribute::Bold),
                    Cell::new("Name").add_attribute(Attribute::Bold),
                    Cell::new("Amount").add_attribute(Attribute::Bold),
                    Cell::new("Timestamp").add_attribute(Attribute::Bold),
                    Cell::new("Link hash").add_attribute(Attribute::Bold),
                ]);

            for (index, block) in chain.iter().enumerate() {
                table.add_row(vec![
                    Cell::new(index),
                    Cell::new(&block.id),
                    Cell::new(&block.name),
                    Cell::new(block.amount),
                    Cell::new(&block.timestamp),
                    Cell::new(format!("{}...", block.link_hash.chars().take(16).collect::<String>())),
                ]);
            }

            println!("{table}");
            println!("{} block(s)", chain.len());
        }
        Commands::Find { id } => {
            let block = open_ledger(&cli.config)?.find(&id)?;
            println!("{}", serde_json::to_string_pretty(&block)?);
        }
        Commands::Verify => match open_ledger(&cli.config)?.verify()? {
            Verification::Intact { length } => {
                println!(
                    "{} {} block(s), all hash links match",
                    "Chain is intact:".bright_green().bold(),
                    length
                );
            }
            Verification::Broken(link) => {
                println!("{}", "Chain integrity compromised".red().bold());
                println!("  index:    {}", link.index);
                println!("  block:    {}", link.block_id);
                println!("  expected: {}", link.expected);
                println!("  found:    {}", link.found);
                std::process::exit(1);
            }
        },
    }

    Ok(())
}

fn open_ledger(config_path: &str) -> Result<Ledger, Box<dyn std::error::Error>> {
    let (_config, ledger) = load_ledger_from_config(config_path)?;
    Ok(ledger)
}

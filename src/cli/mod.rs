//! Command-line interface definitions.

pub mod balances;
pub mod listen;
pub mod output;
pub mod setup;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use crate::config::Config;
use crate::error::Result;

/// Augury - Prediction market node client and provisioning tools.
#[derive(Parser, Debug)]
#[command(name = "augury")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Override the configured log level
    #[arg(long)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Provision a local chain: spawn the node, upload contracts, run faucets
    Setup(SetupArgs),

    /// Poll a price-event filter and print decoded updates
    Listen(ListenArgs),

    /// Show cash, reputation, and ether balances for an account
    Balances(BalancesArgs),
}

/// Arguments for the `setup` subcommand.
#[derive(Parser, Debug)]
pub struct SetupArgs {
    /// Wipe chain state and upload a fresh contract suite
    #[arg(short, long)]
    pub reset: bool,

    /// Fund the test accounts and run the token faucets
    #[arg(short, long)]
    pub faucets: bool,

    /// Attach to an already-running node instead of spawning one
    #[arg(long)]
    pub no_spawn: bool,

    /// Start from the persisted contract addresses
    #[arg(short = 'o', long)]
    pub gospel: bool,

    /// Upload a single named contract
    #[arg(short = 't', long)]
    pub contract: Option<String>,

    /// Checkout holding the contract sources and uploader
    #[arg(short = 'u', long)]
    pub core_path: Option<PathBuf>,

    /// Echo node output to the console
    #[arg(short, long)]
    pub debug: bool,
}

/// Arguments for the `listen` subcommand.
#[derive(Parser, Debug)]
pub struct ListenArgs {
    /// Price-event topic to watch
    #[arg(long, default_value = "updatePrice")]
    pub topic: String,

    /// Seconds between polls
    #[arg(long, default_value_t = 2)]
    pub interval: u64,
}

/// Arguments for the `balances` subcommand.
#[derive(Parser, Debug)]
pub struct BalancesArgs {
    /// Account to inspect (defaults to the node's etherbase)
    #[arg(long)]
    pub account: Option<String>,
}

/// Load the config file, falling back to defaults when it does not exist.
pub fn load_config(path: &Path, log_level: Option<&str>) -> Result<Config> {
    let mut config = if path.exists() {
        Config::load(path)?
    } else {
        Config::default()
    };
    if let Some(level) = log_level {
        config.logging.level = level.to_string();
    }
    Ok(config)
}

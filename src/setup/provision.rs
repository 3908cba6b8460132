//! The provisioning pipeline for a local development chain.
//!
//! Brings a fresh chain to a usable state: spawn the node, wait for the
//! etherbase to mine enough ether, upload the contracts, persist their
//! addresses, then fund the remaining test accounts and drive the token
//! faucets for each of them in turn.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use alloy_primitives::Address;
use indicatif::ProgressBar;
use owo_colors::OwoColorize;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::config::Config;
use crate::contracts::{ContractRegistry, Faucets, DEV_BRANCH};
use crate::error::{Error, Result};
use crate::rpc::{HttpTransport, NodeClient};
use crate::setup::node::{NodeOptions, NodeProcess};

const CONNECT_ATTEMPTS: u32 = 10;
const CONNECT_INTERVAL: Duration = Duration::from_secs(5);
const RESPAWN_LIMIT: u32 = 3;
const BALANCE_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Faucet thresholds: accounts at or above these balances are left alone.
const REP_TARGET: Decimal = dec!(47);
const CASH_TARGET: Decimal = dec!(5);

/// Flags controlling what the provisioning run does.
#[derive(Debug, Clone, Default)]
pub struct SetupOptions {
    /// Wipe chain state under the datadir before starting.
    pub reset: bool,
    /// Fund the remaining test accounts and run the token faucets.
    pub faucets: bool,
    /// Spawn the node (false attaches to one already running).
    pub spawn_node: bool,
    /// Upload a single named contract instead of the full suite.
    pub upload_contract: Option<String>,
    /// Start from the persisted contract addresses instead of uploading.
    pub use_gospel: bool,
    /// Echo node output to the console.
    pub verbose: bool,
}

/// Drives a provisioning run to completion.
pub struct Provisioner {
    config: Config,
    options: SetupOptions,
}

impl Provisioner {
    pub fn new(config: Config, options: SetupOptions) -> Self {
        Self { config, options }
    }

    /// Run the pipeline.
    pub async fn run(&self) -> Result<()> {
        let datadir = self.config.datadir();
        std::fs::create_dir_all(&datadir)?;

        if self.options.reset {
            self.reset_datadir(&datadir)?;
        }

        let accounts = keystore_accounts(&datadir, self.config.chain.max_test_accounts)?;
        let etherbase = *accounts.first().ok_or_else(|| {
            Error::NodeProcess(format!(
                "no accounts in {}; create one before provisioning",
                datadir.join("keystore").display()
            ))
        })?;
        println!("{} {}", "Account 0:".blue().bold(), etherbase.cyan());

        let client = NodeClient::new(
            HttpTransport::new(&self.config.node.rpc_url)?,
            self.config.numeric.format,
        );

        let mut node = if self.options.spawn_node {
            Some(self.spawn_node(etherbase).await?)
        } else {
            None
        };

        let result = self.provision(&client, &accounts, etherbase, &mut node).await;

        if let Some(mut node) = node {
            node.kill().await?;
        }
        result
    }

    async fn provision(
        &self,
        client: &NodeClient<HttpTransport>,
        accounts: &[Address],
        etherbase: Address,
        node: &mut Option<NodeProcess>,
    ) -> Result<()> {
        self.connect(client, node, etherbase).await?;

        let block = client.block_number().await?;
        let balance = client.ether_balance(etherbase).await?;
        println!("Connected on account {}", etherbase.cyan());
        println!("{} {}", block.green(), "blocks".dimmed());
        println!("{} {}", balance.green(), "ETH".dimmed());

        self.wait_for_ether(client, etherbase).await?;

        let registry = if self.options.use_gospel {
            ContractRegistry::load(self.config.gospel_path())?
        } else if self.options.reset || self.options.upload_contract.is_some() {
            self.upload_contracts().await?
        } else {
            ContractRegistry::load(self.config.gospel_path())?
        };

        if self.options.faucets {
            self.fund_accounts(client, etherbase, accounts).await?;
            self.run_faucets(client, &registry, accounts, node).await?;
        }
        Ok(())
    }

    fn reset_datadir(&self, datadir: &Path) -> Result<()> {
        println!(
            "Reset data directory: {}",
            datadir.display().green()
        );
        for subdir in ["blockchain", "extra", "nodes", "state"] {
            match std::fs::remove_dir_all(datadir.join(subdir)) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }

    async fn spawn_node(&self, etherbase: Address) -> Result<NodeProcess> {
        let options = NodeOptions::from_config(&self.config, etherbase, self.options.verbose);
        let node = NodeProcess::spawn(&options).await?;
        println!("Node listening on ports:");
        println!("{} {}", " - Peer:".dimmed(), self.config.node.peer_port.cyan());
        println!("{} {}", " - RPC: ".dimmed(), self.config.node.rpc_port.cyan());
        Ok(node)
    }

    /// Retry until the node answers, respawning it when attempts run out.
    async fn connect(
        &self,
        client: &NodeClient<HttpTransport>,
        node: &mut Option<NodeProcess>,
        etherbase: Address,
    ) -> Result<()> {
        let mut respawns = 0;
        loop {
            for attempt in 1..=CONNECT_ATTEMPTS {
                match client.accounts().await {
                    Ok(accounts) if !accounts.is_empty() => return Ok(()),
                    Ok(_) => warn!(attempt, "node answered with no accounts"),
                    Err(e) => info!(attempt, error = %e, "node not ready"),
                }
                sleep(CONNECT_INTERVAL).await;
            }
            if !self.options.spawn_node || respawns >= RESPAWN_LIMIT {
                return Err(Error::NodeProcess(format!(
                    "could not connect to node at {}",
                    self.config.node.rpc_url
                )));
            }
            respawns += 1;
            warn!(respawns, "node unresponsive, restarting");
            if let Some(mut old) = node.take() {
                old.kill().await?;
            }
            *node = Some(self.spawn_node(etherbase).await?);
        }
    }

    /// Block until the etherbase has mined the configured minimum ether.
    async fn wait_for_ether(
        &self,
        client: &NodeClient<HttpTransport>,
        account: Address,
    ) -> Result<()> {
        let minimum = Decimal::from(self.config.chain.minimum_ether);
        let spinner = ProgressBar::new_spinner();
        spinner.enable_steady_tick(Duration::from_millis(120));
        loop {
            let balance = client.ether_balance(account).await?;
            if balance >= minimum {
                spinner.finish_and_clear();
                return Ok(());
            }
            spinner.set_message(format!(
                "{} ETH, waiting for {minimum}...",
                balance.round_dp(4)
            ));
            sleep(BALANCE_POLL_INTERVAL).await;
        }
    }

    /// Shell out to the uploader, then persist the generated addresses.
    async fn upload_contracts(&self) -> Result<ContractRegistry> {
        match &self.options.upload_contract {
            Some(name) => println!(
                "{} {} {}",
                "Uploading".red().bold(),
                name.yellow().bold(),
                format!("contract to network {}:", self.config.node.network_id)
                    .red()
                    .bold()
            ),
            None => println!(
                "{}",
                format!(
                    "Upload contracts to network {}:",
                    self.config.node.network_id
                )
                .red()
                .bold()
            ),
        }

        let uploader = self.config.core_path().join("load_contracts.py");
        let mut args = vec![
            format!("--BLOCKTIME={}", self.config.chain.block_time),
            format!("--port={}", self.config.node.rpc_port),
        ];
        if let Some(name) = &self.options.upload_contract {
            args.push(format!("--contract={name}"));
        }

        let mut child = Command::new(&uploader)
            .args(&args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                Error::NodeProcess(format!("failed to run {}: {e}", uploader.display()))
            })?;

        if let Some(stdout) = child.stdout.take() {
            tokio::spawn(async move {
                let mut lines = BufReader::new(stdout).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    println!("{}", line.cyan().dimmed());
                }
            });
        }
        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(async move {
                let mut lines = BufReader::new(stderr).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    eprintln!("{}", line.red());
                }
            });
        }

        let status = child
            .wait()
            .await
            .map_err(|e| Error::NodeProcess(e.to_string()))?;
        if !status.success() {
            return Err(Error::NodeProcess(format!(
                "uploader exited with {status}"
            )));
        }

        let generator = self.config.core_path().join("generate_gospel.py");
        let output = Command::new(&generator)
            .arg("-j")
            .output()
            .await
            .map_err(|e| {
                Error::NodeProcess(format!("failed to run {}: {e}", generator.display()))
            })?;
        if !output.status.success() {
            return Err(Error::NodeProcess(format!(
                "address generator exited with {}",
                output.status
            )));
        }

        let registry = ContractRegistry::from_json(&String::from_utf8_lossy(&output.stdout))?;
        registry.save(self.config.gospel_path())?;
        println!(
            "Saved contract addresses: {}",
            self.config.gospel_path().display().green()
        );
        Ok(registry)
    }

    /// Send the minimum ether to every test account beyond the etherbase.
    async fn fund_accounts(
        &self,
        client: &NodeClient<HttpTransport>,
        from: Address,
        accounts: &[Address],
    ) -> Result<()> {
        let amount = Decimal::from(self.config.chain.minimum_ether);
        println!("Send {amount} ETH to:");
        for account in accounts.iter().skip(1) {
            let pending = client.pay(from, *account, amount).await?;
            println!("  {} {}", "✓".green(), account.dimmed());
            info!(to = %account, tx_hash = %pending.tx_hash(), "funding transfer sent");
        }
        Ok(())
    }

    /// Drive the reputation and cash faucets for every test account.
    ///
    /// Faucet transactions must come from the account being topped up, so
    /// each account takes a turn as the node's unlocked etherbase.
    async fn run_faucets(
        &self,
        client: &NodeClient<HttpTransport>,
        registry: &ContractRegistry,
        accounts: &[Address],
        node: &mut Option<NodeProcess>,
    ) -> Result<()> {
        for (index, account) in accounts.iter().enumerate() {
            if index > 0 && self.options.spawn_node {
                println!("{} {}", format!("\nAccount {index}:").blue().bold(), account.cyan());
                if let Some(mut old) = node.take() {
                    old.kill().await?;
                }
                *node = Some(self.spawn_node(*account).await?);
                self.connect(client, node, *account).await?;
                self.wait_for_ether(client, *account).await?;
            }
            self.faucets_for(client, registry, *account).await?;
        }
        Ok(())
    }

    async fn faucets_for(
        &self,
        client: &NodeClient<HttpTransport>,
        registry: &ContractRegistry,
        account: Address,
    ) -> Result<()> {
        let faucets = Faucets::new(client, registry, account)?;

        let reputation = faucets.rep_balance(DEV_BRANCH, account).await?;
        let cash = faucets.cash_balance(account).await?;

        if reputation < REP_TARGET || cash < CASH_TARGET {
            println!("Faucets:");
            if reputation < REP_TARGET {
                let pending = faucets.reputation_faucet(DEV_BRANCH).await?;
                match pending.confirmed().await {
                    Ok(_) => println!("  {} {}", "✓".green(), "Reputation faucet".dimmed()),
                    Err(e) => warn!(account = %account, error = %e, "reputation faucet failed"),
                }
            }
            if cash < CASH_TARGET {
                let pending = faucets.cash_faucet().await?;
                match pending.confirmed().await {
                    Ok(_) => println!("  {} {}", "✓".green(), "Cash faucet".dimmed()),
                    Err(e) => warn!(account = %account, error = %e, "cash faucet failed"),
                }
            }
        }

        let cash = faucets.cash_balance(account).await?;
        let reputation = faucets.rep_balance(DEV_BRANCH, account).await?;
        let ether = client.ether_balance(account).await?;
        println!("{}", "\nBalances:".cyan());
        println!("Cash:       {}", cash.green());
        println!("Reputation: {}", reputation.green());
        println!("Ether:      {}", ether.round_dp(4).green());
        Ok(())
    }
}

/// Accounts from the keystore under `datadir`, in creation order.
///
/// The node names key files with a sortable timestamp prefix, so a plain
/// name sort recovers the order accounts were created in.
pub fn keystore_accounts(datadir: &Path, max: usize) -> Result<Vec<Address>> {
    let keystore = datadir.join("keystore");
    let mut files: Vec<PathBuf> = match std::fs::read_dir(&keystore) {
        Ok(entries) => entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file())
            .collect(),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };
    files.sort();

    let mut accounts = Vec::new();
    for path in files.into_iter().take(max) {
        let content = std::fs::read_to_string(&path)?;
        let key: serde_json::Value = serde_json::from_str(&content)?;
        let Some(address) = key.get("address").and_then(|a| a.as_str()) else {
            warn!(path = %path.display(), "keystore file without an address");
            continue;
        };
        let address = if address.starts_with("0x") {
            address.to_string()
        } else {
            format!("0x{address}")
        };
        match address.parse() {
            Ok(address) => accounts.push(address),
            Err(e) => warn!(path = %path.display(), error = %e, "bad keystore address"),
        }
    }
    Ok(accounts)
}

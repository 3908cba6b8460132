//! Handler for the `balances` command.

use std::str::FromStr;

use alloy_primitives::Address;

use crate::cli::{load_config, output, BalancesArgs, Cli};
use crate::contracts::{ContractRegistry, Faucets, DEV_BRANCH};
use crate::error::{ConfigError, Result};
use crate::rpc::{HttpTransport, NodeClient};

/// Execute the balances command.
pub async fn execute(cli: &Cli, args: &BalancesArgs) -> Result<()> {
    let config = load_config(&cli.config, cli.log_level.as_deref())?;
    config.init_logging();

    let client = NodeClient::new(
        HttpTransport::new(&config.node.rpc_url)?,
        config.numeric.format,
    );
    let account = match &args.account {
        Some(account) => {
            Address::from_str(account).map_err(|e| ConfigError::InvalidValue {
                field: "account",
                reason: e.to_string(),
            })?
        }
        None => client.coinbase().await?,
    };

    let registry = ContractRegistry::load(config.gospel_path())?;
    let faucets = Faucets::new(&client, &registry, account)?;

    let cash = faucets.cash_balance(account).await?;
    let reputation = faucets.rep_balance(DEV_BRANCH, account).await?;
    let ether = client.ether_balance(account).await?;

    output::section(&format!("Balances for {account}"));
    output::key_value("Cash:", cash);
    output::key_value("Reputation:", reputation);
    output::key_value("Ether:", ether.round_dp(4));
    Ok(())
}

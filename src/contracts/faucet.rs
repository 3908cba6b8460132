//! Test-chain faucets and token balance reads.
//!
//! Reputation lives on the reporting contract, cash on the cash contract;
//! both expose a faucet for development chains.

use alloy_primitives::{Address, U256};
use alloy_sol_types::sol;
use rust_decimal::Decimal;

use crate::contracts::{names, read_call, send_call, ContractRegistry};
use crate::domain::fixed::unfix_decimal;
use crate::error::{ContractError, Result};
use crate::rpc::client::NodeClient;
use crate::rpc::transport::Transport;
use crate::rpc::tx::PendingTx;

sol! {
    function reputationFaucet(uint256 branch) external returns (uint256);
    function cashFaucet() external returns (uint256);
    function getRepBalance(uint256 branch, address account) external view returns (uint256);
    function getCashBalance(address account) external view returns (uint256);
}

/// Wrapper over the cash and reporting contracts' faucet surface.
pub struct Faucets<'a, T: Transport> {
    client: &'a NodeClient<T>,
    cash: Address,
    reporting: Address,
    from: Address,
}

impl<'a, T: Transport> Faucets<'a, T> {
    /// Resolve the cash and reporting addresses and bind the sender.
    pub fn new(
        client: &'a NodeClient<T>,
        registry: &ContractRegistry,
        from: Address,
    ) -> std::result::Result<Self, ContractError> {
        Ok(Self {
            client,
            cash: registry.address(names::CASH)?,
            reporting: registry.address(names::REPORTING)?,
            from,
        })
    }

    /// Mint development reputation for the sending account.
    pub async fn reputation_faucet(&self, branch: U256) -> Result<PendingTx<'a, T>> {
        send_call(self.client, self.from, self.reporting, reputationFaucetCall { branch }).await
    }

    /// Mint development cash for the sending account.
    pub async fn cash_faucet(&self) -> Result<PendingTx<'a, T>> {
        send_call(self.client, self.from, self.cash, cashFaucetCall {}).await
    }

    /// Reputation balance of `account` on `branch`.
    pub async fn rep_balance(&self, branch: U256, account: Address) -> Result<Decimal> {
        let raw =
            read_call(self.client, self.from, self.reporting, getRepBalanceCall { branch, account })
                .await?;
        Ok(unfix_decimal(raw)?)
    }

    /// Cash balance of `account`.
    pub async fn cash_balance(&self, account: Address) -> Result<Decimal> {
        let raw = read_call(self.client, self.from, self.cash, getCashBalanceCall { account })
            .await?;
        Ok(unfix_decimal(raw)?)
    }
}

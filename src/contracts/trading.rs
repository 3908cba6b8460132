//! Trading contract wrapper: share purchases, sales, and price reads.

use alloy_primitives::{Address, U256};
use alloy_sol_types::sol;
use rust_decimal::Decimal;

use crate::contracts::{names, read_call, send_call, ContractRegistry};
use crate::domain::fixed::{fix, unfix};
use crate::domain::{MarketId, Numeric, OutcomeId};
use crate::error::{ContractError, Result};
use crate::rpc::client::NodeClient;
use crate::rpc::transport::Transport;
use crate::rpc::tx::PendingTx;

sol! {
    function buyShares(uint256 branch, uint256 market, uint256 outcome, uint256 amount) external returns (uint256);
    function sellShares(uint256 branch, uint256 market, uint256 outcome, uint256 amount) external returns (uint256);
    function price(uint256 market, uint256 outcome) external view returns (uint256);
    function getSimulatedBuy(uint256 market, uint256 outcome, uint256 amount) external view returns (uint256);
    function getMarkets(uint256 branch) external view returns (uint256[] memory);
    function getMarketEvents(uint256 market) external view returns (uint256[] memory);
}

/// Parameters for a share purchase or sale.
#[derive(Debug, Clone)]
pub struct ShareTrade {
    pub branch: U256,
    pub market: MarketId,
    pub outcome: OutcomeId,
    /// Number of shares, fixed-point encoded on the wire.
    pub amount: Decimal,
}

/// Wrapper for the trading contract.
pub struct Trading<'a, T: Transport> {
    client: &'a NodeClient<T>,
    address: Address,
    from: Address,
}

impl<'a, T: Transport> Trading<'a, T> {
    /// Resolve the trading contract address and bind the sending account.
    pub fn new(
        client: &'a NodeClient<T>,
        registry: &ContractRegistry,
        from: Address,
    ) -> std::result::Result<Self, ContractError> {
        Ok(Self {
            client,
            address: registry.address(names::TRADING)?,
            from,
        })
    }

    /// Buy shares in a market outcome.
    pub async fn buy_shares(&self, trade: &ShareTrade) -> Result<PendingTx<'a, T>> {
        let call = buySharesCall {
            branch: trade.branch,
            market: trade.market.as_u256(),
            outcome: trade.outcome.as_u256(),
            amount: fix(trade.amount)?,
        };
        send_call(self.client, self.from, self.address, call).await
    }

    /// Sell shares in a market outcome.
    pub async fn sell_shares(&self, trade: &ShareTrade) -> Result<PendingTx<'a, T>> {
        let call = sellSharesCall {
            branch: trade.branch,
            market: trade.market.as_u256(),
            outcome: trade.outcome.as_u256(),
            amount: fix(trade.amount)?,
        };
        send_call(self.client, self.from, self.address, call).await
    }

    /// Current price of an outcome, in the client's numeric format.
    pub async fn price(&self, market: MarketId, outcome: OutcomeId) -> Result<Numeric> {
        let call = priceCall {
            market: market.as_u256(),
            outcome: outcome.as_u256(),
        };
        let raw = read_call(self.client, self.from, self.address, call).await?;
        Ok(unfix(raw, self.client.format())?)
    }

    /// Cost of buying `amount` shares at the current book.
    pub async fn simulate_buy(
        &self,
        market: MarketId,
        outcome: OutcomeId,
        amount: Decimal,
    ) -> Result<Numeric> {
        let call = getSimulatedBuyCall {
            market: market.as_u256(),
            outcome: outcome.as_u256(),
            amount: fix(amount)?,
        };
        let raw = read_call(self.client, self.from, self.address, call).await?;
        Ok(unfix(raw, self.client.format())?)
    }

    /// Markets listed on a branch.
    pub async fn markets(&self, branch: U256) -> Result<Vec<MarketId>> {
        let call = getMarketsCall { branch };
        let raw = read_call(self.client, self.from, self.address, call).await?;
        Ok(raw.into_iter().map(MarketId::from_raw).collect())
    }

    /// Events a market settles on.
    pub async fn market_events(&self, market: MarketId) -> Result<Vec<U256>> {
        let call = getMarketEventsCall {
            market: market.as_u256(),
        };
        read_call(self.client, self.from, self.address, call).await
    }
}

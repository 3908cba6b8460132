//! Consensus contract wrapper: vote periods, reporter ballots, and the
//! principal-component scoring entry points.
//!
//! Ballot entries and reputation travel fixed-point encoded; the scoring
//! calls (`blank`, `loadings`, `redeem_*`) pass their vectors through
//! untouched; the contract owns that math.

use alloy_primitives::{Address, U256};
use alloy_sol_types::sol;
use rust_decimal::Decimal;

use crate::contracts::{names, read_call, send_call, ContractRegistry};
use crate::domain::fixed::{fix, unfix};
use crate::domain::Numeric;
use crate::error::{ContractError, Result};
use crate::rpc::client::NodeClient;
use crate::rpc::transport::Transport;
use crate::rpc::tx::PendingTx;

sol! {
    function getVotePeriod(uint256 branch) external view returns (uint256);
    function getNumberEvents(uint256 branch, uint256 period) external view returns (uint256);
    function getEvents(uint256 branch, uint256 period) external view returns (uint256[] memory);
    function getNumberReporters(uint256 branch) external view returns (uint256);
    function getReporterID(uint256 branch, uint256 index) external view returns (address);
    function getReporterBallot(uint256 branch, uint256 period, address reporter) external view returns (uint256[] memory);
    function setReporterBallot(uint256 branch, uint256 period, address reporter, uint256[] memory ballot, uint256 reputation) external returns (uint256);
    function getWeightedCenteredData(uint256 branch, uint256 period) external view returns (uint256[] memory);
    function blank(uint256 components, uint256 iterations, uint256 events) external view returns (uint256[] memory);
    function loadings(uint256[] memory loadingVector, uint256[] memory data, uint256[] memory reputation, uint256 reports, uint256 events) external view returns (uint256[] memory);
    function redeemBlank(uint256 branch, uint256 period, uint256 events, uint256 reports, uint256 flatsize) external returns (uint256);
    function redeemLoadings(uint256 branch, uint256 period, uint256 events, uint256 reports, uint256 flatsize) external returns (uint256);
}

/// Wrapper for the consensus contract.
pub struct Consensus<'a, T: Transport> {
    client: &'a NodeClient<T>,
    address: Address,
    from: Address,
}

impl<'a, T: Transport> Consensus<'a, T> {
    /// Resolve the consensus contract address and bind the sending account.
    pub fn new(
        client: &'a NodeClient<T>,
        registry: &ContractRegistry,
        from: Address,
    ) -> std::result::Result<Self, ContractError> {
        Ok(Self {
            client,
            address: registry.address(names::CONSENSUS)?,
            from,
        })
    }

    /// Current vote period on a branch.
    pub async fn vote_period(&self, branch: U256) -> Result<U256> {
        read_call(self.client, self.from, self.address, getVotePeriodCall { branch }).await
    }

    /// Number of events up for reporting in a period.
    pub async fn number_events(&self, branch: U256, period: U256) -> Result<u64> {
        let raw =
            read_call(self.client, self.from, self.address, getNumberEventsCall { branch, period })
                .await?;
        raw.try_into()
            .map_err(|_| ContractError::BadReturn(format!("event count out of range: {raw}")).into())
    }

    /// Events up for reporting in a period.
    pub async fn events(&self, branch: U256, period: U256) -> Result<Vec<U256>> {
        read_call(self.client, self.from, self.address, getEventsCall { branch, period }).await
    }

    /// Number of reporters registered on a branch.
    pub async fn number_reporters(&self, branch: U256) -> Result<u64> {
        let raw =
            read_call(self.client, self.from, self.address, getNumberReportersCall { branch })
                .await?;
        raw.try_into().map_err(|_| {
            ContractError::BadReturn(format!("reporter count out of range: {raw}")).into()
        })
    }

    /// Reporter address at a branch index.
    pub async fn reporter_id(&self, branch: U256, index: u64) -> Result<Address> {
        let call = getReporterIDCall {
            branch,
            index: U256::from(index),
        };
        read_call(self.client, self.from, self.address, call).await
    }

    /// A reporter's ballot for a period, unfixed into the client's format.
    pub async fn reporter_ballot(
        &self,
        branch: U256,
        period: U256,
        reporter: Address,
    ) -> Result<Vec<Numeric>> {
        let call = getReporterBallotCall {
            branch,
            period,
            reporter,
        };
        let raw = read_call(self.client, self.from, self.address, call).await?;
        let format = self.client.format();
        raw.into_iter()
            .map(|word| unfix(word, format).map_err(Into::into))
            .collect()
    }

    /// Submit a reporter's ballot, staking `reputation` on it.
    pub async fn set_reporter_ballot(
        &self,
        branch: U256,
        period: U256,
        reporter: Address,
        ballot: &[Decimal],
        reputation: Decimal,
    ) -> Result<PendingTx<'a, T>> {
        let call = setReporterBallotCall {
            branch,
            period,
            reporter,
            ballot: ballot.iter().map(|entry| fix(*entry)).collect::<std::result::Result<_, _>>()?,
            reputation: fix(reputation)?,
        };
        send_call(self.client, self.from, self.address, call).await
    }

    /// Reputation-weighted, centered report matrix for a period.
    pub async fn weighted_centered_data(&self, branch: U256, period: U256) -> Result<Vec<U256>> {
        let call = getWeightedCenteredDataCall { branch, period };
        read_call(self.client, self.from, self.address, call).await
    }

    /// Initial loading vector for the scoring iteration.
    pub async fn blank(
        &self,
        components: u64,
        iterations: u64,
        events: u64,
    ) -> Result<Vec<U256>> {
        let call = blankCall {
            components: U256::from(components),
            iterations: U256::from(iterations),
            events: U256::from(events),
        };
        read_call(self.client, self.from, self.address, call).await
    }

    /// One power-iteration step over the report matrix.
    pub async fn loadings(
        &self,
        loading_vector: Vec<U256>,
        data: Vec<U256>,
        reputation: Vec<U256>,
        reports: u64,
        events: u64,
    ) -> Result<Vec<U256>> {
        let call = loadingsCall {
            loadingVector: loading_vector,
            data,
            reputation,
            reports: U256::from(reports),
            events: U256::from(events),
        };
        read_call(self.client, self.from, self.address, call).await
    }

    /// Settle the blank phase for a period.
    pub async fn redeem_blank(
        &self,
        branch: U256,
        period: U256,
        events: u64,
        reports: u64,
        flatsize: u64,
    ) -> Result<PendingTx<'a, T>> {
        let call = redeemBlankCall {
            branch,
            period,
            events: U256::from(events),
            reports: U256::from(reports),
            flatsize: U256::from(flatsize),
        };
        send_call(self.client, self.from, self.address, call).await
    }

    /// Settle the loadings phase for a period.
    pub async fn redeem_loadings(
        &self,
        branch: U256,
        period: U256,
        events: u64,
        reports: u64,
        flatsize: u64,
    ) -> Result<PendingTx<'a, T>> {
        let call = redeemLoadingsCall {
            branch,
            period,
            events: U256::from(events),
            reports: U256::from(reports),
            flatsize: U256::from(flatsize),
        };
        send_call(self.client, self.from, self.address, call).await
    }
}

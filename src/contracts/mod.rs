//! Contract-call wrappers.
//!
//! The contracts do the actual work (trading, consensus scoring, name
//! ownership); these wrappers marshal parameters, submit through the
//! node's unlocked account, and decode call returns. Addresses come from
//! the [`registry`] populated at upload time.

pub mod consensus;
pub mod faucet;
pub mod namereg;
pub mod registry;
pub mod trading;

pub use consensus::Consensus;
pub use faucet::Faucets;
pub use namereg::Namereg;
pub use registry::ContractRegistry;
pub use trading::Trading;

use alloy_primitives::{Address, U256};
use alloy_sol_types::SolCall;

use crate::error::{ContractError, Error};
use crate::rpc::client::{NodeClient, TxRequest};
use crate::rpc::transport::Transport;
use crate::rpc::tx::PendingTx;

/// The development branch every fresh chain starts with.
pub const DEV_BRANCH: U256 = U256::from_limbs([1010101, 0, 0, 0]);

/// Registry keys for the deployed contracts.
pub mod names {
    pub const CASH: &str = "cash";
    pub const CONSENSUS: &str = "consensus";
    pub const NAMEREG: &str = "namereg";
    pub const REPORTING: &str = "reporting";
    pub const TRADING: &str = "trading";
}

/// Read-only contract call: encode, `eth_call`, decode the return.
pub(crate) async fn read_call<T: Transport, C: SolCall>(
    client: &NodeClient<T>,
    from: Address,
    to: Address,
    call: C,
) -> Result<C::Return, Error> {
    let tx = TxRequest {
        from: Some(from),
        to: Some(to),
        data: call.abi_encode(),
        ..TxRequest::default()
    };
    let returned = client.call(&tx).await?;
    C::abi_decode_returns(&returned)
        .map_err(|e| ContractError::BadReturn(e.to_string()).into())
}

/// State-changing contract call: encode and submit through the node's
/// unlocked account.
pub(crate) async fn send_call<'a, T: Transport, C: SolCall>(
    client: &'a NodeClient<T>,
    from: Address,
    to: Address,
    call: C,
) -> Result<PendingTx<'a, T>, Error> {
    let tx = TxRequest {
        from: Some(from),
        to: Some(to),
        data: call.abi_encode(),
        ..TxRequest::default()
    };
    Ok(client.send_transaction(&tx).await?)
}

//! Typed wrapper over the node's JSON-RPC surface.

use std::str::FromStr;

use alloy_primitives::{hex, Address, B256, U256};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::domain::fixed::{parse_quantity, parse_u256};
use crate::domain::{FilterHandle, NumericFormat, RawLogEntry};
use crate::error::RpcError;
use crate::rpc::transport::Transport;
use crate::rpc::tx::PendingTx;

/// Wei per ether.
const ETHER: u64 = 1_000_000_000_000_000_000;

/// Parameters for a transaction submission or a read-only call.
///
/// Transactions go through the node's unlocked account; there is no local
/// signing in this crate.
#[derive(Debug, Clone, Default)]
pub struct TxRequest {
    pub from: Option<Address>,
    pub to: Option<Address>,
    pub data: Vec<u8>,
    pub value: Option<U256>,
    pub gas: Option<u64>,
}

impl TxRequest {
    fn to_value(&self) -> Value {
        let mut object = serde_json::Map::new();
        if let Some(from) = self.from {
            object.insert("from".into(), json!(format!("{from}")));
        }
        if let Some(to) = self.to {
            object.insert("to".into(), json!(format!("{to}")));
        }
        if !self.data.is_empty() {
            object.insert("data".into(), json!(hex::encode_prefixed(&self.data)));
        }
        if let Some(value) = self.value {
            object.insert("value".into(), json!(format!("{value:#x}")));
        }
        if let Some(gas) = self.gas {
            object.insert("gas".into(), json!(format!("{gas:#x}")));
        }
        Value::Object(object)
    }
}

/// Parameters for `newFilter` and `getLogs`.
#[derive(Debug, Clone, Default)]
pub struct FilterParams {
    pub topics: Vec<String>,
    pub from_block: Option<u64>,
    pub to_block: Option<u64>,
    pub address: Option<Address>,
}

impl FilterParams {
    /// Match a single topic label from the latest block onward.
    #[must_use]
    pub fn for_topic(label: &str) -> Self {
        Self {
            topics: vec![label.to_string()],
            ..Self::default()
        }
    }

    fn to_value(&self) -> Value {
        let mut object = serde_json::Map::new();
        object.insert("topics".into(), json!(self.topics));
        if let Some(from) = self.from_block {
            object.insert("fromBlock".into(), json!(format!("{from:#x}")));
        }
        if let Some(to) = self.to_block {
            object.insert("toBlock".into(), json!(format!("{to:#x}")));
        }
        if let Some(address) = self.address {
            object.insert("address".into(), json!(format!("{address}")));
        }
        Value::Object(object)
    }
}

/// A mined transaction receipt.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxReceipt {
    pub transaction_hash: String,
    #[serde(default)]
    pub block_hash: Option<String>,
    #[serde(default)]
    pub block_number: Option<String>,
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub to: Option<String>,
    #[serde(default)]
    pub gas_used: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub logs: Vec<RawLogEntry>,
}

impl TxReceipt {
    /// Block the transaction was mined in, when present.
    pub fn block_number(&self) -> Option<u64> {
        self.block_number
            .as_deref()
            .and_then(|n| parse_quantity(n).ok())
    }

    /// Whether the node reported the transaction as applied.
    ///
    /// Nodes that predate receipt statuses omit the field; a mined receipt
    /// without a status counts as success.
    pub fn succeeded(&self) -> bool {
        !matches!(self.status.as_deref(), Some("0x0") | Some("0x00"))
    }
}

/// Client for one node endpoint.
///
/// Carries the numeric output-format switch consulted by every fixed-point
/// decode performed on behalf of this client.
pub struct NodeClient<T: Transport> {
    transport: T,
    format: NumericFormat,
}

impl<T: Transport> NodeClient<T> {
    pub fn new(transport: T, format: NumericFormat) -> Self {
        Self { transport, format }
    }

    /// The configured output representation for decoded values.
    pub fn format(&self) -> NumericFormat {
        self.format
    }

    /// Issue a raw JSON-RPC request.
    pub async fn broadcast(&self, method: &str, params: Value) -> Result<Value, RpcError> {
        self.transport.request(method, params).await
    }

    fn expect_str(value: &Value) -> Result<&str, RpcError> {
        value
            .as_str()
            .ok_or_else(|| RpcError::InvalidResponse(value.to_string()))
    }

    fn parse_address(value: &Value) -> Result<Address, RpcError> {
        Address::from_str(Self::expect_str(value)?)
            .map_err(|e| RpcError::InvalidResponse(e.to_string()))
    }

    /// The node's etherbase account.
    pub async fn coinbase(&self) -> Result<Address, RpcError> {
        let result = self.broadcast("eth_coinbase", json!([])).await?;
        Self::parse_address(&result)
    }

    /// All accounts the node manages.
    pub async fn accounts(&self) -> Result<Vec<Address>, RpcError> {
        let result = self.broadcast("eth_accounts", json!([])).await?;
        let entries = result
            .as_array()
            .ok_or_else(|| RpcError::InvalidResponse(result.to_string()))?;
        entries.iter().map(Self::parse_address).collect()
    }

    /// Current chain height.
    pub async fn block_number(&self) -> Result<u64, RpcError> {
        let result = self.broadcast("eth_blockNumber", json!([])).await?;
        parse_quantity(Self::expect_str(&result)?)
            .map_err(|e| RpcError::InvalidResponse(e.to_string()))
    }

    /// Account balance in wei.
    pub async fn balance(&self, account: Address) -> Result<U256, RpcError> {
        let result = self
            .broadcast("eth_getBalance", json!([format!("{account}"), "latest"]))
            .await?;
        parse_u256(Self::expect_str(&result)?)
            .map_err(|e| RpcError::InvalidResponse(e.to_string()))
    }

    /// Account balance in ether.
    pub async fn ether_balance(&self, account: Address) -> Result<Decimal, RpcError> {
        let wei = self.balance(account).await?;
        let wei: u128 = wei
            .try_into()
            .map_err(|_| RpcError::InvalidResponse(format!("balance out of range: {wei}")))?;
        if wei > i128::MAX as u128 {
            return Err(RpcError::InvalidResponse(format!(
                "balance out of range: {wei}"
            )));
        }
        let wei = Decimal::try_from_i128_with_scale(wei as i128, 0)
            .map_err(|e| RpcError::InvalidResponse(e.to_string()))?;
        Ok(wei / Decimal::from(ETHER))
    }

    /// Submit a transaction through the node's unlocked account.
    pub async fn send_transaction(&self, tx: &TxRequest) -> Result<PendingTx<'_, T>, RpcError> {
        let result = self
            .broadcast("eth_sendTransaction", json!([tx.to_value()]))
            .await?;
        let tx_hash = B256::from_str(Self::expect_str(&result)?)
            .map_err(|e| RpcError::InvalidResponse(e.to_string()))?;
        Ok(PendingTx::new(self, tx_hash))
    }

    /// Read-only contract call.
    pub async fn call(&self, tx: &TxRequest) -> Result<Vec<u8>, RpcError> {
        let result = self
            .broadcast("eth_call", json!([tx.to_value(), "latest"]))
            .await?;
        hex::decode(Self::expect_str(&result)?)
            .map_err(|e| RpcError::InvalidResponse(e.to_string()))
    }

    /// Receipt for a mined transaction, `None` while still pending.
    pub async fn transaction_receipt(
        &self,
        tx_hash: B256,
    ) -> Result<Option<TxReceipt>, RpcError> {
        let result = self
            .broadcast("eth_getTransactionReceipt", json!([format!("{tx_hash}")]))
            .await?;
        if result.is_null() {
            return Ok(None);
        }
        serde_json::from_value(result)
            .map(Some)
            .map_err(|e| RpcError::InvalidResponse(e.to_string()))
    }

    /// Register a log filter with the node.
    pub async fn new_filter(&self, params: &FilterParams) -> Result<FilterHandle, RpcError> {
        let result = self.broadcast("newFilter", json!([params.to_value()])).await?;
        Ok(FilterHandle::new(Self::expect_str(&result)?))
    }

    /// New log entries for a filter since the last fetch.
    pub async fn get_filter_changes(
        &self,
        handle: &FilterHandle,
    ) -> Result<Vec<RawLogEntry>, RpcError> {
        let result = self
            .broadcast("getFilterChanges", json!([handle.as_str()]))
            .await?;
        if result.is_null() {
            return Ok(Vec::new());
        }
        serde_json::from_value(result).map_err(|e| RpcError::InvalidResponse(e.to_string()))
    }

    /// Historical log query, bypassing filter handles.
    pub async fn get_logs(&self, params: &FilterParams) -> Result<Vec<RawLogEntry>, RpcError> {
        let result = self.broadcast("getLogs", json!([params.to_value()])).await?;
        if result.is_null() {
            return Ok(Vec::new());
        }
        serde_json::from_value(result).map_err(|e| RpcError::InvalidResponse(e.to_string()))
    }

    /// Remove a server-side filter.
    pub async fn uninstall_filter(&self, handle: &FilterHandle) -> Result<bool, RpcError> {
        let result = self
            .broadcast("uninstallFilter", json!([handle.as_str()]))
            .await?;
        result
            .as_bool()
            .ok_or_else(|| RpcError::InvalidResponse(result.to_string()))
    }

    /// Plain value transfer.
    pub async fn pay(
        &self,
        from: Address,
        to: Address,
        ether: Decimal,
    ) -> Result<PendingTx<'_, T>, RpcError> {
        let wei = (ether * Decimal::from(ETHER))
            .to_u128()
            .ok_or_else(|| RpcError::InvalidResponse(format!("bad payment amount: {ether}")))?;
        let tx = TxRequest {
            from: Some(from),
            to: Some(to),
            value: Some(U256::from(wei)),
            ..TxRequest::default()
        };
        self.send_transaction(&tx).await
    }
}

//! Mock [`Transport`] implementation and log fixtures for testing.
//!
//! [`ScriptedTransport`] answers each request with the next pre-loaded
//! response and records every call, so tests can assert on both the
//! traffic and the decoded results without a node.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use alloy_primitives::{Address, U256};
use async_trait::async_trait;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use serde_json::Value;

use crate::domain::fixed::fix;
use crate::domain::RawLogEntry;
use crate::error::RpcError;
use crate::rpc::transport::Transport;

/// One JSON-RPC call as the transport saw it.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub method: String,
    pub params: Value,
}

/// A mock transport with scripted responses and a call log.
///
/// Each `request` pops the next response from the queue; an exhausted
/// queue answers `null`, which the client layers treat as "nothing there".
pub struct ScriptedTransport {
    responses: Mutex<VecDeque<Result<Value, RpcError>>>,
    calls: Mutex<Vec<RecordedCall>>,
    request_count: Arc<AtomicU32>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
            request_count: Arc::new(AtomicU32::new(0)),
        }
    }

    /// Queue a successful response.
    #[must_use]
    pub fn with_response(self, value: Value) -> Self {
        self.responses.lock().push_back(Ok(value));
        self
    }

    /// Queue an error response.
    #[must_use]
    pub fn with_error(self, error: RpcError) -> Self {
        self.responses.lock().push_back(Err(error));
        self
    }

    /// Queue a successful response after construction.
    pub fn push_response(&self, value: Value) {
        self.responses.lock().push_back(Ok(value));
    }

    /// Every call made so far, in order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    /// How many calls used the given method.
    pub fn count_method(&self, method: &str) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|call| call.method == method)
            .count()
    }

    /// Total number of requests issued.
    pub fn request_count(&self) -> u32 {
        self.request_count.load(Ordering::SeqCst)
    }
}

impl Default for ScriptedTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn request(&self, method: &str, params: Value) -> Result<Value, RpcError> {
        self.request_count.fetch_add(1, Ordering::SeqCst);
        self.calls.lock().push(RecordedCall {
            method: method.to_string(),
            params,
        });
        self.responses
            .lock()
            .pop_front()
            .unwrap_or(Ok(Value::Null))
    }
}

/// Hex-encode one 32-byte word without a prefix.
#[must_use]
pub fn encode_word(value: U256) -> String {
    format!("{value:064x}")
}

/// Encode a price-log payload: origin, market, outcome, fixed-point price.
#[must_use]
pub fn encode_price_log_data(
    origin: Address,
    market: U256,
    outcome: U256,
    price: Decimal,
) -> String {
    let price = fix(price).expect("fixed-point encode");
    format!(
        "0x{}{}{}{}",
        encode_word(U256::from_be_bytes(origin.into_word().0)),
        encode_word(market),
        encode_word(outcome),
        encode_word(price),
    )
}

/// Build a raw log entry carrying one price update.
#[must_use]
pub fn price_log_entry(
    origin: Address,
    market: U256,
    outcome: U256,
    price: Decimal,
    block_number: u64,
) -> RawLogEntry {
    RawLogEntry {
        data: encode_price_log_data(origin, market, outcome, price),
        block_number: format!("{block_number:#x}"),
        address: None,
        topics: vec![],
    }
}

/// JSON the node would return for a batch of log entries.
#[must_use]
pub fn log_entries_value(entries: &[RawLogEntry]) -> Value {
    serde_json::to_value(entries).expect("serialize log entries")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn scripted_transport_pops_responses_in_order() {
        let transport = ScriptedTransport::new()
            .with_response(json!("first"))
            .with_response(json!("second"));

        tokio_test::block_on(async {
            assert_eq!(
                transport.request("a", json!([])).await.unwrap(),
                json!("first")
            );
            assert_eq!(
                transport.request("b", json!([])).await.unwrap(),
                json!("second")
            );
            // Exhausted queue answers null.
            assert_eq!(transport.request("c", json!([])).await.unwrap(), json!(null));
        });

        assert_eq!(transport.request_count(), 3);
        assert_eq!(transport.calls()[1].method, "b");
    }

    #[test]
    fn encode_word_pads_to_64_chars() {
        let word = encode_word(U256::from(7u64));
        assert_eq!(word.len(), 64);
        assert!(word.ends_with('7'));
    }

    #[test]
    fn price_log_entry_decodes_back() {
        use crate::domain::{NumericFormat, PriceUpdate};

        let origin = Address::repeat_byte(0xaa);
        let entry = price_log_entry(origin, U256::from(7u64), U256::from(2u64), dec!(1.5), 100);
        let update = PriceUpdate::decode(&entry, NumericFormat::Decimal).unwrap();
        assert_eq!(update.origin, origin);
        assert_eq!(update.block_number, 100);
    }
}

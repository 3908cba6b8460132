//! Contract wrapper marshalling and the transaction lifecycle, against a
//! scripted node.

mod support;

use alloy_primitives::{Address, U256};
use augury::contracts::{names, Consensus, ContractRegistry, Faucets, Namereg, Trading, DEV_BRANCH};
use augury::domain::{fix, MarketId, Numeric, NumericFormat, OutcomeId};
use augury::error::TxError;
use augury::rpc::TxStatus;
use augury::testkit::{encode_word, ScriptedTransport};
use augury::contracts::trading::ShareTrade;
use rust_decimal_macros::dec;
use serde_json::json;
use std::time::Duration;

use support::{scripted_client, TX_HASH};

const NAMEREG_ADDR: &str = "0x05e793ce0c6027323b4a83e8d416871087c1e773";
const TRADING_ADDR: &str = "0x0000000000000000000000000000000000000a11";
const CASH_ADDR: &str = "0x0000000000000000000000000000000000000ca5";
const REPORTING_ADDR: &str = "0x00000000000000000000000000000000000003e9";
const CONSENSUS_ADDR: &str = "0x0000000000000000000000000000000000000c05";

fn registry() -> ContractRegistry {
    let mut registry = ContractRegistry::new();
    registry.insert(names::NAMEREG, NAMEREG_ADDR.parse().unwrap());
    registry.insert(names::TRADING, TRADING_ADDR.parse().unwrap());
    registry.insert(names::CASH, CASH_ADDR.parse().unwrap());
    registry.insert(names::REPORTING, REPORTING_ADDR.parse().unwrap());
    registry.insert(names::CONSENSUS, CONSENSUS_ADDR.parse().unwrap());
    registry
}

/// ABI encoding of a single returned word.
fn return_word(value: U256) -> serde_json::Value {
    json!(format!("0x{}", encode_word(value)))
}

/// ABI encoding of a returned `uint256[]`.
fn return_words(values: &[u64]) -> serde_json::Value {
    let mut hex = format!(
        "0x{}{}",
        encode_word(U256::from(0x20u64)),
        encode_word(U256::from(values.len() as u64))
    );
    for value in values {
        hex.push_str(&encode_word(U256::from(*value)));
    }
    json!(hex)
}

#[tokio::test]
async fn namereg_reserve_submits_through_the_unlocked_account() {
    let (transport, client) = scripted_client(
        ScriptedTransport::new().with_response(json!(TX_HASH)),
        NumericFormat::Decimal,
    );
    let from = Address::repeat_byte(0x11);
    let namereg = Namereg::new(&client, &registry(), from).unwrap();

    let pending = namereg.reserve("jack").await.unwrap();
    assert_eq!(format!("{}", pending.tx_hash()), TX_HASH);

    let calls = transport.calls();
    assert_eq!(calls[0].method, "eth_sendTransaction");
    let tx = &calls[0].params[0];
    assert_eq!(
        tx["to"].as_str().unwrap().to_lowercase(),
        NAMEREG_ADDR.to_lowercase()
    );
    assert_eq!(
        tx["from"].as_str().unwrap().to_lowercase(),
        format!("{from}").to_lowercase()
    );

    // Selector plus the 32-byte name key, "jack" left-aligned.
    let data = tx["data"].as_str().unwrap();
    assert_eq!(data.len(), 2 + 8 + 64);
    assert!(data[10..].starts_with("6a61636b"));
    assert!(data[10..].ends_with(&"0".repeat(56)));
}

#[tokio::test]
async fn namereg_owner_reads_via_eth_call() {
    let owner = Address::repeat_byte(0x22);
    let (transport, client) = scripted_client(
        ScriptedTransport::new()
            .with_response(return_word(U256::from_be_bytes(owner.into_word().0))),
        NumericFormat::Decimal,
    );
    let namereg = Namereg::new(&client, &registry(), Address::repeat_byte(0x11)).unwrap();

    let resolved = namereg.owner("jack").await.unwrap();
    assert_eq!(resolved, owner);
    assert_eq!(transport.count_method("eth_call"), 1);
}

#[tokio::test]
async fn trading_buy_shares_fixed_encodes_the_amount() {
    let (transport, client) = scripted_client(
        ScriptedTransport::new().with_response(json!(TX_HASH)),
        NumericFormat::Decimal,
    );
    let trading = Trading::new(&client, &registry(), Address::repeat_byte(0x11)).unwrap();

    trading
        .buy_shares(&ShareTrade {
            branch: DEV_BRANCH,
            market: MarketId::from(7),
            outcome: OutcomeId::from(2),
            amount: dec!(10),
        })
        .await
        .unwrap();

    let calls = transport.calls();
    let data = calls[0].params[0]["data"].as_str().unwrap();
    let amount_word = encode_word(fix(dec!(10)).unwrap());
    assert!(data.ends_with(&amount_word));
    // Selector plus branch, market, outcome, amount.
    assert_eq!(data.len(), 2 + 8 + 4 * 64);
}

#[tokio::test]
async fn trading_markets_decodes_the_returned_array() {
    let (_, client) = scripted_client(
        ScriptedTransport::new().with_response(return_words(&[7, 9])),
        NumericFormat::Decimal,
    );
    let trading = Trading::new(&client, &registry(), Address::repeat_byte(0x11)).unwrap();

    let markets = trading.markets(DEV_BRANCH).await.unwrap();
    assert_eq!(markets, vec![MarketId::from(7), MarketId::from(9)]);
}

#[tokio::test]
async fn trading_price_honors_the_numeric_format() {
    let raw = fix(dec!(0.75)).unwrap();
    let (_, client) = scripted_client(
        ScriptedTransport::new().with_response(return_word(raw)),
        NumericFormat::Text,
    );
    let trading = Trading::new(&client, &registry(), Address::repeat_byte(0x11)).unwrap();

    let price = trading
        .price(MarketId::from(7), OutcomeId::from(2))
        .await
        .unwrap();
    assert_eq!(price, Numeric::Text("0.75".into()));
}

#[tokio::test]
async fn consensus_ballot_round_trips_fixed_point() {
    let (transport, client) = scripted_client(
        ScriptedTransport::new().with_response(json!(TX_HASH)),
        NumericFormat::Decimal,
    );
    let consensus = Consensus::new(&client, &registry(), Address::repeat_byte(0x11)).unwrap();
    let reporter = Address::repeat_byte(0x33);

    consensus
        .set_reporter_ballot(
            DEV_BRANCH,
            U256::from(1u64),
            reporter,
            &[dec!(2.0), dec!(0.0), dec!(1.0)],
            dec!(47),
        )
        .await
        .unwrap();

    let calls = transport.calls();
    let data = calls[0].params[0]["data"].as_str().unwrap();
    // Ballot entries travel 2^64-scaled.
    assert!(data.contains(&encode_word(fix(dec!(2.0)).unwrap())));
    assert!(data.contains(&encode_word(fix(dec!(47)).unwrap())));
}

#[tokio::test]
async fn consensus_reporter_ballot_unfixes_entries() {
    let mut hex = format!(
        "0x{}{}",
        encode_word(U256::from(0x20u64)),
        encode_word(U256::from(2u64))
    );
    hex.push_str(&encode_word(fix(dec!(2.0)).unwrap()));
    hex.push_str(&encode_word(fix(dec!(1.0)).unwrap()));

    let (_, client) = scripted_client(
        ScriptedTransport::new().with_response(json!(hex)),
        NumericFormat::Decimal,
    );
    let consensus = Consensus::new(&client, &registry(), Address::repeat_byte(0x11)).unwrap();

    let ballot = consensus
        .reporter_ballot(DEV_BRANCH, U256::from(1u64), Address::repeat_byte(0x33))
        .await
        .unwrap();
    assert_eq!(
        ballot,
        vec![Numeric::Decimal(dec!(2)), Numeric::Decimal(dec!(1))]
    );
}

#[tokio::test]
async fn faucet_balances_unfix_to_decimals() {
    let (_, client) = scripted_client(
        ScriptedTransport::new()
            .with_response(return_word(fix(dec!(47)).unwrap()))
            .with_response(return_word(fix(dec!(5.5)).unwrap())),
        NumericFormat::Decimal,
    );
    let account = Address::repeat_byte(0x11);
    let faucets = Faucets::new(&client, &registry(), account).unwrap();

    assert_eq!(faucets.rep_balance(DEV_BRANCH, account).await.unwrap(), dec!(47));
    assert_eq!(faucets.cash_balance(account).await.unwrap(), dec!(5.5));
}

#[tokio::test]
async fn pending_tx_reports_the_three_way_lifecycle() {
    let (_, client) = scripted_client(
        ScriptedTransport::new()
            .with_response(json!(TX_HASH))
            .with_response(json!(null))
            .with_response(json!({
                "transactionHash": TX_HASH,
                "blockNumber": "0x64",
                "blockHash": "0x01"
            })),
        NumericFormat::Decimal,
    );
    let trading = Trading::new(&client, &registry(), Address::repeat_byte(0x11)).unwrap();

    let pending = trading
        .buy_shares(&ShareTrade {
            branch: DEV_BRANCH,
            market: MarketId::from(7),
            outcome: OutcomeId::from(2),
            amount: dec!(1),
        })
        .await
        .unwrap();

    // Sent, not yet mined.
    assert!(matches!(pending.status().await, TxStatus::Pending { .. }));

    // Mined on the next check.
    match pending.status().await {
        TxStatus::Success(receipt) => assert_eq!(receipt.block_number(), Some(100)),
        other => panic!("expected success, got {other:?}"),
    }
}

#[tokio::test]
async fn wait_polls_until_the_receipt_lands() {
    let (transport, client) = scripted_client(
        ScriptedTransport::new()
            .with_response(json!(TX_HASH))
            .with_response(json!(null))
            .with_response(json!(null))
            .with_response(json!({
                "transactionHash": TX_HASH,
                "blockNumber": "0x64"
            })),
        NumericFormat::Decimal,
    );
    let namereg = Namereg::new(&client, &registry(), Address::repeat_byte(0x11)).unwrap();

    let pending = namereg.reserve("jack").await.unwrap();
    let receipt = pending
        .wait(Duration::from_millis(5), Duration::from_secs(1))
        .await
        .unwrap();

    assert_eq!(receipt.block_number(), Some(100));
    assert_eq!(transport.count_method("eth_getTransactionReceipt"), 3);
}

#[tokio::test]
async fn reverted_transaction_fails_the_wait() {
    let (_, client) = scripted_client(
        ScriptedTransport::new()
            .with_response(json!(TX_HASH))
            .with_response(json!({
                "transactionHash": TX_HASH,
                "status": "0x0"
            })),
        NumericFormat::Decimal,
    );
    let namereg = Namereg::new(&client, &registry(), Address::repeat_byte(0x11)).unwrap();

    let pending = namereg.reserve("jack").await.unwrap();
    let result = pending
        .wait(Duration::from_millis(5), Duration::from_secs(1))
        .await;
    assert!(matches!(result, Err(TxError::Rejected(_))));
}

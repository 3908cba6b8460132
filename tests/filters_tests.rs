//! Behavior of the price-event filter manager against a scripted node.

mod support;

use alloy_primitives::{Address, U256};
use augury::domain::{MarketId, Numeric, NumericFormat, OutcomeId, PriceTopic};
use augury::error::{FilterError, RpcError};
use augury::testkit::{log_entries_value, price_log_entry, ScriptedTransport};
use rust_decimal_macros::dec;
use serde_json::json;

use support::scripted_filters;

fn origin(byte: u8) -> Address {
    Address::repeat_byte(byte)
}

#[tokio::test]
async fn start_listener_registers_once_per_topic() {
    let (transport, filters) = scripted_filters(
        ScriptedTransport::new().with_response(json!("0xab1")),
        NumericFormat::Decimal,
    );

    let first = filters
        .start_listener(PriceTopic::UpdatePrice)
        .await
        .unwrap();
    let second = filters
        .start_listener(PriceTopic::UpdatePrice)
        .await
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(first.as_str(), "0xab1");
    assert_eq!(transport.count_method("newFilter"), 1);
}

#[tokio::test]
async fn distinct_topics_get_distinct_filters() {
    let (transport, filters) = scripted_filters(
        ScriptedTransport::new()
            .with_response(json!("0x01"))
            .with_response(json!("0x02")),
        NumericFormat::Decimal,
    );

    let update = filters.start_listener(PriceTopic::UpdatePrice).await.unwrap();
    let sold = filters.start_listener(PriceTopic::PriceSold).await.unwrap();

    assert_ne!(update, sold);
    assert_eq!(transport.count_method("newFilter"), 2);
    assert!(filters.is_registered(PriceTopic::UpdatePrice));
    assert!(filters.is_registered(PriceTopic::PriceSold));
}

#[tokio::test]
async fn sentinel_handle_is_rejected_and_nothing_is_stored() {
    let (transport, filters) = scripted_filters(
        ScriptedTransport::new().with_response(json!("0x")),
        NumericFormat::Decimal,
    );

    let result = filters.start_listener(PriceTopic::PricePaid).await;
    assert!(matches!(result, Err(FilterError::InvalidHandle { .. })));
    assert!(!filters.is_registered(PriceTopic::PricePaid));

    // The caller may retry; the next attempt goes back to the node.
    transport.push_response(json!("0xbeef"));
    let handle = filters.start_listener(PriceTopic::PricePaid).await.unwrap();
    assert_eq!(handle.as_str(), "0xbeef");
    assert_eq!(transport.count_method("newFilter"), 2);
}

#[tokio::test]
async fn remote_failure_leaves_no_registration() {
    let (_, filters) = scripted_filters(
        ScriptedTransport::new().with_error(RpcError::Node {
            code: -32000,
            message: "filter pool full".into(),
        }),
        NumericFormat::Decimal,
    );

    let result = filters.start_listener(PriceTopic::UpdatePrice).await;
    assert!(matches!(result, Err(FilterError::Rpc(_))));
    assert!(!filters.is_registered(PriceTopic::UpdatePrice));
}

#[tokio::test]
async fn poll_delivers_entries_in_node_order() {
    let entries = vec![
        price_log_entry(origin(1), U256::from(7u64), U256::from(2u64), dec!(0.4), 100),
        price_log_entry(origin(2), U256::from(7u64), U256::from(2u64), dec!(0.5), 101),
        price_log_entry(origin(3), U256::from(7u64), U256::from(2u64), dec!(0.6), 102),
    ];
    let (_, filters) = scripted_filters(
        ScriptedTransport::new()
            .with_response(json!("0xab1"))
            .with_response(log_entries_value(&entries)),
        NumericFormat::Decimal,
    );
    filters.start_listener(PriceTopic::UpdatePrice).await.unwrap();

    let mut seen = Vec::new();
    let delivered = filters
        .poll(PriceTopic::UpdatePrice, |update| seen.push(update))
        .await
        .unwrap();

    assert_eq!(delivered, 3);
    assert_eq!(
        seen.iter().map(|u| u.block_number).collect::<Vec<_>>(),
        vec![100, 101, 102]
    );
    assert_eq!(
        seen.iter().map(|u| u.origin).collect::<Vec<_>>(),
        vec![origin(1), origin(2), origin(3)]
    );
}

#[tokio::test]
async fn poll_with_no_entries_invokes_no_handler() {
    let (_, filters) = scripted_filters(
        ScriptedTransport::new()
            .with_response(json!("0xab1"))
            .with_response(json!([])),
        NumericFormat::Decimal,
    );
    filters.start_listener(PriceTopic::UpdatePrice).await.unwrap();

    let mut invoked = 0;
    let delivered = filters
        .poll(PriceTopic::UpdatePrice, |_| invoked += 1)
        .await
        .unwrap();

    assert_eq!(delivered, 0);
    assert_eq!(invoked, 0);
}

#[tokio::test]
async fn poll_of_unregistered_topic_is_a_no_op() {
    let (transport, filters) =
        scripted_filters(ScriptedTransport::new(), NumericFormat::Decimal);

    let mut invoked = 0;
    let delivered = filters
        .poll(PriceTopic::PriceSold, |_| invoked += 1)
        .await
        .unwrap();

    assert_eq!(delivered, 0);
    assert_eq!(invoked, 0);
    assert_eq!(transport.request_count(), 0);
}

#[tokio::test]
async fn malformed_entry_aborts_the_poll_with_a_decode_error() {
    let mut bad = price_log_entry(origin(1), U256::from(7u64), U256::from(2u64), dec!(1), 100);
    bad.data = "0x1234".into();
    let (transport, filters) = scripted_filters(
        ScriptedTransport::new()
            .with_response(json!("0xab1"))
            .with_response(log_entries_value(&[bad])),
        NumericFormat::Decimal,
    );
    filters.start_listener(PriceTopic::UpdatePrice).await.unwrap();

    let result = filters.poll(PriceTopic::UpdatePrice, |_| {}).await;
    assert!(matches!(result, Err(FilterError::Decode(_))));

    // The in-flight marker is cleared even on the error path.
    transport.push_response(json!([]));
    let delivered = filters.poll(PriceTopic::UpdatePrice, |_| {}).await.unwrap();
    assert_eq!(delivered, 0);
    assert_eq!(transport.count_method("getFilterChanges"), 2);
}

#[tokio::test]
async fn end_to_end_update_price_scenario() {
    let origin1 = origin(0xaa);
    let entry = price_log_entry(origin1, U256::from(7u64), U256::from(2u64), dec!(1.5), 100);
    let (transport, filters) = scripted_filters(
        ScriptedTransport::new()
            .with_response(json!("0xAB1"))
            .with_response(log_entries_value(&[entry])),
        NumericFormat::Decimal,
    );

    let handle = filters.start_listener(PriceTopic::UpdatePrice).await.unwrap();
    assert_eq!(handle.as_str(), "0xAB1");
    assert_eq!(
        filters.handle_for(PriceTopic::UpdatePrice).unwrap(),
        handle
    );

    let mut seen = Vec::new();
    filters
        .poll(PriceTopic::UpdatePrice, |update| seen.push(update))
        .await
        .unwrap();

    assert_eq!(seen.len(), 1);
    let update = &seen[0];
    assert_eq!(update.origin, origin1);
    assert_eq!(update.market_id, MarketId::from(7));
    assert_eq!(update.outcome, Numeric::Decimal(dec!(2)));
    assert_eq!(update.price, Numeric::Decimal(dec!(1.5)));
    assert_eq!(update.block_number, 100);

    // The poll went to the handle returned at registration.
    let calls = transport.calls();
    let poll_call = calls
        .iter()
        .find(|call| call.method == "getFilterChanges")
        .unwrap();
    assert_eq!(poll_call.params, json!(["0xAB1"]));
}

#[tokio::test]
async fn search_logs_filters_by_numeric_market_and_outcome() {
    let entries = vec![
        price_log_entry(origin(1), U256::from(7u64), U256::from(2u64), dec!(0.4), 100),
        price_log_entry(origin(2), U256::from(8u64), U256::from(2u64), dec!(0.9), 101),
        price_log_entry(origin(3), U256::from(7u64), U256::from(1u64), dec!(0.1), 102),
        price_log_entry(origin(4), U256::from(7u64), U256::from(2u64), dec!(0.6), 103),
    ];
    let (_, filters) = scripted_filters(ScriptedTransport::new(), NumericFormat::Decimal);

    // Identifiers parsed from padded hex still match numerically.
    let market: MarketId =
        "0x0000000000000000000000000000000000000000000000000000000000000007"
            .parse()
            .unwrap();
    let outcome: OutcomeId = "0x02".parse().unwrap();

    let points = filters.search_logs(&entries, market, outcome).unwrap();
    assert_eq!(points.len(), 2);
    assert_eq!(points[0].block_number, 100);
    assert_eq!(points[0].price, Numeric::Decimal(dec!(0.4)));
    assert_eq!(points[1].block_number, 103);
    assert_eq!(points[1].price, Numeric::Decimal(dec!(0.6)));
}

#[tokio::test]
async fn search_logs_with_empty_input_yields_no_entries() {
    let (_, filters) = scripted_filters(ScriptedTransport::new(), NumericFormat::Decimal);
    let points = filters
        .search_logs(&[], MarketId::from(7), OutcomeId::from(2))
        .unwrap();
    assert!(points.is_empty());
}

#[tokio::test]
async fn decode_format_switch_changes_representation_not_value() {
    let entry = price_log_entry(origin(1), U256::from(7u64), U256::from(2u64), dec!(1.5), 100);

    let (_, text_filters) = scripted_filters(
        ScriptedTransport::new()
            .with_response(json!("0x01"))
            .with_response(log_entries_value(&[entry.clone()])),
        NumericFormat::Text,
    );
    let (_, decimal_filters) = scripted_filters(
        ScriptedTransport::new()
            .with_response(json!("0x01"))
            .with_response(log_entries_value(&[entry])),
        NumericFormat::Decimal,
    );

    let mut text_updates = Vec::new();
    text_filters.start_listener(PriceTopic::UpdatePrice).await.unwrap();
    text_filters
        .poll(PriceTopic::UpdatePrice, |u| text_updates.push(u))
        .await
        .unwrap();

    let mut decimal_updates = Vec::new();
    decimal_filters.start_listener(PriceTopic::UpdatePrice).await.unwrap();
    decimal_filters
        .poll(PriceTopic::UpdatePrice, |u| decimal_updates.push(u))
        .await
        .unwrap();

    let text = &text_updates[0];
    let decimal = &decimal_updates[0];
    assert!(matches!(text.price, Numeric::Text(_)));
    assert!(matches!(decimal.price, Numeric::Decimal(_)));
    assert_eq!(
        text.price.as_decimal().unwrap(),
        decimal.price.as_decimal().unwrap()
    );
    assert_eq!(
        text.outcome.as_decimal().unwrap(),
        decimal.outcome.as_decimal().unwrap()
    );
}

#[tokio::test]
async fn historical_logs_feed_search_logs() {
    use augury::rpc::FilterParams;

    let entries = vec![
        price_log_entry(origin(1), U256::from(7u64), U256::from(2u64), dec!(0.4), 90),
        price_log_entry(origin(2), U256::from(9u64), U256::from(2u64), dec!(0.7), 95),
    ];
    let (transport, filters) = scripted_filters(
        ScriptedTransport::new().with_response(log_entries_value(&entries)),
        NumericFormat::Decimal,
    );

    let logs = filters
        .client()
        .get_logs(&FilterParams::for_topic(PriceTopic::UpdatePrice.label()))
        .await
        .unwrap();
    let points = filters
        .search_logs(&logs, MarketId::from(7), OutcomeId::from(2))
        .unwrap();

    assert_eq!(points.len(), 1);
    assert_eq!(points[0].block_number, 90);
    assert_eq!(transport.count_method("getLogs"), 1);
}

#[tokio::test]
async fn uninstall_forwards_the_handle_to_the_node() {
    let (transport, filters) = scripted_filters(
        ScriptedTransport::new()
            .with_response(json!("0xab1"))
            .with_response(json!(true)),
        NumericFormat::Decimal,
    );

    let handle = filters.start_listener(PriceTopic::UpdatePrice).await.unwrap();
    assert!(filters.uninstall(&handle).await.unwrap());

    let calls = transport.calls();
    let uninstall = calls
        .iter()
        .find(|call| call.method == "uninstallFilter")
        .unwrap();
    assert_eq!(uninstall.params, json!(["0xab1"]));
}

#[tokio::test]
async fn registration_params_carry_the_topic_label() {
    let (transport, filters) = scripted_filters(
        ScriptedTransport::new().with_response(json!("0xab1")),
        NumericFormat::Decimal,
    );
    filters.start_listener(PriceTopic::PriceSold).await.unwrap();

    let calls = transport.calls();
    assert_eq!(calls[0].method, "newFilter");
    assert_eq!(calls[0].params, json!([{"topics": ["priceSold"]}]));
}

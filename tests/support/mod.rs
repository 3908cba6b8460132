#![allow(dead_code)]

use std::sync::Arc;

use augury::domain::NumericFormat;
use augury::filters::PriceFilters;
use augury::rpc::NodeClient;
use augury::testkit::ScriptedTransport;

/// Build a filter manager over a scripted transport, keeping a handle to
/// the transport for call assertions.
pub fn scripted_filters(
    transport: ScriptedTransport,
    format: NumericFormat,
) -> (Arc<ScriptedTransport>, PriceFilters<Arc<ScriptedTransport>>) {
    let transport = Arc::new(transport);
    let filters = PriceFilters::new(NodeClient::new(transport.clone(), format));
    (transport, filters)
}

/// Build a bare node client over a scripted transport.
pub fn scripted_client(
    transport: ScriptedTransport,
    format: NumericFormat,
) -> (Arc<ScriptedTransport>, NodeClient<Arc<ScriptedTransport>>) {
    let transport = Arc::new(transport);
    let client = NodeClient::new(transport.clone(), format);
    (transport, client)
}

/// A transaction hash the scripted node can hand back.
pub const TX_HASH: &str = "0x00000000000000000000000000000000000000000000000000000000000000a1";

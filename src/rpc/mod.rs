//! JSON-RPC plumbing: the transport seam, the typed node client, and the
//! transaction lifecycle.

pub mod client;
pub mod transport;
pub mod tx;

pub use client::{FilterParams, NodeClient, TxReceipt, TxRequest};
pub use transport::{HttpTransport, Transport};
pub use tx::{PendingTx, TxStatus};

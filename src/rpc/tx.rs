//! Transaction lifecycle: submitted, confirmed, or failed.
//!
//! Submission returns a [`PendingTx`], the "sent" notification. From
//! there the caller either takes a single [`TxStatus`] snapshot or waits
//! for confirmation with a poll loop.

use std::time::Duration;

use alloy_primitives::B256;
use tokio::time::{sleep, Instant};
use tracing::{debug, warn};

use crate::error::{RpcError, TxError};
use crate::rpc::client::{NodeClient, TxReceipt};
use crate::rpc::transport::Transport;

/// How often a confirmation wait re-checks the receipt.
pub const CONFIRM_INTERVAL: Duration = Duration::from_secs(2);

/// How long a confirmation wait runs before giving up.
pub const CONFIRM_TIMEOUT: Duration = Duration::from_secs(120);

/// The three-way result of a submitted transaction.
#[derive(Debug)]
pub enum TxStatus {
    /// Submitted but not yet mined.
    Pending { tx_hash: B256 },
    /// Mined and applied.
    Success(TxReceipt),
    /// Rejected, reverted, or unreachable.
    Failed(TxError),
}

impl TxStatus {
    /// Check if the transaction is still awaiting a receipt.
    pub fn is_pending(&self) -> bool {
        matches!(self, TxStatus::Pending { .. })
    }

    /// Check if the transaction was mined and applied.
    pub fn is_success(&self) -> bool {
        matches!(self, TxStatus::Success(_))
    }

    /// Check if the transaction failed.
    pub fn is_failed(&self) -> bool {
        matches!(self, TxStatus::Failed(_))
    }

    /// Get the receipt if available.
    pub fn receipt(&self) -> Option<&TxReceipt> {
        match self {
            TxStatus::Success(receipt) => Some(receipt),
            _ => None,
        }
    }
}

/// A transaction the node has accepted but not necessarily mined.
pub struct PendingTx<'a, T: Transport> {
    client: &'a NodeClient<T>,
    tx_hash: B256,
}

impl<'a, T: Transport> PendingTx<'a, T> {
    pub(crate) fn new(client: &'a NodeClient<T>, tx_hash: B256) -> Self {
        Self { client, tx_hash }
    }

    /// Hash the node assigned at submission.
    pub fn tx_hash(&self) -> B256 {
        self.tx_hash
    }

    /// Single receipt check, no waiting.
    pub async fn status(&self) -> TxStatus {
        match self.client.transaction_receipt(self.tx_hash).await {
            Ok(None) => TxStatus::Pending {
                tx_hash: self.tx_hash,
            },
            Ok(Some(receipt)) if receipt.succeeded() => TxStatus::Success(receipt),
            Ok(Some(receipt)) => TxStatus::Failed(TxError::Rejected(format!(
                "transaction {} reverted",
                receipt.transaction_hash
            ))),
            Err(e) => TxStatus::Failed(TxError::Rpc(e)),
        }
    }

    /// Poll until the transaction confirms, fails, or `timeout` elapses.
    pub async fn wait(&self, interval: Duration, timeout: Duration) -> Result<TxReceipt, TxError> {
        let started = Instant::now();
        loop {
            match self.status().await {
                TxStatus::Success(receipt) => {
                    debug!(tx_hash = %self.tx_hash, block = ?receipt.block_number(), "transaction confirmed");
                    return Ok(receipt);
                }
                TxStatus::Failed(TxError::Rpc(RpcError::Transport(reason))) => {
                    // Transient transport trouble: keep polling until the
                    // deadline rather than failing the transaction.
                    warn!(tx_hash = %self.tx_hash, %reason, "receipt check failed");
                }
                TxStatus::Failed(error) => return Err(error),
                TxStatus::Pending { .. } => {}
            }
            if started.elapsed() >= timeout {
                return Err(TxError::ConfirmationTimeout {
                    tx_hash: format!("{}", self.tx_hash),
                    waited_secs: started.elapsed().as_secs(),
                });
            }
            sleep(interval).await;
        }
    }

    /// Wait with the default cadence.
    pub async fn confirmed(&self) -> Result<TxReceipt, TxError> {
        self.wait(CONFIRM_INTERVAL, CONFIRM_TIMEOUT).await
    }
}

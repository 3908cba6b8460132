//! Price-event filter registration and polling.
//!
//! One logical filter exists per price-event topic. The manager registers
//! filters with the node's log service, fetches log deltas on demand, and
//! decodes matching entries into typed price updates for a caller-supplied
//! handler.
//!
//! The manager does not schedule anything itself: `poll` is a single-shot
//! check, and continuous monitoring is the caller's interval loop. Filter
//! lifecycle is caller-managed too: nothing is uninstalled on drop.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::domain::error::DecodeError;
use crate::domain::fixed::{parse_quantity, unfix};
use crate::domain::{
    FilterHandle, MarketId, OutcomeId, PricePoint, PriceTopic, PriceUpdate, RawLogEntry,
};
use crate::error::FilterError;
use crate::rpc::client::{FilterParams, NodeClient};
use crate::rpc::transport::Transport;

/// Book-keeping for one registered price filter.
#[derive(Debug, Clone)]
struct FilterRegistration {
    handle: FilterHandle,
    /// Set while a poll for this filter is in flight; a second poll
    /// arriving before the first completes returns without fetching.
    is_polling: bool,
}

impl FilterRegistration {
    fn new(handle: FilterHandle) -> Self {
        Self {
            handle,
            is_polling: false,
        }
    }
}

/// Manager for the node-side price-event filters.
///
/// Registrations are keyed by topic and owned by the instance, so
/// independent managers (one per client, or per test) never share state.
pub struct PriceFilters<T: Transport> {
    client: NodeClient<T>,
    registrations: Mutex<HashMap<PriceTopic, FilterRegistration>>,
}

/// Clears the in-flight marker when a poll completes, on every exit path.
struct PollGuard<'a, T: Transport> {
    filters: &'a PriceFilters<T>,
    topic: PriceTopic,
}

impl<T: Transport> Drop for PollGuard<'_, T> {
    fn drop(&mut self) {
        if let Some(registration) = self.filters.registrations.lock().get_mut(&self.topic) {
            registration.is_polling = false;
        }
    }
}

impl<T: Transport> PriceFilters<T> {
    /// Create a manager over the given client.
    pub fn new(client: NodeClient<T>) -> Self {
        Self {
            client,
            registrations: Mutex::new(HashMap::new()),
        }
    }

    /// The underlying node client.
    pub fn client(&self) -> &NodeClient<T> {
        &self.client
    }

    /// Whether a filter is currently registered for `topic`.
    pub fn is_registered(&self, topic: PriceTopic) -> bool {
        self.registrations.lock().contains_key(&topic)
    }

    /// Handle of the registered filter for `topic`, if any.
    pub fn handle_for(&self, topic: PriceTopic) -> Option<FilterHandle> {
        self.registrations
            .lock()
            .get(&topic)
            .map(|registration| registration.handle.clone())
    }

    /// Register interest in logs carrying `topic` with the node.
    ///
    /// Nothing is recorded here: this is the raw remote call, used by
    /// [`start_listener`](Self::start_listener). An empty sentinel handle
    /// from the node is an error and is logged as a diagnostic.
    pub async fn create_filter(&self, topic: PriceTopic) -> Result<FilterHandle, FilterError> {
        let params = FilterParams::for_topic(topic.label());
        let handle = match self.client.new_filter(&params).await {
            Ok(handle) => handle,
            Err(e) => {
                warn!(topic = %topic, error = %e, "couldn't create price filter");
                return Err(e.into());
            }
        };
        if handle.is_empty_sentinel() {
            warn!(topic = %topic, "couldn't create price filter: node returned empty handle");
            return Err(FilterError::InvalidHandle {
                topic: topic.label(),
            });
        }
        Ok(handle)
    }

    /// Idempotent registration: returns the existing handle for `topic`
    /// without a second remote call, or creates and records a new filter.
    ///
    /// On failure nothing is stored; the caller may retry.
    pub async fn start_listener(&self, topic: PriceTopic) -> Result<FilterHandle, FilterError> {
        if let Some(handle) = self.handle_for(topic) {
            info!(topic = %topic, handle = %handle, "price filter found");
            return Ok(handle);
        }

        let handle = self.create_filter(topic).await?;

        let raced = {
            let mut registrations = self.registrations.lock();
            match registrations.entry(topic) {
                Entry::Occupied(existing) => Some(existing.get().handle.clone()),
                Entry::Vacant(slot) => {
                    slot.insert(FilterRegistration::new(handle.clone()));
                    None
                }
            }
        };

        if let Some(existing) = raced {
            // Another registration landed between the lookup and the
            // remote call; keep it and drop the fresh server-side filter.
            warn!(topic = %topic, "concurrent registration, reusing existing filter");
            let _ = self.client.uninstall_filter(&handle).await;
            return Ok(existing);
        }

        info!(topic = %topic, handle = %handle, "created price filter");
        Ok(handle)
    }

    /// Single-shot fetch of new log entries for `topic`.
    ///
    /// Each entry decodes into a [`PriceUpdate`] delivered to `on_message`
    /// synchronously, in the order the node returned them (block order).
    /// Returns the number of updates delivered.
    ///
    /// A topic with no registration is a no-op, as is a topic whose
    /// previous poll has not completed yet; both log at debug level. A
    /// malformed entry aborts the poll with a decode error; entries
    /// delivered before it stay delivered.
    pub async fn poll<F>(&self, topic: PriceTopic, mut on_message: F) -> Result<usize, FilterError>
    where
        F: FnMut(PriceUpdate),
    {
        let handle = {
            let mut registrations = self.registrations.lock();
            match registrations.get_mut(&topic) {
                None => {
                    debug!(topic = %topic, "poll for unregistered topic, skipping");
                    return Ok(0);
                }
                Some(registration) if registration.is_polling => {
                    debug!(topic = %topic, "poll already in flight, skipping");
                    return Ok(0);
                }
                Some(registration) => {
                    registration.is_polling = true;
                    registration.handle.clone()
                }
            }
        };
        let _guard = PollGuard {
            filters: self,
            topic,
        };

        let entries = self.client.get_filter_changes(&handle).await?;
        let format = self.client.format();
        let mut delivered = 0;
        for entry in &entries {
            on_message(PriceUpdate::decode(entry, format)?);
            delivered += 1;
        }
        if delivered > 0 {
            debug!(topic = %topic, count = delivered, "delivered price updates");
        }
        Ok(delivered)
    }

    /// Pure filter/decode pass over an already-fetched batch of logs.
    ///
    /// Keeps only entries whose market and outcome words numerically equal
    /// the supplied identifiers (hex padding is irrelevant), preserving
    /// input order. Decoding honors the client's numeric format switch.
    pub fn search_logs(
        &self,
        logs: &[RawLogEntry],
        market_id: MarketId,
        outcome_id: OutcomeId,
    ) -> Result<Vec<PricePoint>, DecodeError> {
        let format = self.client.format();
        let mut points = Vec::new();
        for entry in logs {
            let words = entry.data_words()?;
            if words.len() < 4 {
                return Err(DecodeError::TruncatedData {
                    expected: 4,
                    got: words.len(),
                });
            }
            if MarketId::from_raw(words[1]) == market_id
                && OutcomeId::from_raw(words[2]) == outcome_id
            {
                points.push(PricePoint {
                    price: unfix(words[3], format)?,
                    block_number: parse_quantity(&entry.block_number)?,
                });
            }
        }
        Ok(points)
    }

    /// Remove a server-side filter. Registrations are untouched; filter
    /// lifecycle stays with the caller.
    pub async fn uninstall(&self, handle: &FilterHandle) -> Result<bool, FilterError> {
        Ok(self.client.uninstall_filter(handle).await?)
    }
}

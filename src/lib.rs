//! Augury - Prediction market node client and provisioning tools.
//!
//! This crate wraps a prediction-market blockchain node's JSON-RPC
//! interface: contract-call wrappers (trading, consensus ballots, name
//! registry), a price-event filter manager, and the orchestration used to
//! stand up a local chain for development.
//!
//! # Architecture
//!
//! The heavy lifting (consensus scoring, ballot aggregation, market
//! settlement) happens inside deployed contracts; this crate marshals
//! parameters, submits transactions, and polls for results.
//!
//! - [`rpc`] - JSON-RPC transport and typed node client
//! - [`filters`] - Price-event filter registration and polling
//! - [`contracts`] - Contract-call wrappers and the address registry
//! - [`setup`] - Local node process supervision and chain provisioning
//! - [`domain`] - Identifiers, fixed-point numerics, decoded events
//! - [`config`] - Configuration loading from TOML files
//! - [`error`] - Error types for the crate
//!
//! # Example
//!
//! ```no_run
//! use augury::config::Config;
//! use augury::domain::PriceTopic;
//! use augury::filters::PriceFilters;
//! use augury::rpc::{HttpTransport, NodeClient};
//!
//! # async fn run() -> augury::error::Result<()> {
//! let config = Config::default();
//! let client = NodeClient::new(HttpTransport::new(&config.node.rpc_url)?, config.numeric.format);
//! let filters = PriceFilters::new(client);
//!
//! let handle = filters.start_listener(PriceTopic::UpdatePrice).await?;
//! filters
//!     .poll(PriceTopic::UpdatePrice, |update| println!("{update:?}"))
//!     .await?;
//! filters.uninstall(&handle).await?;
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod contracts;
pub mod domain;
pub mod error;
pub mod filters;
pub mod rpc;
pub mod setup;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;

//! Local-chain provisioning: node process supervision and the setup
//! pipeline (fund accounts, upload contracts, drive the faucets).

pub mod node;
pub mod provision;

pub use node::{NodeOptions, NodeProcess};
pub use provision::{Provisioner, SetupOptions};

//! Exchange-agnostic domain types: identifiers, fixed-point numerics, and
//! decoded price events.

pub mod error;
pub mod fixed;
pub mod id;
pub mod price;

pub use error::DecodeError;
pub use fixed::{fix, unfix, Numeric, NumericFormat};
pub use id::{FilterHandle, MarketId, OutcomeId};
pub use price::{PricePoint, PriceTopic, PriceUpdate, RawLogEntry};

//! Domain identifier types with proper encapsulation.

use std::fmt;
use std::str::FromStr;

use alloy_primitives::U256;

use crate::domain::error::DecodeError;
use crate::domain::fixed::parse_u256;

/// Market identifier - newtype for type safety.
///
/// Wraps the on-chain word so equality is numeric: two identifiers that
/// differ only in hex padding compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MarketId(U256);

impl MarketId {
    /// Create a new `MarketId` from a raw word.
    #[must_use]
    pub const fn from_raw(id: U256) -> Self {
        Self(id)
    }

    /// Get the underlying word.
    #[must_use]
    pub const fn as_u256(&self) -> U256 {
        self.0
    }
}

impl fmt::Display for MarketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

impl FromStr for MarketId {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_u256(s).map(Self)
    }
}

impl From<u64> for MarketId {
    fn from(id: u64) -> Self {
        Self(U256::from(id))
    }
}

/// Outcome identifier within a market - newtype for type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OutcomeId(U256);

impl OutcomeId {
    /// Create a new `OutcomeId` from a raw word.
    #[must_use]
    pub const fn from_raw(id: U256) -> Self {
        Self(id)
    }

    /// Get the underlying word.
    #[must_use]
    pub const fn as_u256(&self) -> U256 {
        self.0
    }
}

impl fmt::Display for OutcomeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for OutcomeId {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_u256(s).map(Self)
    }
}

impl From<u64> for OutcomeId {
    fn from(id: u64) -> Self {
        Self(U256::from(id))
    }
}

/// Opaque handle to a server-side log filter.
///
/// The node identifies filters by whatever string it returned from
/// `newFilter`; the only structure this crate relies on is the sentinel
/// empty value a failed registration produces.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FilterHandle(String);

impl FilterHandle {
    /// Create a new `FilterHandle` from the node's response.
    pub fn new(handle: impl Into<String>) -> Self {
        Self(handle.into())
    }

    /// Get the handle as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the node returned the sentinel empty value instead of a
    /// real handle.
    #[must_use]
    pub fn is_empty_sentinel(&self) -> bool {
        self.0.is_empty() || self.0 == "0x"
    }
}

impl fmt::Display for FilterHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for FilterHandle {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for FilterHandle {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

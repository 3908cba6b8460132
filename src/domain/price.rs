//! Price-event topics and decoded price records.

use std::fmt;
use std::str::FromStr;

use alloy_primitives::{Address, B256, U256};
use serde::{Deserialize, Serialize};

use crate::domain::error::DecodeError;
use crate::domain::fixed::{self, Numeric, NumericFormat};
use crate::domain::id::MarketId;

/// The fixed set of price-event topics the node logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PriceTopic {
    UpdatePrice,
    PricePaid,
    PriceSold,
}

impl PriceTopic {
    /// Every known topic, in registration order.
    pub const ALL: [PriceTopic; 3] = [
        PriceTopic::UpdatePrice,
        PriceTopic::PricePaid,
        PriceTopic::PriceSold,
    ];

    /// The wire label for this topic.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            PriceTopic::UpdatePrice => "updatePrice",
            PriceTopic::PricePaid => "pricePaid",
            PriceTopic::PriceSold => "priceSold",
        }
    }
}

impl fmt::Display for PriceTopic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for PriceTopic {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|topic| topic.label() == s)
            .ok_or_else(|| DecodeError::UnknownTopic { label: s.into() })
    }
}

/// A raw log entry as returned by the node's filter-changes and log
/// queries. Transient: consumed immediately on receipt.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawLogEntry {
    /// Encoded tuple payload: concatenated 32-byte words.
    pub data: String,
    /// Hex-encoded block number.
    pub block_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub topics: Vec<String>,
}

impl RawLogEntry {
    /// Split the payload into 32-byte words.
    pub fn data_words(&self) -> Result<Vec<U256>, DecodeError> {
        let digits = self
            .data
            .strip_prefix("0x")
            .or_else(|| self.data.strip_prefix("0X"))
            .unwrap_or(&self.data);
        if digits.len() % 64 != 0 {
            return Err(DecodeError::InvalidHex {
                value: self.data.clone(),
            });
        }
        digits
            .as_bytes()
            .chunks(64)
            .map(|chunk| {
                let word = std::str::from_utf8(chunk).map_err(|_| DecodeError::InvalidHex {
                    value: self.data.clone(),
                })?;
                U256::from_str_radix(word, 16).map_err(|_| DecodeError::InvalidHex {
                    value: self.data.clone(),
                })
            })
            .collect()
    }
}

/// A decoded price-update event. Immutable once constructed; ownership
/// transfers to the caller's handler on delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceUpdate {
    /// Account that caused the price change.
    pub origin: Address,
    /// Market the price belongs to.
    pub market_id: MarketId,
    /// Outcome within the market.
    pub outcome: Numeric,
    /// The new price, unfixed from the on-chain encoding.
    pub price: Numeric,
    /// Block the log entry was emitted in.
    pub block_number: u64,
}

impl PriceUpdate {
    /// Decode a raw log entry into a price update.
    ///
    /// The payload carries four positional words: origin address, market
    /// id, outcome id, and 2^64-scaled price.
    pub fn decode(entry: &RawLogEntry, format: NumericFormat) -> Result<Self, DecodeError> {
        let words = entry.data_words()?;
        if words.len() < 4 {
            return Err(DecodeError::TruncatedData {
                expected: 4,
                got: words.len(),
            });
        }
        Ok(Self {
            origin: Address::from_word(B256::from(words[0].to_be_bytes::<32>())),
            market_id: MarketId::from_raw(words[1]),
            outcome: fixed::integer(words[2], format)?,
            price: fixed::unfix(words[3], format)?,
            block_number: fixed::parse_quantity(&entry.block_number)?,
        })
    }
}

/// A single point of price history for one market outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricePoint {
    pub price: Numeric,
    pub block_number: u64,
}

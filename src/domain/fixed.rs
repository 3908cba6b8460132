//! Fixed-point numeric encoding.
//!
//! Contract-side quantities are 2^64-scaled integers: `fix` converts a
//! decimal into the on-chain representation and `unfix` converts back.
//! Negative quantities travel as two's complement.
//!
//! Decoded values carry an output-representation switch ([`NumericFormat`])
//! owned by the client configuration: the same underlying value can be
//! rendered as a decimal string or as a [`Decimal`]. This is a
//! representation choice only; both render the identical number.

use alloy_primitives::U256;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::domain::error::DecodeError;

/// The fixed-point scale factor, 2^64.
pub const ONE: U256 = U256::from_limbs([0, 1, 0, 0]);

/// Output representation for decoded numeric values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NumericFormat {
    /// Decimal strings, e.g. `"1.5"`.
    Text,
    /// [`rust_decimal::Decimal`] values.
    #[default]
    Decimal,
}

/// A decoded numeric value in one of the two output representations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Numeric {
    Text(String),
    Decimal(Decimal),
}

impl Numeric {
    /// The underlying value, independent of representation.
    pub fn as_decimal(&self) -> Result<Decimal, DecodeError> {
        match self {
            Numeric::Decimal(d) => Ok(*d),
            Numeric::Text(s) => s.parse().map_err(|_| DecodeError::InvalidNumeric {
                value: s.clone(),
            }),
        }
    }

    fn from_decimal(value: Decimal, format: NumericFormat) -> Self {
        match format {
            NumericFormat::Text => Numeric::Text(value.normalize().to_string()),
            NumericFormat::Decimal => Numeric::Decimal(value.normalize()),
        }
    }
}

impl std::fmt::Display for Numeric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Numeric::Text(s) => write!(f, "{s}"),
            Numeric::Decimal(d) => write!(f, "{d}"),
        }
    }
}

fn two_pow_64() -> Decimal {
    Decimal::from(u64::MAX) + Decimal::ONE
}

/// Split a raw word into sign and magnitude (two's complement).
fn signed_magnitude(raw: U256) -> (bool, U256) {
    if raw.bit(255) {
        (true, (!raw).wrapping_add(U256::ONE))
    } else {
        (false, raw)
    }
}

/// Decode a 2^64-scaled word into a decimal value.
pub fn unfix_decimal(raw: U256) -> Result<Decimal, DecodeError> {
    let (negative, magnitude) = signed_magnitude(raw);
    let int: u128 = (magnitude >> 64usize)
        .try_into()
        .map_err(|_| DecodeError::ValueOutOfRange {
            value: raw.to_string(),
        })?;
    if int > i128::MAX as u128 {
        return Err(DecodeError::ValueOutOfRange {
            value: raw.to_string(),
        });
    }
    let int = Decimal::try_from_i128_with_scale(int as i128, 0).map_err(|_| {
        DecodeError::ValueOutOfRange {
            value: raw.to_string(),
        }
    })?;
    let frac = Decimal::from(magnitude.as_limbs()[0]) / two_pow_64();
    let value = int + frac;
    Ok(if negative { -value } else { value })
}

/// Decode a 2^64-scaled word into the configured output representation.
pub fn unfix(raw: U256, format: NumericFormat) -> Result<Numeric, DecodeError> {
    Ok(Numeric::from_decimal(unfix_decimal(raw)?, format))
}

/// Decode an unscaled integer word into the configured representation.
pub fn integer(raw: U256, format: NumericFormat) -> Result<Numeric, DecodeError> {
    let (negative, magnitude) = signed_magnitude(raw);
    let int: u128 = magnitude
        .try_into()
        .map_err(|_| DecodeError::ValueOutOfRange {
            value: raw.to_string(),
        })?;
    if int > i128::MAX as u128 {
        return Err(DecodeError::ValueOutOfRange {
            value: raw.to_string(),
        });
    }
    let mut value = Decimal::try_from_i128_with_scale(int as i128, 0).map_err(|_| {
        DecodeError::ValueOutOfRange {
            value: raw.to_string(),
        }
    })?;
    if negative {
        value = -value;
    }
    Ok(Numeric::from_decimal(value, format))
}

/// Encode a decimal value as a 2^64-scaled word.
pub fn fix(value: Decimal) -> Result<U256, DecodeError> {
    let negative = value.is_sign_negative();
    let magnitude = value.abs();
    let int = magnitude
        .trunc()
        .to_u128()
        .ok_or_else(|| DecodeError::ValueOutOfRange {
            value: value.to_string(),
        })?;
    let frac = (magnitude.fract() * two_pow_64())
        .round()
        .to_u128()
        .ok_or_else(|| DecodeError::ValueOutOfRange {
            value: value.to_string(),
        })?;
    let raw = (U256::from(int) << 64usize) + U256::from(frac);
    Ok(if negative {
        (!raw).wrapping_add(U256::ONE)
    } else {
        raw
    })
}

/// Parse a numeric string: `0x`-prefixed hex or plain decimal.
pub fn parse_u256(s: &str) -> Result<U256, DecodeError> {
    let trimmed = s.trim();
    let (digits, radix) = match trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        Some(rest) => (rest, 16),
        None => (trimmed, 10),
    };
    if digits.is_empty() {
        return Err(DecodeError::InvalidNumeric { value: s.into() });
    }
    U256::from_str_radix(digits, radix).map_err(|_| DecodeError::InvalidNumeric {
        value: s.into(),
    })
}

/// Parse a hex quantity (e.g. a block number) into a `u64`.
pub fn parse_quantity(s: &str) -> Result<u64, DecodeError> {
    parse_u256(s)?
        .try_into()
        .map_err(|_| DecodeError::ValueOutOfRange { value: s.into() })
}

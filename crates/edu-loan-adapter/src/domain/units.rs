//! # Token Units
//!
//! Conversion between human-facing decimal strings (whole tokens) and the
//! contract's 18-decimal fixed-point integers. This is the one bit-exact
//! boundary of the adapter: everything crossing into a contract call goes
//! through [`parse_units`], everything coming back through [`format_units`].

use crate::domain::value_objects::U256;
use crate::errors::AmountError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Decimals used by the contract's native token.
pub const TOKEN_DECIMALS: usize = 18;

/// Parses a non-negative decimal string into a fixed-point integer with
/// `decimals` fractional digits.
///
/// Accepted: `"1"`, `"1.5"`, `".5"`, `"1."`, `"007.250"`.
/// Rejected: empty input, signs, whitespace, exponents, more than one `.`,
/// and fractional digits beyond `decimals` unless they are trailing zeros.
pub fn parse_units(input: &str, decimals: usize) -> Result<U256, AmountError> {
    if input.is_empty() {
        return Err(AmountError::Empty);
    }
    if input.starts_with('-') {
        return Err(AmountError::Negative(input.to_string()));
    }

    let (whole, fraction) = match input.split_once('.') {
        Some((w, f)) => (w, f),
        None => (input, ""),
    };
    if whole.is_empty() && fraction.is_empty() {
        return Err(AmountError::Malformed(input.to_string()));
    }
    if !whole.bytes().all(|b| b.is_ascii_digit()) || !fraction.bytes().all(|b| b.is_ascii_digit())
    {
        return Err(AmountError::Malformed(input.to_string()));
    }

    let fraction = fraction.trim_end_matches('0');
    if fraction.len() > decimals {
        return Err(AmountError::TooManyDecimals {
            input: input.to_string(),
            max: decimals,
        });
    }

    let mut digits = String::with_capacity(whole.len() + decimals);
    digits.push_str(whole);
    digits.push_str(fraction);
    digits.extend(std::iter::repeat('0').take(decimals - fraction.len()));
    let digits = digits.trim_start_matches('0');
    if digits.is_empty() {
        return Ok(U256::zero());
    }

    U256::from_dec_str(digits).map_err(|_| AmountError::Overflow(input.to_string()))
}

/// Formats a fixed-point integer as a decimal string.
///
/// Trailing fractional zeros are trimmed but one fractional digit is always
/// kept: `10^18` formats as `"1.0"`, `5 * 10^17` as `"0.5"`.
#[must_use]
pub fn format_units(value: U256, decimals: usize) -> String {
    let digits = value.to_string();
    let padded = if digits.len() <= decimals {
        format!("{}{digits}", "0".repeat(decimals + 1 - digits.len()))
    } else {
        digits
    };

    let split = padded.len() - decimals;
    let (whole, fraction) = padded.split_at(split);
    let fraction = fraction.trim_end_matches('0');
    if fraction.is_empty() {
        format!("{whole}.0")
    } else {
        format!("{whole}.{fraction}")
    }
}

/// Parses whole-token decimals into 18-decimal fixed point.
pub fn parse_ether(input: &str) -> Result<U256, AmountError> {
    parse_units(input, TOKEN_DECIMALS)
}

/// Formats an 18-decimal fixed-point integer in whole tokens.
#[must_use]
pub fn format_ether(value: U256) -> String {
    format_units(value, TOKEN_DECIMALS)
}

/// Lossy view of an 18-decimal fixed-point integer as `f64`.
///
/// Used by the read models, which expose amounts as plain numbers.
#[must_use]
pub fn fixed_to_f64(value: U256) -> f64 {
    // format_units always yields a valid float literal
    format_ether(value).parse().unwrap_or(f64::NAN)
}

/// A token amount held as its on-chain fixed-point integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Hash)]
pub struct TokenAmount(U256);

impl TokenAmount {
    /// Zero tokens.
    pub const ZERO: Self = Self(U256::zero());

    /// Wraps a raw fixed-point integer.
    #[must_use]
    pub const fn from_raw(raw: U256) -> Self {
        Self(raw)
    }

    /// Whole tokens, exact.
    #[must_use]
    pub fn from_tokens(tokens: u64) -> Self {
        Self(U256::from(tokens) * U256::exp10(TOKEN_DECIMALS))
    }

    /// The fixed-point integer sent to the contract.
    #[must_use]
    pub const fn raw(&self) -> U256 {
        self.0
    }

    /// Returns true if the amount is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Lossy `f64` view in whole tokens.
    #[must_use]
    pub fn to_f64(&self) -> f64 {
        fixed_to_f64(self.0)
    }
}

impl FromStr for TokenAmount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_ether(s).map(Self)
    }
}

impl fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_ether(self.0))
    }
}

impl From<U256> for TokenAmount {
    fn from(raw: U256) -> Self {
        Self(raw)
    }
}

impl Serialize for TokenAmount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for TokenAmount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

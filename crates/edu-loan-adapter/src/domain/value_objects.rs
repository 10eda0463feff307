//! # Value Objects
//!
//! Immutable primitives shared by every layer of the adapter.
//! Addresses and hashes reuse the `primitive-types` fixed-size hashes so that
//! they serialize as `0x`-prefixed hex, the way JSON-RPC expects.

use crate::errors::AbiError;
use std::str::FromStr;

pub use primitive_types::{H160 as Address, H256 as Hash, U256};

/// Raw calldata / return data.
pub type Bytes = Vec<u8>;

/// Parses a `0x`-prefixed (or bare) 40-hex-digit address.
///
/// Checksums are not verified; mixed case is accepted as-is.
pub fn parse_address(input: &str) -> Result<Address, AbiError> {
    let hex_part = input
        .strip_prefix("0x")
        .or_else(|| input.strip_prefix("0X"))
        .unwrap_or(input);
    if hex_part.len() != 40 {
        return Err(AbiError::InvalidAddress(input.to_string()));
    }
    Address::from_str(hex_part).map_err(|_| AbiError::InvalidAddress(input.to_string()))
}

/// Formats bytes as `0x`-prefixed lowercase hex.
#[must_use]
pub fn to_hex(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Decodes `0x`-prefixed hex data. An empty `0x` yields no bytes.
pub fn from_hex(input: &str) -> Result<Bytes, AbiError> {
    let hex_part = input.strip_prefix("0x").unwrap_or(input);
    hex::decode(hex_part).map_err(|e| AbiError::InvalidHex(e.to_string()))
}

/// Narrows a 256-bit word to `u64`, failing instead of truncating.
pub fn u256_to_u64(value: U256, field: &'static str) -> Result<u64, AbiError> {
    if value > U256::from(u64::MAX) {
        return Err(AbiError::ValueOutOfRange { field });
    }
    Ok(value.low_u64())
}

//! # Domain Services
//!
//! Pure hashing helpers. No I/O, no async.

use crate::domain::value_objects::Hash;
use sha3::{Digest, Keccak256};

/// Keccak-256 (the pre-standard variant used by Ethereum, not SHA3-256).
#[must_use]
pub fn keccak256(data: &[u8]) -> Hash {
    Hash::from_slice(&Keccak256::digest(data))
}

/// First four bytes of `keccak256(signature)`.
///
/// `signature` is the canonical form, e.g. `"requestLoan(uint256,uint256,bool)"`.
#[must_use]
pub fn function_selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    let mut selector = [0u8; 4];
    selector.copy_from_slice(&hash.as_bytes()[..4]);
    selector
}

/// Access-control role identifier: `keccak256(utf8(name))`.
#[must_use]
pub fn role_id(name: &str) -> Hash {
    keccak256(name.as_bytes())
}

//! # ABI Codec
//!
//! Head/tail encoding of Solidity call arguments and return values, limited
//! to the types the EduLoan contract uses: `address`, `uintN`, `bool`,
//! `bytes32`, `string`, and dynamic arrays of those.
//!
//! Every value occupies one 32-byte head word. Dynamic values (`string`,
//! `T[]`) store an offset in the head and their payload in the tail.

use crate::domain::services::{function_selector, keccak256};
use crate::domain::value_objects::{Address, Hash, U256};
use crate::errors::AbiError;

/// Size of an ABI word.
pub const WORD: usize = 32;

/// Selector of the standard `Error(string)` revert payload.
pub const ERROR_SELECTOR: [u8; 4] = [0x08, 0xc3, 0x79, 0xa0];

/// Selector of the compiler-generated `Panic(uint256)` revert payload.
pub const PANIC_SELECTOR: [u8; 4] = [0x4e, 0x48, 0x7b, 0x71];

// =============================================================================
// TYPES
// =============================================================================

/// A Solidity parameter type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamType {
    /// `address`
    Address,
    /// `uintN`, N in bits.
    Uint(usize),
    /// `bool`
    Bool,
    /// `bytes32`
    FixedBytes32,
    /// `string`
    String,
    /// `T[]`
    Array(Box<ParamType>),
}

impl ParamType {
    /// Returns true if the type is encoded in the tail.
    #[must_use]
    pub fn is_dynamic(&self) -> bool {
        matches!(self, ParamType::String | ParamType::Array(_))
    }
}

/// A decoded or to-be-encoded ABI value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// `address`
    Address(Address),
    /// `uintN`
    Uint(U256),
    /// `bool`
    Bool(bool),
    /// `bytes32`
    FixedBytes32(Hash),
    /// `string`
    String(String),
    /// `T[]`
    Array(Vec<Token>),
}

impl Token {
    /// Extracts an address.
    pub fn into_address(self) -> Result<Address, AbiError> {
        match self {
            Token::Address(a) => Ok(a),
            other => Err(mismatch("address", &other)),
        }
    }

    /// Extracts an unsigned integer.
    pub fn into_uint(self) -> Result<U256, AbiError> {
        match self {
            Token::Uint(v) => Ok(v),
            other => Err(mismatch("uint", &other)),
        }
    }

    /// Extracts a bool.
    pub fn into_bool(self) -> Result<bool, AbiError> {
        match self {
            Token::Bool(b) => Ok(b),
            other => Err(mismatch("bool", &other)),
        }
    }

    /// Extracts a bytes32.
    pub fn into_fixed_bytes(self) -> Result<Hash, AbiError> {
        match self {
            Token::FixedBytes32(h) => Ok(h),
            other => Err(mismatch("bytes32", &other)),
        }
    }

    /// Extracts a string.
    pub fn into_string(self) -> Result<String, AbiError> {
        match self {
            Token::String(s) => Ok(s),
            other => Err(mismatch("string", &other)),
        }
    }

    /// Extracts an array.
    pub fn into_array(self) -> Result<Vec<Token>, AbiError> {
        match self {
            Token::Array(items) => Ok(items),
            other => Err(mismatch("array", &other)),
        }
    }
}

fn mismatch(expected: &str, got: &Token) -> AbiError {
    AbiError::UnexpectedLayout(format!("expected {expected}, got {got:?}"))
}

// =============================================================================
// ENCODING
// =============================================================================

/// Encodes `selector ++ encode(tokens)`.
#[must_use]
pub fn encode_call(signature: &str, tokens: &[Token]) -> Vec<u8> {
    let mut out = function_selector(signature).to_vec();
    out.extend(encode(tokens));
    out
}

/// Encodes a tuple of tokens.
#[must_use]
pub fn encode(tokens: &[Token]) -> Vec<u8> {
    let head_len = tokens.len() * WORD;
    let mut head = Vec::with_capacity(head_len);
    let mut tail = Vec::new();

    for token in tokens {
        match encode_word(token) {
            Some(word) => head.extend_from_slice(&word),
            None => {
                head.extend_from_slice(&uint_word(U256::from(head_len + tail.len())));
                tail.extend(encode_dynamic(token));
            }
        }
    }

    head.extend(tail);
    head
}

/// Head word of a static token; `None` for dynamic tokens.
fn encode_word(token: &Token) -> Option<[u8; WORD]> {
    match token {
        Token::Address(a) => {
            let mut word = [0u8; WORD];
            word[12..].copy_from_slice(a.as_bytes());
            Some(word)
        }
        Token::Uint(v) => Some(uint_word(*v)),
        Token::Bool(b) => Some(uint_word(U256::from(u8::from(*b)))),
        Token::FixedBytes32(h) => Some(h.to_fixed_bytes()),
        Token::String(_) | Token::Array(_) => None,
    }
}

fn encode_dynamic(token: &Token) -> Vec<u8> {
    match token {
        Token::String(s) => {
            let bytes = s.as_bytes();
            let mut out = uint_word(U256::from(bytes.len())).to_vec();
            out.extend_from_slice(bytes);
            out.resize(WORD + padded_len(bytes.len()), 0);
            out
        }
        Token::Array(items) => {
            let mut out = uint_word(U256::from(items.len())).to_vec();
            out.extend(encode(items));
            out
        }
        other => encode_word(other).map(|w| w.to_vec()).unwrap_or_default(),
    }
}

fn uint_word(value: U256) -> [u8; WORD] {
    let mut word = [0u8; WORD];
    value.to_big_endian(&mut word);
    word
}

fn padded_len(len: usize) -> usize {
    len.div_ceil(WORD) * WORD
}

// =============================================================================
// DECODING
// =============================================================================

/// Decodes a tuple of `types` from `data`.
pub fn decode(types: &[ParamType], data: &[u8]) -> Result<Vec<Token>, AbiError> {
    types
        .iter()
        .enumerate()
        .map(|(i, ty)| decode_at(ty, data, i * WORD))
        .collect()
}

fn decode_at(ty: &ParamType, data: &[u8], head_offset: usize) -> Result<Token, AbiError> {
    let word = read_word(data, head_offset)?;
    match ty {
        ParamType::Address => {
            let mut bytes = [0u8; 20];
            bytes.copy_from_slice(&word[12..]);
            Ok(Token::Address(Address::from(bytes)))
        }
        ParamType::Uint(bits) => {
            let value = U256::from_big_endian(word);
            if *bits < 256 && value.bits() > *bits {
                return Err(AbiError::UintOverflow { bits: *bits });
            }
            Ok(Token::Uint(value))
        }
        ParamType::Bool => match U256::from_big_endian(word) {
            v if v.is_zero() => Ok(Token::Bool(false)),
            v if v == U256::one() => Ok(Token::Bool(true)),
            _ => Err(AbiError::InvalidBool),
        },
        ParamType::FixedBytes32 => Ok(Token::FixedBytes32(Hash::from_slice(word))),
        ParamType::String => {
            let start = read_usize(data, head_offset)?;
            let len = read_usize(data, start)?;
            let bytes = read_bytes(data, start + WORD, len)?;
            String::from_utf8(bytes.to_vec())
                .map(Token::String)
                .map_err(|_| AbiError::InvalidUtf8)
        }
        ParamType::Array(inner) => {
            let start = read_usize(data, head_offset)?;
            let len = read_usize(data, start)?;
            let body = data.get(start + WORD..).ok_or(AbiError::OutOfBounds {
                offset: start + WORD,
                needed: 0,
                available: data.len(),
            })?;
            // Reject lengths the body cannot possibly hold before allocating.
            if len > body.len() / WORD {
                return Err(AbiError::OutOfBounds {
                    offset: start + WORD,
                    needed: len.saturating_mul(WORD),
                    available: body.len(),
                });
            }
            let items = (0..len)
                .map(|i| decode_at(inner, body, i * WORD))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Token::Array(items))
        }
    }
}

fn read_word(data: &[u8], offset: usize) -> Result<&[u8], AbiError> {
    read_bytes(data, offset, WORD)
}

fn read_bytes(data: &[u8], offset: usize, len: usize) -> Result<&[u8], AbiError> {
    offset
        .checked_add(len)
        .and_then(|end| data.get(offset..end))
        .ok_or(AbiError::OutOfBounds {
            offset,
            needed: len,
            available: data.len(),
        })
}

fn read_usize(data: &[u8], offset: usize) -> Result<usize, AbiError> {
    let value = U256::from_big_endian(read_word(data, offset)?);
    if value > U256::from(usize::MAX) {
        return Err(AbiError::OutOfBounds {
            offset,
            needed: usize::MAX,
            available: data.len(),
        });
    }
    Ok(value.low_u64() as usize)
}

// =============================================================================
// REVERT PAYLOADS
// =============================================================================

/// Extracts a human-readable reason from revert data.
///
/// Understands `Error(string)` and `Panic(uint256)`; anything else yields
/// `None` and the caller falls back to a generic message.
#[must_use]
pub fn decode_revert_reason(data: &[u8]) -> Option<String> {
    let (selector, payload) = data.split_first_chunk::<4>()?;
    if *selector == ERROR_SELECTOR {
        decode(&[ParamType::String], payload)
            .ok()?
            .pop()?
            .into_string()
            .ok()
    } else if *selector == PANIC_SELECTOR {
        let code = decode(&[ParamType::Uint(256)], payload)
            .ok()?
            .pop()?
            .into_uint()
            .ok()?;
        Some(format!("panic code 0x{code:x}"))
    } else {
        None
    }
}

/// Builds an `Error(string)` revert payload.
#[must_use]
pub fn encode_revert_reason(reason: &str) -> Vec<u8> {
    let mut out = ERROR_SELECTOR.to_vec();
    out.extend(encode(&[Token::String(reason.to_string())]));
    out
}

/// Hash of encoded data; used to derive deterministic ids in tests and the
/// in-memory contract.
#[must_use]
pub fn hash_encoded(tokens: &[Token]) -> Hash {
    keccak256(&encode(tokens))
}

// =============================================================================
// TESTS
// =============================================================================

//! Ethereum JSON-RPC wire types.

use crate::domain::entities::TransactionReceipt;
use crate::domain::value_objects::{to_hex, Address, Hash, U256};
use crate::errors::AbiError;
use serde::{Deserialize, Serialize};

/// JSON-RPC request structure
#[derive(Debug, Serialize)]
pub struct JsonRpcRequest<T> {
    pub jsonrpc: &'static str,
    pub method: &'static str,
    pub params: T,
    pub id: u64,
}

impl<T> JsonRpcRequest<T> {
    pub fn new(method: &'static str, params: T, id: u64) -> Self {
        Self {
            jsonrpc: "2.0",
            method,
            params,
            id,
        }
    }
}

/// JSON-RPC response structure
#[derive(Debug, Deserialize)]
pub struct JsonRpcResponse<T> {
    #[serde(default)]
    pub id: Option<u64>,
    pub result: Option<T>,
    #[serde(default)]
    pub error: Option<JsonRpcError>,
}

/// JSON-RPC error object.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
}

impl std::fmt::Display for JsonRpcError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RPC Error {}: {}", self.code, self.message)
    }
}

/// `eth_call` call object.
#[derive(Debug, Clone, Serialize)]
pub struct RpcCall {
    pub from: Address,
    pub to: Address,
    pub data: String,
}

/// `eth_sendTransaction` transaction object.
#[derive(Debug, Clone, Serialize)]
pub struct RpcTransaction {
    pub from: Address,
    pub to: Address,
    pub value: String,
    pub data: String,
}

impl RpcTransaction {
    pub fn new(from: Address, to: Address, value: U256, data: &[u8]) -> Self {
        Self {
            from,
            to,
            value: to_quantity(value),
            data: to_hex(data),
        }
    }
}

/// Subset of `eth_getTransactionReceipt` the adapter reads.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcReceipt {
    pub transaction_hash: Hash,
    pub block_number: Option<String>,
    /// `0x1` success, `0x0` failure. Absent on pre-Byzantium chains.
    #[serde(default)]
    pub status: Option<String>,
}

impl RpcReceipt {
    /// Converts to the domain receipt. `None` while the block number is
    /// still unknown (some nodes return pending receipts).
    pub fn into_receipt(self) -> Result<Option<TransactionReceipt>, AbiError> {
        let Some(block) = self.block_number else {
            return Ok(None);
        };
        let success = match self.status.as_deref() {
            Some(status) => parse_quantity(status)? == 1,
            None => true,
        };
        Ok(Some(TransactionReceipt {
            transaction_hash: self.transaction_hash,
            block_number: parse_quantity(&block)?,
            success,
        }))
    }
}

/// Encodes a `QUANTITY`: `0x`-prefixed, no leading zeros, `0x0` for zero.
#[must_use]
pub fn to_quantity(value: U256) -> String {
    format!("{value:#x}")
}

/// Decodes a `QUANTITY` that fits in `u64`.
pub fn parse_quantity(input: &str) -> Result<u64, AbiError> {
    let digits = input.strip_prefix("0x").unwrap_or(input);
    u64::from_str_radix(digits, 16).map_err(|_| AbiError::InvalidHex(input.to_string()))
}

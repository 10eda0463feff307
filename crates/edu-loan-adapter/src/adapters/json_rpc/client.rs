//! HTTP JSON-RPC provider.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, trace};

use super::types::*;
use crate::domain::abi::decode_revert_reason;
use crate::domain::config::AdapterConfig;
use crate::domain::entities::TransactionReceipt;
use crate::domain::value_objects::{from_hex, to_hex, Address, Bytes, Hash};
use crate::errors::TransactionError;
use crate::ports::outbound::{CallRequest, ChainProvider, TransactionRequest};

/// EIP-1193 "user rejected request".
pub const USER_REJECTED_CODE: i64 = 4001;
/// Geth/Anvil revert code.
pub const EXECUTION_REVERTED_CODE: i64 = 3;
/// Nethermind/Parity-style revert code.
pub const VM_EXECUTION_ERROR_CODE: i64 = -32015;
/// JSON-RPC "method not found".
pub const METHOD_NOT_FOUND_CODE: i64 = -32601;

/// [`ChainProvider`] backed by an Ethereum JSON-RPC endpoint.
///
/// Signing is delegated to the node (`eth_sendTransaction`), so the
/// endpoint must manage the accounts: a wallet bridge, a dev node with
/// unlocked accounts, or a signing proxy.
pub struct JsonRpcProvider {
    client: Client,
    url: String,
    request_id: AtomicU64,
}

impl JsonRpcProvider {
    /// Creates a provider for `config.rpc_url`.
    pub fn new(config: &AdapterConfig) -> Result<Self, TransactionError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| TransactionError::WalletUnavailable(e.to_string()))?;

        Ok(Self {
            client,
            url: config.rpc_url.clone(),
            request_id: AtomicU64::new(1),
        })
    }

    fn next_id(&self) -> u64 {
        self.request_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Sends one request and parses the envelope. Only transport and parse
    /// failures are errors here; a JSON-RPC error object is returned as is.
    async fn exchange<P: Serialize + Send + Sync, R: DeserializeOwned>(
        &self,
        method: &'static str,
        params: P,
    ) -> Result<JsonRpcResponse<R>, TransactionError> {
        let request = JsonRpcRequest::new(method, params, self.next_id());
        trace!(method, id = request.id, "JSON-RPC request");

        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    TransactionError::WalletUnavailable(format!("cannot connect to {}", self.url))
                } else {
                    TransactionError::Network(e.to_string())
                }
            })?;

        let rpc_response: JsonRpcResponse<R> = response
            .json()
            .await
            .map_err(|e| TransactionError::Network(format!("failed to parse response: {e}")))?;
        if let Some(error) = &rpc_response.error {
            debug!(method, code = error.code, message = %error.message, "JSON-RPC error");
        }
        Ok(rpc_response)
    }

    async fn rpc_optional<P: Serialize + Send + Sync, R: DeserializeOwned>(
        &self,
        method: &'static str,
        params: P,
    ) -> Result<Option<R>, TransactionError> {
        let response = self.exchange(method, params).await?;
        match response.error {
            Some(error) => Err(map_rpc_error(&error)),
            None => Ok(response.result),
        }
    }

    /// Call a JSON-RPC method whose result must be present.
    async fn rpc<P: Serialize + Send + Sync, R: DeserializeOwned>(
        &self,
        method: &'static str,
        params: P,
    ) -> Result<R, TransactionError> {
        self.rpc_optional(method, params)
            .await?
            .ok_or_else(|| TransactionError::Network(format!("{method}: missing result")))
    }
}

/// Classifies a JSON-RPC error object.
pub fn map_rpc_error(error: &JsonRpcError) -> TransactionError {
    if error.code == USER_REJECTED_CODE {
        return TransactionError::UserRejected;
    }

    let is_revert = error.code == EXECUTION_REVERTED_CODE
        || error.code == VM_EXECUTION_ERROR_CODE
        || error.message.contains("execution reverted");
    if !is_revert {
        return TransactionError::Network(error.to_string());
    }

    let from_data = error
        .data
        .as_ref()
        .and_then(revert_data)
        .and_then(|bytes| decode_revert_reason(&bytes));
    let reason = from_data.or_else(|| {
        error
            .message
            .strip_prefix("execution reverted: ")
            .map(str::to_string)
    });
    TransactionError::Reverted {
        reason,
        tx_hash: None,
    }
}

/// Extracts revert bytes from `error.data`, which nodes return either as a
/// hex string or as `{ "data": "0x..." }`.
fn revert_data(value: &serde_json::Value) -> Option<Bytes> {
    let hex = match value {
        serde_json::Value::String(s) => s.as_str(),
        serde_json::Value::Object(map) => map.get("data")?.as_str()?,
        _ => return None,
    };
    from_hex(hex).ok()
}

#[async_trait]
impl ChainProvider for JsonRpcProvider {
    async fn request_accounts(&self) -> Result<Vec<Address>, TransactionError> {
        let response = self
            .exchange::<[(); 0], Vec<Address>>("eth_requestAccounts", [])
            .await?;
        match response.error {
            Some(error) if error.code == METHOD_NOT_FOUND_CODE => {
                // plain nodes only know eth_accounts
                debug!("eth_requestAccounts unsupported, using eth_accounts");
                self.rpc::<[(); 0], Vec<Address>>("eth_accounts", []).await
            }
            Some(error) => Err(map_rpc_error(&error)),
            None => response.result.ok_or_else(|| {
                TransactionError::Network("eth_requestAccounts: missing result".into())
            }),
        }
    }

    async fn chain_id(&self) -> Result<u64, TransactionError> {
        let id: String = self.rpc::<[(); 0], String>("eth_chainId", []).await?;
        Ok(parse_quantity(&id)?)
    }

    async fn block_number(&self) -> Result<u64, TransactionError> {
        let number: String = self.rpc::<[(); 0], String>("eth_blockNumber", []).await?;
        Ok(parse_quantity(&number)?)
    }

    async fn call(&self, request: &CallRequest) -> Result<Bytes, TransactionError> {
        let call = RpcCall {
            from: request.from,
            to: request.to,
            data: to_hex(&request.data),
        };
        let output: String = self.rpc("eth_call", (call, "latest")).await?;
        Ok(from_hex(&output)?)
    }

    async fn send_transaction(&self, request: &TransactionRequest) -> Result<Hash, TransactionError> {
        let tx = RpcTransaction::new(request.from, request.to, request.value, &request.data);
        self.rpc("eth_sendTransaction", [tx]).await
    }

    async fn transaction_receipt(
        &self,
        hash: Hash,
    ) -> Result<Option<TransactionReceipt>, TransactionError> {
        let receipt: Option<RpcReceipt> = self
            .rpc_optional("eth_getTransactionReceipt", [hash])
            .await?;
        match receipt {
            Some(receipt) => Ok(receipt.into_receipt()?),
            None => Ok(None),
        }
    }
}

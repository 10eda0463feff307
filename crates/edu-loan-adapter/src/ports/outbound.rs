//! # Driven Ports (SPI - Outbound)
//!
//! The wallet/provider the adapter depends on. Implementations:
//! - `JsonRpcProvider`: an Ethereum JSON-RPC endpoint with unlocked or
//!   wallet-managed accounts (`eth_sendTransaction`)
//! - `InMemoryLoanContract`: an in-process contract double

use crate::domain::entities::TransactionReceipt;
use crate::domain::value_objects::{Address, Bytes, Hash, U256};
use crate::errors::TransactionError;
use async_trait::async_trait;

/// Read-only contract call (`eth_call`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallRequest {
    /// Caller, so that `msg.sender`-dependent views behave.
    pub from: Address,
    /// Contract address.
    pub to: Address,
    /// Calldata.
    pub data: Bytes,
}

/// State-changing call, signed by the wallet (`eth_sendTransaction`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionRequest {
    /// Signing account.
    pub from: Address,
    /// Contract address.
    pub to: Address,
    /// Attached value in wei (zero for non-payable methods).
    pub value: U256,
    /// Calldata.
    pub data: Bytes,
}

/// Wallet and chain access.
///
/// Errors must already be classified into [`TransactionError`] variants:
/// a missing wallet is `WalletUnavailable`, a declined prompt is
/// `UserRejected`, a revert is `Reverted`.
#[async_trait]
pub trait ChainProvider: Send + Sync {
    /// Accounts the wallet exposes (`eth_requestAccounts`).
    ///
    /// May prompt the user on the first call of a session.
    async fn request_accounts(&self) -> Result<Vec<Address>, TransactionError>;

    /// Chain id (`eth_chainId`).
    async fn chain_id(&self) -> Result<u64, TransactionError>;

    /// Latest block number (`eth_blockNumber`).
    async fn block_number(&self) -> Result<u64, TransactionError>;

    /// Executes a read-only call and returns the raw return data.
    async fn call(&self, request: &CallRequest) -> Result<Bytes, TransactionError>;

    /// Signs and broadcasts a transaction, returning its hash.
    ///
    /// Returning means "broadcast", not "confirmed".
    async fn send_transaction(&self, request: &TransactionRequest) -> Result<Hash, TransactionError>;

    /// Receipt of a mined transaction, `None` while pending.
    async fn transaction_receipt(
        &self,
        hash: Hash,
    ) -> Result<Option<TransactionReceipt>, TransactionError>;
}

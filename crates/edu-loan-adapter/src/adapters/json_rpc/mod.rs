//! JSON-RPC provider for a real wallet or node.

mod client;
mod types;

pub use client::{map_rpc_error, JsonRpcProvider};
pub use types::{JsonRpcError, RpcReceipt};

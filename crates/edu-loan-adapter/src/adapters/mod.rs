//! # Adapters Layer (Outer Hexagon)
//!
//! [`ChainProvider`](crate::ports::ChainProvider) implementations.

pub mod in_memory;
#[cfg(feature = "json-rpc")]
pub mod json_rpc;

pub use in_memory::{InMemoryLoanContract, DEV_CHAIN_ID};
#[cfg(feature = "json-rpc")]
pub use json_rpc::JsonRpcProvider;

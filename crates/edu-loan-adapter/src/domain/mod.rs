//! # Domain Layer (Inner Hexagon)
//!
//! Pure types and functions: units, ABI, roles, records, validation.
//! Nothing in here performs I/O.

pub mod abi;
pub mod config;
pub mod contract;
pub mod entities;
pub mod roles;
pub mod services;
pub mod session;
pub mod units;
pub mod validation;
pub mod value_objects;

pub use config::AdapterConfig;
pub use contract::ContractMethod;
pub use entities::*;
pub use roles::Role;
pub use session::Session;
pub use units::{format_ether, parse_ether, TokenAmount};
pub use value_objects::{parse_address, Address, Bytes, Hash, U256};

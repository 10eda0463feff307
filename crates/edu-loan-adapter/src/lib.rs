//! # EduLoan Contract Adapter
//!
//! Typed client for the EduLoan student-loan contract: student
//! registration, loan request/approval/repayment, staking, performance
//! tracking, role management and pausing.
//!
//! ## Purpose
//!
//! Every operation converts between decimal token strings and the
//! contract's 18-decimal fixed point, encodes the call, submits it through a
//! wallet, and (for mutating calls) waits until the transaction is
//! confirmed. Reads decode the contract's tuples into typed records.
//!
//! ## Architecture
//!
//! | Layer | Location | Contents |
//! |-------|----------|----------|
//! | Domain | `domain/` | units, ABI codec, roles, records, validation, config |
//! | Ports | `ports/` | `StudentLoanApi` (inbound), `ChainProvider` (outbound) |
//! | Adapters | `adapters/` | `JsonRpcProvider`, `InMemoryLoanContract` |
//! | Service | `service.rs` | `ContractAdapter` |
//!
//! ## Error Model
//!
//! | Category | Variants |
//! |----------|----------|
//! | Precondition | `WalletUnavailable`, `AccountNotAuthorized`, `ChainMismatch` |
//! | User rejection | `UserRejected` |
//! | Revert | `Reverted { reason, tx_hash }` |
//! | Network | `Network`, `Abi` |
//! | Input | `InvalidAmount` |
//!
//! ## Usage Example
//!
//! ```ignore
//! use edu_loan_adapter::prelude::*;
//!
//! let config = AdapterConfig::load("eduloan.toml")?;
//! let provider = Arc::new(JsonRpcProvider::new(&config)?);
//! let adapter = ContractAdapter::new(provider, Session::new(account), config);
//!
//! adapter.register_student().await?;
//! adapter.request_loan("2500", 180 * SECONDS_PER_DAY, false).await?;
//! let profile = adapter.students(account).await?;
//! ```

// Crate-level lints
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

// =============================================================================
// MODULES
// =============================================================================

pub mod adapters;
pub mod domain;
pub mod errors;
pub mod ports;
pub mod service;

// =============================================================================
// PRELUDE
// =============================================================================

/// Convenient re-exports for common usage.
pub mod prelude {
    // Domain entities
    pub use crate::domain::entities::{
        LoanData, LoanRecord, LoanStatus, PendingLoan, StudentOverview, StudentProfile,
        StudentRecord, TransactionReceipt,
    };

    // Value objects
    pub use crate::domain::units::{format_ether, parse_ether, TokenAmount};
    pub use crate::domain::value_objects::{parse_address, Address, Bytes, Hash, U256};

    // Domain services
    pub use crate::domain::roles::Role;
    pub use crate::domain::services::{keccak256, role_id};
    pub use crate::domain::validation::{
        validate_amount, validate_loan_id, validate_loan_term_days, validate_score,
        validate_stake_amount, MIN_LOAN_TERM_DAYS, MIN_STAKE, SECONDS_PER_DAY,
    };

    // Configuration
    pub use crate::domain::config::AdapterConfig;
    pub use crate::domain::session::Session;

    // Ports
    pub use crate::ports::inbound::{AdapterResult, StudentLoanApi};
    pub use crate::ports::outbound::{CallRequest, ChainProvider, TransactionRequest};

    // Errors
    pub use crate::errors::{
        AbiError, AmountError, ConfigError, ErrorCategory, TransactionError, ValidationError,
    };

    // Adapters
    pub use crate::adapters::{InMemoryLoanContract, DEV_CHAIN_ID};
    #[cfg(feature = "json-rpc")]
    pub use crate::adapters::JsonRpcProvider;

    // Service
    pub use crate::service::{create_test_adapter, ContractAdapter};
}

// =============================================================================
// CRATE INFO
// =============================================================================

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// TESTS
// =============================================================================

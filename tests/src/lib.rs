//! # EduLoan Test Suite
//!
//! End-to-end tests that drive [`edu_loan_adapter::service::ContractAdapter`]
//! against the in-memory contract, through the full encode, submit,
//! confirm and decode path.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── lifecycle.rs   # register → stake → request → approve → repay
//!     ├── properties.rs  # read-side guarantees and unit handling
//!     └── failures.rs    # wallet, rejection, revert and transport errors
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p edu-loan-tests
//! cargo test -p edu-loan-tests integration::failures::
//! ```

pub mod integration;

//! EduLoan CLI: a terminal front end for the EduLoan contract.
//!
//! Mirrors the student, admin and dashboard workflows: registration, loan
//! requests, staking, repayments, approvals, role management and pausing.
//! Input is validated before anything is sent to the wallet.
//!
//! ```text
//! eduloan [--config FILE] [--rpc-url URL] [--contract ADDR] [--account ADDR]
//!         [--demo] [--json] [--log-json] <COMMAND>
//! ```

pub mod cli;
pub mod commands;
pub mod logging;
pub mod render;

pub use cli::{Args, Command};
pub use commands::{execute, Outcome};

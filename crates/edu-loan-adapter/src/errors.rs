//! # Error Types
//!
//! All error types surfaced by the adapter. Every failure is propagated to
//! the caller exactly once; nothing here is retried or swallowed.

use crate::domain::value_objects::{Address, Hash};
use thiserror::Error;

// =============================================================================
// TRANSACTION ERRORS
// =============================================================================

/// Coarse classification of a [`TransactionError`], used by callers to decide
/// how to present it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// No usable wallet/provider. Fatal for the session.
    Precondition,
    /// The user declined the signing prompt. Dismissable.
    UserRejection,
    /// The contract reverted.
    Revert,
    /// Transport or provider failure.
    Network,
    /// The caller passed something that could not be converted.
    Input,
}

/// Failure of any adapter operation.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TransactionError {
    /// No wallet/provider is reachable, or it exposes no accounts.
    #[error("wallet provider unavailable: {0}")]
    WalletUnavailable(String),

    /// The session account is not among the accounts the wallet exposes.
    #[error("account {account:?} is not available in the connected wallet")]
    AccountNotAuthorized {
        /// Session account.
        account: Address,
    },

    /// The provider is connected to a different chain than configured.
    #[error("chain id mismatch: expected {expected}, provider reports {actual}")]
    ChainMismatch {
        /// Configured chain id.
        expected: u64,
        /// Chain id reported by the provider.
        actual: u64,
    },

    /// The user rejected the signing request.
    #[error("user rejected the request")]
    UserRejected,

    /// The contract reverted, either during submission or once mined.
    #[error("transaction reverted: {}", .reason.as_deref().unwrap_or("execution reverted"))]
    Reverted {
        /// Revert reason, when the provider surfaced one.
        reason: Option<String>,
        /// Hash of the mined transaction, when the revert happened on-chain.
        tx_hash: Option<Hash>,
    },

    /// Transport/provider failure.
    #[error("provider error: {0}")]
    Network(String),

    /// An amount could not be converted to fixed point.
    #[error("invalid amount: {0}")]
    InvalidAmount(#[from] AmountError),

    /// The contract returned data that does not match its ABI.
    #[error("malformed contract data: {0}")]
    Abi(#[from] AbiError),
}

impl TransactionError {
    /// Creates a revert error without a mined transaction.
    pub fn reverted(reason: impl Into<String>) -> Self {
        Self::Reverted {
            reason: Some(reason.into()),
            tx_hash: None,
        }
    }

    /// Classifies this error.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::WalletUnavailable(_) | Self::AccountNotAuthorized { .. } | Self::ChainMismatch { .. } => {
                ErrorCategory::Precondition
            }
            Self::UserRejected => ErrorCategory::UserRejection,
            Self::Reverted { .. } => ErrorCategory::Revert,
            Self::Network(_) | Self::Abi(_) => ErrorCategory::Network,
            Self::InvalidAmount(_) => ErrorCategory::Input,
        }
    }

    /// Returns true unless the failure is a missing/misconfigured wallet.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        self.category() != ErrorCategory::Precondition
    }

    /// Returns true if the user declined the signing prompt.
    #[must_use]
    pub fn is_user_rejection(&self) -> bool {
        matches!(self, Self::UserRejected)
    }

    /// Revert reason, if any.
    #[must_use]
    pub fn revert_reason(&self) -> Option<&str> {
        match self {
            Self::Reverted { reason, .. } => reason.as_deref(),
            _ => None,
        }
    }
}

// =============================================================================
// AMOUNT ERRORS
// =============================================================================

/// Errors converting a decimal string to fixed point.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AmountError {
    /// Empty input.
    #[error("amount is empty")]
    Empty,

    /// Negative amounts are never valid.
    #[error("amount must not be negative: {0}")]
    Negative(String),

    /// Not a plain decimal number.
    #[error("not a decimal number: {0:?}")]
    Malformed(String),

    /// More fractional digits than the token supports.
    #[error("{input} has more than {max} decimal places")]
    TooManyDecimals {
        /// Offending input.
        input: String,
        /// Maximum supported fractional digits.
        max: usize,
    },

    /// Does not fit in 256 bits once scaled.
    #[error("amount too large: {0}")]
    Overflow(String),
}

// =============================================================================
// ABI ERRORS
// =============================================================================

/// Errors encoding or decoding contract data.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AbiError {
    /// Data ended before a full word could be read.
    #[error("data too short: need {needed} bytes at offset {offset}, have {available}")]
    OutOfBounds {
        /// Read offset.
        offset: usize,
        /// Bytes needed.
        needed: usize,
        /// Bytes available.
        available: usize,
    },

    /// A boolean word was neither 0 nor 1.
    #[error("invalid bool encoding")]
    InvalidBool,

    /// A uintN word exceeded N bits.
    #[error("value does not fit in uint{bits}")]
    UintOverflow {
        /// Declared width.
        bits: usize,
    },

    /// A string was not UTF-8.
    #[error("invalid utf-8 string")]
    InvalidUtf8,

    /// Tuple arity or token type did not match the expected layout.
    #[error("unexpected layout: {0}")]
    UnexpectedLayout(String),

    /// Unknown function selector.
    #[error("unknown selector 0x{}", hex::encode(.0))]
    UnknownSelector([u8; 4]),

    /// A numeric field does not fit the read model.
    #[error("field {field} is out of range")]
    ValueOutOfRange {
        /// Field name.
        field: &'static str,
    },

    /// Address string could not be parsed.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// Hex string could not be parsed.
    #[error("invalid hex: {0}")]
    InvalidHex(String),
}

// =============================================================================
// VALIDATION ERRORS
// =============================================================================

/// Caller-side input validation failures, phrased for end users.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Amount missing, unparsable or not positive.
    #[error("Please enter a valid {what} amount")]
    InvalidAmount {
        /// What the amount is for ("loan", "stake", ...).
        what: &'static str,
    },

    /// Stake below the contract minimum.
    #[error("Minimum stake is {minimum} EDU")]
    StakeBelowMinimum {
        /// Minimum in whole tokens.
        minimum: u64,
    },

    /// Loan term shorter than the contract minimum.
    #[error("Minimum loan term is {minimum_days} days")]
    TermTooShort {
        /// Minimum in days.
        minimum_days: u64,
    },

    /// Loan ids start at 1.
    #[error("Please enter a valid loan ID")]
    InvalidLoanId,

    /// Score outside 0..=100.
    #[error("Score must be between 0 and {max}")]
    ScoreOutOfRange {
        /// Maximum score.
        max: u64,
    },
}

// =============================================================================
// CONFIG ERRORS
// =============================================================================

/// Configuration loading/validation errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// File could not be read.
    #[error("failed to read {path}: {error}")]
    Io {
        /// Config path.
        path: String,
        /// Underlying error.
        error: String,
    },

    /// TOML could not be parsed.
    #[error("failed to parse config: {0}")]
    Parse(String),

    /// An environment override had an invalid value.
    #[error("invalid value for {key}: {value}")]
    InvalidOverride {
        /// Environment variable.
        key: &'static str,
        /// Offending value.
        value: String,
    },

    /// Contract address is unset.
    #[error("contract address is not configured")]
    MissingContractAddress,

    /// RPC URL is not http(s).
    #[error("invalid rpc url: {0}")]
    InvalidRpcUrl(String),

    /// Poll interval or confirmation depth is zero.
    #[error("invalid confirmation settings: {0}")]
    InvalidConfirmation(String),
}

// =============================================================================
// TESTS
// =============================================================================

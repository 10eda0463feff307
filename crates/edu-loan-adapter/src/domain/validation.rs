//! # Caller-side Validation
//!
//! Form-level checks that front ends run before calling the adapter. The
//! adapter itself enforces none of these: the contract is the authority and
//! reverts on its own terms.

use crate::domain::units::{parse_ether, TokenAmount};
use crate::errors::ValidationError;

/// Contract minimum stake, in whole tokens.
pub const MIN_STAKE: u64 = 1000;

/// Contract minimum loan term, in days.
pub const MIN_LOAN_TERM_DAYS: u64 = 90;

/// Seconds per day; loan terms cross the adapter boundary in seconds.
pub const SECONDS_PER_DAY: u64 = 86_400;

/// Maximum course score accepted by `updatePerformance`.
pub const MAX_SCORE: u64 = 100;

/// Validates a strictly positive amount.
pub fn validate_amount(input: &str, what: &'static str) -> Result<TokenAmount, ValidationError> {
    let raw = parse_ether(input.trim()).map_err(|_| ValidationError::InvalidAmount { what })?;
    if raw.is_zero() {
        return Err(ValidationError::InvalidAmount { what });
    }
    Ok(TokenAmount::from_raw(raw))
}

/// Validates a stake: positive and at least [`MIN_STAKE`].
pub fn validate_stake_amount(input: &str) -> Result<TokenAmount, ValidationError> {
    let amount = validate_amount(input, "stake")?;
    if amount < TokenAmount::from_tokens(MIN_STAKE) {
        return Err(ValidationError::StakeBelowMinimum { minimum: MIN_STAKE });
    }
    Ok(amount)
}

/// Validates a loan term given in days and returns it in seconds.
pub fn validate_loan_term_days(days: u64) -> Result<u64, ValidationError> {
    if days < MIN_LOAN_TERM_DAYS {
        return Err(ValidationError::TermTooShort {
            minimum_days: MIN_LOAN_TERM_DAYS,
        });
    }
    days.checked_mul(SECONDS_PER_DAY)
        .ok_or(ValidationError::TermTooShort {
            minimum_days: MIN_LOAN_TERM_DAYS,
        })
}

/// Loan ids start at 1.
pub fn validate_loan_id(loan_id: u64) -> Result<u64, ValidationError> {
    if loan_id == 0 {
        return Err(ValidationError::InvalidLoanId);
    }
    Ok(loan_id)
}

/// Course scores are percentages.
pub fn validate_score(score: u64) -> Result<u64, ValidationError> {
    if score > MAX_SCORE {
        return Err(ValidationError::ScoreOutOfRange { max: MAX_SCORE });
    }
    Ok(score)
}

//! # Domain Entities
//!
//! Raw contract records (exact `U256` values, as decoded from the ABI) and
//! the read models derived from them. Read models are immutable snapshots:
//! every state change goes through a transaction followed by a re-fetch.

use crate::domain::abi::Token;
use crate::domain::contract::STUDENT_DETAILS_FIELDS;
use crate::domain::units::{fixed_to_f64, format_ether};
use crate::domain::value_objects::{u256_to_u64, Address, Hash, U256};
use crate::errors::AbiError;
use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// LOAN STATUS
// =============================================================================

/// Lifecycle state of a loan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LoanStatus {
    /// Requested, awaiting approval. Also the status of a missing loan.
    Pending = 0,
    /// Approved and funded.
    Active = 1,
    /// Fully repaid.
    Repaid = 2,
    /// Defaulted.
    Defaulted = 3,
}

impl TryFrom<u8> for LoanStatus {
    type Error = AbiError;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        match raw {
            0 => Ok(Self::Pending),
            1 => Ok(Self::Active),
            2 => Ok(Self::Repaid),
            3 => Ok(Self::Defaulted),
            _ => Err(AbiError::ValueOutOfRange { field: "status" }),
        }
    }
}

impl fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Pending => "Pending",
            Self::Active => "Active",
            Self::Repaid => "Repaid",
            Self::Defaulted => "Defaulted",
        };
        f.write_str(label)
    }
}

// =============================================================================
// RAW RECORDS
// =============================================================================

/// `students(address)` exactly as returned by the contract.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudentRecord {
    pub is_registered: bool,
    pub credit_score: U256,
    pub total_borrowed: U256,
    pub performance_score: U256,
    pub is_blacklisted: bool,
    pub staked_amount: U256,
    pub last_rewards_claim: U256,
    pub courses_count: U256,
    pub loans: Vec<U256>,
}

impl StudentRecord {
    /// Builds the record from the full return values, loan-id list last.
    pub fn from_tokens(mut tokens: Vec<Token>) -> Result<Self, AbiError> {
        if tokens.len() != STUDENT_DETAILS_FIELDS + 1 {
            return Err(arity("students", STUDENT_DETAILS_FIELDS + 1, tokens.len()));
        }
        let loans = tokens
            .pop()
            .ok_or_else(|| arity("students", STUDENT_DETAILS_FIELDS + 1, 0))?
            .into_array()?
            .into_iter()
            .map(Token::into_uint)
            .collect::<Result<_, _>>()?;
        Ok(Self {
            loans,
            ..Self::from_details(tokens)?
        })
    }

    /// Builds the record from the static fields only. `loans` is left empty;
    /// struct getters omit array members, so the list may not be there.
    pub fn from_details(tokens: Vec<Token>) -> Result<Self, AbiError> {
        let [is_registered, credit_score, total_borrowed, performance_score, is_blacklisted, staked_amount, last_rewards_claim, courses_count]: [Token; STUDENT_DETAILS_FIELDS] =
            tokens
                .try_into()
                .map_err(|t: Vec<Token>| arity("students", STUDENT_DETAILS_FIELDS, t.len()))?;

        Ok(Self {
            is_registered: is_registered.into_bool()?,
            credit_score: credit_score.into_uint()?,
            total_borrowed: total_borrowed.into_uint()?,
            performance_score: performance_score.into_uint()?,
            is_blacklisted: is_blacklisted.into_bool()?,
            staked_amount: staked_amount.into_uint()?,
            last_rewards_claim: last_rewards_claim.into_uint()?,
            courses_count: courses_count.into_uint()?,
            loans: Vec::new(),
        })
    }

    /// Encodes the record as the contract would return it.
    #[must_use]
    pub fn to_tokens(&self) -> Vec<Token> {
        vec![
            Token::Bool(self.is_registered),
            Token::Uint(self.credit_score),
            Token::Uint(self.total_borrowed),
            Token::Uint(self.performance_score),
            Token::Bool(self.is_blacklisted),
            Token::Uint(self.staked_amount),
            Token::Uint(self.last_rewards_claim),
            Token::Uint(self.courses_count),
            Token::Array(self.loans.iter().copied().map(Token::Uint).collect()),
        ]
    }
}

/// `loans(uint256)` exactly as returned by the contract.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoanData {
    pub borrower: Address,
    pub principal: U256,
    pub remaining_amount: U256,
    pub interest_rate: U256,
    pub term: U256,
    pub status: u8,
    pub is_collateralized: bool,
    pub collateral_amount: U256,
    pub milestone: U256,
}

impl LoanData {
    /// Builds the record from decoded return values.
    pub fn from_tokens(tokens: Vec<Token>) -> Result<Self, AbiError> {
        let [borrower, principal, remaining_amount, interest_rate, term, status, is_collateralized, collateral_amount, milestone]: [Token; 9] =
            tokens
                .try_into()
                .map_err(|t: Vec<Token>| arity("loans", 9, t.len()))?;

        let status = status.into_uint()?;
        Ok(Self {
            borrower: borrower.into_address()?,
            principal: principal.into_uint()?,
            remaining_amount: remaining_amount.into_uint()?,
            interest_rate: interest_rate.into_uint()?,
            term: term.into_uint()?,
            // decoded as uint8, so the low byte is the whole value
            status: status.low_u32() as u8,
            is_collateralized: is_collateralized.into_bool()?,
            collateral_amount: collateral_amount.into_uint()?,
            milestone: milestone.into_uint()?,
        })
    }

    /// Encodes the record as the contract would return it.
    #[must_use]
    pub fn to_tokens(&self) -> Vec<Token> {
        vec![
            Token::Address(self.borrower),
            Token::Uint(self.principal),
            Token::Uint(self.remaining_amount),
            Token::Uint(self.interest_rate),
            Token::Uint(self.term),
            Token::Uint(U256::from(self.status)),
            Token::Bool(self.is_collateralized),
            Token::Uint(self.collateral_amount),
            Token::Uint(self.milestone),
        ]
    }
}

fn arity(method: &str, expected: usize, got: usize) -> AbiError {
    AbiError::UnexpectedLayout(format!("{method}: expected {expected} values, got {got}"))
}

// =============================================================================
// READ MODELS
// =============================================================================

/// Student profile with amounts in whole tokens.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentProfile {
    pub is_registered: bool,
    pub credit_score: u64,
    /// Whole tokens (fixed point / 10^18).
    pub total_borrowed: f64,
    pub performance_score: u64,
    pub is_blacklisted: bool,
    /// Whole tokens (fixed point / 10^18).
    pub staked_amount: f64,
    /// Unix seconds.
    pub last_rewards_claim: u64,
    pub courses_count: u64,
}

impl TryFrom<&StudentRecord> for StudentProfile {
    type Error = AbiError;

    fn try_from(raw: &StudentRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            is_registered: raw.is_registered,
            credit_score: u256_to_u64(raw.credit_score, "creditScore")?,
            total_borrowed: fixed_to_f64(raw.total_borrowed),
            performance_score: u256_to_u64(raw.performance_score, "performanceScore")?,
            is_blacklisted: raw.is_blacklisted,
            staked_amount: fixed_to_f64(raw.staked_amount),
            last_rewards_claim: u256_to_u64(raw.last_rewards_claim, "lastRewardsClaim")?,
            courses_count: u256_to_u64(raw.courses_count, "coursesCount")?,
        })
    }
}

/// Loan with amounts in whole tokens. `status` stays raw; map it with
/// [`LoanRecord::loan_status`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanRecord {
    pub borrower: Address,
    pub principal: f64,
    pub remaining_amount: f64,
    /// Basis points.
    pub interest_rate: u64,
    /// Seconds.
    pub term: u64,
    pub status: u8,
    pub is_collateralized: bool,
    pub collateral_amount: f64,
    pub milestone: u64,
}

impl LoanRecord {
    /// Maps the raw status to [`LoanStatus`].
    pub fn loan_status(&self) -> Result<LoanStatus, AbiError> {
        LoanStatus::try_from(self.status)
    }

    /// The contract returns an all-zero record for unknown ids.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.borrower.is_zero() && self.principal == 0.0 && self.status == 0
    }
}

impl TryFrom<&LoanData> for LoanRecord {
    type Error = AbiError;

    fn try_from(raw: &LoanData) -> Result<Self, Self::Error> {
        Ok(Self {
            borrower: raw.borrower,
            principal: fixed_to_f64(raw.principal),
            remaining_amount: fixed_to_f64(raw.remaining_amount),
            interest_rate: u256_to_u64(raw.interest_rate, "interestRate")?,
            term: u256_to_u64(raw.term, "term")?,
            status: raw.status,
            is_collateralized: raw.is_collateralized,
            collateral_amount: fixed_to_f64(raw.collateral_amount),
            milestone: u256_to_u64(raw.milestone, "milestone")?,
        })
    }
}

/// A pending loan found by scanning loan ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingLoan {
    pub loan_id: u64,
    #[serde(flatten)]
    pub loan: LoanRecord,
    /// Principal as an exact decimal string, ready to pass to `approve_loan`.
    pub principal_exact: String,
}

impl PendingLoan {
    /// Builds the entry from the raw record so the exact principal survives.
    pub fn from_raw(loan_id: u64, raw: &LoanData) -> Result<Self, AbiError> {
        Ok(Self {
            loan_id,
            loan: LoanRecord::try_from(raw)?,
            principal_exact: format_ether(raw.principal),
        })
    }
}

/// Dashboard view: a student's profile with each of their loans.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentOverview {
    pub address: Address,
    pub profile: StudentProfile,
    pub loans: Vec<(u64, LoanRecord)>,
}

impl StudentOverview {
    /// Sum of outstanding balances of active loans, in whole tokens.
    #[must_use]
    pub fn outstanding(&self) -> f64 {
        self.loans
            .iter()
            .filter(|(_, loan)| loan.loan_status() == Ok(LoanStatus::Active))
            .map(|(_, loan)| loan.remaining_amount)
            .sum()
    }
}

// =============================================================================
// RECEIPTS
// =============================================================================

/// Confirmation of a mined transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReceipt {
    pub transaction_hash: Hash,
    pub block_number: u64,
    /// `false` when the transaction was mined but reverted.
    pub success: bool,
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::units::parse_ether;

    fn sample_student() -> StudentRecord {
        StudentRecord {
            is_registered: true,
            credit_score: U256::from(650u64),
            total_borrowed: parse_ether("1500.5").unwrap(),
            performance_score: U256::from(87u64),
            is_blacklisted: false,
            staked_amount: parse_ether("1000").unwrap(),
            last_rewards_claim: U256::from(1_700_000_000u64),
            courses_count: U256::from(4u64),
            loans: vec![U256::from(1u64), U256::from(3u64)],
        }
    }

    #[test]
    fn test_loan_status_mapping() {
        assert_eq!(LoanStatus::try_from(0), Ok(LoanStatus::Pending));
        assert_eq!(LoanStatus::try_from(3), Ok(LoanStatus::Defaulted));
        assert!(LoanStatus::try_from(4).is_err());
        assert_eq!(LoanStatus::Active.to_string(), "Active");
    }

    #[test]
    fn test_student_record_token_round_trip() {
        let record = sample_student();
        let back = StudentRecord::from_tokens(record.to_tokens()).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_student_record_rejects_wrong_arity() {
        let mut tokens = sample_student().to_tokens();
        tokens.pop();
        assert!(matches!(
            StudentRecord::from_tokens(tokens),
            Err(AbiError::UnexpectedLayout(_))
        ));
    }

    #[test]
    fn test_student_details_without_loan_list() {
        let mut tokens = sample_student().to_tokens();
        tokens.pop();
        let record = StudentRecord::from_details(tokens).unwrap();
        assert!(record.is_registered);
        assert!(record.loans.is_empty());
        assert_eq!(record.courses_count, sample_student().courses_count);
    }

    #[test]
    fn test_student_profile_conversion() {
        let profile = StudentProfile::try_from(&sample_student()).unwrap();
        assert!(profile.is_registered);
        assert_eq!(profile.credit_score, 650);
        assert!((profile.total_borrowed - 1500.5).abs() < 1e-9);
        assert!((profile.staked_amount - 1000.0).abs() < 1e-9);
        assert_eq!(profile.last_rewards_claim, 1_700_000_000);
        assert_eq!(profile.courses_count, 4);
    }

    #[test]
    fn test_unregistered_profile_is_zeroed() {
        let profile = StudentProfile::try_from(&StudentRecord::default()).unwrap();
        assert_eq!(profile, StudentProfile::default());
        assert!(!profile.is_registered);
    }

    #[test]
    fn test_empty_loan_record() {
        let record = LoanRecord::try_from(&LoanData::default()).unwrap();
        assert!(record.is_empty());
        assert_eq!(record.loan_status(), Ok(LoanStatus::Pending));
    }

    #[test]
    fn test_loan_record_conversion() {
        let raw = LoanData {
            borrower: Address::from_low_u64_be(5),
            principal: parse_ether("2000").unwrap(),
            remaining_amount: parse_ether("2200").unwrap(),
            interest_rate: U256::from(1000u64),
            term: U256::from(90u64 * 86_400),
            status: 1,
            is_collateralized: true,
            collateral_amount: parse_ether("1000").unwrap(),
            milestone: U256::zero(),
        };
        let back = LoanData::from_tokens(raw.to_tokens()).unwrap();
        assert_eq!(back, raw);

        let record = LoanRecord::try_from(&raw).unwrap();
        assert!(!record.is_empty());
        assert_eq!(record.loan_status(), Ok(LoanStatus::Active));
        assert!((record.remaining_amount - 2200.0).abs() < 1e-9);
        assert_eq!(record.term, 7_776_000);
    }

    #[test]
    fn test_pending_loan_keeps_exact_principal() {
        let raw = LoanData {
            borrower: Address::from_low_u64_be(5),
            principal: parse_ether("0.123456789012345678").unwrap(),
            ..LoanData::default()
        };
        let pending = PendingLoan::from_raw(7, &raw).unwrap();
        assert_eq!(pending.principal_exact, "0.123456789012345678");
    }

    #[test]
    fn test_overview_outstanding_counts_active_only() {
        let active = LoanRecord {
            status: 1,
            remaining_amount: 100.0,
            ..LoanRecord::default()
        };
        let repaid = LoanRecord {
            status: 2,
            remaining_amount: 0.0,
            ..LoanRecord::default()
        };
        let overview = StudentOverview {
            address: Address::zero(),
            profile: StudentProfile::default(),
            loans: vec![(1, active), (2, repaid)],
        };
        assert!((overview.outstanding() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_profile_serializes_camel_case() {
        let json = serde_json::to_value(StudentProfile::default()).unwrap();
        assert!(json.get("isRegistered").is_some());
        assert!(json.get("stakedAmount").is_some());
    }
}

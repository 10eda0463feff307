//! # Driving Ports (API - Inbound)
//!
//! The adapter's public surface. Amounts are decimal strings in whole
//! tokens; loan terms are seconds. Every mutating operation returns only
//! after the transaction is confirmed.

use crate::domain::entities::{
    LoanData, LoanRecord, PendingLoan, StudentOverview, StudentProfile, TransactionReceipt,
};
use crate::domain::roles::Role;
use crate::domain::value_objects::Address;
use crate::errors::TransactionError;
use async_trait::async_trait;

/// Result type of every adapter operation.
pub type AdapterResult<T> = Result<T, TransactionError>;

/// Typed facade over the EduLoan contract.
#[async_trait]
pub trait StudentLoanApi: Send + Sync {
    // ── Students ──────────────────────────────────────────────────────────

    /// Registers the session account as a student.
    async fn register_student(&self) -> AdapterResult<TransactionReceipt>;

    /// Profile of `student`. Unregistered addresses yield a zeroed profile.
    async fn students(&self, student: Address) -> AdapterResult<StudentProfile>;

    /// Loan ids held by `student`, in contract order.
    async fn get_student_loans(&self, student: Address) -> AdapterResult<Vec<u64>>;

    /// Profile plus every loan of `student`.
    async fn student_overview(&self, student: Address) -> AdapterResult<StudentOverview>;

    /// Updates a student's course score (admin/institution).
    async fn update_performance(
        &self,
        student: Address,
        course_id: u64,
        score: u64,
    ) -> AdapterResult<TransactionReceipt>;

    /// Advances loan milestones for `student`.
    async fn check_milestones(&self, student: Address) -> AdapterResult<TransactionReceipt>;

    // ── Loans ─────────────────────────────────────────────────────────────

    /// Requests a loan of `amount` tokens over `term_seconds`.
    async fn request_loan(
        &self,
        amount: &str,
        term_seconds: u64,
        use_collateral: bool,
    ) -> AdapterResult<TransactionReceipt>;

    /// Approves and funds a loan; `amount` is sent as transaction value.
    async fn approve_loan(&self, loan_id: u64, amount: &str) -> AdapterResult<TransactionReceipt>;

    /// Repays part of a loan; `amount` is sent as transaction value.
    async fn make_repayment(&self, loan_id: u64, amount: &str)
        -> AdapterResult<TransactionReceipt>;

    /// Loan by id. Unknown ids yield an all-zero record (see
    /// [`LoanRecord::is_empty`]).
    async fn loans(&self, loan_id: u64) -> AdapterResult<LoanRecord>;

    /// Loan by id without unit conversion.
    async fn loan_details_raw(&self, loan_id: u64) -> AdapterResult<LoanData>;

    /// Pending loans among ids `1..=max_loan_id`.
    async fn pending_loans(&self, max_loan_id: u64) -> AdapterResult<Vec<PendingLoan>>;

    /// Interest rate the contract would offer `student`, in basis points.
    async fn calculate_interest_rate(&self, student: Address) -> AdapterResult<u64>;

    /// Next installment of a loan as a decimal string.
    async fn next_payment(&self, loan_id: u64) -> AdapterResult<String>;

    // ── Staking ───────────────────────────────────────────────────────────

    /// Stakes `amount` tokens. No minimum is enforced here.
    async fn stake(&self, amount: &str) -> AdapterResult<TransactionReceipt>;

    // ── Roles ─────────────────────────────────────────────────────────────

    /// Checks a role given by name; the id is hashed on every call.
    async fn has_role_named(&self, role_name: &str, account: Address) -> AdapterResult<bool>;

    /// Checks a known role using its precomputed id.
    async fn has_role(&self, role: Role, account: Address) -> AdapterResult<bool>;

    /// Grants the institution role.
    async fn grant_institution_role(&self, account: Address) -> AdapterResult<TransactionReceipt>;

    /// Grants the admin role.
    async fn grant_admin_role(&self, account: Address) -> AdapterResult<TransactionReceipt>;

    /// Revokes the institution role.
    async fn revoke_institution_role(&self, account: Address)
        -> AdapterResult<TransactionReceipt>;

    /// Revokes the admin role.
    async fn revoke_admin_role(&self, account: Address) -> AdapterResult<TransactionReceipt>;

    // ── Administration ────────────────────────────────────────────────────

    /// Pauses the contract.
    async fn pause(&self) -> AdapterResult<TransactionReceipt>;

    /// Unpauses the contract.
    async fn unpause(&self) -> AdapterResult<TransactionReceipt>;
}

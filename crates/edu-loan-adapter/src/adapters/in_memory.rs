//! # In-Memory Loan Contract
//!
//! A [`ChainProvider`] that runs the EduLoan contract rules in process.
//! Calldata is decoded with the same ABI codec the adapter uses, so the
//! double exercises the full encode, submit, confirm, and decode path.
//!
//! Wallet behaviour (disconnects, declined signatures, slow confirmations)
//! is controlled through the `set_*`/`*_next_*` methods.

use crate::domain::abi::{encode, hash_encoded, Token};
use crate::domain::contract::ContractMethod;
use crate::domain::entities::{LoanData, LoanStatus, StudentRecord, TransactionReceipt};
use crate::domain::roles::Role;
use crate::domain::services::keccak256;
use crate::domain::units::TokenAmount;
use crate::domain::value_objects::{Address, Bytes, Hash, U256};
use crate::errors::TransactionError;
use crate::ports::outbound::{CallRequest, ChainProvider, TransactionRequest};

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{debug, trace};

/// Chain id reported by the double (Hardhat/Anvil default).
pub const DEV_CHAIN_ID: u64 = 31_337;

const GENESIS_TIMESTAMP: u64 = 1_700_000_000;
const BLOCK_TIME_SECS: u64 = 12;
const INITIAL_CREDIT_SCORE: u64 = 500;
const MAX_CREDIT_SCORE: u64 = 850;
const REPAID_CREDIT_BONUS: u64 = 20;
const MIN_STAKE_TOKENS: u64 = 1000;
const MIN_TERM_SECS: u64 = 90 * 86_400;
const INSTALLMENT_PERIOD_SECS: u64 = 30 * 86_400;
const BASE_RATE_BPS: u64 = 1000;
const MIN_RATE_BPS: u64 = 300;
const BPS: u64 = 10_000;

// =============================================================================
// CONTRACT STATE
// =============================================================================

#[derive(Debug, Clone, Default)]
struct StudentState {
    record: StudentRecord,
    course_scores: BTreeMap<u64, u64>,
}

/// Contract storage. Cloned for `eth_call` dry runs of mutating methods.
#[derive(Debug, Clone)]
struct LoanBook {
    students: HashMap<Address, StudentState>,
    loans: BTreeMap<u64, LoanData>,
    next_loan_id: u64,
    roles: HashMap<Hash, HashSet<Address>>,
    paused: bool,
}

/// Per-call execution context.
struct CallContext {
    sender: Address,
    value: U256,
    timestamp: u64,
}

type Revert = String;

fn require(condition: bool, reason: &str) -> Result<(), Revert> {
    if condition {
        Ok(())
    } else {
        Err(reason.to_string())
    }
}

fn arg_uint(args: &[Token], index: usize) -> Result<U256, Revert> {
    args.get(index)
        .cloned()
        .and_then(|t| t.into_uint().ok())
        .ok_or_else(|| "bad arguments".to_string())
}

fn arg_address(args: &[Token], index: usize) -> Result<Address, Revert> {
    args.get(index)
        .cloned()
        .and_then(|t| t.into_address().ok())
        .ok_or_else(|| "bad arguments".to_string())
}

fn arg_u64(args: &[Token], index: usize) -> Result<u64, Revert> {
    let value = arg_uint(args, index)?;
    require(value <= U256::from(u64::MAX), "value out of range")?;
    Ok(value.low_u64())
}

impl LoanBook {
    fn new(admin: Address) -> Self {
        let mut book = Self {
            students: HashMap::new(),
            loans: BTreeMap::new(),
            next_loan_id: 1,
            roles: HashMap::new(),
            paused: false,
        };
        book.grant(Role::DefaultAdmin.id(), admin);
        book.grant(Role::Admin.id(), admin);
        book
    }

    fn has_role(&self, role: &Hash, account: &Address) -> bool {
        self.roles
            .get(role)
            .is_some_and(|members| members.contains(account))
    }

    fn grant(&mut self, role: Hash, account: Address) {
        self.roles.entry(role).or_default().insert(account);
    }

    fn revoke(&mut self, role: &Hash, account: &Address) {
        if let Some(members) = self.roles.get_mut(role) {
            members.remove(account);
        }
    }

    fn only_role(&self, role: Role, account: &Address) -> Result<(), Revert> {
        require(
            self.has_role(&role.id(), account),
            "AccessControl: account is missing role",
        )
    }

    fn only_staff(&self, account: &Address) -> Result<(), Revert> {
        require(
            self.has_role(&Role::Admin.id(), account)
                || self.has_role(&Role::Institution.id(), account),
            "Caller is not authorized",
        )
    }

    fn when_not_paused(&self) -> Result<(), Revert> {
        require(!self.paused, "Pausable: paused")
    }

    fn registered_mut(&mut self, student: &Address) -> Result<&mut StudentState, Revert> {
        self.students
            .get_mut(student)
            .filter(|s| s.record.is_registered)
            .ok_or_else(|| "Student not registered".to_string())
    }

    fn student_record(&self, student: &Address) -> StudentRecord {
        self.students
            .get(student)
            .map(|s| s.record.clone())
            .unwrap_or_default()
    }

    fn interest_rate(&self, student: &Address) -> u64 {
        let record = self.student_record(student);
        let credit = record.credit_score.low_u64();
        let performance = record.performance_score.low_u64();

        let mut rate = BASE_RATE_BPS;
        if credit >= 700 {
            rate -= 200;
        } else if credit >= 600 {
            rate -= 100;
        }
        if performance >= 80 {
            rate -= 100;
        }
        rate.max(MIN_RATE_BPS)
    }

    fn next_payment(&self, loan_id: u64) -> U256 {
        let Some(loan) = self.loans.get(&loan_id) else {
            return U256::zero();
        };
        if loan.status != LoanStatus::Active as u8 {
            return U256::zero();
        }
        let installments = (loan.term.low_u64() / INSTALLMENT_PERIOD_SECS).max(1);
        let owed = loan.principal
            + loan.principal.saturating_mul(loan.interest_rate) / U256::from(BPS);
        (owed / U256::from(installments)).min(loan.remaining_amount)
    }

    /// Runs one method call. Views return their outputs; mutating methods
    /// return an empty list.
    fn execute(
        &mut self,
        ctx: &CallContext,
        method: ContractMethod,
        args: &[Token],
    ) -> Result<Vec<Token>, Revert> {
        if !method.is_payable() {
            require(ctx.value.is_zero(), "non-payable method")?;
        }

        match method {
            // ── Views ────────────────────────────────────────────────────
            ContractMethod::HasRole => {
                let role = args
                    .first()
                    .cloned()
                    .and_then(|t| t.into_fixed_bytes().ok())
                    .ok_or_else(|| "bad arguments".to_string())?;
                let account = arg_address(args, 1)?;
                Ok(vec![Token::Bool(self.has_role(&role, &account))])
            }
            ContractMethod::Students => {
                let student = arg_address(args, 0)?;
                Ok(self.student_record(&student).to_tokens())
            }
            ContractMethod::Loans => {
                let loan_id = arg_u64(args, 0)?;
                Ok(self
                    .loans
                    .get(&loan_id)
                    .cloned()
                    .unwrap_or_default()
                    .to_tokens())
            }
            ContractMethod::CalcInterestRate => {
                let student = arg_address(args, 0)?;
                Ok(vec![Token::Uint(U256::from(self.interest_rate(&student)))])
            }
            ContractMethod::GetNextPayment => {
                let loan_id = arg_u64(args, 0)?;
                Ok(vec![Token::Uint(self.next_payment(loan_id))])
            }

            // ── Students ─────────────────────────────────────────────────
            ContractMethod::RegisterStudent => {
                self.when_not_paused()?;
                let entry = self.students.entry(ctx.sender).or_default();
                require(!entry.record.is_registered, "Already registered")?;
                entry.record.is_registered = true;
                entry.record.credit_score = U256::from(INITIAL_CREDIT_SCORE);
                Ok(vec![])
            }
            ContractMethod::UpdatePerformance => {
                self.only_staff(&ctx.sender)?;
                let student = arg_address(args, 0)?;
                let course_id = arg_u64(args, 1)?;
                let score = arg_u64(args, 2)?;
                require(score <= 100, "Invalid score")?;

                let state = self.registered_mut(&student)?;
                state.course_scores.insert(course_id, score);
                let count = state.course_scores.len() as u64;
                let total: u64 = state.course_scores.values().sum();
                state.record.courses_count = U256::from(count);
                state.record.performance_score = U256::from(total / count);
                Ok(vec![])
            }
            ContractMethod::CheckMilestones => {
                let student = arg_address(args, 0)?;
                let state = self.registered_mut(&student)?;
                let courses = state.record.courses_count;
                let loan_ids = state.record.loans.clone();
                for id in loan_ids {
                    if let Some(loan) = self.loans.get_mut(&id.low_u64()) {
                        if loan.status == LoanStatus::Active as u8 {
                            loan.milestone = courses;
                        }
                    }
                }
                Ok(vec![])
            }

            // ── Loans ────────────────────────────────────────────────────
            ContractMethod::RequestLoan => {
                self.when_not_paused()?;
                let amount = arg_uint(args, 0)?;
                let term = arg_uint(args, 1)?;
                let use_collateral = args
                    .get(2)
                    .cloned()
                    .and_then(|t| t.into_bool().ok())
                    .ok_or_else(|| "bad arguments".to_string())?;

                require(!amount.is_zero(), "Amount must be positive")?;
                require(term >= U256::from(MIN_TERM_SECS), "Term too short")?;
                let rate = self.interest_rate(&ctx.sender);
                let loan_id = self.next_loan_id;

                let state = self.registered_mut(&ctx.sender)?;
                require(!state.record.is_blacklisted, "Student is blacklisted")?;
                let collateral = if use_collateral {
                    require(!state.record.staked_amount.is_zero(), "No stake available")?;
                    let locked = state.record.staked_amount.min(amount);
                    state.record.staked_amount -= locked;
                    locked
                } else {
                    U256::zero()
                };
                state.record.loans.push(U256::from(loan_id));

                self.loans.insert(
                    loan_id,
                    LoanData {
                        borrower: ctx.sender,
                        principal: amount,
                        remaining_amount: amount,
                        interest_rate: U256::from(rate),
                        term,
                        status: LoanStatus::Pending as u8,
                        is_collateralized: use_collateral,
                        collateral_amount: collateral,
                        milestone: U256::zero(),
                    },
                );
                self.next_loan_id += 1;
                Ok(vec![])
            }
            ContractMethod::ApproveLoan => {
                self.when_not_paused()?;
                self.only_staff(&ctx.sender)?;
                let loan_id = arg_u64(args, 0)?;
                let loan = self
                    .loans
                    .get_mut(&loan_id)
                    .ok_or_else(|| "Loan does not exist".to_string())?;
                require(loan.status == LoanStatus::Pending as u8, "Loan not pending")?;
                require(ctx.value == loan.principal, "Incorrect funding amount")?;

                let interest = loan
                    .principal
                    .checked_mul(loan.interest_rate)
                    .map(|v| v / U256::from(BPS))
                    .ok_or_else(|| "arithmetic overflow".to_string())?;
                loan.remaining_amount = loan.principal + interest;
                loan.status = LoanStatus::Active as u8;
                let (borrower, principal) = (loan.borrower, loan.principal);

                if let Some(state) = self.students.get_mut(&borrower) {
                    state.record.total_borrowed += principal;
                }
                Ok(vec![])
            }
            ContractMethod::MakeRepayment => {
                self.when_not_paused()?;
                let loan_id = arg_u64(args, 0)?;
                let loan = self
                    .loans
                    .get_mut(&loan_id)
                    .ok_or_else(|| "Loan does not exist".to_string())?;
                require(loan.borrower == ctx.sender, "Not the borrower")?;
                require(loan.status == LoanStatus::Active as u8, "Loan not active")?;
                require(!ctx.value.is_zero(), "Amount must be positive")?;
                require(ctx.value <= loan.remaining_amount, "Repayment exceeds balance")?;

                loan.remaining_amount -= ctx.value;
                if !loan.remaining_amount.is_zero() {
                    return Ok(vec![]);
                }
                loan.status = LoanStatus::Repaid as u8;
                let released = std::mem::take(&mut loan.collateral_amount);

                let state = self.registered_mut(&ctx.sender)?;
                state.record.staked_amount += released;
                let credit = (state.record.credit_score.low_u64() + REPAID_CREDIT_BONUS)
                    .min(MAX_CREDIT_SCORE);
                state.record.credit_score = U256::from(credit);
                Ok(vec![])
            }

            // ── Staking ──────────────────────────────────────────────────
            ContractMethod::Stake => {
                self.when_not_paused()?;
                require(
                    ctx.value >= TokenAmount::from_tokens(MIN_STAKE_TOKENS).raw(),
                    "Minimum stake is 1000 EDU",
                )?;
                let state = self.registered_mut(&ctx.sender)?;
                state.record.staked_amount += ctx.value;
                state.record.last_rewards_claim = U256::from(ctx.timestamp);
                Ok(vec![])
            }

            // ── Roles ────────────────────────────────────────────────────
            ContractMethod::GrantInstitutionRole | ContractMethod::RevokeInstitutionRole => {
                self.only_role(Role::Admin, &ctx.sender)?;
                let account = arg_address(args, 0)?;
                if method == ContractMethod::GrantInstitutionRole {
                    self.grant(Role::Institution.id(), account);
                } else {
                    self.revoke(&Role::Institution.id(), &account);
                }
                Ok(vec![])
            }
            ContractMethod::GrantAdminRole | ContractMethod::RevokeAdminRole => {
                self.only_role(Role::DefaultAdmin, &ctx.sender)?;
                let account = arg_address(args, 0)?;
                if method == ContractMethod::GrantAdminRole {
                    self.grant(Role::Admin.id(), account);
                } else {
                    self.revoke(&Role::Admin.id(), &account);
                }
                Ok(vec![])
            }

            // ── Administration ───────────────────────────────────────────
            ContractMethod::Pause => {
                self.only_role(Role::Admin, &ctx.sender)?;
                require(!self.paused, "Pausable: paused")?;
                self.paused = true;
                Ok(vec![])
            }
            ContractMethod::Unpause => {
                self.only_role(Role::Admin, &ctx.sender)?;
                require(self.paused, "Pausable: not paused")?;
                self.paused = false;
                Ok(vec![])
            }
        }
    }
}

// =============================================================================
// CHAIN + WALLET SIMULATION
// =============================================================================

#[derive(Debug)]
struct PendingReceipt {
    receipt: TransactionReceipt,
    polls_left: u32,
}

#[derive(Debug)]
struct Inner {
    book: LoanBook,
    accounts: Vec<Address>,
    connected: bool,
    chain_id: u64,
    block_number: u64,
    blocks_per_poll: u64,
    nonce: u64,
    receipts: HashMap<Hash, PendingReceipt>,
    reject_next: bool,
    fail_next_on_chain: bool,
    confirmation_delay: u32,
    failing_receipt_polls: u32,
    receipt_polls: u64,
}

impl Inner {
    fn timestamp(&self) -> u64 {
        GENESIS_TIMESTAMP + self.block_number * BLOCK_TIME_SECS
    }
}

/// In-process EduLoan contract behind a simulated wallet.
///
/// The deployer (`admin`) holds `DEFAULT_ADMIN_ROLE` and `ADMIN_ROLE` and
/// is the wallet's first account.
#[derive(Debug)]
pub struct InMemoryLoanContract {
    address: Address,
    inner: Mutex<Inner>,
}

impl InMemoryLoanContract {
    /// Deploys a fresh contract at `address`.
    #[must_use]
    pub fn new(address: Address, admin: Address) -> Self {
        Self {
            address,
            inner: Mutex::new(Inner {
                book: LoanBook::new(admin),
                accounts: vec![admin],
                connected: true,
                chain_id: DEV_CHAIN_ID,
                block_number: 1,
                blocks_per_poll: 0,
                nonce: 0,
                receipts: HashMap::new(),
                reject_next: false,
                fail_next_on_chain: false,
                confirmation_delay: 0,
                failing_receipt_polls: 0,
                receipt_polls: 0,
            }),
        }
    }

    /// Contract address.
    #[must_use]
    pub fn address(&self) -> Address {
        self.address
    }

    /// Exposes another account through the wallet.
    pub fn add_account(&self, account: Address) {
        let mut inner = self.inner.lock();
        if !inner.accounts.contains(&account) {
            inner.accounts.push(account);
        }
    }

    /// Simulates a missing or locked wallet.
    pub fn set_connected(&self, connected: bool) {
        self.inner.lock().connected = connected;
    }

    /// Overrides the reported chain id.
    pub fn set_chain_id(&self, chain_id: u64) {
        self.inner.lock().chain_id = chain_id;
    }

    /// The user declines the next signature prompt.
    pub fn reject_next_signature(&self) {
        self.inner.lock().reject_next = true;
    }

    /// The next transaction is mined with a failed status.
    pub fn fail_next_on_chain(&self) {
        self.inner.lock().fail_next_on_chain = true;
    }

    /// Receipts stay unavailable for `polls` receipt queries.
    pub fn set_confirmation_delay(&self, polls: u32) {
        self.inner.lock().confirmation_delay = polls;
    }

    /// The next `polls` receipt queries fail with a transport error.
    pub fn fail_receipt_polls(&self, polls: u32) {
        self.inner.lock().failing_receipt_polls = polls;
    }

    /// Advances the chain by `blocks` on every block-number query.
    pub fn set_blocks_per_poll(&self, blocks: u64) {
        self.inner.lock().blocks_per_poll = blocks;
    }

    /// Flags a student as blacklisted.
    pub fn blacklist(&self, student: Address) {
        let mut inner = self.inner.lock();
        inner
            .book
            .students
            .entry(student)
            .or_default()
            .record
            .is_blacklisted = true;
    }

    /// Transactions broadcast so far.
    #[must_use]
    pub fn transaction_count(&self) -> u64 {
        self.inner.lock().nonce
    }

    /// Receipt queries served so far.
    #[must_use]
    pub fn receipt_polls(&self) -> u64 {
        self.inner.lock().receipt_polls
    }

    /// Current head without advancing it.
    #[must_use]
    pub fn block_number_now(&self) -> u64 {
        self.inner.lock().block_number
    }

    /// Whether the contract is paused.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.inner.lock().book.paused
    }

    fn ensure_connected(inner: &Inner) -> Result<(), TransactionError> {
        if inner.connected {
            Ok(())
        } else {
            Err(TransactionError::WalletUnavailable(
                "no wallet provider detected".into(),
            ))
        }
    }

    fn ensure_target(&self, to: Address) -> Result<(), TransactionError> {
        if to == self.address {
            Ok(())
        } else {
            Err(TransactionError::Network(format!(
                "no contract deployed at {to:?}"
            )))
        }
    }
}

#[async_trait]
impl ChainProvider for InMemoryLoanContract {
    async fn request_accounts(&self) -> Result<Vec<Address>, TransactionError> {
        let inner = self.inner.lock();
        Self::ensure_connected(&inner)?;
        Ok(inner.accounts.clone())
    }

    async fn chain_id(&self) -> Result<u64, TransactionError> {
        let inner = self.inner.lock();
        Self::ensure_connected(&inner)?;
        Ok(inner.chain_id)
    }

    async fn block_number(&self) -> Result<u64, TransactionError> {
        let mut inner = self.inner.lock();
        Self::ensure_connected(&inner)?;
        inner.block_number += inner.blocks_per_poll;
        Ok(inner.block_number)
    }

    async fn call(&self, request: &CallRequest) -> Result<Bytes, TransactionError> {
        self.ensure_target(request.to)?;
        let (method, args) = ContractMethod::decode_call(&request.data)?;

        let inner = self.inner.lock();
        Self::ensure_connected(&inner)?;
        let ctx = CallContext {
            sender: request.from,
            value: U256::zero(),
            timestamp: inner.timestamp(),
        };
        // dry run against a copy; eth_call never persists
        let mut scratch = inner.book.clone();
        let output = scratch
            .execute(&ctx, method, &args)
            .map_err(TransactionError::reverted)?;
        trace!(method = method.name(), "eth_call served");
        Ok(encode(&output))
    }

    async fn send_transaction(&self, request: &TransactionRequest) -> Result<Hash, TransactionError> {
        self.ensure_target(request.to)?;
        let (method, args) = ContractMethod::decode_call(&request.data)?;

        let mut inner = self.inner.lock();
        Self::ensure_connected(&inner)?;
        if !inner.accounts.contains(&request.from) {
            return Err(TransactionError::AccountNotAuthorized {
                account: request.from,
            });
        }
        if std::mem::take(&mut inner.reject_next) {
            return Err(TransactionError::UserRejected);
        }

        let ctx = CallContext {
            sender: request.from,
            value: request.value,
            timestamp: inner.timestamp(),
        };

        // wallets estimate gas first, which surfaces reverts before signing
        let mut next = inner.book.clone();
        next.execute(&ctx, method, &args).map_err(TransactionError::reverted)?;

        inner.nonce += 1;
        let tx_hash = hash_encoded(&[
            Token::Address(request.from),
            Token::Uint(U256::from(inner.nonce)),
            Token::FixedBytes32(keccak256(&request.data)),
        ]);

        let success = !std::mem::take(&mut inner.fail_next_on_chain);
        if success {
            inner.book = next;
        }
        inner.block_number += 1;
        let receipt = TransactionReceipt {
            transaction_hash: tx_hash,
            block_number: inner.block_number,
            success,
        };
        let polls_left = inner.confirmation_delay;
        inner
            .receipts
            .insert(tx_hash, PendingReceipt { receipt, polls_left });

        debug!(method = method.name(), tx_hash = ?tx_hash, success, "Transaction mined in memory");
        Ok(tx_hash)
    }

    async fn transaction_receipt(
        &self,
        hash: Hash,
    ) -> Result<Option<TransactionReceipt>, TransactionError> {
        let mut inner = self.inner.lock();
        Self::ensure_connected(&inner)?;
        inner.receipt_polls += 1;
        if inner.failing_receipt_polls > 0 {
            inner.failing_receipt_polls -= 1;
            return Err(TransactionError::Network("connection reset".into()));
        }
        let Some(pending) = inner.receipts.get_mut(&hash) else {
            return Ok(None);
        };
        if pending.polls_left > 0 {
            pending.polls_left -= 1;
            return Ok(None);
        }
        Ok(Some(pending.receipt))
    }
}

// =============================================================================
// TESTS
// =============================================================================

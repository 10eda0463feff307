//! # Contract Adapter Service
//!
//! Implements [`StudentLoanApi`] over any [`ChainProvider`].
//!
//! Every operation binds first: the wallet is asked for its accounts and
//! the session account must be among them. Mutating operations then encode,
//! submit, and poll for the receipt until it is confirmed; there is no
//! timeout and nothing is resubmitted. Reads go through `eth_call` and are decoded against
//! the method's return layout.

use crate::domain::abi::Token;
use crate::domain::config::AdapterConfig;
use crate::domain::contract::{ContractMethod, STUDENT_DETAILS_FIELDS};
use crate::domain::entities::{
    LoanData, LoanRecord, LoanStatus, PendingLoan, StudentOverview, StudentProfile, StudentRecord,
    TransactionReceipt,
};
use crate::domain::roles::Role;
use crate::domain::services::role_id;
use crate::domain::session::Session;
use crate::domain::units::{format_ether, parse_ether};
use crate::domain::value_objects::{u256_to_u64, Address, Bytes, Hash, U256};
use crate::errors::{AbiError, TransactionError};
use crate::ports::inbound::{AdapterResult, StudentLoanApi};
use crate::ports::outbound::{CallRequest, ChainProvider, TransactionRequest};

use crate::adapters::{InMemoryLoanContract, DEV_CHAIN_ID};

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// The EduLoan contract adapter.
///
/// Holds no mutable state: a shared provider handle, the session and the
/// configuration. Safe to share across tasks.
pub struct ContractAdapter<P: ChainProvider + ?Sized> {
    provider: Arc<P>,
    session: Session,
    config: AdapterConfig,
}

impl<P: ChainProvider + ?Sized> Clone for ContractAdapter<P> {
    fn clone(&self) -> Self {
        Self {
            provider: Arc::clone(&self.provider),
            session: self.session,
            config: self.config.clone(),
        }
    }
}

impl<P: ChainProvider + ?Sized> ContractAdapter<P> {
    /// Creates an adapter for `session` against the configured contract.
    pub fn new(provider: Arc<P>, session: Session, config: AdapterConfig) -> Self {
        Self {
            provider,
            session,
            config,
        }
    }

    /// The session this adapter acts for.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Adapter configuration.
    pub fn config(&self) -> &AdapterConfig {
        &self.config
    }

    /// Resolves the signing account for this call.
    async fn bind(&self) -> AdapterResult<Address> {
        let accounts = self.provider.request_accounts().await?;
        if accounts.is_empty() {
            return Err(TransactionError::WalletUnavailable(
                "wallet exposes no accounts".into(),
            ));
        }
        if !accounts.contains(&self.session.account) {
            return Err(TransactionError::AccountNotAuthorized {
                account: self.session.account,
            });
        }
        if let Some(expected) = self.config.chain_id {
            let actual = self.provider.chain_id().await?;
            if actual != expected {
                return Err(TransactionError::ChainMismatch { expected, actual });
            }
        }
        Ok(self.session.account)
    }

    /// Submits a state-changing call and waits for its confirmation.
    async fn submit(
        &self,
        method: ContractMethod,
        args: &[Token],
        value: U256,
    ) -> AdapterResult<TransactionReceipt> {
        let from = self.bind().await?;
        let request = TransactionRequest {
            from,
            to: self.config.contract_address,
            value,
            data: method.encode_call(args),
        };
        debug!(method = method.name(), calldata_len = request.data.len(), %value, "Submitting transaction");

        let tx_hash = match self.provider.send_transaction(&request).await {
            Ok(hash) => hash,
            Err(err) => {
                warn!(method = method.name(), error = %err, "Transaction submission failed");
                return Err(err);
            }
        };
        info!(method = method.name(), tx_hash = ?tx_hash, "Transaction broadcast, awaiting confirmation");

        let receipt = self.wait_for_confirmation(tx_hash).await;
        if !receipt.success {
            warn!(method = method.name(), tx_hash = ?tx_hash, "Transaction reverted on-chain");
            return Err(TransactionError::Reverted {
                reason: None,
                tx_hash: Some(tx_hash),
            });
        }

        info!(
            method = method.name(),
            tx_hash = ?tx_hash,
            block = receipt.block_number,
            "Transaction confirmed"
        );
        Ok(receipt)
    }

    /// Polls until the receipt exists and is `confirmations` blocks deep.
    ///
    /// The transaction is already broadcast, so provider errors while polling
    /// are logged and polling continues.
    async fn wait_for_confirmation(&self, tx_hash: Hash) -> TransactionReceipt {
        let depth = self.config.confirmations.max(1);
        let mut polls: u64 = 0;
        loop {
            match self.confirmation_depth(tx_hash).await {
                Ok(Some((receipt, confirmations))) if confirmations >= depth => return receipt,
                Ok(Some((_, confirmations))) => {
                    debug!(tx_hash = ?tx_hash, confirmations, required = depth, "Waiting for confirmations");
                }
                Ok(None) => {}
                Err(err) => {
                    warn!(tx_hash = ?tx_hash, error = %err, "Receipt poll failed, retrying");
                }
            }
            polls += 1;
            if polls % 30 == 0 {
                debug!(tx_hash = ?tx_hash, polls, "Transaction still pending");
            }
            tokio::time::sleep(self.config.confirmation_poll_interval).await;
        }
    }

    /// Receipt and its current depth, `None` while pending.
    async fn confirmation_depth(
        &self,
        tx_hash: Hash,
    ) -> AdapterResult<Option<(TransactionReceipt, u64)>> {
        let Some(receipt) = self.provider.transaction_receipt(tx_hash).await? else {
            return Ok(None);
        };
        let head = self.provider.block_number().await?;
        let confirmations = head.saturating_sub(receipt.block_number) + 1;
        Ok(Some((receipt, confirmations)))
    }

    /// Performs a read-only call and returns the raw return data.
    async fn call_raw(&self, method: ContractMethod, args: &[Token]) -> AdapterResult<Bytes> {
        let from = self.bind().await?;
        let request = CallRequest {
            from,
            to: self.config.contract_address,
            data: method.encode_call(args),
        };
        self.provider.call(&request).await
    }

    /// Performs a read-only call and decodes its return data.
    async fn read(&self, method: ContractMethod, args: &[Token]) -> AdapterResult<Vec<Token>> {
        let output = self.call_raw(method, args).await?;
        Ok(method.decode_output(&output)?)
    }

    /// Full student record, loan-id list included.
    async fn read_student(&self, student: Address) -> AdapterResult<StudentRecord> {
        let tokens = self
            .read(ContractMethod::Students, &[Token::Address(student)])
            .await?;
        Ok(StudentRecord::from_tokens(tokens)?)
    }

    /// Static student fields only; `loans` comes back empty.
    async fn read_student_details(&self, student: Address) -> AdapterResult<StudentRecord> {
        let output = self
            .call_raw(ContractMethod::Students, &[Token::Address(student)])
            .await?;
        let tokens = ContractMethod::Students.decode_output_head(&output, STUDENT_DETAILS_FIELDS)?;
        Ok(StudentRecord::from_details(tokens)?)
    }

    async fn read_uint(&self, method: ContractMethod, args: &[Token]) -> AdapterResult<U256> {
        let value = self
            .read(method, args)
            .await?
            .pop()
            .ok_or_else(|| AbiError::UnexpectedLayout(format!("{} returned nothing", method.name())))?
            .into_uint()?;
        Ok(value)
    }

    async fn query_role(&self, role: Hash, account: Address) -> AdapterResult<bool> {
        let value = self
            .read(
                ContractMethod::HasRole,
                &[Token::FixedBytes32(role), Token::Address(account)],
            )
            .await?
            .pop()
            .ok_or_else(|| AbiError::UnexpectedLayout("hasRole returned nothing".into()))?
            .into_bool()?;
        Ok(value)
    }

    async fn account_call(
        &self,
        method: ContractMethod,
        account: Address,
    ) -> AdapterResult<TransactionReceipt> {
        self.submit(method, &[Token::Address(account)], U256::zero())
            .await
    }
}

fn loan_id_token(loan_id: u64) -> Token {
    Token::Uint(U256::from(loan_id))
}

#[async_trait]
impl<P: ChainProvider + ?Sized> StudentLoanApi for ContractAdapter<P> {
    #[instrument(skip(self))]
    async fn register_student(&self) -> AdapterResult<TransactionReceipt> {
        self.submit(ContractMethod::RegisterStudent, &[], U256::zero())
            .await
    }

    #[instrument(skip(self))]
    async fn students(&self, student: Address) -> AdapterResult<StudentProfile> {
        let record = self.read_student_details(student).await?;
        Ok(StudentProfile::try_from(&record)?)
    }

    #[instrument(skip(self))]
    async fn get_student_loans(&self, student: Address) -> AdapterResult<Vec<u64>> {
        let record = self.read_student(student).await?;
        let ids = record
            .loans
            .into_iter()
            .map(|id| u256_to_u64(id, "loans"))
            .collect::<Result<_, _>>()?;
        Ok(ids)
    }

    #[instrument(skip(self))]
    async fn student_overview(&self, student: Address) -> AdapterResult<StudentOverview> {
        let record = self.read_student(student).await?;
        let profile = StudentProfile::try_from(&record)?;
        let mut loans = Vec::with_capacity(record.loans.len());
        for id in record.loans {
            let id = u256_to_u64(id, "loans")?;
            loans.push((id, self.loans(id).await?));
        }
        Ok(StudentOverview {
            address: student,
            profile,
            loans,
        })
    }

    #[instrument(skip(self))]
    async fn update_performance(
        &self,
        student: Address,
        course_id: u64,
        score: u64,
    ) -> AdapterResult<TransactionReceipt> {
        self.submit(
            ContractMethod::UpdatePerformance,
            &[
                Token::Address(student),
                Token::Uint(U256::from(course_id)),
                Token::Uint(U256::from(score)),
            ],
            U256::zero(),
        )
        .await
    }

    #[instrument(skip(self))]
    async fn check_milestones(&self, student: Address) -> AdapterResult<TransactionReceipt> {
        self.account_call(ContractMethod::CheckMilestones, student)
            .await
    }

    #[instrument(skip(self))]
    async fn request_loan(
        &self,
        amount: &str,
        term_seconds: u64,
        use_collateral: bool,
    ) -> AdapterResult<TransactionReceipt> {
        let amount = parse_ether(amount)?;
        self.submit(
            ContractMethod::RequestLoan,
            &[
                Token::Uint(amount),
                Token::Uint(U256::from(term_seconds)),
                Token::Bool(use_collateral),
            ],
            U256::zero(),
        )
        .await
    }

    #[instrument(skip(self))]
    async fn approve_loan(&self, loan_id: u64, amount: &str) -> AdapterResult<TransactionReceipt> {
        let value = parse_ether(amount)?;
        self.submit(ContractMethod::ApproveLoan, &[loan_id_token(loan_id)], value)
            .await
    }

    #[instrument(skip(self))]
    async fn make_repayment(
        &self,
        loan_id: u64,
        amount: &str,
    ) -> AdapterResult<TransactionReceipt> {
        let value = parse_ether(amount)?;
        self.submit(ContractMethod::MakeRepayment, &[loan_id_token(loan_id)], value)
            .await
    }

    #[instrument(skip(self))]
    async fn loans(&self, loan_id: u64) -> AdapterResult<LoanRecord> {
        let raw = self.loan_details_raw(loan_id).await?;
        Ok(LoanRecord::try_from(&raw)?)
    }

    #[instrument(skip(self))]
    async fn loan_details_raw(&self, loan_id: u64) -> AdapterResult<LoanData> {
        let tokens = self
            .read(ContractMethod::Loans, &[loan_id_token(loan_id)])
            .await?;
        Ok(LoanData::from_tokens(tokens)?)
    }

    #[instrument(skip(self))]
    async fn pending_loans(&self, max_loan_id: u64) -> AdapterResult<Vec<PendingLoan>> {
        let mut pending = Vec::new();
        for loan_id in 1..=max_loan_id {
            let raw = self.loan_details_raw(loan_id).await?;
            let entry = PendingLoan::from_raw(loan_id, &raw)?;
            if raw.status == LoanStatus::Pending as u8 && !entry.loan.is_empty() {
                pending.push(entry);
            }
        }
        debug!(found = pending.len(), scanned = max_loan_id, "Pending loan scan complete");
        Ok(pending)
    }

    #[instrument(skip(self))]
    async fn calculate_interest_rate(&self, student: Address) -> AdapterResult<u64> {
        let rate = self
            .read_uint(ContractMethod::CalcInterestRate, &[Token::Address(student)])
            .await?;
        Ok(u256_to_u64(rate, "interestRate")?)
    }

    #[instrument(skip(self))]
    async fn next_payment(&self, loan_id: u64) -> AdapterResult<String> {
        let amount = self
            .read_uint(ContractMethod::GetNextPayment, &[loan_id_token(loan_id)])
            .await?;
        Ok(format_ether(amount))
    }

    #[instrument(skip(self))]
    async fn stake(&self, amount: &str) -> AdapterResult<TransactionReceipt> {
        let value = parse_ether(amount)?;
        self.submit(ContractMethod::Stake, &[], value).await
    }

    #[instrument(skip(self))]
    async fn has_role_named(&self, role_name: &str, account: Address) -> AdapterResult<bool> {
        self.query_role(role_id(role_name), account).await
    }

    #[instrument(skip(self))]
    async fn has_role(&self, role: Role, account: Address) -> AdapterResult<bool> {
        self.query_role(role.id(), account).await
    }

    #[instrument(skip(self))]
    async fn grant_institution_role(&self, account: Address) -> AdapterResult<TransactionReceipt> {
        self.account_call(ContractMethod::GrantInstitutionRole, account)
            .await
    }

    #[instrument(skip(self))]
    async fn grant_admin_role(&self, account: Address) -> AdapterResult<TransactionReceipt> {
        self.account_call(ContractMethod::GrantAdminRole, account)
            .await
    }

    #[instrument(skip(self))]
    async fn revoke_institution_role(
        &self,
        account: Address,
    ) -> AdapterResult<TransactionReceipt> {
        self.account_call(ContractMethod::RevokeInstitutionRole, account)
            .await
    }

    #[instrument(skip(self))]
    async fn revoke_admin_role(&self, account: Address) -> AdapterResult<TransactionReceipt> {
        self.account_call(ContractMethod::RevokeAdminRole, account)
            .await
    }

    #[instrument(skip(self))]
    async fn pause(&self) -> AdapterResult<TransactionReceipt> {
        self.submit(ContractMethod::Pause, &[], U256::zero()).await
    }

    #[instrument(skip(self))]
    async fn unpause(&self) -> AdapterResult<TransactionReceipt> {
        self.submit(ContractMethod::Unpause, &[], U256::zero()).await
    }
}

/// Builds an adapter over a fresh [`InMemoryLoanContract`] deployed by
/// `admin`, with a short poll interval. Used by tests and demo mode.
#[must_use]
pub fn create_test_adapter(
    admin: Address,
) -> (Arc<InMemoryLoanContract>, ContractAdapter<InMemoryLoanContract>) {
    let contract_address = Address::from_low_u64_be(0xed00);
    let contract = Arc::new(InMemoryLoanContract::new(contract_address, admin));
    let mut config = AdapterConfig::for_contract(contract_address);
    config.confirmation_poll_interval = Duration::from_millis(1);
    config.chain_id = Some(DEV_CHAIN_ID);
    let adapter = ContractAdapter::new(Arc::clone(&contract), Session::new(admin), config);
    (contract, adapter)
}

// =============================================================================
// TESTS
// =============================================================================

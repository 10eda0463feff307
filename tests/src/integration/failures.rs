//! # Failure Paths
//!
//! Every failure surfaces as the matching `TransactionError` variant; none
//! is swallowed or retried.

#[cfg(test)]
mod tests {
    use super::super::{account, Fixture, ADMIN, ALICE};
    use async_trait::async_trait;
    use edu_loan_adapter::prelude::*;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    /// Provider whose transport always fails.
    struct UnreachableProvider {
        attempts: AtomicU64,
    }

    #[async_trait]
    impl ChainProvider for UnreachableProvider {
        async fn request_accounts(&self) -> Result<Vec<Address>, TransactionError> {
            self.attempts.fetch_add(1, Ordering::Relaxed);
            Err(TransactionError::Network("connection reset".into()))
        }
        async fn chain_id(&self) -> Result<u64, TransactionError> {
            Err(TransactionError::Network("connection reset".into()))
        }
        async fn block_number(&self) -> Result<u64, TransactionError> {
            Err(TransactionError::Network("connection reset".into()))
        }
        async fn call(&self, _: &CallRequest) -> Result<Bytes, TransactionError> {
            Err(TransactionError::Network("connection reset".into()))
        }
        async fn send_transaction(&self, _: &TransactionRequest) -> Result<Hash, TransactionError> {
            Err(TransactionError::Network("connection reset".into()))
        }
        async fn transaction_receipt(
            &self,
            _: Hash,
        ) -> Result<Option<TransactionReceipt>, TransactionError> {
            Err(TransactionError::Network("connection reset".into()))
        }
    }

    /// Provider that answers every call with truncated return data.
    struct TruncatingProvider;

    #[async_trait]
    impl ChainProvider for TruncatingProvider {
        async fn request_accounts(&self) -> Result<Vec<Address>, TransactionError> {
            Ok(vec![account(ALICE)])
        }
        async fn chain_id(&self) -> Result<u64, TransactionError> {
            Ok(DEV_CHAIN_ID)
        }
        async fn block_number(&self) -> Result<u64, TransactionError> {
            Ok(1)
        }
        async fn call(&self, _: &CallRequest) -> Result<Bytes, TransactionError> {
            Ok(vec![0u8; 40])
        }
        async fn send_transaction(&self, _: &TransactionRequest) -> Result<Hash, TransactionError> {
            Ok(Hash::zero())
        }
        async fn transaction_receipt(
            &self,
            _: Hash,
        ) -> Result<Option<TransactionReceipt>, TransactionError> {
            Ok(None)
        }
    }

    /// Provider answering `students` the way a struct getter does: the
    /// eight static fields, no loan-id list.
    struct StructGetterProvider;

    #[async_trait]
    impl ChainProvider for StructGetterProvider {
        async fn request_accounts(&self) -> Result<Vec<Address>, TransactionError> {
            Ok(vec![account(ALICE)])
        }
        async fn chain_id(&self) -> Result<u64, TransactionError> {
            Ok(DEV_CHAIN_ID)
        }
        async fn block_number(&self) -> Result<u64, TransactionError> {
            Ok(1)
        }
        async fn call(&self, _: &CallRequest) -> Result<Bytes, TransactionError> {
            let mut words = vec![0u8; 8 * 32];
            words[31] = 1; // isRegistered
            words[63] = 200; // creditScore
            Ok(words)
        }
        async fn send_transaction(&self, _: &TransactionRequest) -> Result<Hash, TransactionError> {
            Ok(Hash::zero())
        }
        async fn transaction_receipt(
            &self,
            _: Hash,
        ) -> Result<Option<TransactionReceipt>, TransactionError> {
            Ok(None)
        }
    }

    fn adapter_over<P: ChainProvider + 'static>(provider: P) -> ContractAdapter<P> {
        ContractAdapter::new(
            Arc::new(provider),
            Session::new(account(ALICE)),
            AdapterConfig::for_contract(Address::from_low_u64_be(0xc0)),
        )
    }

    // =============================================================================
    // PRECONDITIONS
    // =============================================================================

    #[tokio::test]
    async fn test_missing_wallet_fails_every_operation() {
        let fx = Fixture::new();
        fx.contract.set_connected(false);

        let err = fx.admin.register_student().await.unwrap_err();
        assert!(matches!(err, TransactionError::WalletUnavailable(_)));
        assert!(!err.is_recoverable());

        let err = fx.admin.students(account(ALICE)).await.unwrap_err();
        assert!(matches!(err, TransactionError::WalletUnavailable(_)));
    }

    #[tokio::test]
    async fn test_chain_mismatch_is_precondition() {
        let fx = Fixture::new();
        fx.contract.set_chain_id(1);
        let err = fx.admin.pause().await.unwrap_err();
        assert_eq!(
            err,
            TransactionError::ChainMismatch {
                expected: DEV_CHAIN_ID,
                actual: 1
            }
        );
        assert_eq!(err.category(), ErrorCategory::Precondition);
        assert!(!fx.contract.is_paused());
    }

    // =============================================================================
    // USER REJECTION & REVERTS
    // =============================================================================

    #[tokio::test]
    async fn test_user_rejection_surfaces_and_leaves_state() {
        let fx = Fixture::new();
        let alice = fx.as_account(ALICE);
        fx.contract.reject_next_signature();

        let err = alice.register_student().await.unwrap_err();
        assert!(err.is_user_rejection());
        assert_eq!(err.category(), ErrorCategory::UserRejection);
        assert!(err.is_recoverable());
        assert!(!alice.students(account(ALICE)).await.unwrap().is_registered);

        // next attempt prompts again and succeeds
        alice.register_student().await.unwrap();
    }

    #[tokio::test]
    async fn test_revert_reason_is_decoded() {
        let fx = Fixture::new();
        let alice = fx.as_account(ALICE);
        let err = alice
            .request_loan("100", 90 * SECONDS_PER_DAY, false)
            .await
            .unwrap_err();
        assert_eq!(err.revert_reason(), Some("Student not registered"));
        assert_eq!(
            err.to_string(),
            "transaction reverted: Student not registered"
        );
    }

    #[tokio::test]
    async fn test_on_chain_failure_without_reason() {
        let fx = Fixture::new();
        fx.contract.fail_next_on_chain();
        let err = fx.admin.register_student().await.unwrap_err();
        assert!(matches!(
            err,
            TransactionError::Reverted {
                reason: None,
                tx_hash: Some(_)
            }
        ));
        assert_eq!(err.to_string(), "transaction reverted: execution reverted");
    }

    #[tokio::test]
    async fn test_blacklisted_student_cannot_borrow() {
        let fx = Fixture::new();
        let alice = fx.as_account(ALICE);
        alice.register_student().await.unwrap();
        fx.contract.blacklist(account(ALICE));

        let err = alice
            .request_loan("100", 90 * SECONDS_PER_DAY, false)
            .await
            .unwrap_err();
        assert_eq!(err.revert_reason(), Some("Student is blacklisted"));
    }

    // =============================================================================
    // INPUT, TRANSPORT & DECODING
    // =============================================================================

    #[tokio::test]
    async fn test_invalid_amount_fails_before_any_io() {
        let provider = Arc::new(UnreachableProvider {
            attempts: AtomicU64::new(0),
        });
        let adapter = ContractAdapter::new(
            Arc::clone(&provider),
            Session::new(account(ALICE)),
            AdapterConfig::for_contract(Address::from_low_u64_be(0xc0)),
        );

        for bad in ["", "-5", "1.2.3", "abc", "0.0000000000000000001"] {
            let err = adapter.stake(bad).await.unwrap_err();
            assert!(
                matches!(err, TransactionError::InvalidAmount(_)),
                "{bad:?} gave {err:?}"
            );
        }
        assert_eq!(provider.attempts.load(Ordering::Relaxed), 0);
    }

    #[tokio::test]
    async fn test_transport_failure_is_network() {
        let adapter = adapter_over(UnreachableProvider {
            attempts: AtomicU64::new(0),
        });
        let err = adapter.loans(1).await.unwrap_err();
        assert!(matches!(err, TransactionError::Network(_)));
        assert!(err.is_recoverable());
    }

    #[tokio::test]
    async fn test_malformed_return_data_is_abi_error() {
        let adapter = adapter_over(TruncatingProvider);
        let err = adapter.students(account(ALICE)).await.unwrap_err();
        assert!(matches!(err, TransactionError::Abi(_)));
    }

    #[tokio::test]
    async fn test_profile_reads_without_loan_list() {
        let adapter = adapter_over(StructGetterProvider);
        let profile = adapter.students(account(ALICE)).await.unwrap();
        assert!(profile.is_registered);
        assert_eq!(profile.credit_score, 200);

        let err = adapter.get_student_loans(account(ALICE)).await.unwrap_err();
        assert!(matches!(err, TransactionError::Abi(_)));
    }

    #[tokio::test]
    async fn test_receipt_poll_failures_keep_waiting() {
        let fx = Fixture::new();
        fx.contract.fail_receipt_polls(3);
        let receipt = fx.admin.register_student().await.unwrap();
        assert!(receipt.success);
        assert_eq!(fx.contract.transaction_count(), 1);
        assert!(fx.admin.students(account(ADMIN)).await.unwrap().is_registered);
    }

    #[tokio::test]
    async fn test_slow_confirmation_still_completes() {
        let fx = Fixture::new();
        fx.contract.set_confirmation_delay(5);
        let receipt = fx.admin.register_student().await.unwrap();
        assert!(receipt.success);
        assert!(fx.contract.receipt_polls() >= 6);
    }
}

//! # Read-side Properties
//!
//! Guarantees callers rely on: zeroed records for unknown keys, stable role
//! identifiers, caller-side validation that the adapter does not repeat,
//! and exact unit handling end to end.

#[cfg(test)]
mod tests {
    use super::super::{account, Fixture, ADMIN, ALICE, BOB};
    use edu_loan_adapter::prelude::*;

    #[tokio::test]
    async fn test_unregistered_student_reads_as_zeroed_profile() {
        let fx = Fixture::new();
        let profile = fx.admin.students(account(BOB)).await.unwrap();
        assert!(!profile.is_registered);
        assert_eq!(profile, StudentProfile::default());
    }

    #[tokio::test]
    async fn test_registered_student_without_loans_has_empty_list() {
        let fx = Fixture::new();
        let alice = fx.as_account(ALICE);
        alice.register_student().await.unwrap();
        assert!(alice.get_student_loans(account(ALICE)).await.unwrap().is_empty());
        assert!(alice
            .student_overview(account(ALICE))
            .await
            .unwrap()
            .loans
            .is_empty());
    }

    #[tokio::test]
    async fn test_missing_loan_is_zero_record() {
        let fx = Fixture::new();
        let loan = fx.admin.loans(5).await.unwrap();
        assert!(loan.is_empty());
        assert_eq!(loan.loan_status().unwrap(), LoanStatus::Pending);
        assert!(fx.admin.pending_loans(5).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_role_lookup_is_stable() {
        let fx = Fixture::new();
        assert_eq!(role_id("ADMIN_ROLE"), role_id("ADMIN_ROLE"));
        assert_eq!(role_id("ADMIN_ROLE"), Role::Admin.id());

        let by_name = fx
            .admin
            .has_role_named("ADMIN_ROLE", account(ADMIN))
            .await
            .unwrap();
        let by_enum = fx
            .admin
            .has_role(Role::Admin, account(ADMIN))
            .await
            .unwrap();
        assert!(by_name);
        assert_eq!(by_name, by_enum);

        // arbitrary names are hashed, not rejected
        assert!(!fx
            .admin
            .has_role_named("AUDITOR_ROLE", account(ADMIN))
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_small_stake_rejected_by_validation_but_forwarded_by_adapter() {
        assert_eq!(
            validate_stake_amount("500"),
            Err(ValidationError::StakeBelowMinimum { minimum: MIN_STAKE })
        );

        let fx = Fixture::new();
        let alice = fx.as_account(ALICE);
        alice.register_student().await.unwrap();
        let before = fx.contract.transaction_count();

        let err = alice.stake("500").await.unwrap_err();
        assert_eq!(err.revert_reason(), Some("Minimum stake is 1000 EDU"));
        assert_eq!(err.category(), ErrorCategory::Revert);
        // reverted during estimation, so nothing was broadcast
        assert_eq!(fx.contract.transaction_count(), before);
    }

    #[tokio::test]
    async fn test_short_term_rejected_by_validation_and_contract() {
        assert!(validate_loan_term_days(30).is_err());

        let fx = Fixture::new();
        let alice = fx.as_account(ALICE);
        alice.register_student().await.unwrap();
        let err = alice
            .request_loan("10", 30 * SECONDS_PER_DAY, false)
            .await
            .unwrap_err();
        assert_eq!(err.revert_reason(), Some("Term too short"));
    }

    #[tokio::test]
    async fn test_fractional_amounts_are_exact() {
        let fx = Fixture::new();
        let alice = fx.as_account(ALICE);
        alice.register_student().await.unwrap();
        alice
            .request_loan("0.000000000000000001", 90 * SECONDS_PER_DAY, false)
            .await
            .unwrap();

        let raw = alice.loan_details_raw(1).await.unwrap();
        assert_eq!(raw.principal, U256::one());
        let pending = alice.pending_loans(1).await.unwrap();
        assert_eq!(pending[0].principal_exact, "0.000000000000000001");
    }

    #[tokio::test]
    async fn test_concurrent_reads() {
        let fx = Fixture::new();
        let alice = fx.as_account(ALICE);
        alice.register_student().await.unwrap();

        let (a, b, c) = tokio::join!(
            alice.students(account(ALICE)),
            fx.admin.students(account(ALICE)),
            fx.admin.loans(1),
        );
        assert_eq!(a.unwrap(), b.unwrap());
        assert!(c.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_read_models_serialize_camel_case() {
        let fx = Fixture::new();
        let alice = fx.as_account(ALICE);
        alice.register_student().await.unwrap();
        let overview = alice.student_overview(account(ALICE)).await.unwrap();

        let json = serde_json::to_value(&overview).unwrap();
        assert_eq!(json["profile"]["isRegistered"], true);
        assert_eq!(json["profile"]["creditScore"], 500);
    }
}

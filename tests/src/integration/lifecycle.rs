//! # Loan Lifecycle
//!
//! A student registers, stakes, borrows against the stake, gets approved by
//! an institution and repays in two installments. Also covers role
//! management, performance updates and pausing.

#[cfg(test)]
mod tests {
    use super::super::{account, Fixture, ADMIN, ALICE, BOB, UNIVERSITY};
    use edu_loan_adapter::prelude::*;

    fn approx(actual: f64, expected: f64) -> bool {
        (actual - expected).abs() < 1e-9
    }

    // =============================================================================
    // FULL FLOW
    // =============================================================================

    #[tokio::test]
    async fn test_register_stake_borrow_approve_repay() {
        let fx = Fixture::new();
        let alice = fx.as_account(ALICE);
        let university = fx.as_account(UNIVERSITY);

        // Setup: register, stake, and enable the institution
        alice.register_student().await.unwrap();
        alice.stake("1500").await.unwrap();
        fx.admin
            .grant_institution_role(account(UNIVERSITY))
            .await
            .unwrap();
        assert!(fx
            .admin
            .has_role(Role::Institution, account(UNIVERSITY))
            .await
            .unwrap());

        let profile = alice.students(account(ALICE)).await.unwrap();
        assert!(profile.is_registered);
        assert_eq!(profile.credit_score, 500);
        assert!(approx(profile.staked_amount, 1500.0));

        // Request a collateralized loan over 180 days
        let term = validate_loan_term_days(180).unwrap();
        alice.request_loan("2000", term, true).await.unwrap();
        assert_eq!(alice.get_student_loans(account(ALICE)).await.unwrap(), vec![1]);

        let loan = alice.loans(1).await.unwrap();
        assert_eq!(loan.borrower, account(ALICE));
        assert_eq!(loan.loan_status().unwrap(), LoanStatus::Pending);
        assert_eq!(loan.term, 180 * SECONDS_PER_DAY);
        assert!(loan.is_collateralized);
        assert!(approx(loan.collateral_amount, 1500.0));

        // The institution finds it in the pending scan and funds it
        let pending = university.pending_loans(3).await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].loan_id, 1);
        assert_eq!(pending[0].principal_exact, "2000.0");
        university
            .approve_loan(1, &pending[0].principal_exact)
            .await
            .unwrap();

        let loan = alice.loans(1).await.unwrap();
        assert_eq!(loan.loan_status().unwrap(), LoanStatus::Active);
        assert_eq!(loan.interest_rate, 1000);
        assert!(approx(loan.remaining_amount, 2200.0));
        assert!(university.pending_loans(3).await.unwrap().is_empty());

        // 2200 over six monthly installments
        let next = alice.next_payment(1).await.unwrap();
        assert!(next.starts_with("366.666"), "unexpected installment {next}");

        // Repay in two steps
        alice.make_repayment(1, "200").await.unwrap();
        let overview = alice.student_overview(account(ALICE)).await.unwrap();
        assert!(approx(overview.outstanding(), 2000.0));

        alice.make_repayment(1, "2000").await.unwrap();
        let loan = alice.loans(1).await.unwrap();
        assert_eq!(loan.loan_status().unwrap(), LoanStatus::Repaid);
        assert!(approx(loan.remaining_amount, 0.0));
        assert_eq!(alice.next_payment(1).await.unwrap(), "0.0");

        // Collateral released, credit improved
        let profile = alice.students(account(ALICE)).await.unwrap();
        assert!(approx(profile.staked_amount, 1500.0));
        assert!(approx(profile.total_borrowed, 2000.0));
        assert_eq!(profile.credit_score, 520);

        let overview = alice.student_overview(account(ALICE)).await.unwrap();
        assert_eq!(overview.loans.len(), 1);
        assert!(approx(overview.outstanding(), 0.0));
    }

    #[tokio::test]
    async fn test_approval_requires_exact_principal() {
        let fx = Fixture::new();
        let alice = fx.as_account(ALICE);
        alice.register_student().await.unwrap();
        alice
            .request_loan("1000.5", 90 * SECONDS_PER_DAY, false)
            .await
            .unwrap();

        let err = fx.admin.approve_loan(1, "1000").await.unwrap_err();
        assert_eq!(err.revert_reason(), Some("Incorrect funding amount"));

        fx.admin.approve_loan(1, "1000.5").await.unwrap();
        let err = fx.admin.approve_loan(1, "1000.5").await.unwrap_err();
        assert_eq!(err.revert_reason(), Some("Loan not pending"));
    }

    #[tokio::test]
    async fn test_only_borrower_can_repay() {
        let fx = Fixture::new();
        let alice = fx.as_account(ALICE);
        let bob = fx.as_account(BOB);
        alice.register_student().await.unwrap();
        alice
            .request_loan("100", 120 * SECONDS_PER_DAY, false)
            .await
            .unwrap();
        fx.admin.approve_loan(1, "100").await.unwrap();

        let err = bob.make_repayment(1, "10").await.unwrap_err();
        assert_eq!(err.revert_reason(), Some("Not the borrower"));

        let err = alice.make_repayment(1, "1000").await.unwrap_err();
        assert_eq!(err.revert_reason(), Some("Repayment exceeds balance"));
    }

    #[tokio::test]
    async fn test_loan_ids_are_sequential_across_students() {
        let fx = Fixture::new();
        let alice = fx.as_account(ALICE);
        let bob = fx.as_account(BOB);
        alice.register_student().await.unwrap();
        bob.register_student().await.unwrap();

        let term = 90 * SECONDS_PER_DAY;
        alice.request_loan("10", term, false).await.unwrap();
        bob.request_loan("20", term, false).await.unwrap();
        alice.request_loan("30", term, false).await.unwrap();

        assert_eq!(alice.get_student_loans(account(ALICE)).await.unwrap(), vec![1, 3]);
        assert_eq!(bob.get_student_loans(account(BOB)).await.unwrap(), vec![2]);

        let pending = fx.admin.pending_loans(5).await.unwrap();
        let ids: Vec<u64> = pending.iter().map(|p| p.loan_id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    // =============================================================================
    // PERFORMANCE & MILESTONES
    // =============================================================================

    #[tokio::test]
    async fn test_performance_updates_lower_interest_rate() {
        let fx = Fixture::new();
        let alice = fx.as_account(ALICE);
        alice.register_student().await.unwrap();
        assert_eq!(alice.calculate_interest_rate(account(ALICE)).await.unwrap(), 1000);

        fx.admin
            .update_performance(account(ALICE), 1, 90)
            .await
            .unwrap();
        fx.admin
            .update_performance(account(ALICE), 2, 80)
            .await
            .unwrap();

        let profile = alice.students(account(ALICE)).await.unwrap();
        assert_eq!(profile.courses_count, 2);
        assert_eq!(profile.performance_score, 85);
        assert_eq!(alice.calculate_interest_rate(account(ALICE)).await.unwrap(), 900);

        let err = fx
            .admin
            .update_performance(account(ALICE), 3, 101)
            .await
            .unwrap_err();
        assert_eq!(err.revert_reason(), Some("Invalid score"));
    }

    #[tokio::test]
    async fn test_check_milestones_tracks_courses() {
        let fx = Fixture::new();
        let alice = fx.as_account(ALICE);
        alice.register_student().await.unwrap();
        alice
            .request_loan("500", 90 * SECONDS_PER_DAY, false)
            .await
            .unwrap();
        fx.admin.approve_loan(1, "500").await.unwrap();
        for course in 1..=3 {
            fx.admin
                .update_performance(account(ALICE), course, 70)
                .await
                .unwrap();
        }

        alice.check_milestones(account(ALICE)).await.unwrap();
        assert_eq!(alice.loans(1).await.unwrap().milestone, 3);
    }

    // =============================================================================
    // ROLES & ADMINISTRATION
    // =============================================================================

    #[tokio::test]
    async fn test_admin_role_grant_and_revoke() {
        let fx = Fixture::new();
        assert!(fx.admin.has_role(Role::DefaultAdmin, account(ADMIN)).await.unwrap());

        fx.admin.grant_admin_role(account(BOB)).await.unwrap();
        assert!(fx
            .admin
            .has_role_named("ADMIN_ROLE", account(BOB))
            .await
            .unwrap());

        fx.admin.revoke_admin_role(account(BOB)).await.unwrap();
        assert!(!fx.admin.has_role(Role::Admin, account(BOB)).await.unwrap());
    }

    #[tokio::test]
    async fn test_revoked_institution_cannot_approve() {
        let fx = Fixture::new();
        let alice = fx.as_account(ALICE);
        let university = fx.as_account(UNIVERSITY);
        alice.register_student().await.unwrap();
        alice
            .request_loan("50", 90 * SECONDS_PER_DAY, false)
            .await
            .unwrap();

        fx.admin
            .grant_institution_role(account(UNIVERSITY))
            .await
            .unwrap();
        fx.admin
            .revoke_institution_role(account(UNIVERSITY))
            .await
            .unwrap();

        let err = university.approve_loan(1, "50").await.unwrap_err();
        assert_eq!(err.revert_reason(), Some("Caller is not authorized"));
    }

    #[tokio::test]
    async fn test_students_cannot_manage_roles() {
        let fx = Fixture::new();
        let alice = fx.as_account(ALICE);
        let err = alice
            .grant_institution_role(account(ALICE))
            .await
            .unwrap_err();
        assert!(err.revert_reason().unwrap().contains("missing role"));
    }

    #[tokio::test]
    async fn test_pause_and_unpause() {
        let fx = Fixture::new();
        let alice = fx.as_account(ALICE);

        fx.admin.pause().await.unwrap();
        assert!(fx.contract.is_paused());
        let err = alice.register_student().await.unwrap_err();
        assert_eq!(err.revert_reason(), Some("Pausable: paused"));
        let err = fx.admin.pause().await.unwrap_err();
        assert_eq!(err.revert_reason(), Some("Pausable: paused"));

        // reads keep working while paused
        assert!(!alice.students(account(ALICE)).await.unwrap().is_registered);

        fx.admin.unpause().await.unwrap();
        alice.register_student().await.unwrap();
        let err = fx.admin.unpause().await.unwrap_err();
        assert_eq!(err.revert_reason(), Some("Pausable: not paused"));
    }
}

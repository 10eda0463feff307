//! Human-readable output.

use std::fmt::Write as _;

use edu_loan_adapter::prelude::*;

/// One-line confirmation for a mined transaction.
pub fn receipt(action: &str, receipt: &TransactionReceipt) -> String {
    format!(
        "{action} confirmed in block {} (tx {:?})",
        receipt.block_number, receipt.transaction_hash
    )
}

/// Loan status label; raw values outside the enum are shown as numbers.
pub fn status(raw: u8) -> String {
    LoanStatus::try_from(raw).map_or_else(|_| format!("Unknown({raw})"), |s| s.to_string())
}

pub fn profile(address: Address, profile: &StudentProfile) -> String {
    if !profile.is_registered {
        return format!("{address:?} is not registered");
    }
    let mut out = String::new();
    let _ = writeln!(out, "Student {address:?}");
    let _ = writeln!(out, "  credit score:      {}", profile.credit_score);
    let _ = writeln!(out, "  performance score: {}", profile.performance_score);
    let _ = writeln!(out, "  courses:           {}", profile.courses_count);
    let _ = writeln!(out, "  total borrowed:    {} EDU", profile.total_borrowed);
    let _ = writeln!(out, "  staked:            {} EDU", profile.staked_amount);
    if profile.is_blacklisted {
        let _ = writeln!(out, "  BLACKLISTED");
    }
    out
}

pub fn loan(loan_id: u64, loan: &LoanRecord) -> String {
    if loan.is_empty() {
        return format!("Loan #{loan_id} not found");
    }
    let mut out = String::new();
    let _ = writeln!(out, "Loan #{loan_id} [{}]", status(loan.status));
    let _ = writeln!(out, "  borrower:   {:?}", loan.borrower);
    let _ = writeln!(out, "  principal:  {} EDU", loan.principal);
    let _ = writeln!(out, "  remaining:  {} EDU", loan.remaining_amount);
    let _ = writeln!(out, "  rate:       {:.2}%", loan.interest_rate as f64 / 100.0);
    let _ = writeln!(out, "  term:       {} days", loan.term / SECONDS_PER_DAY);
    if loan.is_collateralized {
        let _ = writeln!(out, "  collateral: {} EDU", loan.collateral_amount);
    }
    let _ = writeln!(out, "  milestone:  {}", loan.milestone);
    out
}

pub fn overview(overview: &StudentOverview) -> String {
    let mut out = profile(overview.address, &overview.profile);
    if overview.loans.is_empty() {
        out.push_str("No loans\n");
        return out;
    }
    for (loan_id, record) in &overview.loans {
        out.push_str(&loan(*loan_id, record));
    }
    let _ = writeln!(out, "Outstanding: {} EDU", overview.outstanding());
    out
}

pub fn pending(loans: &[PendingLoan]) -> String {
    if loans.is_empty() {
        return "No pending loans".to_string();
    }
    let mut out = String::new();
    for entry in loans {
        let _ = writeln!(
            out,
            "#{:<4} {:?}  {} EDU  {} days{}",
            entry.loan_id,
            entry.loan.borrower,
            entry.principal_exact,
            entry.loan.term / SECONDS_PER_DAY,
            if entry.loan.is_collateralized {
                "  (collateralized)"
            } else {
                ""
            }
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_labels() {
        assert_eq!(status(1), "Active");
        assert_eq!(status(9), "Unknown(9)");
    }

    #[test]
    fn test_missing_loan_text() {
        assert_eq!(loan(5, &LoanRecord::default()), "Loan #5 not found");
    }

    #[test]
    fn test_unregistered_profile_text() {
        let text = profile(Address::zero(), &StudentProfile::default());
        assert!(text.ends_with("is not registered"));
    }

    #[test]
    fn test_loan_text_shows_days_and_percent() {
        let record = LoanRecord {
            borrower: Address::from_low_u64_be(1),
            principal: 100.0,
            interest_rate: 950,
            term: 90 * SECONDS_PER_DAY,
            status: 1,
            ..LoanRecord::default()
        };
        let text = loan(2, &record);
        assert!(text.contains("[Active]"));
        assert!(text.contains("9.50%"));
        assert!(text.contains("90 days"));
    }
}

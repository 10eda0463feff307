//! Command dispatch.
//!
//! Inputs are validated before the adapter is called; the adapter itself
//! forwards whatever it is given and lets the contract decide.

use anyhow::{Context, Result};
use serde_json::{json, Value};
use tracing::info;

use crate::cli::Command;
use crate::render;
use edu_loan_adapter::prelude::*;

/// Result of one command, in both output formats.
#[derive(Debug, Clone)]
pub struct Outcome {
    pub text: String,
    pub json: Value,
}

impl Outcome {
    fn new(text: impl Into<String>, json: Value) -> Self {
        Self {
            text: text.into(),
            json,
        }
    }

    fn receipt(action: &str, receipt: &TransactionReceipt) -> Result<Self> {
        Ok(Self::new(
            render::receipt(action, receipt),
            serde_json::to_value(receipt)?,
        ))
    }
}

/// Runs `command` as `account`.
pub async fn execute(api: &dyn StudentLoanApi, account: Address, command: &Command) -> Result<Outcome> {
    info!(?command, account = ?account, "Executing command");
    match command {
        Command::Register => {
            let receipt = api.register_student().await?;
            Outcome::receipt("Registration", &receipt)
        }

        Command::RequestLoan {
            amount,
            term_days,
            collateral,
        } => {
            let amount = validate_amount(amount, "loan")?;
            let term = validate_loan_term_days(*term_days)?;
            let receipt = api
                .request_loan(&amount.to_string(), term, *collateral)
                .await?;
            Outcome::receipt(&format!("Loan request for {amount} EDU"), &receipt)
        }

        Command::ApproveLoan { loan_id, amount } => {
            let loan_id = validate_loan_id(*loan_id)?;
            let amount = match amount {
                Some(amount) => validate_amount(amount, "funding")?.to_string(),
                None => {
                    let raw = api.loan_details_raw(loan_id).await?;
                    anyhow::ensure!(!raw.principal.is_zero(), "Loan #{loan_id} not found");
                    format_ether(raw.principal)
                }
            };
            let receipt = api.approve_loan(loan_id, &amount).await?;
            Outcome::receipt(&format!("Approval of loan #{loan_id} ({amount} EDU)"), &receipt)
        }

        Command::Repay { loan_id, amount } => {
            let loan_id = validate_loan_id(*loan_id)?;
            let amount = validate_amount(amount, "repayment")?;
            let receipt = api.make_repayment(loan_id, &amount.to_string()).await?;
            Outcome::receipt(&format!("Repayment of {amount} EDU"), &receipt)
        }

        Command::Stake { amount } => {
            let amount = validate_stake_amount(amount)?;
            let receipt = api.stake(&amount.to_string()).await?;
            Outcome::receipt(&format!("Stake of {amount} EDU"), &receipt)
        }

        Command::UpdatePerformance {
            student,
            course_id,
            score,
        } => {
            let score = validate_score(*score)?;
            let receipt = api.update_performance(*student, *course_id, score).await?;
            Outcome::receipt(&format!("Score {score} for course {course_id}"), &receipt)
        }

        Command::GrantRole { role, account } => {
            let role = Role::from(*role);
            let receipt = match role {
                Role::Admin => api.grant_admin_role(*account).await?,
                _ => api.grant_institution_role(*account).await?,
            };
            Outcome::receipt(&format!("Grant of {role} to {account:?}"), &receipt)
        }

        Command::RevokeRole { role, account } => {
            let role = Role::from(*role);
            let receipt = match role {
                Role::Admin => api.revoke_admin_role(*account).await?,
                _ => api.revoke_institution_role(*account).await?,
            };
            Outcome::receipt(&format!("Revocation of {role} from {account:?}"), &receipt)
        }

        Command::HasRole { role, account } => {
            // declared names use the role table (DEFAULT_ADMIN_ROLE is the
            // zero hash); anything else is hashed as typed
            let holds = match Role::from_name(role) {
                Some(known) => api.has_role(known, *account).await?,
                None => api.has_role_named(role, *account).await?,
            };
            let text = if holds {
                format!("{account:?} has {role}")
            } else {
                format!("{account:?} does not have {role}")
            };
            Ok(Outcome::new(text, json!({ "role": role, "account": account, "hasRole": holds })))
        }

        Command::Student { address } => {
            let overview = api.student_overview(address.unwrap_or(account)).await?;
            Ok(Outcome::new(
                render::overview(&overview),
                serde_json::to_value(&overview)?,
            ))
        }

        Command::Loan { loan_id } => {
            let loan_id = validate_loan_id(*loan_id)?;
            let loan = api.loans(loan_id).await?;
            Ok(Outcome::new(render::loan(loan_id, &loan), serde_json::to_value(&loan)?))
        }

        Command::Loans { address } => {
            let ids = api.get_student_loans(address.unwrap_or(account)).await?;
            let text = if ids.is_empty() {
                "No loans".to_string()
            } else {
                ids.iter()
                    .map(|id| format!("#{id}"))
                    .collect::<Vec<_>>()
                    .join(", ")
            };
            Ok(Outcome::new(text, json!(ids)))
        }

        Command::Pending { max_id } => {
            let pending = api.pending_loans(*max_id).await?;
            Ok(Outcome::new(render::pending(&pending), serde_json::to_value(&pending)?))
        }

        Command::Pause => {
            let receipt = api.pause().await?;
            Outcome::receipt("Pause", &receipt)
        }

        Command::Unpause => {
            let receipt = api.unpause().await?;
            Outcome::receipt("Unpause", &receipt)
        }

        Command::InterestRate { address } => {
            let student = address.unwrap_or(account);
            let bps = api.calculate_interest_rate(student).await?;
            Ok(Outcome::new(
                format!("{:.2}% ({bps} bps)", bps as f64 / 100.0),
                json!({ "student": student, "interestRateBps": bps }),
            ))
        }

        Command::NextPayment { loan_id } => {
            let loan_id = validate_loan_id(*loan_id)?;
            let amount = api.next_payment(loan_id).await?;
            Ok(Outcome::new(
                format!("Next payment on loan #{loan_id}: {amount} EDU"),
                json!({ "loanId": loan_id, "amount": amount }),
            ))
        }

        Command::CheckMilestones { address } => {
            let receipt = api
                .check_milestones(address.unwrap_or(account))
                .await?;
            Outcome::receipt("Milestone check", &receipt)
        }
    }
}

/// Seeds the demo contract: the account registers, stakes and requests a
/// collateralized loan, leaving loan #1 pending.
pub async fn seed_demo(api: &dyn StudentLoanApi) -> Result<()> {
    api.register_student().await.context("demo: register")?;
    api.stake("1000").await.context("demo: stake")?;
    api.request_loan("2500", 180 * SECONDS_PER_DAY, true)
        .await
        .context("demo: request loan")?;
    Ok(())
}

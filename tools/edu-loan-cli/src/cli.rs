//! Command-line arguments.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use edu_loan_adapter::prelude::{parse_address, Address, Role};

/// EduLoan: student loans, staking and performance tracking on-chain.
#[derive(Parser, Debug)]
#[command(name = "eduloan", version)]
#[command(about = "Command-line front end for the EduLoan student-loan contract")]
pub struct Args {
    /// TOML configuration file
    #[arg(short, long, env = "EDU_CONFIG")]
    pub config: Option<PathBuf>,

    /// JSON-RPC endpoint of the wallet/provider (overrides config)
    #[arg(long)]
    pub rpc_url: Option<String>,

    /// EduLoan contract address (overrides config)
    #[arg(long, value_parser = address)]
    pub contract: Option<Address>,

    /// Account to act as; defaults to the wallet's first account
    #[arg(short, long, value_parser = address)]
    pub account: Option<Address>,

    /// Run against an in-memory contract with sample data
    #[arg(long)]
    pub demo: bool,

    /// Print results as JSON
    #[arg(long)]
    pub json: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Roles that can be granted and revoked through the contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ManagedRole {
    Institution,
    Admin,
}

impl From<ManagedRole> for Role {
    fn from(role: ManagedRole) -> Self {
        match role {
            ManagedRole::Institution => Role::Institution,
            ManagedRole::Admin => Role::Admin,
        }
    }
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Register the account as a student
    Register,

    /// Request a loan
    RequestLoan {
        /// Amount in EDU
        #[arg(long)]
        amount: String,
        /// Term in days (minimum 90)
        #[arg(long)]
        term_days: u64,
        /// Back the loan with staked tokens
        #[arg(long)]
        collateral: bool,
    },

    /// Approve and fund a pending loan (admin or institution)
    ApproveLoan {
        #[arg(long)]
        loan_id: u64,
        /// Funding amount; defaults to the loan's exact principal
        #[arg(long)]
        amount: Option<String>,
    },

    /// Repay part of an active loan
    Repay {
        #[arg(long)]
        loan_id: u64,
        /// Amount in EDU
        #[arg(long)]
        amount: String,
    },

    /// Stake tokens (minimum 1000 EDU)
    Stake {
        /// Amount in EDU
        #[arg(long)]
        amount: String,
    },

    /// Record a course score for a student (admin or institution)
    UpdatePerformance {
        #[arg(long, value_parser = address)]
        student: Address,
        #[arg(long)]
        course_id: u64,
        /// Score between 0 and 100
        #[arg(long)]
        score: u64,
    },

    /// Grant a role
    GrantRole {
        #[arg(long, value_enum)]
        role: ManagedRole,
        #[arg(long, value_parser = address)]
        account: Address,
    },

    /// Revoke a role
    RevokeRole {
        #[arg(long, value_enum)]
        role: ManagedRole,
        #[arg(long, value_parser = address)]
        account: Address,
    },

    /// Check whether an account holds a role (any role name)
    HasRole {
        /// Role name, e.g. ADMIN_ROLE. Declared names use the contract's
        /// role ids; any other text is keccak-hashed exactly as typed
        #[arg(long)]
        role: String,
        #[arg(long, value_parser = address)]
        account: Address,
    },

    /// Show a student's profile and loans
    Student {
        #[arg(long, value_parser = address)]
        address: Option<Address>,
    },

    /// Show a loan
    Loan {
        #[arg(long)]
        loan_id: u64,
    },

    /// List a student's loan ids
    Loans {
        #[arg(long, value_parser = address)]
        address: Option<Address>,
    },

    /// Scan loan ids for pending loans
    Pending {
        /// Highest loan id to scan
        #[arg(long, default_value = "20")]
        max_id: u64,
    },

    /// Pause the contract (admin)
    Pause,

    /// Unpause the contract (admin)
    Unpause,

    /// Interest rate the contract would offer a student
    InterestRate {
        #[arg(long, value_parser = address)]
        address: Option<Address>,
    },

    /// Next installment due on a loan
    NextPayment {
        #[arg(long)]
        loan_id: u64,
    },

    /// Advance loan milestones for a student
    CheckMilestones {
        #[arg(long, value_parser = address)]
        address: Option<Address>,
    },
}

impl Command {
    /// Returns true if the command submits a transaction.
    #[must_use]
    pub fn is_transaction(&self) -> bool {
        !matches!(
            self,
            Command::HasRole { .. }
                | Command::Student { .. }
                | Command::Loan { .. }
                | Command::Loans { .. }
                | Command::Pending { .. }
                | Command::InterestRate { .. }
                | Command::NextPayment { .. }
        )
    }
}

fn address(input: &str) -> Result<Address, String> {
    parse_address(input).map_err(|e| e.to_string())
}

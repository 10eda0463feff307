//! eduloan: EduLoan contract command-line front end.

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, error, warn};

use edu_loan_adapter::prelude::*;
use edu_loan_cli::commands::{execute, seed_demo, Outcome};
use edu_loan_cli::{logging, Args};

/// Exit code when the user declines the wallet prompt.
const EXIT_USER_REJECTED: u8 = 2;

/// Default deployer account in demo mode.
const DEMO_ACCOUNT: u64 = 0xad;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(e) = logging::init(args.log_json) {
        eprintln!("Warning: failed to initialise logging: {e}");
    }

    match run(&args).await {
        Ok(outcome) => {
            if args.json {
                println!("{}", outcome.json);
            } else {
                println!("{}", outcome.text.trim_end());
            }
            ExitCode::SUCCESS
        }
        Err(err) => report(&err),
    }
}

async fn run(args: &Args) -> Result<Outcome> {
    if args.demo {
        let account = args
            .account
            .unwrap_or_else(|| Address::from_low_u64_be(DEMO_ACCOUNT));
        let (_, adapter) = create_test_adapter(account);
        seed_demo(&adapter).await?;
        return execute(&adapter, account, &args.command).await;
    }

    let config = load_config(args)?;
    let provider = Arc::new(JsonRpcProvider::new(&config)?);

    // like a wallet connect: default to the first exposed account
    let account = match args.account {
        Some(account) => account,
        None => provider
            .request_accounts()
            .await?
            .first()
            .copied()
            .ok_or_else(|| TransactionError::WalletUnavailable("wallet exposes no accounts".into()))?,
    };
    debug!(account = ?account, contract = ?config.contract_address, "Session established");

    let adapter = ContractAdapter::new(provider, Session::new(account), config);
    execute(&adapter, account, &args.command).await
}

fn load_config(args: &Args) -> Result<AdapterConfig> {
    let mut config = match &args.config {
        Some(path) => AdapterConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => AdapterConfig::default(),
    };
    config.apply_env_overrides()?;
    if let Some(url) = &args.rpc_url {
        config.rpc_url = url.clone();
    }
    if let Some(contract) = args.contract {
        config.contract_address = contract;
    }
    config.validate()?;
    Ok(config)
}

/// Prints an error and picks the exit code. A declined signature is a
/// notice, not a failure report.
fn report(err: &anyhow::Error) -> ExitCode {
    match err.downcast_ref::<TransactionError>() {
        Some(tx_err) if tx_err.is_user_rejection() => {
            warn!("Request cancelled in wallet");
            eprintln!("Cancelled: the request was rejected in the wallet.");
            ExitCode::from(EXIT_USER_REJECTED)
        }
        Some(tx_err) => {
            error!(category = ?tx_err.category(), "{tx_err}");
            match tx_err.category() {
                ErrorCategory::Precondition => {
                    eprintln!("Error: {tx_err}. Connect a wallet and check the configured account.");
                }
                _ => eprintln!("Error: {tx_err}"),
            }
            ExitCode::FAILURE
        }
        None => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

//! Adapter integration scenarios.

pub mod failures;
pub mod lifecycle;
pub mod properties;

use std::sync::Arc;

use edu_loan_adapter::prelude::*;

pub const ADMIN: u64 = 0xad;
pub const ALICE: u64 = 0xa1;
pub const BOB: u64 = 0xb0;
pub const UNIVERSITY: u64 = 0x1f;

/// Deterministic test account.
pub fn account(n: u64) -> Address {
    Address::from_low_u64_be(n)
}

/// A deployed contract with admin, two students and an institution
/// account exposed by the wallet.
pub struct Fixture {
    pub contract: Arc<InMemoryLoanContract>,
    pub admin: ContractAdapter<InMemoryLoanContract>,
}

impl Fixture {
    pub fn new() -> Self {
        let (contract, admin) = create_test_adapter(account(ADMIN));
        for n in [ALICE, BOB, UNIVERSITY] {
            contract.add_account(account(n));
        }
        Self { contract, admin }
    }

    /// Adapter acting as `who`, sharing the same provider and config.
    pub fn as_account(&self, who: u64) -> ContractAdapter<InMemoryLoanContract> {
        ContractAdapter::new(
            Arc::clone(&self.contract),
            Session::new(account(who)),
            self.admin.config().clone(),
        )
    }
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new()
    }
}

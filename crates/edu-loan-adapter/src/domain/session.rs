//! Explicit wallet session handed to the adapter at construction.

use crate::domain::value_objects::Address;
use serde::{Deserialize, Serialize};

/// The account the adapter signs and reads as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Connected wallet account.
    pub account: Address,
}

impl Session {
    /// Creates a session for `account`.
    #[must_use]
    pub const fn new(account: Address) -> Self {
        Self { account }
    }
}

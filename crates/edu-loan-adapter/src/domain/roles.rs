//! # Access-Control Roles
//!
//! The contract's roles as a closed enum. Identifiers are hashed once into a
//! lookup table; arbitrary role names still go through
//! [`services::role_id`](crate::domain::services::role_id) at call time.

use crate::domain::services::role_id;
use crate::domain::value_objects::Hash;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// Roles known to the EduLoan contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// OpenZeppelin `DEFAULT_ADMIN_ROLE` (the zero hash).
    DefaultAdmin,
    /// `ADMIN_ROLE`: approvals, pausing, role management.
    Admin,
    /// `INSTITUTION_ROLE`: approvals and performance updates.
    Institution,
}

impl Role {
    /// Every role, in table order.
    pub const ALL: [Role; 3] = [Role::DefaultAdmin, Role::Admin, Role::Institution];

    /// The role's name as declared in the contract.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Role::DefaultAdmin => "DEFAULT_ADMIN_ROLE",
            Role::Admin => "ADMIN_ROLE",
            Role::Institution => "INSTITUTION_ROLE",
        }
    }

    /// The 32-byte identifier the contract checks against.
    #[must_use]
    pub fn id(self) -> Hash {
        role_table()[self as usize]
    }

    /// Exact lookup by declared name (`"ADMIN_ROLE"`). Unlike [`FromStr`],
    /// no case folding and no short aliases.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Role> {
        Self::ALL.into_iter().find(|role| role.name() == name)
    }

    /// Reverse lookup from an identifier.
    #[must_use]
    pub fn from_id(id: &Hash) -> Option<Role> {
        Self::ALL.into_iter().find(|role| role.id() == *id)
    }
}

fn role_table() -> &'static [Hash; 3] {
    static TABLE: OnceLock<[Hash; 3]> = OnceLock::new();
    TABLE.get_or_init(|| {
        [
            // DEFAULT_ADMIN_ROLE is bytes32(0), not a hash of its name
            Hash::zero(),
            role_id(Role::Admin.name()),
            role_id(Role::Institution.name()),
        ]
    })
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "DEFAULT_ADMIN_ROLE" | "DEFAULT_ADMIN" => Ok(Role::DefaultAdmin),
            "ADMIN_ROLE" | "ADMIN" => Ok(Role::Admin),
            "INSTITUTION_ROLE" | "INSTITUTION" => Ok(Role::Institution),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

//! Data models shared by the Storefront services

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A role granted to a user account
///
/// Serialized with its authority name (`ROLE_USER`, `ROLE_ADMIN`), which is
/// also what lands in the `authorities` claim of issued tokens.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RoleName {
    #[serde(rename = "ROLE_USER")]
    User,
    #[serde(rename = "ROLE_ADMIN")]
    Admin,
}

impl RoleName {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoleName::User => "ROLE_USER",
            RoleName::Admin => "ROLE_ADMIN",
        }
    }
}

impl fmt::Display for RoleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RoleName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ROLE_USER" => Ok(RoleName::User),
            "ROLE_ADMIN" => Ok(RoleName::Admin),
            other => Err(format!("Unknown role: {}", other)),
        }
    }
}

/// Catalog product
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub description: String,
    /// Price in minor currency units
    pub price: i64,
}

//! User roles and the capability table that decides what each role may do.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Account role. Closed set; the wire format is the lowercase name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Buyer,
    Seller,
    Admin,
}

/// Something an action requires of the calling identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Review, approve and reject listings; read moderation dashboards.
    Moderate,
    /// Create and manage one's own listings.
    Sell,
    /// Use a cart, place orders, rate sellers.
    Purchase,
    /// Read the order lines sold by oneself.
    ViewSales,
    /// Move orders through their status lifecycle.
    ManageOrders,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Buyer => "buyer",
            Self::Seller => "seller",
            Self::Admin => "admin",
        }
    }

    /// Single decision table for role-based access.
    pub fn allows(self, capability: Capability) -> bool {
        match capability {
            Capability::Moderate | Capability::ManageOrders => self == Self::Admin,
            Capability::Sell | Capability::ViewSales => self == Self::Seller,
            Capability::Purchase => matches!(self, Self::Buyer | Self::Seller),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not a known [`Role`].
#[derive(Debug, Error)]
#[error("unknown role: {0:?}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "buyer" => Ok(Self::Buyer),
            "seller" => Ok(Self::Seller),
            "admin" => Ok(Self::Admin),
            other => Err(UnknownRole(other.to_owned())),
        }
    }
}

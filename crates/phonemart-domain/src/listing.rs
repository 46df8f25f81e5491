//! Phone listing domain types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::pagination::Sort;

/// Moderation status of a listing. Persisted values are stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingStatus {
    Pending,
    Approved,
    Rejected,
}

impl ListingStatus {
    pub const ALL: [Self; 3] = [Self::Pending, Self::Approved, Self::Rejected];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

/// Phone manufacturer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Brand {
    Apple,
    Samsung,
    Google,
    OnePlus,
    Xiaomi,
    Oppo,
    Vivo,
    Realme,
    Motorola,
    Nokia,
    Other,
}

impl Brand {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Apple => "apple",
            Self::Samsung => "samsung",
            Self::Google => "google",
            Self::OnePlus => "oneplus",
            Self::Xiaomi => "xiaomi",
            Self::Oppo => "oppo",
            Self::Vivo => "vivo",
            Self::Realme => "realme",
            Self::Motorola => "motorola",
            Self::Nokia => "nokia",
            Self::Other => "other",
        }
    }
}

/// Physical condition of a used phone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Condition {
    New,
    LikeNew,
    Excellent,
    Good,
    Fair,
}

impl Condition {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::LikeNew => "like-new",
            Self::Excellent => "excellent",
            Self::Good => "good",
            Self::Fair => "fair",
        }
    }
}

/// Error returned when a stored or requested value does not name a known variant.
#[derive(Debug, Error)]
#[error("unknown {what}: {value:?}")]
pub struct UnknownVariant {
    pub what: &'static str,
    pub value: String,
}

impl FromStr for ListingStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            other => Err(UnknownVariant {
                what: "listing status",
                value: other.to_owned(),
            }),
        }
    }
}

impl FromStr for Brand {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "apple" => Ok(Self::Apple),
            "samsung" => Ok(Self::Samsung),
            "google" => Ok(Self::Google),
            "oneplus" => Ok(Self::OnePlus),
            "xiaomi" => Ok(Self::Xiaomi),
            "oppo" => Ok(Self::Oppo),
            "vivo" => Ok(Self::Vivo),
            "realme" => Ok(Self::Realme),
            "motorola" => Ok(Self::Motorola),
            "nokia" => Ok(Self::Nokia),
            "other" => Ok(Self::Other),
            other => Err(UnknownVariant {
                what: "brand",
                value: other.to_owned(),
            }),
        }
    }
}

impl FromStr for Condition {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" => Ok(Self::New),
            "like-new" => Ok(Self::LikeNew),
            "excellent" => Ok(Self::Excellent),
            "good" => Ok(Self::Good),
            "fair" => Ok(Self::Fair),
            other => Err(UnknownVariant {
                what: "condition",
                value: other.to_owned(),
            }),
        }
    }
}

impl fmt::Display for ListingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Brand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sort order for listing queries.
///
/// The wire format is a single hyphenated string (e.g. `"price-asc"`) carrying both
/// the field and the direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingSortBy {
    CreatedAt(Sort),
    UpdatedAt(Sort),
    Price(Sort),
    Title(Sort),
}

impl Default for ListingSortBy {
    fn default() -> Self {
        Self::CreatedAt(Sort::Desc)
    }
}

impl ListingSortBy {
    pub fn from_kebab_case(s: &str) -> Option<Self> {
        match s {
            "created-at-desc" => Some(Self::CreatedAt(Sort::Desc)),
            "created-at-asc" => Some(Self::CreatedAt(Sort::Asc)),
            "updated-at-desc" => Some(Self::UpdatedAt(Sort::Desc)),
            "updated-at-asc" => Some(Self::UpdatedAt(Sort::Asc)),
            "price-desc" => Some(Self::Price(Sort::Desc)),
            "price-asc" => Some(Self::Price(Sort::Asc)),
            "title-desc" => Some(Self::Title(Sort::Desc)),
            "title-asc" => Some(Self::Title(Sort::Asc)),
            _ => None,
        }
    }
}

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Returned when a string does not name a known enum variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {kind} '{value}'")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

impl ParseEnumError {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

/// Lifecycle status of a listing.
///
/// Listings are never removed from the store; `Deleted` is a soft delete.
/// Any status may follow any other, the only check is that the value is one
/// of these four.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingStatus {
    Pending,
    Available,
    Sold,
    Deleted,
}

impl ListingStatus {
    pub const ALL: [ListingStatus; 4] = [
        ListingStatus::Pending,
        ListingStatus::Available,
        ListingStatus::Sold,
        ListingStatus::Deleted,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ListingStatus::Pending => "pending",
            ListingStatus::Available => "available",
            ListingStatus::Sold => "sold",
            ListingStatus::Deleted => "deleted",
        }
    }

    /// Whether listings in this status are shown on the public storefront.
    pub fn is_public(self) -> bool {
        self == ListingStatus::Available
    }

    /// Whether a listing has passed review and is still listed: on sale or
    /// already sold.
    pub fn is_approved(self) -> bool {
        matches!(self, ListingStatus::Available | ListingStatus::Sold)
    }
}

impl fmt::Display for ListingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ListingStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|v| v.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseEnumError::new("listing status", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GadgetType {
    Phone,
    Laptop,
    Other,
}

impl GadgetType {
    pub const ALL: [GadgetType; 3] = [GadgetType::Phone, GadgetType::Laptop, GadgetType::Other];

    pub fn as_str(self) -> &'static str {
        match self {
            GadgetType::Phone => "phone",
            GadgetType::Laptop => "laptop",
            GadgetType::Other => "other",
        }
    }
}

impl fmt::Display for GadgetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GadgetType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|v| v.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseEnumError::new("gadget type", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GadgetCondition {
    New,
    Used,
    OpenBox,
}

impl GadgetCondition {
    pub const ALL: [GadgetCondition; 3] = [
        GadgetCondition::New,
        GadgetCondition::Used,
        GadgetCondition::OpenBox,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            GadgetCondition::New => "new",
            GadgetCondition::Used => "used",
            GadgetCondition::OpenBox => "open_box",
        }
    }
}

impl fmt::Display for GadgetCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GadgetCondition {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|v| v.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseEnumError::new("gadget condition", s))
    }
}

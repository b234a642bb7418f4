//! Database row types. These map directly to SQLite rows.
//! Distinct from resale-types API models to keep the DB layer independent.

use resale_types::models::{GadgetCondition, GadgetType, ListingStatus};

pub struct AdminRow {
    pub id: i64,
    pub username: String,
    pub hashed_password: String,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct ListingRow {
    pub id: i64,
    pub name: String,
    pub gadget_type: GadgetType,
    pub condition: GadgetCondition,
    pub description: String,
    pub seller_price: f64,
    pub listing_price: Option<f64>,
    pub seller_contact_info: String,
    pub photo_url: String,
    pub status: ListingStatus,
    pub created_at: String,
}

impl ListingRow {
    /// Price shown to buyers: the admin's listing price once set, otherwise
    /// what the seller asked for.
    pub fn effective_price(&self) -> f64 {
        self.listing_price.unwrap_or(self.seller_price)
    }
}

#[derive(Debug, Clone)]
pub struct QuestionRow {
    pub id: i64,
    pub listing_id: Option<i64>,
    pub question: String,
    pub contact_info: String,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct GadgetRequestRow {
    pub id: i64,
    pub gadget_details: String,
    pub contact_info: String,
    pub is_resolved: bool,
    pub created_at: String,
}

#[derive(Debug, Clone, Default)]
pub struct SettingsRow {
    pub whatsapp_number: Option<String>,
}

// -- Inputs --

/// A listing about to be inserted. Status is chosen by the caller:
/// seller submissions start `Pending`, admin additions start `Available`.
#[derive(Debug, Clone)]
pub struct NewListing {
    pub name: String,
    pub gadget_type: GadgetType,
    pub condition: GadgetCondition,
    pub description: String,
    pub seller_price: f64,
    pub listing_price: Option<f64>,
    pub seller_contact_info: String,
    pub photo_url: String,
    pub status: ListingStatus,
}

/// Partial update; `None` leaves the column untouched.
#[derive(Debug, Clone, Default)]
pub struct ListingPatch {
    pub name: Option<String>,
    pub gadget_type: Option<GadgetType>,
    pub condition: Option<GadgetCondition>,
    pub description: Option<String>,
    pub seller_price: Option<f64>,
    pub listing_price: Option<f64>,
}

/// Storefront filters. Price bounds are inclusive and apply to the
/// effective price. An empty `statuses` means `available` only.
#[derive(Debug, Clone, Default)]
pub struct ListingFilter {
    pub statuses: Vec<ListingStatus>,
    pub gadget_type: Option<GadgetType>,
    pub condition: Option<GadgetCondition>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
}

/// Result of one id within a bulk status change.
#[derive(Debug, Clone, PartialEq)]
pub enum BulkItemOutcome {
    Updated,
    NotFound,
    Failed(String),
}

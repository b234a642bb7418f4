use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{GadgetCondition, GadgetType, ListingStatus};

// -- JWT Claims --

/// Admin bearer token claims. `sub` is the admin username.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
}

// -- Auth --

/// Form-encoded body of `POST /admin/login` (OAuth2 password flow field names).
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

// -- Listings --

/// Full listing as seen by admins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Listing {
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
    pub created_at: DateTime<Utc>,
}

/// Listing as shown on the storefront. Seller price and contact are withheld;
/// buyers reach the admin through the configured WhatsApp number instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicListing {
    pub id: i64,
    pub name: String,
    pub gadget_type: GadgetType,
    pub condition: GadgetCondition,
    pub description: String,
    pub listing_price: f64,
    pub photo_url: String,
    pub status: ListingStatus,
    pub created_at: DateTime<Utc>,
    pub admin_whatsapp_number: Option<String>,
}

/// Query string of `GET /listings`.
#[derive(Debug, Default, Deserialize)]
pub struct ListingQuery {
    pub gadget_type: Option<GadgetType>,
    pub condition: Option<GadgetCondition>,
    #[serde(alias = "price_min")]
    pub min_price: Option<f64>,
    #[serde(alias = "price_max")]
    pub max_price: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateListingRequest {
    pub name: Option<String>,
    pub gadget_type: Option<GadgetType>,
    pub condition: Option<GadgetCondition>,
    pub description: Option<String>,
    pub seller_price: Option<f64>,
    pub listing_price: Option<f64>,
}

/// `status` stays a string so unknown values surface as a validation error
/// with a readable message rather than a body-deserialization failure.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StatusUpdateRequest {
    pub status: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BulkActionRequest {
    pub action: String,
    pub listing_ids: Vec<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkOutcome {
    pub id: i64,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BulkActionResponse {
    pub action: ListingStatus,
    pub updated: usize,
    pub failed: usize,
    pub results: Vec<BulkOutcome>,
}

// -- Inquiries --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QuestionSubmission {
    #[serde(default)]
    pub listing_id: Option<i64>,
    pub question: String,
    pub contact_info: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: i64,
    pub listing_id: Option<i64>,
    pub question: String,
    pub contact_info: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GadgetRequestSubmission {
    pub gadget_details: String,
    pub contact_info: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GadgetRequest {
    pub id: i64,
    pub gadget_details: String,
    pub contact_info: String,
    pub is_resolved: bool,
    pub created_at: DateTime<Utc>,
}

// -- Admin --

#[derive(Debug, Serialize, Deserialize)]
pub struct Dashboard {
    pub pending_listings: Vec<Listing>,
    pub active_listings: Vec<Listing>,
    pub sold_listings: Vec<Listing>,
    pub buyer_questions: Vec<Question>,
    pub gadget_requests: Vec<GadgetRequest>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SettingsRequest {
    pub whatsapp_number: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Settings {
    pub whatsapp_number: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SettingsUpdated {
    pub status: String,
    pub whatsapp_number: String,
}

// -- Misc --

/// Body of every error response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub detail: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatusMessage {
    pub status: String,
}

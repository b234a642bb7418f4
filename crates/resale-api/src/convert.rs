//! Row → wire conversions.

use chrono::{DateTime, Utc};
use tracing::warn;

use resale_db::models::{GadgetRequestRow, ListingRow, QuestionRow};
use resale_types::api::{GadgetRequest, Listing, PublicListing, Question};

/// SQLite hands back RFC 3339 text for rows written by this schema, but
/// older rows may use `datetime('now')` format without a timezone.
pub(crate) fn parse_timestamp(raw: &str) -> DateTime<Utc> {
    raw.parse::<DateTime<Utc>>()
        .or_else(|_| {
            chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            warn!("Corrupt timestamp '{}': {}", raw, e);
            DateTime::default()
        })
}

pub(crate) fn listing(row: ListingRow) -> Listing {
    Listing {
        created_at: parse_timestamp(&row.created_at),
        id: row.id,
        name: row.name,
        gadget_type: row.gadget_type,
        condition: row.condition,
        description: row.description,
        seller_price: row.seller_price,
        listing_price: row.listing_price,
        seller_contact_info: row.seller_contact_info,
        photo_url: row.photo_url,
        status: row.status,
    }
}

pub(crate) fn public_listing(row: ListingRow, whatsapp: Option<&str>) -> PublicListing {
    PublicListing {
        listing_price: row.effective_price(),
        created_at: parse_timestamp(&row.created_at),
        id: row.id,
        name: row.name,
        gadget_type: row.gadget_type,
        condition: row.condition,
        description: row.description,
        photo_url: row.photo_url,
        status: row.status,
        admin_whatsapp_number: whatsapp.map(str::to_string),
    }
}

pub(crate) fn question(row: QuestionRow) -> Question {
    Question {
        created_at: parse_timestamp(&row.created_at),
        id: row.id,
        listing_id: row.listing_id,
        question: row.question,
        contact_info: row.contact_info,
    }
}

pub(crate) fn gadget_request(row: GadgetRequestRow) -> GadgetRequest {
    GadgetRequest {
        created_at: parse_timestamp(&row.created_at),
        id: row.id,
        gadget_details: row.gadget_details,
        contact_info: row.contact_info,
        is_resolved: row.is_resolved,
    }
}

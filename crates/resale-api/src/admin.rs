use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    response::IntoResponse,
};
use tracing::info;

use resale_types::api::{Dashboard, Settings, SettingsRequest, SettingsUpdated};
use resale_types::models::ListingStatus;

use crate::auth::AppState;
use crate::convert;
use crate::error::{ApiError, require_text};

/// GET /admin/dashboard: everything an admin reviews, in one response.
pub async fn dashboard(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let (pending, active, sold, questions, requests) = crate::db_call(&state, |db| {
        Ok((
            db.listings_by_status(ListingStatus::Pending)?,
            db.listings_by_status(ListingStatus::Available)?,
            db.listings_by_status(ListingStatus::Sold)?,
            db.list_questions()?,
            db.list_gadget_requests()?,
        ))
    })
    .await?;

    Ok(Json(Dashboard {
        pending_listings: pending.into_iter().map(convert::listing).collect(),
        active_listings: active.into_iter().map(convert::listing).collect(),
        sold_listings: sold.into_iter().map(convert::listing).collect(),
        buyer_questions: questions.into_iter().map(convert::question).collect(),
        gadget_requests: requests.into_iter().map(convert::gadget_request).collect(),
    }))
}

/// GET /admin/settings
pub async fn get_settings(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let row = crate::db_call(&state, |db| db.get_settings()).await?;
    Ok(Json(Settings {
        whatsapp_number: row.whatsapp_number,
    }))
}

/// POST /admin/settings: replaces the settings record.
pub async fn update_settings(
    State(state): State<AppState>,
    payload: Result<Json<SettingsRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload?;
    let number = require_text("whatsapp_number", &req.whatsapp_number)?;

    let row = crate::db_call(&state, move |db| db.replace_settings(&number)).await?;
    let whatsapp_number = row.whatsapp_number.unwrap_or_default();
    info!("Admin WhatsApp number set to {}", whatsapp_number);

    Ok(Json(SettingsUpdated {
        status: "settings updated".to_string(),
        whatsapp_number,
    }))
}

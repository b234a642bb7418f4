use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::info;

use resale_types::api::{GadgetRequestSubmission, QuestionSubmission};

use crate::auth::AppState;
use crate::convert;
use crate::error::{ApiError, require_text};

/// POST /buyer/question
pub async fn submit_question(
    State(state): State<AppState>,
    payload: Result<Json<QuestionSubmission>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload?;
    let question = require_text("question", &req.question)?;
    let contact_info = require_text("contact_info", &req.contact_info)?;
    let listing_id = req.listing_id;

    let row = crate::db_call(&state, move |db| {
        db.insert_question(listing_id, &question, &contact_info)
    })
    .await?
    .ok_or_else(|| ApiError::not_found("Listing not found"))?;

    info!("Question {} received", row.id);
    Ok((StatusCode::CREATED, Json(convert::question(row))))
}

/// POST /buyer/request
pub async fn submit_gadget_request(
    State(state): State<AppState>,
    payload: Result<Json<GadgetRequestSubmission>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload?;
    let details = require_text("gadget_details", &req.gadget_details)?;
    let contact_info = require_text("contact_info", &req.contact_info)?;

    let row =
        crate::db_call(&state, move |db| db.insert_gadget_request(&details, &contact_info)).await?;

    info!("Gadget request {} received", row.id);
    Ok((StatusCode::CREATED, Json(convert::gadget_request(row))))
}

/// DELETE /admin/questions/{id}
pub async fn delete_question(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let removed = crate::db_call(&state, move |db| db.delete_question(id)).await?;
    if !removed {
        return Err(ApiError::not_found("Question not found"));
    }

    info!("Question {} deleted", id);
    Ok(StatusCode::NO_CONTENT)
}

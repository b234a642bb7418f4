use std::collections::HashMap;

use axum::{
    Json,
    body::Bytes,
    extract::{
        Multipart, Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::IntoResponse,
};
use tracing::info;

use resale_db::models::{BulkItemOutcome, ListingFilter, ListingPatch, NewListing};
use resale_types::api::{
    BulkActionRequest, BulkActionResponse, BulkOutcome, ListingQuery, PublicListing,
    StatusUpdateRequest, UpdateListingRequest,
};
use resale_types::models::{GadgetCondition, GadgetType, ListingStatus};

use crate::auth::AppState;
use crate::convert;
use crate::error::{ApiError, require_price, require_text};
use crate::uploads::{MAX_PHOTO_SIZE, public_url};

/// Text fields and the photo part of a listing submission.
struct ListingForm {
    fields: HashMap<String, String>,
    photo: Option<(Option<String>, Bytes)>,
}

impl ListingForm {
    async fn read(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut fields = HashMap::new();
        let mut photo = None;

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();
            if name == "photo" {
                let file_name = field.file_name().map(str::to_string);
                let bytes = field.bytes().await?;
                photo = Some((file_name, bytes));
            } else {
                let text = field.text().await?;
                fields.insert(name, text);
            }
        }

        Ok(Self { fields, photo })
    }

    fn text(&self, name: &str) -> Result<String, ApiError> {
        let raw = self
            .fields
            .get(name)
            .ok_or_else(|| ApiError::validation(format!("'{}' is required", name)))?;
        require_text(name, raw)
    }

    fn price(&self, name: &str) -> Result<f64, ApiError> {
        let raw = self.text(name)?;
        let value: f64 = raw
            .parse()
            .map_err(|_| ApiError::validation(format!("'{}' must be a number", name)))?;
        require_price(name, value)
    }

    /// Validate everything except the photo; the photo is written last so a
    /// rejected form never leaves a file behind.
    fn into_listing(
        self,
        status: ListingStatus,
        with_listing_price: bool,
    ) -> Result<(NewListing, Option<String>, Bytes), ApiError> {
        let gadget_type: GadgetType = self.text("gadget_type")?.parse()?;
        let condition: GadgetCondition = self.text("condition")?.parse()?;
        let listing_price = if with_listing_price {
            Some(self.price("listing_price")?)
        } else {
            None
        };

        let listing = NewListing {
            name: self.text("name")?,
            gadget_type,
            condition,
            description: self.text("description")?,
            seller_price: self.price("seller_price")?,
            listing_price,
            seller_contact_info: self.text("seller_contact_info")?,
            photo_url: String::new(),
            status,
        };

        let (file_name, bytes) = self
            .photo
            .ok_or_else(|| ApiError::validation("'photo' is required"))?;
        if bytes.is_empty() {
            return Err(ApiError::validation("Empty photo"));
        }
        if bytes.len() > MAX_PHOTO_SIZE {
            return Err(ApiError::validation("Photo too large. Maximum size is 10MB."));
        }

        Ok((listing, file_name, bytes))
    }
}

async fn create_listing(
    state: AppState,
    multipart: Multipart,
    status: ListingStatus,
) -> Result<impl IntoResponse, ApiError> {
    let with_listing_price = status == ListingStatus::Available;
    let (mut listing, file_name, bytes) =
        ListingForm::read(multipart).await?.into_listing(status, with_listing_price)?;

    let stored = state.uploads.save(file_name.as_deref(), &bytes).await?;
    listing.photo_url = public_url(&stored);

    let row = crate::db_call(&state, move |db| db.insert_listing(&listing)).await?;
    info!("Listing {} created as {}", row.id, row.status);

    Ok((StatusCode::CREATED, Json(convert::listing(row))))
}

/// POST /seller/submit: multipart listing from a seller, starts `pending`.
pub async fn submit_listing(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    create_listing(state, multipart, ListingStatus::Pending).await
}

/// POST /admin/add: admin-priced listing, goes live immediately.
pub async fn add_listing(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    create_listing(state, multipart, ListingStatus::Available).await
}

/// PUT /admin/listings/{id}
pub async fn update_listing(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    payload: Result<Json<UpdateListingRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload?;

    let patch = ListingPatch {
        name: req.name.as_deref().map(|v| require_text("name", v)).transpose()?,
        gadget_type: req.gadget_type,
        condition: req.condition,
        description: req
            .description
            .as_deref()
            .map(|v| require_text("description", v))
            .transpose()?,
        seller_price: req.seller_price.map(|v| require_price("seller_price", v)).transpose()?,
        listing_price: req.listing_price.map(|v| require_price("listing_price", v)).transpose()?,
    };

    let row = crate::db_call(&state, move |db| db.update_listing(id, &patch))
        .await?
        .ok_or_else(|| ApiError::not_found("Listing not found"))?;

    Ok(Json(convert::listing(row)))
}

/// PATCH /admin/listings/{id}/status
pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    payload: Result<Json<StatusUpdateRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload?;
    let status: ListingStatus = req.status.parse()?;

    let row = crate::db_call(&state, move |db| db.set_listing_status(id, status))
        .await?
        .ok_or_else(|| ApiError::not_found("Listing not found"))?;

    info!("Listing {} set to {}", id, status);
    Ok(Json(convert::listing(row)))
}

/// POST /admin/listings/bulk: one status for many ids, reported per id.
pub async fn bulk_update_status(
    State(state): State<AppState>,
    payload: Result<Json<BulkActionRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload?;
    let action: ListingStatus = req.action.parse()?;
    if req.listing_ids.is_empty() {
        return Err(ApiError::validation("'listing_ids' must not be empty"));
    }

    let ids = req.listing_ids;
    let outcomes = crate::db_call(&state, move |db| db.bulk_set_status(&ids, action)).await?;

    let results: Vec<BulkOutcome> = outcomes
        .into_iter()
        .map(|(id, outcome)| match outcome {
            BulkItemOutcome::Updated => BulkOutcome {
                id,
                success: true,
                error: None,
            },
            BulkItemOutcome::NotFound => BulkOutcome {
                id,
                success: false,
                error: Some("Listing not found".to_string()),
            },
            // Cause already logged by the store; keep internals off the wire
            BulkItemOutcome::Failed(_) => BulkOutcome {
                id,
                success: false,
                error: Some("Update failed".to_string()),
            },
        })
        .collect();

    let updated = results.iter().filter(|r| r.success).count();
    let failed = results.len() - updated;
    info!("Bulk {}: {} updated, {} failed", action, updated, failed);

    Ok(Json(BulkActionResponse {
        action,
        updated,
        failed,
        results,
    }))
}

/// GET /admin/listings/pending
pub async fn pending_listings(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let rows =
        crate::db_call(&state, |db| db.listings_by_status(ListingStatus::Pending)).await?;
    Ok(Json(rows.into_iter().map(convert::listing).collect::<Vec<_>>()))
}

/// GET /listings: storefront with optional filters.
pub async fn public_listings(
    State(state): State<AppState>,
    query: Result<Query<ListingQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Query(query) = query?;
    let min_price = query.min_price.map(|v| require_price("min_price", v)).transpose()?;
    let max_price = query.max_price.map(|v| require_price("max_price", v)).transpose()?;
    if let (Some(min), Some(max)) = (min_price, max_price) {
        if min > max {
            return Err(ApiError::validation("'min_price' must not exceed 'max_price'"));
        }
    }

    let filter = ListingFilter {
        statuses: statuses_where(ListingStatus::is_public),
        gadget_type: query.gadget_type,
        condition: query.condition,
        min_price,
        max_price,
    };
    storefront(&state, filter).await
}

/// GET /listings/approved: everything past review and not deleted, sold
/// listings included. No filters.
pub async fn approved_listings(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let filter = ListingFilter {
        statuses: statuses_where(ListingStatus::is_approved),
        ..Default::default()
    };
    storefront(&state, filter).await
}

fn statuses_where(pred: fn(ListingStatus) -> bool) -> Vec<ListingStatus> {
    ListingStatus::ALL.into_iter().filter(|s| pred(*s)).collect()
}

async fn storefront(
    state: &AppState,
    filter: ListingFilter,
) -> Result<Json<Vec<PublicListing>>, ApiError> {
    let (rows, settings) = crate::db_call(state, move |db| {
        Ok((db.public_listings(&filter)?, db.get_settings()?))
    })
    .await?;

    let whatsapp = settings.whatsapp_number.as_deref();
    let listings = rows
        .into_iter()
        .map(|row| convert::public_listing(row, whatsapp))
        .collect();

    Ok(Json(listings))
}

use axum::{
    Json, Router,
    extract::DefaultBodyLimit,
    middleware,
    routing::{delete, get, patch, post, put},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use resale_types::api::StatusMessage;

use crate::auth::{self, AppState};
use crate::middleware::require_admin;
use crate::uploads::MAX_PHOTO_SIZE;
use crate::{admin, inquiries, listings, uploads};

/// Room for the photo plus the text fields of a multipart listing.
const MAX_BODY_SIZE: usize = MAX_PHOTO_SIZE + 1024 * 1024;

/// Full HTTP surface. Admin routes sit behind [`require_admin`].
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/seller/submit", post(listings::submit_listing))
        .route("/buyer/request", post(inquiries::submit_gadget_request))
        .route("/buyer/question", post(inquiries::submit_question))
        .route("/admin/login", post(auth::login))
        .route("/listings", get(listings::public_listings))
        .route("/listings/approved", get(listings::approved_listings))
        .route("/uploads/{filename}", get(uploads::serve_upload))
        .route("/health", get(health));

    let admin_routes = Router::new()
        .route("/admin/add", post(listings::add_listing))
        .route("/admin/dashboard", get(admin::dashboard))
        .route("/admin/listings/pending", get(listings::pending_listings))
        .route("/admin/listings/bulk", post(listings::bulk_update_status))
        .route("/admin/listings/{id}", put(listings::update_listing))
        .route("/admin/listings/{id}/status", patch(listings::update_status))
        .route("/admin/settings", get(admin::get_settings).post(admin::update_settings))
        .route("/admin/questions/{id}", delete(inquiries::delete_question))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin));

    Router::new()
        .merge(public_routes)
        .merge(admin_routes)
        .layer(DefaultBodyLimit::max(MAX_BODY_SIZE))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> Json<StatusMessage> {
    Json(StatusMessage {
        status: "ok".to_string(),
    })
}

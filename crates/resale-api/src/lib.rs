pub mod admin;
pub mod auth;
pub mod config;
mod convert;
pub mod error;
pub mod inquiries;
pub mod listings;
pub mod middleware;
pub mod routes;
pub mod uploads;

pub use routes::router;

use resale_db::Database;
use tracing::error;

use crate::auth::AppState;
use crate::error::ApiError;

/// Run a blocking database call off the async runtime.
pub(crate) async fn db_call<F, T>(state: &AppState, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&Database) -> anyhow::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let state = state.clone();
    tokio::task::spawn_blocking(move || f(&state.db))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            anyhow::anyhow!("database task failed")
        })?
        .map_err(ApiError::Internal)
}

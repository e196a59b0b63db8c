pub mod health;
pub mod requests;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /requests                       submit (POST, multipart)
/// /requests/{id}                  delete registry record (DELETE)
/// /requests/{id}/{kind}           poll one job (GET)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().nest("/requests", requests::router())
}

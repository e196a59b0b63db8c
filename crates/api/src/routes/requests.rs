use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::requests;
use crate::state::AppState;

/// Routes mounted at `/requests`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(requests::submit))
        .route("/{id}", delete(requests::delete))
        .route("/{id}/{kind}", get(requests::poll))
}

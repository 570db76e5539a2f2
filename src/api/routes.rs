//! API route configuration.

use crate::api::handlers::{
    create_url_handler, delete_url_handler, get_url_handler, health_handler,
};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

/// All routes served under `/api`.
///
/// # Endpoints
///
/// - `POST   /urls`          - Create a short URL
/// - `GET    /urls/{code}`   - Look up the original URL
/// - `DELETE /urls/{code}`   - Delete a short URL
/// - `GET    /health`        - Store, event queue and transport status
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/urls", post(create_url_handler))
        .route(
            "/urls/{code}",
            get(get_url_handler).delete(delete_url_handler),
        )
        .route("/health", get(health_handler))
}

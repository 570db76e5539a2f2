//! Handler for short URL redirect.

use axum::{
    extract::{Path, State},
    http::{HeaderValue, StatusCode, header},
    response::IntoResponse,
};
use serde_json::json;
use tracing::{debug, warn};

use crate::error::AppError;
use crate::state::AppState;
use crate::utils::code_generator::is_valid_code;

/// Redirects a short code to its original URL.
///
/// # Endpoint
///
/// `GET /{code}`
///
/// Codes that cannot have been generated by this service are rejected before
/// any store lookup. Lookups emit no event.
///
/// # Errors
///
/// Returns 404 Not Found if the code is malformed or unknown.
/// Returns 422 Unprocessable Entity if the stored URL cannot be sent as a
/// `Location` header (for example, it contains control characters). URLs are
/// stored verbatim, so such records can exist.
/// Returns 500 Internal Server Error if the store fails.
pub async fn redirect_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    if !is_valid_code(&code) {
        debug!(short_code = %code, "Rejected malformed short code");
        return Err(AppError::not_found(
            "Short URL not found",
            json!({ "short_code": code }),
        ));
    }

    let record = state.url_service.get(&code).await?;

    let location = HeaderValue::from_str(&record.original_url).map_err(|_| {
        warn!(short_code = %code, "Stored url is not a valid Location header");
        AppError::unprocessable(
            "Stored URL cannot be used as a redirect target",
            json!({ "short_code": code, "reason": "invalid characters in original_url" }),
        )
    })?;

    Ok((StatusCode::TEMPORARY_REDIRECT, [(header::LOCATION, location)]))
}

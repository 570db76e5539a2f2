//! Handlers for short URL creation, lookup and deletion.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::TimeDelta;
use serde_json::json;
use validator::Validate;

use crate::api::dto::url::{CreateUrlRequest, CreateUrlResponse, GetUrlResponse};
use crate::domain::entities::UrlRecord;
use crate::error::AppError;
use crate::state::AppState;

/// Creates a short URL.
///
/// # Endpoint
///
/// `POST /api/urls`
///
/// # Request Body
///
/// ```json
/// {
///   "original_url": "https://example.com/some/long/path",
///   "ttl_seconds": 3600
/// }
/// ```
///
/// `ttl_seconds` is optional; absent or `0` stores the record without expiry.
///
/// # Response
///
/// ```json
/// {
///   "short_url": "3f9a1c0e",
///   "original_url": "https://example.com/some/long/path"
/// }
/// ```
///
/// # Errors
///
/// Returns 400 Bad Request if `original_url` is missing or empty.
/// Returns 500 Internal Server Error if the store fails.
pub async fn create_url_handler(
    State(state): State<AppState>,
    Json(payload): Json<CreateUrlRequest>,
) -> Result<Json<CreateUrlResponse>, AppError> {
    payload.validate()?;

    let ttl_seconds = payload.ttl_seconds.unwrap_or(0);
    let ttl = TimeDelta::try_seconds(ttl_seconds).ok_or_else(|| {
        AppError::bad_request(
            "ttl_seconds is out of range",
            json!({ "field": "ttl_seconds", "value": ttl_seconds }),
        )
    })?;

    let record = state
        .url_service
        .save(UrlRecord::new(payload.original_url), ttl)
        .await?;

    Ok(Json(CreateUrlResponse {
        short_url: record.short_code,
        original_url: record.original_url,
    }))
}

/// Returns the original URL for a short code.
///
/// # Endpoint
///
/// `GET /api/urls/{code}`
///
/// # Errors
///
/// Returns 404 Not Found if no live record exists for the code.
/// Returns 500 Internal Server Error if the store fails.
pub async fn get_url_handler(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<GetUrlResponse>, AppError> {
    let record = state.url_service.get(&code).await?;

    Ok(Json(GetUrlResponse {
        original_url: record.original_url,
    }))
}

/// Deletes a short code.
///
/// # Endpoint
///
/// `DELETE /api/urls/{code}`
///
/// Deleting a code that does not exist still returns 204.
///
/// # Errors
///
/// Returns 500 Internal Server Error if the store fails.
pub async fn delete_url_handler(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<StatusCode, AppError> {
    state.url_service.delete(&code).await?;

    Ok(StatusCode::NO_CONTENT)
}

//! DTOs for the short URL endpoints.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request to create a short URL.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUrlRequest {
    /// The URL to shorten. Stored verbatim; only emptiness is checked.
    #[serde(default)]
    #[validate(length(min = 1, message = "original_url is required"))]
    pub original_url: String,

    /// Lifetime of the record in seconds. Absent or `0` means no expiry.
    pub ttl_seconds: Option<i64>,
}

/// A freshly created short URL.
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateUrlResponse {
    pub short_url: String,
    pub original_url: String,
}

/// Lookup result for a short code.
#[derive(Debug, Serialize, Deserialize)]
pub struct GetUrlResponse {
    pub original_url: String,
}

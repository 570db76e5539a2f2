//! URL record entity representing a short code mapping.

use serde::{Deserialize, Serialize};

/// A mapping between a short code and the original URL.
///
/// `short_code` is empty until the record passes through
/// [`crate::application::services::UrlService::save`], which assigns it exactly once.
/// `original_url` is stored verbatim; no normalization is applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlRecord {
    pub short_code: String,
    pub original_url: String,
}

impl UrlRecord {
    /// Creates a record without a short code.
    pub fn new(original_url: impl Into<String>) -> Self {
        Self {
            short_code: String::new(),
            original_url: original_url.into(),
        }
    }

    /// Creates a record with a caller-chosen short code.
    pub fn with_code(short_code: impl Into<String>, original_url: impl Into<String>) -> Self {
        Self {
            short_code: short_code.into(),
            original_url: original_url.into(),
        }
    }

    /// Returns true once a short code has been assigned.
    pub fn has_code(&self) -> bool {
        !self.short_code.is_empty()
    }
}

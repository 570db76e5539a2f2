//! Repository trait for URL record storage.

use crate::domain::entities::UrlRecord;
use async_trait::async_trait;
use chrono::TimeDelta;

/// Errors reported by a [`UrlRepository`] implementation.
///
/// Store-specific conditions are translated into this set so the
/// orchestration layer never depends on a concrete client's error type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// Input rejected before any store I/O.
    #[error("invalid input: {0}")]
    Validation(String),

    /// The key is absent (never written, deleted, or expired).
    #[error("url not found")]
    NotFound,

    /// The connection is closed, refused, dropped, or timed out.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Any other failure reported by the store.
    #[error("store error: {0}")]
    Backend(String),
}

/// Capability interface over a key-value store with per-key expiry.
///
/// Every operation touches exactly one key. Implementations own no business
/// logic; they validate inputs, perform a single store command, and translate
/// store errors into [`StoreError`].
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::RedisUrlRepository`] - Redis implementation
/// - [`crate::infrastructure::persistence::MemoryUrlRepository`] - In-process implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UrlRepository: Send + Sync {
    /// Stores `record.original_url` under `record.short_code` with the given time-to-live.
    ///
    /// `ttl` is passed to the store as-is. A zero ttl means no expiry; a
    /// negative ttl is left to the store to interpret or reject.
    /// An existing value under the same key is overwritten.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Validation`] if the short code is empty.
    /// Returns [`StoreError::Unavailable`] or [`StoreError::Backend`] on store failure.
    async fn save(&self, record: &UrlRecord, ttl: TimeDelta) -> Result<(), StoreError>;

    /// Reads the record stored under `short_code`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Validation`] if `short_code` is empty.
    /// Returns [`StoreError::NotFound`] if the key is absent.
    /// Returns [`StoreError::Unavailable`] or [`StoreError::Backend`] on store failure.
    async fn get(&self, short_code: &str) -> Result<UrlRecord, StoreError>;

    /// Removes the record stored under `short_code`.
    ///
    /// Idempotent: deleting an absent key succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Validation`] if `short_code` is empty.
    /// Returns [`StoreError::Unavailable`] or [`StoreError::Backend`] on store failure.
    async fn delete(&self, short_code: &str) -> Result<(), StoreError>;

    /// Checks if the store is reachable.
    async fn health_check(&self) -> bool;
}

/// Rejects an empty key before it reaches a store.
pub fn ensure_key(short_code: &str) -> Result<(), StoreError> {
    if short_code.is_empty() {
        return Err(StoreError::Validation(
            "short code cannot be empty".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_key_rejects_empty() {
        assert_eq!(
            ensure_key(""),
            Err(StoreError::Validation(
                "short code cannot be empty".to_string()
            ))
        );
    }

    #[test]
    fn test_ensure_key_accepts_any_non_empty() {
        assert!(ensure_key("abc12345").is_ok());
        assert!(ensure_key(" ").is_ok());
    }

    #[test]
    fn test_store_error_display() {
        assert_eq!(StoreError::NotFound.to_string(), "url not found");
        assert_eq!(
            StoreError::Unavailable("connection closed".to_string()).to_string(),
            "store unavailable: connection closed"
        );
    }
}

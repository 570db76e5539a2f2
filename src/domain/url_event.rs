//! Mutation events published to downstream consumers.

use serde::Serialize;

/// Event key for a newly persisted short URL.
pub const URL_CREATED_KEY: &str = "url_created";

/// Event key for a deleted short URL.
pub const URL_DELETED_KEY: &str = "url_deleted";

/// An event describing a successful store mutation.
///
/// Produced at most once per successful save or delete and handed to the
/// background event worker. Nothing in this service persists or replays events,
/// and there is no ordering guarantee relative to later reads of the record.
///
/// # Wire format
///
/// | Kind      | Key           | Payload                                       |
/// |-----------|---------------|-----------------------------------------------|
/// | `Created` | `url_created` | `{"original_url": "...", "short_url": "..."}` |
/// | `Deleted` | `url_deleted` | raw short code bytes                          |
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UrlEvent {
    Created {
        short_code: String,
        original_url: String,
    },
    Deleted {
        short_code: String,
    },
}

#[derive(Serialize)]
struct CreatedPayload<'a> {
    original_url: &'a str,
    short_url: &'a str,
}

impl UrlEvent {
    pub fn created(short_code: impl Into<String>, original_url: impl Into<String>) -> Self {
        Self::Created {
            short_code: short_code.into(),
            original_url: original_url.into(),
        }
    }

    pub fn deleted(short_code: impl Into<String>) -> Self {
        Self::Deleted {
            short_code: short_code.into(),
        }
    }

    /// Routing key consumers use to tell event kinds apart.
    pub fn key(&self) -> &'static str {
        match self {
            Self::Created { .. } => URL_CREATED_KEY,
            Self::Deleted { .. } => URL_DELETED_KEY,
        }
    }

    pub fn short_code(&self) -> &str {
        match self {
            Self::Created { short_code, .. } | Self::Deleted { short_code } => short_code,
        }
    }

    /// Encodes the event body.
    pub fn payload(&self) -> Vec<u8> {
        match self {
            Self::Created {
                short_code,
                original_url,
            } => {
                let body = CreatedPayload {
                    original_url,
                    short_url: short_code,
                };
                // Serializing two string fields cannot fail.
                serde_json::to_vec(&body).unwrap_or_default()
            }
            Self::Deleted { short_code } => short_code.as_bytes().to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn test_created_event_key_and_payload() {
        let event = UrlEvent::created("1a2b3c4d", "https://example.com/path?q=1");

        assert_eq!(event.key(), "url_created");
        assert_eq!(event.short_code(), "1a2b3c4d");

        let payload: Value = serde_json::from_slice(&event.payload()).unwrap();
        assert_eq!(payload["original_url"], "https://example.com/path?q=1");
        assert_eq!(payload["short_url"], "1a2b3c4d");
        assert_eq!(payload.as_object().unwrap().len(), 2);
    }

    #[test]
    fn test_deleted_event_payload_is_raw_code() {
        let event = UrlEvent::deleted("deadbeef");

        assert_eq!(event.key(), "url_deleted");
        assert_eq!(event.payload(), b"deadbeef".to_vec());
    }

    #[test]
    fn test_created_payload_escapes_unicode_url() {
        let event = UrlEvent::created("00ff00ff", "https://пример.рф/\"quoted\"");

        let payload: Value = serde_json::from_slice(&event.payload()).unwrap();
        assert_eq!(payload["original_url"], "https://пример.рф/\"quoted\"");
    }
}

//! Short URL creation, lookup and deletion.

use std::sync::Arc;

use chrono::TimeDelta;
use serde_json::json;
use tracing::{debug, info, instrument};

use crate::domain::entities::UrlRecord;
use crate::domain::event_worker::EventNotifier;
use crate::domain::repositories::{StoreError, UrlRepository};
use crate::domain::url_event::UrlEvent;
use crate::error::AppError;
use crate::utils::code_generator::generate_code;

/// Orchestrates code generation, persistence and event notification.
///
/// Persistence is the source of truth and completes before a call returns.
/// Notifications are handed to the background event worker afterwards and
/// never delay or fail the call that produced them.
///
/// | Operation | Store call | Event on success |
/// |-----------|------------|------------------|
/// | `save`    | `save`     | `url_created`    |
/// | `get`     | `get`      | none             |
/// | `delete`  | `delete`   | `url_deleted`    |
///
/// No state is kept between calls; concurrent calls only share the store.
pub struct UrlService<R: UrlRepository + ?Sized = dyn UrlRepository> {
    repository: Arc<R>,
    notifier: EventNotifier,
}

impl<R: UrlRepository + ?Sized> UrlService<R> {
    /// Creates a new URL service.
    pub fn new(repository: Arc<R>, notifier: EventNotifier) -> Self {
        Self {
            repository,
            notifier,
        }
    }

    /// Persists a record with the given time-to-live.
    ///
    /// Assigns a freshly generated code when `record.short_code` is empty; a
    /// caller-supplied code is kept as-is. A generated code that collides with an
    /// existing one overwrites it (last write wins).
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if `original_url` is empty. No store call is made.
    /// Returns [`AppError::Internal`] if the store fails. No event is emitted.
    #[instrument(skip(self, record), fields(short_code = tracing::field::Empty))]
    pub async fn save(&self, mut record: UrlRecord, ttl: TimeDelta) -> Result<UrlRecord, AppError> {
        if record.original_url.is_empty() {
            return Err(AppError::bad_request(
                "original_url is required",
                json!({ "field": "original_url" }),
            ));
        }

        if !record.has_code() {
            record.short_code = generate_code(&record.original_url);
            debug!(
                short_code = %record.short_code,
                original_url = %record.original_url,
                "Short code generated"
            );
        }
        tracing::Span::current().record("short_code", record.short_code.as_str());

        self.repository.save(&record, ttl).await?;

        info!(ttl_seconds = ttl.num_seconds(), "Short URL saved");
        self.notifier.notify(UrlEvent::created(
            record.short_code.clone(),
            record.original_url.clone(),
        ));

        Ok(record)
    }

    /// Looks up the record for a short code.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if `short_code` is empty. No store call is made.
    /// Returns [`AppError::NotFound`] if no live record exists for the code.
    /// Returns [`AppError::Internal`] if the store fails.
    #[instrument(skip(self))]
    pub async fn get(&self, short_code: &str) -> Result<UrlRecord, AppError> {
        ensure_short_code(short_code)?;

        self.repository
            .get(short_code)
            .await
            .map_err(|e| match e {
                StoreError::NotFound => AppError::not_found(
                    "Short URL not found",
                    json!({ "short_code": short_code }),
                ),
                other => other.into(),
            })
    }

    /// Deletes the record for a short code.
    ///
    /// Deleting an unknown code succeeds and still emits `url_deleted`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if `short_code` is empty. No store call is made.
    /// Returns [`AppError::Internal`] if the store fails. No event is emitted.
    #[instrument(skip(self))]
    pub async fn delete(&self, short_code: &str) -> Result<(), AppError> {
        ensure_short_code(short_code)?;

        self.repository.delete(short_code).await?;

        info!("Short URL deleted");
        self.notifier.notify(UrlEvent::deleted(short_code));

        Ok(())
    }

    /// Reports whether the underlying store is reachable.
    pub async fn store_healthy(&self) -> bool {
        self.repository.health_check().await
    }
}

fn ensure_short_code(short_code: &str) -> Result<(), AppError> {
    if short_code.is_empty() {
        return Err(AppError::bad_request(
            "short_code is required",
            json!({ "field": "short_code" }),
        ));
    }
    Ok(())
}

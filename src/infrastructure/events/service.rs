//! Event publisher trait and error types.

use crate::domain::url_event::UrlEvent;
use async_trait::async_trait;
use std::time::Duration;

/// Errors that can occur while handing events to the transport.
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("Event transport connection error: {0}")]
    Connection(String),

    #[error("Event transport write error: {0}")]
    Write(String),

    #[error("Event not acknowledged: {0}")]
    NotAcknowledged(String),

    #[error("Event transport write timed out after {0:?}")]
    Timeout(Duration),
}

/// Result type for publish operations.
pub type PublishResult<T> = Result<T, PublishError>;

/// Capability interface over a message transport.
///
/// Topic selection, batching limits, acknowledgement level and retries are
/// transport configuration and live in the implementation. Callers never see
/// publish errors on the request path: the background event worker logs them
/// and moves on.
///
/// # Implementations
///
/// - [`crate::infrastructure::events::RedisStreamPublisher`] - Redis Streams transport
/// - [`crate::infrastructure::events::NullPublisher`] - Drops events (notifications disabled)
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publishes a single event.
    async fn publish(&self, event: &UrlEvent) -> PublishResult<()>;

    /// Publishes a batch of events.
    ///
    /// The default implementation publishes sequentially and stops at the first error.
    async fn publish_batch(&self, events: &[UrlEvent]) -> PublishResult<()> {
        for event in events {
            self.publish(event).await?;
        }
        Ok(())
    }

    /// Checks if the transport is reachable.
    async fn health_check(&self) -> bool;
}

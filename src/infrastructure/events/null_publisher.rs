//! No-op publisher for disabled notifications.

use super::service::{EventPublisher, PublishResult};
use crate::domain::url_event::UrlEvent;
use async_trait::async_trait;
use tracing::debug;

/// A publisher that accepts and discards every event.
///
/// Used when `EVENTS_ENABLED=false` or when the event transport is unreachable
/// at startup. The service keeps working; downstream consumers simply receive
/// nothing.
pub struct NullPublisher;

impl NullPublisher {
    /// Creates a new NullPublisher instance.
    pub fn new() -> Self {
        debug!("Using NullPublisher (event notifications disabled)");
        Self
    }
}

impl Default for NullPublisher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventPublisher for NullPublisher {
    async fn publish(&self, event: &UrlEvent) -> PublishResult<()> {
        debug!(
            event = event.key(),
            short_code = event.short_code(),
            "Event discarded"
        );
        Ok(())
    }

    async fn health_check(&self) -> bool {
        true
    }
}

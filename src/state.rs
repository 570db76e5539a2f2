//! Shared application state injected into every handler.

use std::sync::Arc;

use crate::application::services::UrlService;
use crate::domain::event_worker::EventNotifier;
use crate::infrastructure::events::EventPublisher;

#[derive(Clone)]
pub struct AppState {
    pub url_service: Arc<UrlService>,
    /// Transport behind the event worker; only consulted by health checks.
    pub publisher: Arc<dyn EventPublisher>,
    pub event_notifier: EventNotifier,
}

impl AppState {
    pub fn new(
        url_service: Arc<UrlService>,
        publisher: Arc<dyn EventPublisher>,
        event_notifier: EventNotifier,
    ) -> Self {
        Self {
            url_service,
            publisher,
            event_notifier,
        }
    }
}

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::TimeDelta;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use shortener_service::application::services::UrlService;
use shortener_service::domain::entities::UrlRecord;
use shortener_service::domain::event_worker::EventNotifier;
use shortener_service::domain::repositories::{StoreError, UrlRepository};
use shortener_service::domain::url_event::UrlEvent;
use shortener_service::infrastructure::events::{EventPublisher, PublishError, PublishResult};
use shortener_service::infrastructure::persistence::MemoryUrlRepository;
use shortener_service::state::AppState;

/// Publisher that records what it was given and can be switched to fail.
#[derive(Default)]
pub struct RecordingPublisher {
    pub events: Mutex<Vec<UrlEvent>>,
    pub failing: AtomicBool,
}

impl RecordingPublisher {
    pub fn failing() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            failing: AtomicBool::new(true),
        }
    }

    pub fn published(&self) -> Vec<UrlEvent> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl EventPublisher for RecordingPublisher {
    async fn publish(&self, event: &UrlEvent) -> PublishResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(PublishError::Connection("transport down".to_string()));
        }
        self.events.lock().unwrap().push(event.clone());
        Ok(())
    }

    async fn health_check(&self) -> bool {
        !self.failing.load(Ordering::SeqCst)
    }
}

/// Store whose every call fails as if the backend connection were closed.
pub struct UnavailableRepository;

#[async_trait]
impl UrlRepository for UnavailableRepository {
    async fn save(&self, _record: &UrlRecord, _ttl: TimeDelta) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("connection closed".to_string()))
    }

    async fn get(&self, _short_code: &str) -> Result<UrlRecord, StoreError> {
        Err(StoreError::Unavailable("connection closed".to_string()))
    }

    async fn delete(&self, _short_code: &str) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("connection closed".to_string()))
    }

    async fn health_check(&self) -> bool {
        false
    }
}

/// Builds state over the given store; events stay in the returned receiver.
pub fn create_state_with(
    repository: Arc<dyn UrlRepository>,
    publisher: Arc<dyn EventPublisher>,
) -> (AppState, mpsc::Receiver<UrlEvent>) {
    let (notifier, rx) = EventNotifier::channel(100);
    let url_service = Arc::new(UrlService::new(repository, notifier.clone()));
    (AppState::new(url_service, publisher, notifier), rx)
}

/// In-memory store with a healthy recording publisher.
pub fn create_test_state() -> (AppState, mpsc::Receiver<UrlEvent>) {
    create_state_with(
        Arc::new(MemoryUrlRepository::new()),
        Arc::new(RecordingPublisher::default()),
    )
}

/// Collects every event currently buffered in the queue.
pub fn drain_events(rx: &mut mpsc::Receiver<UrlEvent>) -> Vec<UrlEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

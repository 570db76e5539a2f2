//! # Shortener Service
//!
//! A URL shortening service that stores expiring short-code records in Redis
//! and announces every creation and deletion on an event stream.
//!
//! ## Architecture
//!
//! This crate follows Clean Architecture principles with clear layer separation:
//!
//! - **Domain Layer** ([`domain`]) - URL record, events, store trait and event worker
//! - **Application Layer** ([`application`]) - The orchestrating [`UrlService`](application::services::UrlService)
//! - **Infrastructure Layer** ([`infrastructure`]) - Redis store, in-memory store and event transports
//! - **API Layer** ([`api`]) - REST API handlers, DTOs and middleware
//!
//! ## Features
//!
//! - 8-character hex codes derived from SHA-256 of the URL and a random salt
//! - Per-record time-to-live
//! - Fire-and-forget `url_created` / `url_deleted` events on a Redis Stream
//! - Bounded event queue with concurrency-limited, time-boxed publishing
//!
//! ## Quick Start
//!
//! ```bash
//! export REDIS_URL="redis://localhost:6379/0"
//! cargo run
//!
//! curl -X POST localhost:8080/api/urls \
//!      -H 'content-type: application/json' \
//!      -d '{"original_url": "https://example.com", "ttl_seconds": 3600}'
//! ```
//!
//! ## Configuration
//!
//! Service configuration is loaded from environment variables via [`config::Config`].
//! See [`config`] module for available options.

pub mod api;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod state;
pub mod utils;

pub mod config;
pub mod server;

pub mod routes;

pub use error::AppError;
pub use state::AppState;

/// Commonly used types for external consumers.
///
/// Re-exports frequently used types to simplify imports for library users
/// and integration tests.
pub mod prelude {
    pub use crate::application::services::UrlService;
    pub use crate::domain::entities::UrlRecord;
    pub use crate::domain::event_worker::{EventNotifier, EventWorkerConfig};
    pub use crate::domain::repositories::{StoreError, UrlRepository};
    pub use crate::domain::url_event::UrlEvent;
    pub use crate::error::AppError;
    pub use crate::infrastructure::events::{EventPublisher, PublishError, PublishResult};
    pub use crate::state::AppState;
}

//! Domain layer containing business entities and logic.
//!
//! Defines the URL record, the events emitted when records change, the store
//! capability the orchestrator depends on, and the bounded notification worker.
//!
//! # Architecture
//!
//! - [`entities`] - Core business data structures
//! - [`repositories`] - Record store trait and its error taxonomy
//! - [`url_event`] - Created/deleted event model and payload encoding
//! - [`event_worker`] - Bounded, detached event dispatch
//!
//! # Event Flow
//!
//! 1. [`crate::application::services::UrlService`] persists a change
//! 2. [`url_event::UrlEvent`] is handed to [`event_worker::EventNotifier`] without waiting
//! 3. [`event_worker::run_event_worker`] publishes batches with bounded concurrency
//! 4. Failures are logged and counted, never returned to the caller

pub mod entities;
pub mod event_worker;
pub mod repositories;
pub mod url_event;

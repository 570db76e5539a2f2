//! Infrastructure layer for external integrations.
//!
//! This layer implements interfaces defined by the domain layer, providing
//! concrete store and event transport bindings.
//!
//! # Modules
//!
//! - [`events`] - Event publishing (Redis Streams and no-op implementations)
//! - [`persistence`] - URL record storage (Redis and in-memory implementations)

pub mod events;
pub mod persistence;

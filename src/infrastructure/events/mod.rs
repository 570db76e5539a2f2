//! Event transport for created/deleted notifications.
//!
//! Provides an [`EventPublisher`] trait with two implementations:
//! - [`RedisStreamPublisher`] - Production transport appending to a Redis Stream
//! - [`NullPublisher`] - No-op implementation for disabled notifications

mod null_publisher;
mod redis_stream;
mod service;

pub use null_publisher::NullPublisher;
pub use redis_stream::{RedisStreamPublisher, RequiredAcks, StreamPublisherConfig};
pub use service::{EventPublisher, PublishError, PublishResult};

#[cfg(test)]
pub use service::MockEventPublisher;

//! URL repository implementations.
//!
//! Concrete implementations of [`crate::domain::repositories::UrlRepository`].
//!
//! # Repositories
//!
//! - [`RedisUrlRepository`] - Redis `SET`/`GET`/`DEL` with per-key expiry
//! - [`MemoryUrlRepository`] - Process-local map with lazy expiry

pub mod memory_url_repository;
pub mod redis_url_repository;

pub use memory_url_repository::MemoryUrlRepository;
pub use redis_url_repository::RedisUrlRepository;

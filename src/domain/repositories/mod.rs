//! Repository trait definitions for the domain layer.
//!
//! Repository traits abstract data access so the orchestration layer does not
//! depend on a concrete store client.
//!
//! # Architecture
//!
//! - Traits define the contract for data operations
//! - Implementations live in `crate::infrastructure::persistence`
//! - Mock implementations are auto-generated via `mockall` for testing
//!
//! # Available Repositories
//!
//! - [`UrlRepository`] - Expiring short code to URL records

pub mod url_repository;

pub use url_repository::{StoreError, UrlRepository, ensure_key};

#[cfg(test)]
pub use url_repository::MockUrlRepository;

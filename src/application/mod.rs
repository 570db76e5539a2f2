//! Application layer services implementing business logic.
//!
//! Services coordinate repository calls, validation and side effects, and
//! give HTTP handlers and the admin CLI a single entry point.
//!
//! # Available Services
//!
//! - [`services::url_service::UrlService`] - Short URL save, lookup and delete

pub mod services;

//! Core domain entities representing the business data model.
//!
//! The service has a single persisted entity, [`UrlRecord`]. Expiry is not part
//! of the entity: it is supplied per save and enforced by the store.

pub mod url_record;

pub use url_record::UrlRecord;

//! Satchel Document Store Library
//!
//! This crate provides the document store abstraction used by the upload service:
//! records, their attachments, and the transaction that makes a record and all of its
//! attachments visible together or not at all.
//!
//! Backends:
//!
//! - **postgres** (default): `upload_records` and `attachments` tables, see `migrations/`.
//! - **memory**: process-local store for development and tests.

pub mod error;
pub mod factory;
#[cfg(feature = "memory")]
pub mod memory;
#[cfg(feature = "postgres")]
pub mod postgres;
pub mod traits;
pub mod transaction;

// Re-export commonly used types
pub use error::{DbError, DbResult};
pub use factory::create_document_store;
#[cfg(feature = "memory")]
pub use memory::MemoryDocumentStore;
#[cfg(feature = "postgres")]
pub use postgres::PgDocumentStore;
pub use traits::{AttachmentSelector, DocumentStore, RecordFilter, StoreTransaction};
pub use transaction::{rollback_preserving, with_transaction};

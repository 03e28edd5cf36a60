//! Document store abstraction
//!
//! A [`DocumentStore`] hands out [`StoreTransaction`]s. Everything written through a
//! transaction stays invisible to other transactions until `commit` succeeds.

use async_trait::async_trait;
use bytes::Bytes;
use satchel_core::{Attachment, NewAttachment, UploadRecord};
use std::path::Path;
use uuid::Uuid;

use crate::error::DbResult;

/// Record search filter. Unset fields match everything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecordFilter {
    pub id: Option<Uuid>,
    pub owner: Option<Uuid>,
}

impl RecordFilter {
    pub fn by_id(id: Uuid) -> Self {
        Self {
            id: Some(id),
            owner: None,
        }
    }

    pub fn by_owner(owner: Uuid) -> Self {
        Self {
            id: None,
            owner: Some(owner),
        }
    }
}

/// Which attachments of a record to return. Results are ordered by creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentSelector {
    All,
    Id(Uuid),
    /// Earliest-created attachment only
    First,
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Open a new unit of work.
    async fn begin(&self) -> DbResult<Box<dyn StoreTransaction>>;

    /// Cheap connectivity check for health endpoints.
    async fn ping(&self) -> DbResult<()>;

    fn backend_name(&self) -> &'static str;
}

/// One unit of work against the store.
///
/// `commit` and `rollback` end the transaction; any later call fails with
/// [`DbError::TransactionClosed`](crate::DbError::TransactionClosed). The one exception
/// is `rollback` after a failed `commit`, which is accepted so callers can always
/// compensate.
#[async_trait]
pub trait StoreTransaction: Send {
    async fn create_record(
        &mut self,
        record_type: &str,
        owner: Option<Uuid>,
    ) -> DbResult<UploadRecord>;

    /// Store the file at `path` as a new attachment of `record`.
    async fn create_attachment(
        &mut self,
        record: &UploadRecord,
        path: &Path,
        meta: NewAttachment,
    ) -> DbResult<Attachment>;

    async fn search_records(
        &mut self,
        record_type: &str,
        filter: RecordFilter,
    ) -> DbResult<Vec<UploadRecord>>;

    async fn search_attachments(
        &mut self,
        record: &UploadRecord,
        selector: AttachmentSelector,
    ) -> DbResult<Vec<Attachment>>;

    /// Raw bytes of an attachment.
    async fn load_body(&mut self, attachment: &Attachment) -> DbResult<Bytes>;

    async fn commit(&mut self) -> DbResult<()>;

    async fn rollback(&mut self) -> DbResult<()>;
}

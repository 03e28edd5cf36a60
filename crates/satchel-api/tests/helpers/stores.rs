//! Store wrappers that inject failures.

use async_trait::async_trait;
use bytes::Bytes;
use satchel_core::{Attachment, NewAttachment, UploadRecord};
use satchel_db::{
    AttachmentSelector, DbError, DbResult, DocumentStore, MemoryDocumentStore, RecordFilter,
    StoreTransaction,
};
use std::path::Path;
use uuid::Uuid;

/// Memory store whose transactions reject their n-th attachment (1-based).
pub struct FailingAttachmentStore {
    pub inner: MemoryDocumentStore,
    pub fail_on: usize,
}

struct FailingTransaction {
    inner: Box<dyn StoreTransaction>,
    fail_on: usize,
    created: usize,
}

#[async_trait]
impl DocumentStore for FailingAttachmentStore {
    async fn begin(&self) -> DbResult<Box<dyn StoreTransaction>> {
        Ok(Box::new(FailingTransaction {
            inner: self.inner.begin().await?,
            fail_on: self.fail_on,
            created: 0,
        }))
    }

    async fn ping(&self) -> DbResult<()> {
        self.inner.ping().await
    }

    fn backend_name(&self) -> &'static str {
        "failing"
    }
}

#[async_trait]
impl StoreTransaction for FailingTransaction {
    async fn create_record(
        &mut self,
        record_type: &str,
        owner: Option<Uuid>,
    ) -> DbResult<UploadRecord> {
        self.inner.create_record(record_type, owner).await
    }

    async fn create_attachment(
        &mut self,
        record: &UploadRecord,
        path: &Path,
        meta: NewAttachment,
    ) -> DbResult<Attachment> {
        self.created += 1;
        if self.created == self.fail_on {
            return Err(DbError::Config("attachment storage offline".to_string()));
        }
        self.inner.create_attachment(record, path, meta).await
    }

    async fn search_records(
        &mut self,
        record_type: &str,
        filter: RecordFilter,
    ) -> DbResult<Vec<UploadRecord>> {
        self.inner.search_records(record_type, filter).await
    }

    async fn search_attachments(
        &mut self,
        record: &UploadRecord,
        selector: AttachmentSelector,
    ) -> DbResult<Vec<Attachment>> {
        self.inner.search_attachments(record, selector).await
    }

    async fn load_body(&mut self, attachment: &Attachment) -> DbResult<Bytes> {
        self.inner.load_body(attachment).await
    }

    async fn commit(&mut self) -> DbResult<()> {
        self.inner.commit().await
    }

    async fn rollback(&mut self) -> DbResult<()> {
        self.inner.rollback().await
    }
}

use async_trait::async_trait;
use bytes::Bytes;
use satchel_core::{AppError, Attachment, NewAttachment, UploadRecord};
use satchel_db::{
    with_transaction, AttachmentSelector, DbError, DbResult, DocumentStore, MemoryDocumentStore,
    RecordFilter, StoreTransaction,
};
use std::path::Path;
use uuid::Uuid;

/// Memory store whose transactions refuse to roll back.
struct StubbornStore {
    inner: MemoryDocumentStore,
}

struct StubbornTransaction {
    inner: Box<dyn StoreTransaction>,
}

#[async_trait]
impl DocumentStore for StubbornStore {
    async fn begin(&self) -> DbResult<Box<dyn StoreTransaction>> {
        Ok(Box::new(StubbornTransaction {
            inner: self.inner.begin().await?,
        }))
    }

    async fn ping(&self) -> DbResult<()> {
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "stubborn"
    }
}

#[async_trait]
impl StoreTransaction for StubbornTransaction {
    async fn create_record(&mut self, record_type: &str, owner: Option<Uuid>) -> DbResult<UploadRecord> {
        self.inner.create_record(record_type, owner).await
    }

    async fn create_attachment(
        &mut self,
        record: &UploadRecord,
        path: &Path,
        meta: NewAttachment,
    ) -> DbResult<Attachment> {
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
        Err(DbError::Config("rollback unavailable".to_string()))
    }
}

#[tokio::test]
async fn test_with_transaction_commits_on_success() {
    let store = MemoryDocumentStore::new();

    let id = with_transaction(&store, |tx| {
        Box::pin(async move {
            let record = tx.create_record("Upload", None).await?;
            Ok(record.id)
        })
    })
    .await
    .unwrap();

    assert_eq!(store.record_count().await, 1);

    let found = with_transaction(&store, move |tx| {
        Box::pin(async move { Ok(tx.search_records("Upload", RecordFilter::by_id(id)).await?) })
    })
    .await
    .unwrap();
    assert_eq!(found.len(), 1);
}

#[tokio::test]
async fn test_with_transaction_rolls_back_and_returns_cause() {
    let store = MemoryDocumentStore::new();

    let result: Result<(), AppError> = with_transaction(&store, |tx| {
        Box::pin(async move {
            tx.create_record("Upload", None).await?;
            Err(AppError::Validation("boom".to_string()))
        })
    })
    .await;

    assert!(matches!(result, Err(AppError::Validation(msg)) if msg == "boom"));
    assert_eq!(store.record_count().await, 0);
}

#[tokio::test]
async fn test_failed_rollback_keeps_original_error() {
    let store = StubbornStore {
        inner: MemoryDocumentStore::new(),
    };

    let result: Result<(), AppError> = with_transaction(&store, |tx| {
        Box::pin(async move {
            tx.create_record("Upload", None).await?;
            Err(AppError::Persistence("disk full".to_string()))
        })
    })
    .await;

    assert!(matches!(result, Err(AppError::Persistence(msg)) if msg == "disk full"));
    assert_eq!(store.inner.record_count().await, 0);
}

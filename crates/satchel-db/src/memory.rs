use crate::error::{DbError, DbResult};
use crate::traits::{AttachmentSelector, DocumentStore, RecordFilter, StoreTransaction};
use async_trait::async_trait;
use bytes::Bytes;
use satchel_core::{Attachment, NewAttachment, UploadRecord};
use std::path::Path;
use std::sync::Arc;
use tokio::fs;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
struct MemoryState {
    records: Vec<UploadRecord>,
    attachments: Vec<(Attachment, Bytes)>,
}

/// Process-local document store
///
/// Writes are staged per transaction and applied on commit. Transactions read their
/// own staged writes plus everything committed.
#[derive(Clone, Default)]
pub struct MemoryDocumentStore {
    state: Arc<RwLock<MemoryState>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of committed records.
    pub async fn record_count(&self) -> usize {
        self.state.read().await.records.len()
    }

    /// Number of committed attachments.
    pub async fn attachment_count(&self) -> usize {
        self.state.read().await.attachments.len()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn begin(&self) -> DbResult<Box<dyn StoreTransaction>> {
        Ok(Box::new(MemoryTransaction {
            state: self.state.clone(),
            staged: MemoryState::default(),
            status: TxStatus::Open,
        }))
    }

    async fn ping(&self) -> DbResult<()> {
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TxStatus {
    Open,
    Committed,
    RolledBack,
}

struct MemoryTransaction {
    state: Arc<RwLock<MemoryState>>,
    staged: MemoryState,
    status: TxStatus,
}

impl MemoryTransaction {
    fn ensure_open(&self) -> DbResult<()> {
        match self.status {
            TxStatus::Open => Ok(()),
            TxStatus::Committed => Err(DbError::TransactionClosed("committed")),
            TxStatus::RolledBack => Err(DbError::TransactionClosed("rolled back")),
        }
    }
}

fn record_matches(record: &UploadRecord, record_type: &str, filter: RecordFilter) -> bool {
    record.record_type == record_type
        && filter.id.map_or(true, |id| record.id == id)
        && filter.owner.map_or(true, |owner| record.owner == Some(owner))
}

#[async_trait]
impl StoreTransaction for MemoryTransaction {
    async fn create_record(
        &mut self,
        record_type: &str,
        owner: Option<Uuid>,
    ) -> DbResult<UploadRecord> {
        self.ensure_open()?;
        let record = UploadRecord::new(record_type, owner);
        self.staged.records.push(record.clone());
        Ok(record)
    }

    async fn create_attachment(
        &mut self,
        record: &UploadRecord,
        path: &Path,
        meta: NewAttachment,
    ) -> DbResult<Attachment> {
        self.ensure_open()?;

        let known = self.staged.records.iter().any(|r| r.id == record.id)
            || self.state.read().await.records.iter().any(|r| r.id == record.id);
        if !known {
            return Err(DbError::MissingRecord(record.id));
        }

        let body = Bytes::from(fs::read(path).await?);
        let attachment = meta.into_attachment(record.id);
        self.staged.attachments.push((attachment.clone(), body));
        Ok(attachment)
    }

    async fn search_records(
        &mut self,
        record_type: &str,
        filter: RecordFilter,
    ) -> DbResult<Vec<UploadRecord>> {
        self.ensure_open()?;
        let state = self.state.read().await;
        let mut records: Vec<UploadRecord> = state
            .records
            .iter()
            .chain(self.staged.records.iter())
            .filter(|r| record_matches(r, record_type, filter))
            .cloned()
            .collect();
        records.sort_by_key(|r| r.created_at);
        Ok(records)
    }

    async fn search_attachments(
        &mut self,
        record: &UploadRecord,
        selector: AttachmentSelector,
    ) -> DbResult<Vec<Attachment>> {
        self.ensure_open()?;
        let state = self.state.read().await;
        let mut attachments: Vec<Attachment> = state
            .attachments
            .iter()
            .chain(self.staged.attachments.iter())
            .map(|(a, _)| a)
            .filter(|a| a.record_id == record.id)
            .filter(|a| match selector {
                AttachmentSelector::Id(id) => a.id == id,
                AttachmentSelector::All | AttachmentSelector::First => true,
            })
            .cloned()
            .collect();
        attachments.sort_by_key(|a| a.created_at);
        if selector == AttachmentSelector::First {
            attachments.truncate(1);
        }
        Ok(attachments)
    }

    async fn load_body(&mut self, attachment: &Attachment) -> DbResult<Bytes> {
        self.ensure_open()?;
        let state = self.state.read().await;
        state
            .attachments
            .iter()
            .chain(self.staged.attachments.iter())
            .find(|(a, _)| a.id == attachment.id)
            .map(|(_, body)| body.clone())
            .ok_or(DbError::MissingAttachment(attachment.id))
    }

    async fn commit(&mut self) -> DbResult<()> {
        self.ensure_open()?;
        let staged = std::mem::take(&mut self.staged);
        let mut state = self.state.write().await;
        state.records.extend(staged.records);
        state.attachments.extend(staged.attachments);
        self.status = TxStatus::Committed;
        Ok(())
    }

    async fn rollback(&mut self) -> DbResult<()> {
        self.ensure_open()?;
        self.staged = MemoryState::default();
        self.status = TxStatus::RolledBack;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn temp_file(contents: &[u8]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents).unwrap();
        file
    }

    #[tokio::test]
    async fn test_commit_makes_writes_visible() {
        let store = MemoryDocumentStore::new();
        let file = temp_file(b"hello");

        let mut tx = store.begin().await.unwrap();
        let record = tx.create_record("Upload", None).await.unwrap();
        tx.create_attachment(&record, file.path(), NewAttachment::new("a.txt", None))
            .await
            .unwrap();

        assert_eq!(store.record_count().await, 0);
        tx.commit().await.unwrap();
        assert_eq!(store.record_count().await, 1);
        assert_eq!(store.attachment_count().await, 1);
    }

    #[tokio::test]
    async fn test_rollback_discards_writes() {
        let store = MemoryDocumentStore::new();
        let file = temp_file(b"hello");

        let mut tx = store.begin().await.unwrap();
        let record = tx.create_record("Upload", None).await.unwrap();
        tx.create_attachment(&record, file.path(), NewAttachment::new("a.txt", None))
            .await
            .unwrap();
        tx.rollback().await.unwrap();

        assert_eq!(store.record_count().await, 0);
        assert_eq!(store.attachment_count().await, 0);
    }

    #[tokio::test]
    async fn test_operations_after_commit_are_rejected() {
        let store = MemoryDocumentStore::new();
        let mut tx = store.begin().await.unwrap();
        tx.commit().await.unwrap();

        assert!(matches!(
            tx.commit().await,
            Err(DbError::TransactionClosed("committed"))
        ));
        assert!(tx.rollback().await.is_err());
        assert!(tx.create_record("Upload", None).await.is_err());
    }

    #[tokio::test]
    async fn test_attachment_requires_known_record() {
        let store = MemoryDocumentStore::new();
        let file = temp_file(b"x");
        let mut tx = store.begin().await.unwrap();
        let stranger = UploadRecord::new("Upload", None);

        let result = tx
            .create_attachment(&stranger, file.path(), NewAttachment::new("x", None))
            .await;
        assert!(matches!(result, Err(DbError::MissingRecord(id)) if id == stranger.id));
    }

    #[tokio::test]
    async fn test_search_filters_and_first_attachment() {
        let store = MemoryDocumentStore::new();
        let owner = Uuid::new_v4();
        let first = temp_file(b"first");
        let second = temp_file(b"second");

        let mut tx = store.begin().await.unwrap();
        let mine = tx.create_record("Upload", Some(owner)).await.unwrap();
        tx.create_record("Upload", None).await.unwrap();
        tx.create_record("Avatar", Some(owner)).await.unwrap();
        tx.create_attachment(&mine, first.path(), NewAttachment::new("1", None))
            .await
            .unwrap();
        tx.create_attachment(&mine, second.path(), NewAttachment::new("2", None))
            .await
            .unwrap();
        tx.commit().await.unwrap();

        let mut tx = store.begin().await.unwrap();
        let owned = tx
            .search_records("Upload", RecordFilter::by_owner(owner))
            .await
            .unwrap();
        assert_eq!(owned, vec![mine.clone()]);

        let all = tx
            .search_attachments(&mine, AttachmentSelector::All)
            .await
            .unwrap();
        assert_eq!(all.len(), 2);

        let head = tx
            .search_attachments(&mine, AttachmentSelector::First)
            .await
            .unwrap();
        assert_eq!(head.len(), 1);
        assert_eq!(head[0].name, "1");
        assert_eq!(tx.load_body(&head[0]).await.unwrap(), Bytes::from_static(b"first"));

        let by_id = tx
            .search_attachments(&mine, AttachmentSelector::Id(all[1].id))
            .await
            .unwrap();
        assert_eq!(by_id[0].name, "2");
        tx.commit().await.unwrap();
    }
}

use crate::error::{DbError, DbResult};
use crate::traits::{AttachmentSelector, DocumentStore, RecordFilter, StoreTransaction};
use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use satchel_core::{Attachment, NewAttachment, UploadRecord};
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres, Transaction};
use std::path::Path;
use std::time::Duration;
use tokio::fs;
use uuid::Uuid;

const RECORD_COLUMNS: &str = "id, record_type, created_at, owner";
const ATTACHMENT_COLUMNS: &str = "id, record_id, created_at, name, content_type, info, original";

/// PostgreSQL document store
///
/// Records live in `upload_records`, attachments (metadata and body) in `attachments`.
#[derive(Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect a pool and apply pending migrations.
    pub async fn connect(
        database_url: &str,
        max_connections: u32,
        timeout_seconds: u64,
    ) -> DbResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(timeout_seconds))
            .connect(database_url)
            .await?;

        sqlx::migrate!("../../migrations").run(&pool).await?;
        tracing::info!(max_connections, "Connected to PostgreSQL document store");

        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn begin(&self) -> DbResult<Box<dyn StoreTransaction>> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgStoreTransaction {
            tx: Some(tx),
            status: TxStatus::Open,
        }))
    }

    async fn ping(&self) -> DbResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TxStatus {
    Open,
    Committed,
    /// The server already discarded the work; only rollback is still accepted.
    CommitFailed,
    RolledBack,
}

struct PgStoreTransaction {
    tx: Option<Transaction<'static, Postgres>>,
    status: TxStatus,
}

impl PgStoreTransaction {
    fn conn(&mut self) -> DbResult<&mut Transaction<'static, Postgres>> {
        match self.status {
            TxStatus::Open => self
                .tx
                .as_mut()
                .ok_or(DbError::TransactionClosed("finished")),
            TxStatus::Committed => Err(DbError::TransactionClosed("committed")),
            TxStatus::CommitFailed => Err(DbError::TransactionClosed("aborted by a failed commit")),
            TxStatus::RolledBack => Err(DbError::TransactionClosed("rolled back")),
        }
    }
}

#[async_trait]
impl StoreTransaction for PgStoreTransaction {
    async fn create_record(
        &mut self,
        record_type: &str,
        owner: Option<Uuid>,
    ) -> DbResult<UploadRecord> {
        let conn = self.conn()?;
        let record = sqlx::query_as::<_, UploadRecord>(&format!(
            "INSERT INTO upload_records (id, record_type, owner, created_at) \
             VALUES ($1, $2, $3, $4) RETURNING {RECORD_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(record_type)
        .bind(owner)
        .bind(Utc::now())
        .fetch_one(&mut **conn)
        .await?;

        Ok(record)
    }

    async fn create_attachment(
        &mut self,
        record: &UploadRecord,
        path: &Path,
        meta: NewAttachment,
    ) -> DbResult<Attachment> {
        let body = fs::read(path).await?;
        let conn = self.conn()?;
        let attachment = sqlx::query_as::<_, Attachment>(&format!(
            "INSERT INTO attachments \
             (id, record_id, name, content_type, info, original, body, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING {ATTACHMENT_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(record.id)
        .bind(&meta.name)
        .bind(&meta.content_type)
        .bind(&meta.info)
        .bind(&meta.original)
        .bind(body)
        .bind(Utc::now())
        .fetch_one(&mut **conn)
        .await?;

        Ok(attachment)
    }

    async fn search_records(
        &mut self,
        record_type: &str,
        filter: RecordFilter,
    ) -> DbResult<Vec<UploadRecord>> {
        let conn = self.conn()?;
        let records = sqlx::query_as::<_, UploadRecord>(&format!(
            "SELECT {RECORD_COLUMNS} FROM upload_records \
             WHERE record_type = $1 \
               AND ($2::uuid IS NULL OR id = $2) \
               AND ($3::uuid IS NULL OR owner = $3) \
             ORDER BY created_at"
        ))
        .bind(record_type)
        .bind(filter.id)
        .bind(filter.owner)
        .fetch_all(&mut **conn)
        .await?;

        Ok(records)
    }

    async fn search_attachments(
        &mut self,
        record: &UploadRecord,
        selector: AttachmentSelector,
    ) -> DbResult<Vec<Attachment>> {
        let (id, limit): (Option<Uuid>, Option<i64>) = match selector {
            AttachmentSelector::All => (None, None),
            AttachmentSelector::Id(id) => (Some(id), None),
            AttachmentSelector::First => (None, Some(1)),
        };

        let conn = self.conn()?;
        let attachments = sqlx::query_as::<_, Attachment>(&format!(
            "SELECT {ATTACHMENT_COLUMNS} FROM attachments \
             WHERE record_id = $1 AND ($2::uuid IS NULL OR id = $2) \
             ORDER BY created_at, id \
             LIMIT $3"
        ))
        .bind(record.id)
        .bind(id)
        .bind(limit)
        .fetch_all(&mut **conn)
        .await?;

        Ok(attachments)
    }

    async fn load_body(&mut self, attachment: &Attachment) -> DbResult<Bytes> {
        let conn = self.conn()?;
        let body: Option<Vec<u8>> =
            sqlx::query_scalar("SELECT body FROM attachments WHERE id = $1")
                .bind(attachment.id)
                .fetch_optional(&mut **conn)
                .await?;

        body.map(Bytes::from)
            .ok_or(DbError::MissingAttachment(attachment.id))
    }

    async fn commit(&mut self) -> DbResult<()> {
        self.conn()?;
        let tx = self
            .tx
            .take()
            .ok_or(DbError::TransactionClosed("finished"))?;

        match tx.commit().await {
            Ok(()) => {
                self.status = TxStatus::Committed;
                Ok(())
            }
            Err(e) => {
                self.status = TxStatus::CommitFailed;
                Err(e.into())
            }
        }
    }

    async fn rollback(&mut self) -> DbResult<()> {
        match self.status {
            TxStatus::CommitFailed => {
                self.status = TxStatus::RolledBack;
                Ok(())
            }
            _ => {
                self.conn()?;
                let tx = self
                    .tx
                    .take()
                    .ok_or(DbError::TransactionClosed("finished"))?;
                self.status = TxStatus::RolledBack;
                tx.rollback().await?;
                Ok(())
            }
        }
    }
}

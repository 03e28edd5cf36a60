use satchel_core::AppError;
use thiserror::Error;

/// Document store operation errors
#[derive(Debug, Error)]
pub enum DbError {
    #[error("Database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("Migration failed: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("Failed to read attachment file: {0}")]
    Io(#[from] std::io::Error),

    /// A commit or rollback already ended this transaction.
    #[error("Transaction already {0}")]
    TransactionClosed(&'static str),

    #[error("Record {0} does not exist")]
    MissingRecord(uuid::Uuid),

    #[error("Attachment {0} does not exist")]
    MissingAttachment(uuid::Uuid),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for store operations
pub type DbResult<T> = Result<T, DbError>;

impl From<DbError> for AppError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Sqlx(e) => AppError::Database(e),
            DbError::MissingAttachment(id) => {
                AppError::Integrity(format!("Attachment {} has no stored body", id))
            }
            other => AppError::Persistence(other.to_string()),
        }
    }
}

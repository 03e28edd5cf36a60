//! Document store factory

use std::sync::Arc;

use satchel_core::{Config, StoreBackend};

use crate::error::{DbError, DbResult};
use crate::traits::DocumentStore;

/// Create the document store selected by `config.store_backend`.
pub async fn create_document_store(config: &Config) -> DbResult<Arc<dyn DocumentStore>> {
    match config.store_backend {
        StoreBackend::Postgres => create_postgres(config).await,
        StoreBackend::Memory => create_memory(),
    }
}

#[cfg(feature = "postgres")]
async fn create_postgres(config: &Config) -> DbResult<Arc<dyn DocumentStore>> {
    let url = config
        .database_url
        .as_deref()
        .ok_or_else(|| DbError::Config("DATABASE_URL is required for the postgres store".into()))?;

    let store = crate::postgres::PgDocumentStore::connect(
        url,
        config.db_max_connections,
        config.db_timeout_seconds,
    )
    .await?;
    Ok(Arc::new(store))
}

#[cfg(not(feature = "postgres"))]
async fn create_postgres(_config: &Config) -> DbResult<Arc<dyn DocumentStore>> {
    Err(DbError::Config(
        "satchel-db was built without the postgres feature".into(),
    ))
}

#[cfg(feature = "memory")]
fn create_memory() -> DbResult<Arc<dyn DocumentStore>> {
    tracing::warn!("Using in-memory document store; uploads are lost on restart");
    Ok(Arc::new(crate::memory::MemoryDocumentStore::new()))
}

#[cfg(not(feature = "memory"))]
fn create_memory() -> DbResult<Arc<dyn DocumentStore>> {
    Err(DbError::Config(
        "satchel-db was built without the memory feature".into(),
    ))
}

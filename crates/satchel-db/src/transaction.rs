//! Transaction utilities
//!
//! Helpers that pair every unit of work with its compensation: commit on success,
//! roll back on failure, and always hand the caller the error that caused the rollback.

use satchel_core::AppError;
use std::future::Future;
use std::pin::Pin;

use crate::traits::{DocumentStore, StoreTransaction};

/// Roll `tx` back because of `cause` and return `cause`.
///
/// A failing rollback is logged and otherwise ignored; it never replaces `cause`.
pub async fn rollback_preserving(tx: &mut dyn StoreTransaction, cause: AppError) -> AppError {
    tracing::warn!(error = %cause, "Rolling back transaction");

    if let Err(rollback_err) = tx.rollback().await {
        let rollback_err = AppError::Rollback(rollback_err.to_string());
        tracing::error!(
            error = %rollback_err,
            original_error = %cause,
            "Failed to rollback transaction"
        );
    }

    cause
}

/// Execute a closure within a store transaction
///
/// Begins a transaction, runs `f` with it, and commits if `f` succeeds. If `f` or the
/// commit fails the transaction is rolled back and the failure is returned.
///
/// The returned future may only borrow the transaction; move owned copies of anything
/// else it needs into it.
pub async fn with_transaction<T, F>(store: &dyn DocumentStore, f: F) -> Result<T, AppError>
where
    T: Send,
    F: for<'a> FnOnce(
        &'a mut Box<dyn StoreTransaction>,
    ) -> Pin<Box<dyn Future<Output = Result<T, AppError>> + Send + 'a>>,
{
    let mut tx = store.begin().await.map_err(|e| {
        tracing::error!(error = %e, "Failed to begin transaction");
        AppError::from(e)
    })?;

    let cause = match f(&mut tx).await {
        Ok(value) => match tx.commit().await {
            Ok(()) => return Ok(value),
            Err(e) => {
                tracing::error!(error = %e, "Failed to commit transaction");
                AppError::from(e)
            }
        },
        Err(e) => e,
    };

    Err(rollback_preserving(tx.as_mut(), cause).await)
}

//! Application setup and initialization

pub mod routes;
pub mod server;

use crate::state::AppState;
use anyhow::{Context, Result};
use satchel_core::Config;
use std::sync::Arc;

/// Initialize the entire application: document store, state and routes.
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    config
        .validate()
        .context("Configuration validation failed")?;
    tracing::info!(environment = %config.environment, "Configuration loaded and validated successfully");

    let store = satchel_db::create_document_store(&config)
        .await
        .context("Failed to initialize document store")?;
    tracing::info!(backend = store.backend_name(), "Document store ready");

    let state = Arc::new(AppState::new(config.clone(), store));
    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}

//! Route configuration and setup

use crate::constants::{DOCS_PATH, HEALTH_PATH, OPENAPI_PATH, UPLOAD_PATH};
use crate::handlers;
use crate::middleware::{error_details_middleware, ErrorDetailsConfig};
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    middleware,
    routing::get,
    Json, Router,
};
use satchel_core::Config;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router, anyhow::Error> {
    let cors = setup_cors(config)?;
    let error_details = ErrorDetailsConfig::new(config.is_production());

    let app = Router::new()
        .merge(upload_routes())
        .route(HEALTH_PATH, get(handlers::health::health_check))
        .route(
            OPENAPI_PATH,
            get(|| async { Json(crate::api_doc::get_openapi_spec()) }),
        )
        .merge(utoipa_rapidoc::RapiDoc::new(OPENAPI_PATH).path(DOCS_PATH))
        .layer(middleware::from_fn_with_state(
            error_details,
            error_details_middleware,
        ))
        .layer(
            ServiceBuilder::new()
                // Multipart bodies are bounded by the layer below, not axum's 2 MB default.
                .layer(DefaultBodyLimit::disable())
                .layer(RequestBodyLimitLayer::new(config.max_upload_size_bytes)),
        )
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state);

    tracing::info!(
        max_upload_size_bytes = config.max_upload_size_bytes,
        "Routes configured"
    );
    Ok(app)
}

/// Setup CORS configuration
fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let methods = [Method::GET, Method::POST, Method::OPTIONS];

    if config.cors_origins.iter().any(|o| o == "*") {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        return Ok(CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any));
    }

    let origins = config
        .cors_origins
        .iter()
        .map(|o| {
            o.parse::<HeaderValue>()
                .map_err(|e| anyhow::anyhow!("Invalid CORS origin '{}': {}", o, e))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(methods)
        .allow_headers(Any))
}

/// Upload resource routes
fn upload_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            UPLOAD_PATH,
            get(handlers::upload::list_uploads).post(handlers::upload::create_upload),
        )
        .route(
            &format!("{}/{{id}}", UPLOAD_PATH),
            get(handlers::upload::get_upload),
        )
        .route(
            &format!("{}/{{id}}/attachments/{{attachment_id}}/body", UPLOAD_PATH),
            get(handlers::upload::get_attachment_body),
        )
}

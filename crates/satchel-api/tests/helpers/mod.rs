//! Test helpers: build AppState and router over the in-memory document store.
//!
//! Run from workspace root: `cargo test -p satchel-api`.

pub mod fixtures;
pub mod stores;

use axum_test::TestServer;
use satchel_api::auth::JwtService;
use satchel_api::setup::routes;
use satchel_api::state::AppState;
use satchel_core::{Config, PipelineConfig, ResizeSpec};
use satchel_db::{DocumentStore, MemoryDocumentStore};
use std::sync::Arc;
use tempfile::TempDir;
use uuid::Uuid;

pub const TEST_JWT_SECRET: &str = "integration-test-secret-at-least-32-chars";

/// Test application: server plus the store behind it.
pub struct TestApp {
    pub server: TestServer,
    pub store: MemoryDocumentStore,
    pub _tmp_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }
}

pub fn plain_pipeline() -> PipelineConfig {
    PipelineConfig::default()
}

pub fn image_pipeline(width: Option<u32>, height: Option<u32>) -> PipelineConfig {
    PipelineConfig::new(
        "Upload",
        true,
        ResizeSpec::new(width, height).unwrap(),
        vec!["image".to_string(), "background".to_string()],
    )
    .unwrap()
}

fn test_config(pipeline: PipelineConfig, tmp_dir: &TempDir) -> Config {
    let mut config = Config::from_lookup(|key| match key {
        "DOCUMENT_STORE" => Some("memory".to_string()),
        "JWT_SECRET" => Some(TEST_JWT_SECRET.to_string()),
        "MAX_UPLOAD_SIZE_MB" => Some("1".to_string()),
        _ => None,
    })
    .expect("test config");
    config.upload_tmp_dir = Some(tmp_dir.path().to_path_buf());
    config.pipeline = pipeline;
    config
}

/// Setup test app over a fresh in-memory store.
pub fn setup_test_app(pipeline: PipelineConfig) -> TestApp {
    let store = MemoryDocumentStore::new();
    setup_test_app_with_store(pipeline, store.clone(), Arc::new(store))
}

/// Setup test app serving `serving`; `store` is the memory store underneath it.
pub fn setup_test_app_with_store(
    pipeline: PipelineConfig,
    store: MemoryDocumentStore,
    serving: Arc<dyn DocumentStore>,
) -> TestApp {
    build_test_app(pipeline, store, serving, |_| {})
}

/// Setup test app whose configuration reports a production environment.
pub fn setup_production_test_app(pipeline: PipelineConfig) -> TestApp {
    let store = MemoryDocumentStore::new();
    build_test_app(pipeline, store.clone(), Arc::new(store), |config| {
        config.environment = "production".to_string();
    })
}

fn build_test_app(
    pipeline: PipelineConfig,
    store: MemoryDocumentStore,
    serving: Arc<dyn DocumentStore>,
    customize: impl FnOnce(&mut Config),
) -> TestApp {
    let tmp_dir = TempDir::new().unwrap();
    let mut config = test_config(pipeline, &tmp_dir);
    customize(&mut config);
    let state = Arc::new(AppState::new(config.clone(), serving));
    let router = routes::setup_routes(&config, state).unwrap();

    TestApp {
        server: TestServer::new(router).unwrap(),
        store,
        _tmp_dir: tmp_dir,
    }
}

/// `Authorization` header value for `user_id`.
pub fn bearer(user_id: Uuid) -> String {
    let token = JwtService::new(TEST_JWT_SECRET)
        .issue(user_id, chrono::Duration::hours(1))
        .unwrap();
    format!("Bearer {}", token)
}

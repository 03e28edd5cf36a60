//! Application state shared by all handlers.

use satchel_core::Config;
use satchel_db::DocumentStore;
use satchel_processing::IngestionPipeline;
use std::sync::Arc;

use crate::auth::JwtService;

pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn DocumentStore>,
    pub pipeline: IngestionPipeline,
    /// `None` when no JWT secret is configured; every caller is then anonymous.
    pub jwt: Option<JwtService>,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn DocumentStore>) -> Self {
        let pipeline = IngestionPipeline::new(config.pipeline.clone(), store.clone());
        Self::with_pipeline(config, store, pipeline)
    }

    pub fn with_pipeline(
        config: Config,
        store: Arc<dyn DocumentStore>,
        pipeline: IngestionPipeline,
    ) -> Self {
        let jwt = config.jwt_secret.as_deref().map(JwtService::new);
        Self {
            config,
            store,
            pipeline,
            jwt,
        }
    }

    /// Record type served by this resource.
    pub fn upload_type(&self) -> &str {
        self.pipeline.config().upload_type()
    }
}

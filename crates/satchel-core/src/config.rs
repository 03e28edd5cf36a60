//! Configuration module
//!
//! Server, store and pipeline settings, read from the environment (and `.env`).
//! The ingestion pipeline gets its own immutable [`PipelineConfig`], validated once
//! at startup and never mutated afterwards.

use std::env;
use std::path::PathBuf;

use crate::constants::{DEFAULT_ATTACHMENT_FIELDS, DEFAULT_UPLOAD_TYPE};
use crate::error::AppError;
use crate::store_types::StoreBackend;

// Common constants
const SERVER_PORT: u16 = 4000;
const MAX_CONNECTIONS: u32 = 20;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const MAX_UPLOAD_SIZE_MB: usize = 20;
const MIN_JWT_SECRET_LEN: usize = 32;

/// Target geometry for the resize step. At least one dimension is set and every set
/// dimension is at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeSpec {
    width: Option<u32>,
    height: Option<u32>,
}

impl ResizeSpec {
    /// Returns `Ok(None)` when neither dimension is given: resizing is then disabled.
    pub fn new(width: Option<u32>, height: Option<u32>) -> Result<Option<Self>, AppError> {
        if width == Some(0) || height == Some(0) {
            return Err(AppError::Validation(
                "Resize width and height must be at least 1".to_string(),
            ));
        }
        if width.is_none() && height.is_none() {
            return Ok(None);
        }
        Ok(Some(Self { width, height }))
    }

    pub fn width(&self) -> Option<u32> {
        self.width
    }

    pub fn height(&self) -> Option<u32> {
        self.height
    }
}

/// Step set of the ingestion pipeline, resolved once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    upload_type: String,
    image_aware: bool,
    resize: Option<ResizeSpec>,
    attachment_field_names: Vec<String>,
}

impl PipelineConfig {
    /// Build a validated pipeline configuration.
    ///
    /// A resize spec turns image awareness on: deriving the missing dimension needs the
    /// original image metadata.
    pub fn new(
        upload_type: impl Into<String>,
        image_aware: bool,
        resize: Option<ResizeSpec>,
        attachment_field_names: Vec<String>,
    ) -> Result<Self, AppError> {
        let upload_type = upload_type.into().trim().to_string();
        if upload_type.is_empty() {
            return Err(AppError::Validation(
                "Upload record type must not be empty".to_string(),
            ));
        }

        let attachment_field_names: Vec<String> = attachment_field_names
            .into_iter()
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .collect();
        if attachment_field_names.is_empty() {
            return Err(AppError::Validation(
                "At least one attachment field name is required".to_string(),
            ));
        }

        Ok(Self {
            upload_type,
            image_aware: image_aware || resize.is_some(),
            resize,
            attachment_field_names,
        })
    }

    pub fn upload_type(&self) -> &str {
        &self.upload_type
    }

    pub fn image_aware(&self) -> bool {
        self.image_aware
    }

    pub fn resize(&self) -> Option<ResizeSpec> {
        self.resize
    }

    pub fn attachment_field_names(&self) -> &[String] {
        &self.attachment_field_names
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            upload_type: DEFAULT_UPLOAD_TYPE.to_string(),
            image_aware: false,
            resize: None,
            attachment_field_names: DEFAULT_ATTACHMENT_FIELDS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    pub server_port: u16,
    pub environment: String,
    pub cors_origins: Vec<String>,
    pub store_backend: StoreBackend,
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    /// Without a secret every request is treated as anonymous.
    pub jwt_secret: Option<String>,
    pub max_upload_size_bytes: usize,
    /// Parent directory for request-scoped upload directories; system temp dir if unset.
    pub upload_tmp_dir: Option<PathBuf>,
    pub pipeline: PipelineConfig,
}

impl Config {
    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = lookup("ENVIRONMENT")
            .or_else(|| lookup("APP_ENV"))
            .unwrap_or_else(|| "development".to_string());

        let cors_origins: Vec<String> = lookup("CORS_ORIGINS")
            .unwrap_or_else(|| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let store_backend = match lookup("DOCUMENT_STORE") {
            Some(value) => value.parse::<StoreBackend>().map_err(|e| anyhow::anyhow!(e))?,
            None => StoreBackend::default(),
        };

        let max_upload_size_mb = lookup("MAX_UPLOAD_SIZE_MB")
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(MAX_UPLOAD_SIZE_MB);

        let resize = ResizeSpec::new(
            parse_optional_u32(&lookup, "UPLOAD_RESIZE_WIDTH")?,
            parse_optional_u32(&lookup, "UPLOAD_RESIZE_HEIGHT")?,
        )?;

        let field_names: Vec<String> = match lookup("UPLOAD_FIELDS") {
            Some(fields) => fields.split(',').map(|s| s.to_string()).collect(),
            None => DEFAULT_ATTACHMENT_FIELDS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        };

        let pipeline = PipelineConfig::new(
            lookup("UPLOAD_TYPE").unwrap_or_else(|| DEFAULT_UPLOAD_TYPE.to_string()),
            lookup("UPLOAD_IMAGE")
                .map(|s| s.trim().eq_ignore_ascii_case("true") || s.trim() == "1")
                .unwrap_or(false),
            resize,
            field_names,
        )?;

        let config = Config {
            server_port: lookup("PORT")
                .unwrap_or_else(|| SERVER_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            environment,
            cors_origins,
            store_backend,
            database_url: lookup("DATABASE_URL"),
            db_max_connections: lookup("DB_MAX_CONNECTIONS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(MAX_CONNECTIONS),
            db_timeout_seconds: lookup("DB_TIMEOUT_SECONDS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(CONNECTION_TIMEOUT_SECS),
            jwt_secret: lookup("JWT_SECRET").filter(|s| !s.is_empty()),
            max_upload_size_bytes: max_upload_size_mb * 1024 * 1024,
            upload_tmp_dir: lookup("UPLOAD_TMP_DIR").map(PathBuf::from),
            pipeline,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if let Some(secret) = &self.jwt_secret {
            if secret.len() < MIN_JWT_SECRET_LEN {
                return Err(anyhow::anyhow!(
                    "JWT_SECRET must be at least {} characters long",
                    MIN_JWT_SECRET_LEN
                ));
            }
        }

        if self.store_backend == StoreBackend::Postgres {
            match &self.database_url {
                Some(url) if url.starts_with("postgres://") || url.starts_with("postgresql://") => {}
                Some(_) => {
                    return Err(anyhow::anyhow!(
                        "DATABASE_URL must be a valid PostgreSQL connection string"
                    ))
                }
                None => return Err(anyhow::anyhow!("DATABASE_URL must be set")),
            }
        }

        if self.is_production() {
            if self.store_backend == StoreBackend::Memory {
                return Err(anyhow::anyhow!(
                    "DOCUMENT_STORE=memory is not allowed in production"
                ));
            }
            if self.cors_origins.iter().any(|o| o == "*") {
                return Err(anyhow::anyhow!(
                    "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
                ));
            }
        }

        Ok(())
    }
}

fn parse_optional_u32<F>(lookup: &F, key: &str) -> Result<Option<u32>, anyhow::Error>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(value) if !value.trim().is_empty() => value
            .trim()
            .parse::<u32>()
            .map(Some)
            .map_err(|_| anyhow::anyhow!("{} must be a positive integer", key)),
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config, anyhow::Error> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_resize_spec_without_dimensions_is_disabled() {
        assert_eq!(ResizeSpec::new(None, None).unwrap(), None);
    }

    #[test]
    fn test_resize_spec_rejects_zero() {
        assert!(ResizeSpec::new(Some(0), None).is_err());
        assert!(ResizeSpec::new(Some(10), Some(0)).is_err());
    }

    #[test]
    fn test_resize_forces_image_awareness() {
        let resize = ResizeSpec::new(Some(100), None).unwrap();
        let config =
            PipelineConfig::new("Upload", false, resize, vec!["image".to_string()]).unwrap();
        assert!(config.image_aware());
        assert_eq!(config.resize().and_then(|r| r.width()), Some(100));
    }

    #[test]
    fn test_pipeline_config_requires_field_names() {
        let err = PipelineConfig::new("Upload", false, None, vec![" ".to_string()]);
        assert!(matches!(err, Err(AppError::Validation(_))));
    }

    #[test]
    fn test_pipeline_config_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.upload_type(), "Upload");
        assert!(!config.image_aware());
        assert_eq!(config.attachment_field_names(), &["image", "background"]);
    }

    #[test]
    fn test_from_lookup_memory_store() {
        let config = config_from(&[
            ("DOCUMENT_STORE", "memory"),
            ("UPLOAD_RESIZE_HEIGHT", "240"),
            ("UPLOAD_FIELDS", "photo, image"),
            ("UPLOAD_TYPE", "Photo"),
        ])
        .unwrap();

        assert_eq!(config.store_backend, StoreBackend::Memory);
        assert_eq!(config.server_port, 4000);
        assert_eq!(config.max_upload_size_bytes, 20 * 1024 * 1024);
        assert_eq!(config.pipeline.upload_type(), "Photo");
        assert!(config.pipeline.image_aware());
        assert_eq!(config.pipeline.attachment_field_names(), &["photo", "image"]);
        assert_eq!(config.pipeline.resize().and_then(|r| r.height()), Some(240));
    }

    #[test]
    fn test_from_lookup_requires_database_url_for_postgres() {
        assert!(config_from(&[]).is_err());
        assert!(config_from(&[("DATABASE_URL", "mysql://localhost/db")]).is_err());
        assert!(config_from(&[("DATABASE_URL", "postgres://localhost/db")]).is_ok());
    }

    #[test]
    fn test_production_rejects_memory_store_and_wildcard_cors() {
        assert!(config_from(&[("DOCUMENT_STORE", "memory"), ("ENVIRONMENT", "production")]).is_err());
        assert!(config_from(&[
            ("DATABASE_URL", "postgres://localhost/db"),
            ("ENVIRONMENT", "production"),
        ])
        .is_err());
        assert!(config_from(&[
            ("DATABASE_URL", "postgres://localhost/db"),
            ("ENVIRONMENT", "production"),
            ("CORS_ORIGINS", "https://example.com"),
        ])
        .is_ok());
    }

    #[test]
    fn test_short_jwt_secret_rejected() {
        assert!(config_from(&[("DOCUMENT_STORE", "memory"), ("JWT_SECRET", "short")]).is_err());
    }

    #[test]
    fn test_invalid_resize_width_rejected() {
        assert!(config_from(&[("DOCUMENT_STORE", "memory"), ("UPLOAD_RESIZE_WIDTH", "wide")]).is_err());
    }
}

//! Satchel Core Library
//!
//! This crate provides the domain models, error types and configuration shared by
//! the store, processing and API crates.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod store_types;

// Re-export commonly used types
pub use config::{Config, PipelineConfig, ResizeSpec};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::{Attachment, ImageInfo, NewAttachment, UploadRecord};
pub use store_types::StoreBackend;

//! Satchel Processing Library
//!
//! Image inspection and resizing plus the ingestion pipeline that turns a decoded
//! multipart upload into a committed upload record.

pub mod error;
pub mod image;
pub mod upload;

pub use error::ImageError;
pub use crate::image::{ImageInspector, ImageProcessor, ImageResize, ImageResizer, ResizeRequest};
pub use upload::{AttachmentFile, DecodedUpload, IngestionPipeline};

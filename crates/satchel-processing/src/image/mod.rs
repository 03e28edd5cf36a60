//! Image processing module
//!
//! - Metadata extraction (inspector)
//! - Resize geometry and resizing (resize)

pub mod inspector;
pub mod resize;

pub use inspector::{ImageInspector, ImageProcessor};
pub use resize::{ImageResize, ImageResizer, ResizeRequest};

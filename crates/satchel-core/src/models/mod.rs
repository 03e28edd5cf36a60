//! Domain models for uploads and their attachments.

pub mod attachment;
pub mod image_info;
pub mod upload;

pub use attachment::{Attachment, NewAttachment};
pub use image_info::ImageInfo;
pub use upload::UploadRecord;

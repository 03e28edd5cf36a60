pub mod pipeline;
pub mod types;

pub use pipeline::IngestionPipeline;
pub use types::{AttachmentFile, DecodedUpload};

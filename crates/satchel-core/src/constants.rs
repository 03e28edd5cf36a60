/// Record type used when `UPLOAD_TYPE` is not set.
pub const DEFAULT_UPLOAD_TYPE: &str = "Upload";

/// Multipart field names accepted for attachments, in priority order.
pub const DEFAULT_ATTACHMENT_FIELDS: &[&str] = &["image", "background"];

/// Content type stored and served when the client did not send one.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Suffix appended to a file's path when its pre-resize bytes are kept aside.
pub const ORIGINAL_FILE_SUFFIX: &str = ".orig";

/// Sentinel attachment id selecting the earliest-created attachment.
pub const FIRST_ATTACHMENT: &str = "first";

//! API constants and path helpers

use uuid::Uuid;

/// Collection path of upload records
pub const UPLOAD_PATH: &str = "/upload";

pub const OPENAPI_PATH: &str = "/api/openapi.json";
pub const DOCS_PATH: &str = "/docs";
pub const HEALTH_PATH: &str = "/health";

/// Location of a single upload record.
pub fn upload_location(id: Uuid) -> String {
    format!("{}/{}", UPLOAD_PATH, id)
}

/// URL that serves an attachment's stored body.
pub fn attachment_body_path(record_id: Uuid, attachment_id: Uuid) -> String {
    format!("{}/{}/attachments/{}/body", UPLOAD_PATH, record_id, attachment_id)
}

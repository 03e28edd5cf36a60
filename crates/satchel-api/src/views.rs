//! Wire shapes of upload records and attachments

use chrono::{DateTime, Utc};
use satchel_core::{Attachment, UploadRecord};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::constants::attachment_body_path;

/// Upload record as listed
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadSummary {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub record_type: String,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<Uuid>,
}

impl From<&UploadRecord> for UploadSummary {
    fn from(record: &UploadRecord) -> Self {
        Self {
            id: record.id,
            record_type: record.record_type.clone(),
            created_at: record.created_at,
            owner: record.owner,
        }
    }
}

/// Upload record with its attachment metadata
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    #[serde(flatten)]
    pub record: UploadSummary,
    pub attachments: Vec<AttachmentResponse>,
}

impl UploadResponse {
    pub fn new(record: &UploadRecord, attachments: &[Attachment]) -> Self {
        Self {
            record: record.into(),
            attachments: attachments
                .iter()
                .map(|a| AttachmentResponse::new(record.id, a))
                .collect(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentResponse {
    pub id: Uuid,
    pub name: String,
    pub content_type: String,
    pub created_at: DateTime<Utc>,
    /// Image metadata, `{}` for non-images
    #[schema(value_type = Object)]
    pub info: serde_json::Value,
    /// The file as it was uploaded: filename, size, content type and pre-resize info
    #[schema(value_type = Object)]
    pub original: serde_json::Value,
    pub body: BodyRef,
}

impl AttachmentResponse {
    pub fn new(record_id: Uuid, attachment: &Attachment) -> Self {
        let content_type = attachment.content_type_or_default().to_string();
        Self {
            id: attachment.id,
            name: attachment.name.clone(),
            content_type: content_type.clone(),
            created_at: attachment.created_at,
            info: attachment.info.clone(),
            original: attachment.original.clone(),
            body: BodyRef {
                reference: attachment_body_path(record_id, attachment.id),
                content_type,
            },
        }
    }
}

/// Reference to a body served separately
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BodyRef {
    #[serde(rename = "$ref")]
    pub reference: String,
    pub content_type: String,
}

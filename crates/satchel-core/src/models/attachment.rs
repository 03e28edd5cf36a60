use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::DEFAULT_CONTENT_TYPE;

/// Attachment metadata as stored; the body is loaded separately.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Attachment {
    pub id: Uuid,
    pub record_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub name: String,
    pub content_type: String,
    /// Image metadata after all processing, or `{}`
    pub info: serde_json::Value,
    /// Descriptor of the file as it was uploaded
    pub original: serde_json::Value,
}

impl Attachment {
    pub fn content_type_or_default(&self) -> &str {
        if self.content_type.trim().is_empty() {
            DEFAULT_CONTENT_TYPE
        } else {
            &self.content_type
        }
    }
}

/// Metadata for an attachment about to be created.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAttachment {
    pub name: String,
    pub content_type: String,
    pub info: serde_json::Value,
    pub original: serde_json::Value,
}

impl NewAttachment {
    pub fn new(name: impl Into<String>, content_type: Option<&str>) -> Self {
        let content_type = content_type
            .map(str::trim)
            .filter(|ct| !ct.is_empty())
            .unwrap_or(DEFAULT_CONTENT_TYPE);
        Self {
            name: name.into(),
            content_type: content_type.to_string(),
            info: serde_json::json!({}),
            original: serde_json::json!({}),
        }
    }

    pub fn with_info(mut self, info: serde_json::Value) -> Self {
        self.info = info;
        self
    }

    pub fn with_original(mut self, original: serde_json::Value) -> Self {
        self.original = original;
        self
    }

    /// Materialize the stored attachment row.
    pub fn into_attachment(self, record_id: Uuid) -> Attachment {
        Attachment {
            id: Uuid::new_v4(),
            record_id,
            created_at: Utc::now(),
            name: self.name,
            content_type: self.content_type,
            info: self.info,
            original: self.original,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_content_type_defaults_to_octet_stream() {
        assert_eq!(
            NewAttachment::new("a.bin", None).content_type,
            "application/octet-stream"
        );
        assert_eq!(
            NewAttachment::new("a.bin", Some("  ")).content_type,
            "application/octet-stream"
        );
        assert_eq!(
            NewAttachment::new("a.png", Some("image/png")).content_type,
            "image/png"
        );
    }

    #[test]
    fn test_new_attachment_defaults_info_to_empty_object() {
        let attachment = NewAttachment::new("a.txt", Some("text/plain")).into_attachment(Uuid::nil());
        assert_eq!(attachment.info, serde_json::json!({}));
        assert_eq!(attachment.record_id, Uuid::nil());
        assert_eq!(attachment.content_type_or_default(), "text/plain");
    }
}

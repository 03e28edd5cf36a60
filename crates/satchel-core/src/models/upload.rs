use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A committed upload. Owns one or more attachments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct UploadRecord {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub record_type: String,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<Uuid>,
}

impl UploadRecord {
    pub fn new(record_type: impl Into<String>, owner: Option<Uuid>) -> Self {
        Self {
            id: Uuid::new_v4(),
            record_type: record_type.into(),
            created_at: Utc::now(),
            owner,
        }
    }
}

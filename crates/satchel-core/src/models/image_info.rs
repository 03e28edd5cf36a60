use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Basic facts about a decodable image file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
    pub format: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<u64>,
}

impl ImageInfo {
    /// JSON form stored on attachments; `{}` when there is no image metadata.
    pub fn to_json(info: Option<&ImageInfo>) -> serde_json::Value {
        match info {
            Some(info) => serde_json::to_value(info)
                .unwrap_or_else(|_| serde_json::Value::Object(Default::default())),
            None => serde_json::Value::Object(Default::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_info_is_empty_object() {
        assert_eq!(ImageInfo::to_json(None), serde_json::json!({}));
    }

    #[test]
    fn test_info_serialization() {
        let info = ImageInfo {
            width: 100,
            height: 25,
            format: "Png".to_string(),
            size_bytes: None,
        };
        let json = ImageInfo::to_json(Some(&info));
        assert_eq!(json["width"], 100);
        assert_eq!(json["height"], 25);
        assert!(json.get("size_bytes").is_none());

        let back: ImageInfo = serde_json::from_value(json).unwrap();
        assert_eq!(back, info);
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Catalog entry for one hosted video.
///
/// `status` is free-form because it echoes whatever the video host reports
/// ("processing" right after upload, "active" once playable).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct VideoRecord {
    pub id: Uuid,
    pub file_code: String,
    pub embed_code: String,
    pub title: String,
    pub thumbnail_url: String,
    pub duration: String,
    pub status: String,
    pub views: i64,
    pub upload_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VideoResponse {
    pub id: Uuid,
    pub file_code: String,
    pub embed_code: String,
    pub title: String,
    pub thumbnail: String,
    pub duration: String,
    pub status: String,
    pub views: i64,
    pub upload_date: DateTime<Utc>,
}

impl From<VideoRecord> for VideoResponse {
    fn from(video: VideoRecord) -> Self {
        VideoResponse {
            id: video.id,
            file_code: video.file_code,
            embed_code: video.embed_code,
            title: video.title,
            thumbnail: video.thumbnail_url,
            duration: video.duration,
            status: video.status,
            views: video.views,
            upload_date: video.upload_date,
        }
    }
}

/// Register a pre-existing host file without transferring bytes.
///
/// The duration format is checked by the handler against the accepted
/// `mm:ss` / `hh:mm:ss` pattern.
#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
pub struct AddVideoRequest {
    #[validate(length(min = 1, message = "file_code is required"))]
    pub file_code: String,

    #[validate(length(min = 1, message = "title is required"))]
    pub title: String,

    #[serde(default = "default_duration")]
    pub duration: String,
}

fn default_duration() -> String {
    "0:00".to_string()
}

// ----- Response envelopes -----
//
// Every JSON response carries a `success` flag so the frontend can branch on
// one shape. Shared here so the api-client deserializes the same types the
// API serializes.

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ListVideosResponse {
    pub success: bool,
    pub count: usize,
    pub videos: Vec<VideoResponse>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VideoEnvelope {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub video: VideoResponse,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct EmbedResponse {
    pub success: bool,
    pub embed_url: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CatalogStats {
    pub total_videos: i64,
    pub total_views: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StatsResponse {
    pub success: bool,
    pub stats: CatalogStats,
}

/// Best-effort quota snapshot from the video host; None when the host is unreachable.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HostQuota {
    pub storage_usage: u64,
    pub storage_limit: u64,
    pub daily_upload_remaining: u64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
    pub environment: String,
    pub timestamp: DateTime<Utc>,
    pub host_quota: Option<HostQuota>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    fn test_record() -> VideoRecord {
        let now = Utc::now();
        VideoRecord {
            id: Uuid::new_v4(),
            file_code: "abc123".to_string(),
            embed_code: "abc123".to_string(),
            title: "My Video".to_string(),
            thumbnail_url: "https://cdn.example.com/thumb.jpg".to_string(),
            duration: "1:30".to_string(),
            status: "active".to_string(),
            views: 7,
            upload_date: now,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn video_response_from_record() {
        let record = test_record();
        let id = record.id;
        let response = VideoResponse::from(record);
        assert_eq!(response.id, id);
        assert_eq!(response.title, "My Video");
        assert_eq!(response.thumbnail, "https://cdn.example.com/thumb.jpg");
        assert_eq!(response.views, 7);
    }

    #[test]
    fn add_video_request_rejects_blank_fields() {
        let request = AddVideoRequest {
            file_code: String::new(),
            title: "ok".to_string(),
            duration: "0:00".to_string(),
        };
        assert!(request.validate().is_err());

        let request = AddVideoRequest {
            file_code: "abc".to_string(),
            title: String::new(),
            duration: "0:00".to_string(),
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn add_video_request_default_duration() {
        let request: AddVideoRequest =
            serde_json::from_str(r#"{"file_code":"abc","title":"ok"}"#).unwrap();
        assert_eq!(request.duration, "0:00");
        assert!(request.validate().is_ok());
    }
}

//! JSON shapes exchanged with the remote data service.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Item of the public `/courses` listing.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct CatalogItem {
    #[serde(rename = "PK", default)]
    pub pk: Option<String>,
    #[serde(rename = "Title", default)]
    pub title: Option<String>,
    #[serde(rename = "TotalVideos", default, deserialize_with = "lenient_count")]
    pub total_videos: Option<u32>,
}

/// Item of `/courses/{id}`: either the course metadata or one lesson.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct CourseItem {
    #[serde(rename = "Type", default)]
    pub kind: Option<String>,
    #[serde(rename = "SK", default)]
    pub sk: Option<String>,
    #[serde(rename = "Title", default)]
    pub title: Option<String>,
    #[serde(rename = "YouTubeID", default)]
    pub video_id: Option<String>,
    #[serde(rename = "VideoTitle", default)]
    pub video_title: Option<String>,
}

/// Item of `/user?userId=…`, discriminated by its `SK` prefix.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct UserItem {
    #[serde(rename = "SK", default)]
    pub sk: Option<String>,
    #[serde(rename = "VideoId", default)]
    pub video_id: Option<String>,
    #[serde(rename = "CourseId", default)]
    pub course_id: Option<String>,
    #[serde(rename = "Title", default)]
    pub title: Option<String>,
    #[serde(rename = "TotalVideos", default, deserialize_with = "lenient_count")]
    pub total_videos: Option<u32>,
    #[serde(rename = "NoteText", default)]
    pub note_text: Option<String>,
}

/// Body of `POST /user`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ActionPayload {
    pub user_id: String,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub course_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_videos: Option<u32>,
}

/// Body of `POST /admin/ingest`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct IngestPayload {
    pub playlist_id: String,
    pub course_title: String,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct IngestResponse {
    #[serde(default)]
    pub message: Option<String>,
}

/// Counts arrive as numbers, numeric strings, or not at all.
fn lenient_count<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|value| match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| {
                n.as_f64()
                    .filter(|f| *f >= 0.0 && f.fract() == 0.0)
                    .map(|f| f as u64)
            })
            .and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_accept_numbers_and_strings() {
        let items: Vec<CatalogItem> = serde_json::from_str(
            r#"[
                {"PK": "COURSE#a", "TotalVideos": 12},
                {"PK": "COURSE#b", "TotalVideos": "7"},
                {"PK": "COURSE#c", "TotalVideos": 3.0},
                {"PK": "COURSE#d", "TotalVideos": null},
                {"PK": "COURSE#e", "TotalVideos": -2},
                {"PK": "COURSE#f"}
            ]"#,
        )
        .unwrap();
        let totals: Vec<_> = items.iter().map(|i| i.total_videos).collect();
        assert_eq!(totals, vec![Some(12), Some(7), Some(3), None, None, None]);
    }

    #[test]
    fn action_payload_omits_absent_fields() {
        let payload = ActionPayload {
            user_id: "ana".into(),
            kind: "WATCH",
            course_id: "rust".into(),
            video_id: Some("v1".into()),
            text: None,
            title: None,
            total_videos: None,
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "userId": "ana",
                "type": "WATCH",
                "courseId": "rust",
                "videoId": "v1"
            })
        );
    }
}

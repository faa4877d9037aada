use learn_core::model::{
    Catalog, CatalogEntry, CourseId, CourseSnapshot, RecordFields, UserAction, UserId,
    UserRecord, UserRecords, VideoId,
};
use tracing::debug;

use super::wire::{ActionPayload, CatalogItem, CourseItem, UserItem};
use crate::repository::StorageError;

const COURSE_KEY_PREFIX: &str = "COURSE#";
const COURSE_KIND: &str = "COURSE";
const VIDEO_KIND: &str = "VIDEO";

/// `COURSE#<id>[#…]` → `<id>`
fn course_id_from_key(key: &str) -> Option<CourseId> {
    let rest = key.strip_prefix(COURSE_KEY_PREFIX)?;
    let id = rest.split('#').next()?;
    CourseId::new(id).ok()
}

pub(crate) fn catalog_from_items(items: Vec<CatalogItem>) -> Catalog {
    let entries = items
        .into_iter()
        .filter_map(|item| {
            let Some(course_id) = item.pk.as_deref().and_then(course_id_from_key) else {
                debug!(pk = ?item.pk, "skipping catalog item without a course key");
                return None;
            };
            Some(CatalogEntry::new(course_id, item.title, item.total_videos))
        })
        .collect();
    Catalog::new(entries)
}

/// Split a course-detail response into metadata and lessons.
///
/// Lessons are ordered by their sort key; the remote store returns them in
/// no guaranteed order.
pub(crate) fn course_from_items(
    course_id: &CourseId,
    items: Vec<CourseItem>,
) -> Result<CourseSnapshot, StorageError> {
    let metadata = items
        .iter()
        .find(|item| item.kind.as_deref() == Some(COURSE_KIND))
        .ok_or(StorageError::NotFound)?;
    let title = metadata.title.clone().unwrap_or_default();

    let mut videos: Vec<&CourseItem> = items
        .iter()
        .filter(|item| item.kind.as_deref() == Some(VIDEO_KIND))
        .collect();
    videos.sort_by(|a, b| a.sk.cmp(&b.sk));

    let lessons: Vec<(VideoId, String)> = videos
        .into_iter()
        .filter_map(|item| {
            let raw = item.video_id.as_deref().unwrap_or_default();
            match VideoId::new(raw) {
                Ok(video_id) => Some((video_id, item.video_title.clone().unwrap_or_default())),
                Err(err) => {
                    debug!(sk = ?item.sk, %err, "skipping lesson without a usable video id");
                    None
                }
            }
        })
        .collect();

    Ok(CourseSnapshot::new(course_id.clone(), title, lessons))
}

pub(crate) fn records_from_items(items: Vec<UserItem>) -> UserRecords {
    items
        .into_iter()
        .filter_map(|item| {
            let key = item.sk?;
            let fields = RecordFields {
                video_id: item.video_id,
                course_id: item.course_id,
                title: item.title,
                total_videos: item.total_videos,
                note_text: item.note_text,
            };
            match UserRecord::from_fields(&key, fields) {
                Ok(record) => record,
                Err(err) => {
                    debug!(%key, %err, "skipping malformed user record");
                    None
                }
            }
        })
        .collect()
}

pub(crate) fn action_payload(user_id: &UserId, action: &UserAction) -> ActionPayload {
    let mut payload = ActionPayload {
        user_id: user_id.to_string(),
        kind: action.kind().as_str(),
        course_id: action.course_id().to_string(),
        video_id: action.video_id().map(ToString::to_string),
        text: None,
        title: None,
        total_videos: None,
    };
    match action {
        UserAction::Note { text, .. } => payload.text = Some(text.clone()),
        UserAction::Enroll {
            title,
            total_videos,
            ..
        }
        | UserAction::Bookmark {
            title,
            total_videos,
            ..
        } => {
            payload.title = Some(title.clone());
            payload.total_videos = *total_videos;
        }
        UserAction::Watch { .. } | UserAction::RemoveBookmark { .. } => {}
    }
    payload
}

#[cfg(test)]
mod tests {
    use super::*;

    fn course() -> CourseId {
        CourseId::new("rust").unwrap()
    }

    #[test]
    fn course_detail_orders_lessons_by_sort_key() {
        let items: Vec<CourseItem> = serde_json::from_str(
            r#"[
                {"Type": "VIDEO", "SK": "VIDEO#003", "YouTubeID": "c", "VideoTitle": "Third"},
                {"Type": "COURSE", "SK": "METADATA", "Title": "Rust"},
                {"Type": "VIDEO", "SK": "VIDEO#001", "YouTubeID": "a", "VideoTitle": "First"},
                {"Type": "VIDEO", "SK": "VIDEO#002", "YouTubeID": "b", "VideoTitle": "Second"},
                {"Type": "VIDEO", "SK": "VIDEO#004"}
            ]"#,
        )
        .unwrap();

        let snapshot = course_from_items(&course(), items).unwrap();
        assert_eq!(snapshot.title(), "Rust");
        let order: Vec<_> = snapshot
            .lessons()
            .iter()
            .map(|l| l.video_id().as_str())
            .collect();
        assert_eq!(order, vec!["a", "b", "c"]);
        assert_eq!(snapshot.lessons()[0].title(), "First");
    }

    #[test]
    fn course_without_metadata_is_not_found() {
        let items: Vec<CourseItem> =
            serde_json::from_str(r#"[{"Type": "VIDEO", "SK": "VIDEO#1", "YouTubeID": "a"}]"#)
                .unwrap();
        assert!(matches!(
            course_from_items(&course(), items),
            Err(StorageError::NotFound)
        ));
    }

    #[test]
    fn catalog_skips_items_without_course_key() {
        let items: Vec<CatalogItem> = serde_json::from_str(
            r#"[
                {"PK": "COURSE#rust", "Title": "Rust", "TotalVideos": 4},
                {"PK": "USER#ana"},
                {"Title": "Orphan"}
            ]"#,
        )
        .unwrap();
        let catalog = catalog_from_items(items);
        assert_eq!(catalog.entries().len(), 1);
        assert_eq!(catalog.find(&course()).unwrap().total_videos(), Some(4));
    }

    #[test]
    fn user_records_are_split_by_key_prefix() {
        let items: Vec<UserItem> = serde_json::from_str(
            r#"[
                {"SK": "COURSE#rust", "Title": "Rust", "TotalVideos": 0},
                {"SK": "WATCHED#rust#a", "VideoId": "a", "CourseId": "rust"},
                {"SK": "WATCHED#legacy", "VideoId": "b"},
                {"SK": "WATCHED#broken"},
                {"SK": "NOTE#rust#a", "NoteText": "ownership"},
                {"SK": "BOOKMARK#go", "Title": "Go"},
                {"SK": "PROFILE"},
                {"VideoId": "no-key"}
            ]"#,
        )
        .unwrap();

        let records = records_from_items(items);
        assert_eq!(records.enrollments().len(), 1);
        assert_eq!(records.enrollments()[0].total_videos, Some(0));
        assert_eq!(records.watched().len(), 2);
        assert_eq!(records.watched()[1].course_id, None);
        assert_eq!(records.notes()[0].text, "ownership");
        assert_eq!(records.bookmarks()[0].course_id.as_str(), "go");
    }

    #[test]
    fn enroll_payload_carries_title_and_total() {
        let payload = action_payload(
            &UserId::new("ana").unwrap(),
            &UserAction::Enroll {
                course_id: course(),
                title: "Rust".into(),
                total_videos: Some(12),
            },
        );
        assert_eq!(payload.kind, "ENROLL");
        assert_eq!(payload.title.as_deref(), Some("Rust"));
        assert_eq!(payload.total_videos, Some(12));
        assert_eq!(payload.video_id, None);
    }

    #[test]
    fn note_payload_carries_text_and_video() {
        let payload = action_payload(
            &UserId::new("ana").unwrap(),
            &UserAction::Note {
                course_id: course(),
                video_id: VideoId::new("a").unwrap(),
                text: "borrowck".into(),
            },
        );
        assert_eq!(payload.kind, "NOTE");
        assert_eq!(payload.video_id.as_deref(), Some("a"));
        assert_eq!(payload.text.as_deref(), Some("borrowck"));
    }
}

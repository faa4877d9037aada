use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use learn_core::model::{CourseId, CourseSnapshot, UserIdentity, UserRecords, VideoId};
use storage::{CatalogRepository, StorageError, UserRecordRepository};
use tracing::{debug, warn};

/// Everything the player view needs to open a course.
#[derive(Debug, Clone)]
pub struct LoadedCourse {
    pub course: CourseSnapshot,
    /// Watched lessons across all of the user's courses.
    pub watched: HashSet<VideoId>,
    /// Saved note text for this course, keyed by lesson.
    pub notes: HashMap<VideoId, String>,
}

/// Fetches a course and the user's records for it.
#[derive(Clone)]
pub struct CourseLoader {
    catalog: Arc<dyn CatalogRepository>,
    records: Arc<dyn UserRecordRepository>,
}

impl CourseLoader {
    #[must_use]
    pub fn new(
        catalog: Arc<dyn CatalogRepository>,
        records: Arc<dyn UserRecordRepository>,
    ) -> Self {
        Self { catalog, records }
    }

    /// Load a course for playback.
    ///
    /// A failed record fetch degrades to "nothing watched, no notes".
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the course itself cannot be fetched.
    pub async fn load(
        &self,
        identity: &UserIdentity,
        course_id: &CourseId,
    ) -> Result<LoadedCourse, StorageError> {
        let course = self.catalog.get_course(course_id).await?;
        let records = match self.records.get_records(identity.user_id()).await {
            Ok(records) => records,
            Err(err) => {
                warn!(user = %identity.user_id(), %err, "user records unavailable; opening course without progress");
                UserRecords::default()
            }
        };
        debug!(course = %course_id, lessons = course.lesson_count(), "course fetched");
        Ok(LoadedCourse {
            watched: records.watched_videos(),
            notes: records.notes_for_course(course_id),
            course,
        })
    }
}

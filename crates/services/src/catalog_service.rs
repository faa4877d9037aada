use std::collections::HashSet;
use std::sync::Arc;

use learn_core::model::{CatalogEntry, CourseId, UserAction, UserIdentity};
use storage::{CatalogRepository, IngestRepository, IngestRequest, UserRecordRepository};
use tracing::info;

use crate::error::CatalogServiceError;

/// Course browsing, enrollment, bookmarks and playlist import.
#[derive(Clone)]
pub struct CatalogService {
    catalog: Arc<dyn CatalogRepository>,
    records: Arc<dyn UserRecordRepository>,
    ingest: Arc<dyn IngestRepository>,
}

impl CatalogService {
    #[must_use]
    pub fn new(
        catalog: Arc<dyn CatalogRepository>,
        records: Arc<dyn UserRecordRepository>,
        ingest: Arc<dyn IngestRepository>,
    ) -> Self {
        Self {
            catalog,
            records,
            ingest,
        }
    }

    /// Courses whose title contains `query`, ignoring case. Untitled
    /// courses are never listed.
    ///
    /// # Errors
    ///
    /// Returns `CatalogServiceError::Storage` if the catalog cannot be fetched.
    pub async fn browse(&self, query: &str) -> Result<Vec<CatalogEntry>, CatalogServiceError> {
        let catalog = self.catalog.list_courses().await?;
        Ok(catalog.search(query).cloned().collect())
    }

    /// # Errors
    ///
    /// Returns `CatalogServiceError::UnknownCourse` if no entry has this id.
    pub async fn find(&self, course_id: &CourseId) -> Result<CatalogEntry, CatalogServiceError> {
        let catalog = self.catalog.list_courses().await?;
        catalog
            .find(course_id)
            .cloned()
            .ok_or_else(|| CatalogServiceError::UnknownCourse(course_id.clone()))
    }

    /// # Errors
    ///
    /// Returns `CatalogServiceError::Storage` if the user's records cannot be fetched.
    pub async fn bookmarks(
        &self,
        identity: &UserIdentity,
    ) -> Result<HashSet<CourseId>, CatalogServiceError> {
        let records = self.records.get_records(identity.user_id()).await?;
        Ok(records.bookmarked_courses())
    }

    /// # Errors
    ///
    /// Returns `CatalogServiceError::Storage` if the write is not accepted.
    pub async fn enroll(
        &self,
        identity: &UserIdentity,
        entry: &CatalogEntry,
    ) -> Result<(), CatalogServiceError> {
        let action = UserAction::Enroll {
            course_id: entry.course_id().clone(),
            title: entry.title().unwrap_or_default().to_string(),
            total_videos: entry.total_videos(),
        };
        self.records.apply_action(identity.user_id(), &action).await?;
        info!(user = %identity.user_id(), course = %entry.course_id(), "enrolled");
        Ok(())
    }

    /// Flip the bookmark on `entry` and return whether it is now bookmarked.
    ///
    /// `bookmarks` is updated only once the write is accepted.
    ///
    /// # Errors
    ///
    /// Returns `CatalogServiceError::Storage` if the write is not accepted.
    pub async fn toggle_bookmark(
        &self,
        identity: &UserIdentity,
        entry: &CatalogEntry,
        bookmarks: &mut HashSet<CourseId>,
    ) -> Result<bool, CatalogServiceError> {
        let course_id = entry.course_id().clone();
        let bookmarked = bookmarks.contains(&course_id);
        let action = if bookmarked {
            UserAction::RemoveBookmark {
                course_id: course_id.clone(),
            }
        } else {
            UserAction::Bookmark {
                course_id: course_id.clone(),
                title: entry.title().unwrap_or_default().to_string(),
                total_videos: entry.total_videos(),
            }
        };
        self.records.apply_action(identity.user_id(), &action).await?;
        if bookmarked {
            bookmarks.remove(&course_id);
        } else {
            bookmarks.insert(course_id);
        }
        Ok(!bookmarked)
    }

    /// Ask the data service to import a playlist as a new course.
    ///
    /// # Errors
    ///
    /// Returns `CatalogServiceError::MissingField` for a blank playlist id or
    /// title, or `CatalogServiceError::Storage` if the request fails.
    pub async fn ingest_playlist(
        &self,
        playlist_id: &str,
        course_title: &str,
    ) -> Result<String, CatalogServiceError> {
        let playlist_id = playlist_id.trim();
        let course_title = course_title.trim();
        if playlist_id.is_empty() {
            return Err(CatalogServiceError::MissingField("playlist id"));
        }
        if course_title.is_empty() {
            return Err(CatalogServiceError::MissingField("course title"));
        }
        let request = IngestRequest {
            playlist_id: playlist_id.to_string(),
            course_title: course_title.to_string(),
        };
        let message = self.ingest.ingest_playlist(&request).await?;
        info!(playlist = playlist_id, "playlist import requested");
        Ok(message)
    }
}

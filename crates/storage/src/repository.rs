use async_trait::async_trait;
use learn_core::model::{
    Bookmark, Catalog, CatalogEntry, CourseId, CourseSnapshot, Enrollment, Note, UserAction,
    UserId, UserRecord, UserRecords, WatchRecord,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("remote service answered with status {0}")]
    Status(u16),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("write rejected: {0}")]
    Rejected(String),
}

/// Admin request to import a playlist as a new course.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestRequest {
    pub playlist_id: String,
    pub course_title: String,
}

/// Read access to the public course catalog.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// List every course in the public catalog.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the listing cannot be fetched or decoded.
    async fn list_courses(&self) -> Result<Catalog, StorageError>;

    /// Fetch a course with its lessons in watch order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the course has no metadata record,
    /// or other storage errors.
    async fn get_course(&self, course_id: &CourseId) -> Result<CourseSnapshot, StorageError>;
}

/// Per-user record store.
#[async_trait]
pub trait UserRecordRepository: Send + Sync {
    /// Fetch every record held for the user.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the records cannot be fetched or decoded.
    async fn get_records(&self, user_id: &UserId) -> Result<UserRecords, StorageError>;

    /// Apply a typed write. The store enforces its own rules.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the write is not accepted.
    async fn apply_action(&self, user_id: &UserId, action: &UserAction)
    -> Result<(), StorageError>;
}

#[async_trait]
pub trait IngestRepository: Send + Sync {
    /// Submit a playlist import and return the service's status message.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the request is refused or fails.
    async fn ingest_playlist(&self, request: &IngestRequest) -> Result<String, StorageError>;
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, StorageError> {
    mutex
        .lock()
        .map_err(|e| StorageError::Connection(e.to_string()))
}

/// In-memory stand-in for the remote data service, for tests and offline runs.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    catalog: Arc<Mutex<Vec<CatalogEntry>>>,
    courses: Arc<Mutex<HashMap<CourseId, CourseSnapshot>>>,
    records: Arc<Mutex<HashMap<UserId, UserRecords>>>,
    applied: Arc<Mutex<Vec<(UserId, UserAction)>>>,
    ingested: Arc<Mutex<Vec<IngestRequest>>>,
    reject_writes: Arc<AtomicBool>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish a course: adds it to the catalog listing and the detail store.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if a lock is poisoned.
    pub fn publish_course(
        &self,
        course: CourseSnapshot,
        total_videos: Option<u32>,
    ) -> Result<(), StorageError> {
        lock(&self.catalog)?.push(CatalogEntry::new(
            course.id().clone(),
            Some(course.title().to_string()),
            total_videos,
        ));
        lock(&self.courses)?.insert(course.id().clone(), course);
        Ok(())
    }

    /// Add a catalog entry without lesson detail.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if a lock is poisoned.
    pub fn insert_catalog_entry(&self, entry: CatalogEntry) -> Result<(), StorageError> {
        lock(&self.catalog)?.push(entry);
        Ok(())
    }

    /// Seed raw records for a user, bypassing write rules.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if a lock is poisoned.
    pub fn insert_records(
        &self,
        user_id: &UserId,
        records: impl IntoIterator<Item = UserRecord>,
    ) -> Result<(), StorageError> {
        let mut guard = lock(&self.records)?;
        let entry = guard.entry(user_id.clone()).or_default();
        for record in records {
            entry.push(record);
        }
        Ok(())
    }

    /// Make every subsequent write fail with `StorageError::Rejected`.
    pub fn reject_writes(&self, reject: bool) {
        self.reject_writes.store(reject, Ordering::SeqCst);
    }

    /// Writes accepted so far, in arrival order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if a lock is poisoned.
    pub fn applied_actions(&self) -> Result<Vec<(UserId, UserAction)>, StorageError> {
        Ok(lock(&self.applied)?.clone())
    }

    /// # Errors
    ///
    /// Returns `StorageError::Connection` if a lock is poisoned.
    pub fn ingest_requests(&self) -> Result<Vec<IngestRequest>, StorageError> {
        Ok(lock(&self.ingested)?.clone())
    }
}

#[async_trait]
impl CatalogRepository for InMemoryRepository {
    async fn list_courses(&self) -> Result<Catalog, StorageError> {
        Ok(Catalog::new(lock(&self.catalog)?.clone()))
    }

    async fn get_course(&self, course_id: &CourseId) -> Result<CourseSnapshot, StorageError> {
        lock(&self.courses)?
            .get(course_id)
            .cloned()
            .ok_or(StorageError::NotFound)
    }
}

#[async_trait]
impl UserRecordRepository for InMemoryRepository {
    async fn get_records(&self, user_id: &UserId) -> Result<UserRecords, StorageError> {
        Ok(lock(&self.records)?
            .get(user_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn apply_action(
        &self,
        user_id: &UserId,
        action: &UserAction,
    ) -> Result<(), StorageError> {
        if self.reject_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Rejected(format!("{} refused", action.kind())));
        }

        {
            let mut guard = lock(&self.records)?;
            let records = guard.entry(user_id.clone()).or_default();
            apply_to_records(records, action);
        }
        lock(&self.applied)?.push((user_id.clone(), action.clone()));
        Ok(())
    }
}

#[async_trait]
impl IngestRepository for InMemoryRepository {
    async fn ingest_playlist(&self, request: &IngestRequest) -> Result<String, StorageError> {
        lock(&self.ingested)?.push(request.clone());
        Ok(format!("Imported {}", request.course_title))
    }
}

fn apply_to_records(records: &mut UserRecords, action: &UserAction) {
    match action {
        UserAction::Enroll {
            course_id,
            title,
            total_videos,
        } => {
            if !records.is_enrolled(course_id) {
                records.push(UserRecord::Enrollment(Enrollment {
                    course_id: course_id.clone(),
                    title: title.clone(),
                    total_videos: *total_videos,
                }));
            }
        }
        UserAction::Watch {
            course_id,
            video_id,
        } => {
            let known = records.watched().iter().any(|w| {
                w.course_id.as_ref() == Some(course_id) && &w.video_id == video_id
            });
            if !known {
                records.push(UserRecord::Watched(WatchRecord {
                    course_id: Some(course_id.clone()),
                    video_id: video_id.clone(),
                }));
            }
        }
        UserAction::Note {
            course_id,
            video_id,
            text,
        } => records.upsert_note(Note {
            course_id: course_id.clone(),
            video_id: video_id.clone(),
            text: text.clone(),
        }),
        UserAction::Bookmark {
            course_id, title, ..
        } => {
            if !records.bookmarked_courses().contains(course_id) {
                records.push(UserRecord::Bookmark(Bookmark {
                    course_id: course_id.clone(),
                    title: title.clone(),
                }));
            }
        }
        UserAction::RemoveBookmark { course_id } => records.remove_bookmark(course_id),
    }
}

/// Aggregates the remote-service repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub catalog: Arc<dyn CatalogRepository>,
    pub records: Arc<dyn UserRecordRepository>,
    pub ingest: Arc<dyn IngestRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        Self::from_in_memory(&InMemoryRepository::new())
    }

    /// Share one in-memory repository across every role.
    #[must_use]
    pub fn from_in_memory(repo: &InMemoryRepository) -> Self {
        let catalog: Arc<dyn CatalogRepository> = Arc::new(repo.clone());
        let records: Arc<dyn UserRecordRepository> = Arc::new(repo.clone());
        let ingest: Arc<dyn IngestRepository> = Arc::new(repo.clone());
        Self {
            catalog,
            records,
            ingest,
        }
    }
}

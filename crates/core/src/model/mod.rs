mod action;
mod catalog;
mod course;
mod identity;
mod ids;
mod record;

pub use action::{ActionKind, UserAction};
pub use catalog::{Catalog, CatalogEntry};
pub use course::{CourseSnapshot, LessonRef};
pub use identity::UserIdentity;
pub use ids::{CourseId, IdError, UserId, VideoId};
pub use record::{
    Bookmark, Enrollment, Note, RecordFields, RecordKey, RecordKeyError, UserRecord, UserRecords,
    WatchRecord,
};

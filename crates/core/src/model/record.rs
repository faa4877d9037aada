use std::collections::{HashMap, HashSet};
use std::str::FromStr;

use thiserror::Error;

use crate::error::Error;
use crate::model::ids::{CourseId, IdError, VideoId};

//
// ─── RECORD KEY ────────────────────────────────────────────────────────────────
//

const ENROLLMENT_PREFIX: &str = "COURSE";
const WATCHED_PREFIX: &str = "WATCHED";
const NOTE_PREFIX: &str = "NOTE";
const BOOKMARK_PREFIX: &str = "BOOKMARK";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum RecordKeyError {
    #[error("record key {0:?} has no segment after its prefix")]
    MissingSegment(String),
    #[error("record key {key:?}: {source}")]
    InvalidId {
        key: String,
        #[source]
        source: IdError,
    },
}

/// Composite sort key of a per-user record, distinguished by its kind prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordKey {
    /// `COURSE#<course>`
    Enrollment(CourseId),
    /// `WATCHED#…`; the suffix carries no information the record body lacks.
    Watched,
    /// `NOTE#<course>#<video>`
    Note { course_id: CourseId, video_id: VideoId },
    /// `BOOKMARK#<course>`
    Bookmark(CourseId),
    /// Any prefix this client does not understand.
    Other(String),
}

impl RecordKey {
    #[must_use]
    pub fn note(course_id: &CourseId, video_id: &VideoId) -> String {
        format!("{NOTE_PREFIX}#{course_id}#{video_id}")
    }
}

impl FromStr for RecordKey {
    type Err = RecordKeyError;

    fn from_str(key: &str) -> Result<Self, Self::Err> {
        let mut parts = key.split('#');
        let prefix = parts.next().unwrap_or_default();

        let mut segment = || {
            parts
                .next()
                .filter(|s| !s.trim().is_empty())
                .ok_or_else(|| RecordKeyError::MissingSegment(key.to_string()))
        };
        let invalid = |source: IdError| RecordKeyError::InvalidId {
            key: key.to_string(),
            source,
        };

        match prefix {
            ENROLLMENT_PREFIX => Ok(Self::Enrollment(
                CourseId::new(segment()?).map_err(invalid)?,
            )),
            WATCHED_PREFIX => Ok(Self::Watched),
            NOTE_PREFIX => {
                let course_id = CourseId::new(segment()?).map_err(invalid)?;
                let video_id = VideoId::new(segment()?).map_err(invalid)?;
                Ok(Self::Note {
                    course_id,
                    video_id,
                })
            }
            BOOKMARK_PREFIX => Ok(Self::Bookmark(
                CourseId::new(segment()?).map_err(invalid)?,
            )),
            other => Ok(Self::Other(other.to_string())),
        }
    }
}

//
// ─── RECORDS ───────────────────────────────────────────────────────────────────
//

/// Course enrollment held on the user's own record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enrollment {
    pub course_id: CourseId,
    pub title: String,
    /// Lesson count captured at enrollment time. Older records lack it.
    pub total_videos: Option<u32>,
}

/// "This lesson has been completed by this user."
///
/// Older records were written without a course identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchRecord {
    pub course_id: Option<CourseId>,
    pub video_id: VideoId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    pub course_id: CourseId,
    pub video_id: VideoId,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bookmark {
    pub course_id: CourseId,
    pub title: String,
}

/// Loose attribute bag read off a remote record before its kind is known.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordFields {
    pub video_id: Option<String>,
    pub course_id: Option<String>,
    pub title: Option<String>,
    pub total_videos: Option<u32>,
    pub note_text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserRecord {
    Enrollment(Enrollment),
    Watched(WatchRecord),
    Note(Note),
    Bookmark(Bookmark),
}

impl UserRecord {
    /// Interpret a remote record by its key prefix.
    ///
    /// Returns `Ok(None)` for record kinds this client ignores.
    ///
    /// # Errors
    ///
    /// Returns `Error::RecordKey` for malformed keys of a known kind and
    /// `Error::MissingField` / `Error::Id` for watch records without a usable
    /// video identifier.
    pub fn from_fields(key: &str, fields: RecordFields) -> Result<Option<Self>, Error> {
        let record = match key.parse::<RecordKey>()? {
            RecordKey::Enrollment(course_id) => Self::Enrollment(Enrollment {
                course_id,
                title: fields.title.unwrap_or_default(),
                total_videos: fields.total_videos,
            }),
            RecordKey::Watched => {
                let raw = fields.video_id.ok_or_else(|| Error::MissingField {
                    key: key.to_string(),
                    field: "VideoId",
                })?;
                Self::Watched(WatchRecord {
                    // A bad course id degrades to "unknown course" rather than
                    // dropping the whole record.
                    course_id: fields.course_id.and_then(|c| CourseId::new(c).ok()),
                    video_id: VideoId::new(raw)?,
                })
            }
            RecordKey::Note {
                course_id,
                video_id,
            } => Self::Note(Note {
                course_id,
                video_id,
                text: fields.note_text.unwrap_or_default(),
            }),
            RecordKey::Bookmark(course_id) => Self::Bookmark(Bookmark {
                course_id,
                title: fields.title.unwrap_or_default(),
            }),
            RecordKey::Other(_) => return Ok(None),
        };
        Ok(Some(record))
    }
}

//
// ─── USER RECORDS ──────────────────────────────────────────────────────────────
//

/// Everything the remote record store holds for one user, split by kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserRecords {
    enrollments: Vec<Enrollment>,
    watched: Vec<WatchRecord>,
    notes: Vec<Note>,
    bookmarks: Vec<Bookmark>,
}

impl UserRecords {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: UserRecord) {
        match record {
            UserRecord::Enrollment(e) => self.enrollments.push(e),
            UserRecord::Watched(w) => self.watched.push(w),
            UserRecord::Note(n) => self.notes.push(n),
            UserRecord::Bookmark(b) => self.bookmarks.push(b),
        }
    }

    #[must_use]
    pub fn enrollments(&self) -> &[Enrollment] {
        &self.enrollments
    }

    #[must_use]
    pub fn watched(&self) -> &[WatchRecord] {
        &self.watched
    }

    #[must_use]
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    #[must_use]
    pub fn bookmarks(&self) -> &[Bookmark] {
        &self.bookmarks
    }

    /// Video identifiers with a watch record, regardless of course.
    ///
    /// Lesson screens key watched-state by video alone, so records written
    /// without a course identifier still count here.
    #[must_use]
    pub fn watched_videos(&self) -> HashSet<VideoId> {
        self.watched.iter().map(|w| w.video_id.clone()).collect()
    }

    /// Note text per lesson for one course.
    #[must_use]
    pub fn notes_for_course(&self, course_id: &CourseId) -> HashMap<VideoId, String> {
        self.notes
            .iter()
            .filter(|n| &n.course_id == course_id)
            .map(|n| (n.video_id.clone(), n.text.clone()))
            .collect()
    }

    #[must_use]
    pub fn bookmarked_courses(&self) -> HashSet<CourseId> {
        self.bookmarks.iter().map(|b| b.course_id.clone()).collect()
    }

    #[must_use]
    pub fn is_enrolled(&self, course_id: &CourseId) -> bool {
        self.enrollments.iter().any(|e| &e.course_id == course_id)
    }

    /// Replace the note for the same lesson, or append a new one.
    pub fn upsert_note(&mut self, note: Note) {
        match self
            .notes
            .iter_mut()
            .find(|n| n.course_id == note.course_id && n.video_id == note.video_id)
        {
            Some(existing) => existing.text = note.text,
            None => self.notes.push(note),
        }
    }

    pub fn remove_bookmark(&mut self, course_id: &CourseId) {
        self.bookmarks.retain(|b| &b.course_id != course_id);
    }
}

impl FromIterator<UserRecord> for UserRecords {
    fn from_iter<I: IntoIterator<Item = UserRecord>>(iter: I) -> Self {
        let mut records = Self::new();
        for record in iter {
            records.push(record);
        }
        records
    }
}

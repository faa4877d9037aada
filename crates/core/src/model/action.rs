use std::fmt;

use crate::model::ids::{CourseId, VideoId};

/// Kind tag of a write sent to the remote record store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Enroll,
    Watch,
    Note,
    Bookmark,
    RemoveBookmark,
}

impl ActionKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ActionKind::Enroll => "ENROLL",
            ActionKind::Watch => "WATCH",
            ActionKind::Note => "NOTE",
            ActionKind::Bookmark => "BOOKMARK",
            ActionKind::RemoveBookmark => "REMOVE_BOOKMARK",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A typed write against the user's record store.
///
/// The remote service answers with success or failure only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserAction {
    Enroll {
        course_id: CourseId,
        title: String,
        total_videos: Option<u32>,
    },
    Watch {
        course_id: CourseId,
        video_id: VideoId,
    },
    Note {
        course_id: CourseId,
        video_id: VideoId,
        text: String,
    },
    Bookmark {
        course_id: CourseId,
        title: String,
        total_videos: Option<u32>,
    },
    RemoveBookmark {
        course_id: CourseId,
    },
}

impl UserAction {
    #[must_use]
    pub fn kind(&self) -> ActionKind {
        match self {
            UserAction::Enroll { .. } => ActionKind::Enroll,
            UserAction::Watch { .. } => ActionKind::Watch,
            UserAction::Note { .. } => ActionKind::Note,
            UserAction::Bookmark { .. } => ActionKind::Bookmark,
            UserAction::RemoveBookmark { .. } => ActionKind::RemoveBookmark,
        }
    }

    #[must_use]
    pub fn course_id(&self) -> &CourseId {
        match self {
            UserAction::Enroll { course_id, .. }
            | UserAction::Watch { course_id, .. }
            | UserAction::Note { course_id, .. }
            | UserAction::Bookmark { course_id, .. }
            | UserAction::RemoveBookmark { course_id } => course_id,
        }
    }

    #[must_use]
    pub fn video_id(&self) -> Option<&VideoId> {
        match self {
            UserAction::Watch { video_id, .. } | UserAction::Note { video_id, .. } => {
                Some(video_id)
            }
            _ => None,
        }
    }
}

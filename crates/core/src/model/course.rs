use crate::model::ids::{CourseId, VideoId};

//
// ─── LESSON ────────────────────────────────────────────────────────────────────
//

/// A single playable lesson within a course.
///
/// `position` is the zero-based place of the lesson in the course's watch
/// sequence and is assigned once when the snapshot is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LessonRef {
    video_id: VideoId,
    title: String,
    position: usize,
}

impl LessonRef {
    #[must_use]
    pub fn video_id(&self) -> &VideoId {
        &self.video_id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn position(&self) -> usize {
        self.position
    }
}

//
// ─── COURSE SNAPSHOT ───────────────────────────────────────────────────────────
//

/// A loaded course with its lessons in watch order.
///
/// The lesson order is fixed at construction; nothing mutates it afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseSnapshot {
    id: CourseId,
    title: String,
    lessons: Vec<LessonRef>,
}

impl CourseSnapshot {
    /// Build a snapshot from `(video, title)` pairs already in watch order.
    #[must_use]
    pub fn new(
        id: CourseId,
        title: impl Into<String>,
        lessons: impl IntoIterator<Item = (VideoId, String)>,
    ) -> Self {
        let lessons = lessons
            .into_iter()
            .enumerate()
            .map(|(position, (video_id, title))| LessonRef {
                video_id,
                title,
                position,
            })
            .collect();
        Self {
            id,
            title: title.into(),
            lessons,
        }
    }

    #[must_use]
    pub fn id(&self) -> &CourseId {
        &self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn lessons(&self) -> &[LessonRef] {
        &self.lessons
    }

    #[must_use]
    pub fn lesson_count(&self) -> usize {
        self.lessons.len()
    }

    #[must_use]
    pub fn first_lesson(&self) -> Option<&LessonRef> {
        self.lessons.first()
    }

    /// Find a lesson by its video identifier (first match wins).
    #[must_use]
    pub fn lesson(&self, video_id: &VideoId) -> Option<&LessonRef> {
        self.lessons.iter().find(|l| &l.video_id == video_id)
    }

    /// Resolve the lesson that follows `video_id` in watch order.
    ///
    /// Returns `None` when the lesson is last or is not part of this course.
    #[must_use]
    pub fn next_after(&self, video_id: &VideoId) -> Option<&LessonRef> {
        let index = self.lessons.iter().position(|l| &l.video_id == video_id)?;
        self.lessons.get(index + 1)
    }
}

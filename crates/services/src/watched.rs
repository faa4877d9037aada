//! Optimistic watched-lesson tracking for the open course.

use std::collections::HashSet;

use learn_core::model::{CourseId, UserAction, UserId, VideoId};
use tracing::debug;

use crate::sync::RemoteSync;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkOutcome {
    Recorded,
    AlreadyWatched,
}

/// Local watched set for one course.
///
/// A lesson is added to the set before its remote write is sent, and stays
/// there whether or not the write succeeds.
#[derive(Debug)]
pub struct WatchTracker {
    user_id: UserId,
    course_id: CourseId,
    watched: HashSet<VideoId>,
    sync: RemoteSync,
}

impl WatchTracker {
    #[must_use]
    pub fn new(
        user_id: UserId,
        course_id: CourseId,
        watched: HashSet<VideoId>,
        sync: RemoteSync,
    ) -> Self {
        Self {
            user_id,
            course_id,
            watched,
            sync,
        }
    }

    #[must_use]
    pub fn course_id(&self) -> &CourseId {
        &self.course_id
    }

    #[must_use]
    pub fn watched(&self) -> &HashSet<VideoId> {
        &self.watched
    }

    #[must_use]
    pub fn is_watched(&self, video_id: &VideoId) -> bool {
        self.watched.contains(video_id)
    }

    /// Record `video_id` as watched and send the write at most once.
    ///
    /// # Panics
    ///
    /// Panics if a new lesson is recorded outside a Tokio runtime.
    pub fn mark_watched(&mut self, video_id: &VideoId) -> MarkOutcome {
        if !self.watched.insert(video_id.clone()) {
            debug!(video = %video_id, "lesson already watched; no write sent");
            return MarkOutcome::AlreadyWatched;
        }
        self.sync.submit(
            &self.user_id,
            UserAction::Watch {
                course_id: self.course_id.clone(),
                video_id: video_id.clone(),
            },
        );
        MarkOutcome::Recorded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::SyncOutcome;
    use learn_core::time::fixed_clock;
    use std::sync::Arc;
    use storage::InMemoryRepository;

    fn tracker(repo: &InMemoryRepository, watched: &[&str]) -> (WatchTracker, RemoteSync) {
        let sync = RemoteSync::new(Arc::new(repo.clone()), fixed_clock());
        let watched = watched.iter().map(|v| VideoId::new(v).unwrap()).collect();
        let tracker = WatchTracker::new(
            UserId::new("ana").unwrap(),
            CourseId::new("rust").unwrap(),
            watched,
            sync.clone(),
        );
        (tracker, sync)
    }

    #[tokio::test]
    async fn second_mark_sends_nothing() {
        let repo = InMemoryRepository::new();
        let (mut tracker, sync) = tracker(&repo, &[]);
        let mut events = sync.subscribe();
        let video = VideoId::new("v1").unwrap();

        assert_eq!(tracker.mark_watched(&video), MarkOutcome::Recorded);
        assert_eq!(tracker.mark_watched(&video), MarkOutcome::AlreadyWatched);
        events.recv().await.unwrap();

        assert_eq!(repo.applied_actions().unwrap().len(), 1);
        assert!(tracker.is_watched(&video));
    }

    #[tokio::test]
    async fn previously_watched_lesson_is_not_resent() {
        let repo = InMemoryRepository::new();
        let (mut tracker, _sync) = tracker(&repo, &["v1"]);
        let outcome = tracker.mark_watched(&VideoId::new("v1").unwrap());
        assert_eq!(outcome, MarkOutcome::AlreadyWatched);
        tokio::task::yield_now().await;
        assert!(repo.applied_actions().unwrap().is_empty());
    }

    #[tokio::test]
    async fn failed_write_keeps_local_mark() {
        let repo = InMemoryRepository::new();
        repo.reject_writes(true);
        let (mut tracker, sync) = tracker(&repo, &[]);
        let mut events = sync.subscribe();
        let video = VideoId::new("v2").unwrap();

        tracker.mark_watched(&video);
        let event = events.recv().await.unwrap();

        assert!(matches!(event.outcome, SyncOutcome::Failed(_)));
        assert!(tracker.is_watched(&video));
    }
}

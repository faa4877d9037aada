use std::fmt;

use crate::model::{CourseSnapshot, LessonRef, VideoId};
use crate::playback::config::PlaybackConfig;
use crate::playback::player::{PlaybackPosition, PlayerError, PlayerSignal};

//
// ─── IDENTIFIERS & STATES ──────────────────────────────────────────────────────
//

/// Identity of one playback session; watchdog ticks are tagged with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(u64);

impl SessionId {
    #[must_use]
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    #[must_use]
    pub fn value(&self) -> u64 {
        self.0
    }

    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Interstitial shown on top of the player surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OverlayMode {
    None,
    Paused,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    /// Lesson activated, player has not reported anything yet.
    Starting,
    Playing,
    PausedOverlay,
    CompletedOverlay,
}

impl SessionState {
    #[must_use]
    pub fn overlay(self) -> OverlayMode {
        match self {
            SessionState::Starting | SessionState::Playing => OverlayMode::None,
            SessionState::PausedOverlay => OverlayMode::Paused,
            SessionState::CompletedOverlay => OverlayMode::Completed,
        }
    }
}

/// Side effect requested by a transition. The caller executes them in order.
#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackEffect {
    StartWatchdog(SessionId),
    StopWatchdog(SessionId),
    Play,
    Pause,
    SeekTo(f64),
    MarkWatched(VideoId),
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// Lifecycle of the active lesson.
///
/// Completion is sticky: once `CompletedOverlay` is reached only an explicit
/// replay leaves it, and `MarkWatched` is requested at most once no matter how
/// many completion paths fire.
#[derive(Debug, Clone)]
pub struct PlaybackSession {
    id: SessionId,
    lesson: LessonRef,
    next: Option<LessonRef>,
    state: SessionState,
    completion_emitted: bool,
    completion_threshold: f64,
}

impl PlaybackSession {
    /// Start a session for `lesson`, resolving its successor within `course`.
    #[must_use]
    pub fn new(
        id: SessionId,
        course: &CourseSnapshot,
        lesson: LessonRef,
        config: &PlaybackConfig,
    ) -> Self {
        let next = course.next_after(lesson.video_id()).cloned();
        Self {
            id,
            lesson,
            next,
            state: SessionState::Starting,
            completion_emitted: false,
            completion_threshold: config.completion_threshold().as_secs_f64(),
        }
    }

    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    #[must_use]
    pub fn lesson(&self) -> &LessonRef {
        &self.lesson
    }

    #[must_use]
    pub fn next_lesson(&self) -> Option<&LessonRef> {
        self.next.as_ref()
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    #[must_use]
    pub fn overlay(&self) -> OverlayMode {
        self.state.overlay()
    }

    /// True while the watchdog should be running.
    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.state == SessionState::Playing
    }

    #[must_use]
    pub fn completion_emitted(&self) -> bool {
        self.completion_emitted
    }

    /// Whether a watchdog tick tagged `tick` should be sampled at all.
    #[must_use]
    pub fn accepts_tick(&self, tick: SessionId) -> bool {
        tick == self.id && self.is_playing()
    }

    /// Apply a native player notification.
    pub fn on_signal(&mut self, signal: PlayerSignal) -> Vec<PlaybackEffect> {
        match (self.state, signal) {
            // Autoplay or a stray resume must not undo completion.
            (SessionState::CompletedOverlay, PlayerSignal::Playing) => vec![PlaybackEffect::Pause],
            (SessionState::CompletedOverlay, _) | (SessionState::Playing, PlayerSignal::Playing) => {
                Vec::new()
            }
            (_, PlayerSignal::Playing) => self.enter_playing(),
            (SessionState::Starting | SessionState::Playing, PlayerSignal::Paused) => {
                self.enter_paused()
            }
            (_, PlayerSignal::Ended) => self.complete(),
            _ => Vec::new(),
        }
    }

    /// Apply one watchdog reading taken for session `tick`.
    ///
    /// Failed reads and unusable positions are "no signal this tick".
    pub fn on_watchdog_sample(
        &mut self,
        tick: SessionId,
        sample: Result<PlaybackPosition, PlayerError>,
    ) -> Vec<PlaybackEffect> {
        if !self.accepts_tick(tick) {
            return Vec::new();
        }
        let near_end = sample
            .ok()
            .and_then(|position| position.remaining())
            .is_some_and(|remaining| remaining < self.completion_threshold);
        if near_end {
            self.complete()
        } else {
            Vec::new()
        }
    }

    /// User dismissed the pause overlay.
    pub fn resume(&mut self) -> Vec<PlaybackEffect> {
        if self.state != SessionState::PausedOverlay {
            return Vec::new();
        }
        self.state = SessionState::Playing;
        vec![PlaybackEffect::Play, PlaybackEffect::StartWatchdog(self.id)]
    }

    /// Restart a completed lesson from the beginning under a fresh id.
    ///
    /// The lesson stays recorded as watched, so completing it again does not
    /// request another `MarkWatched`.
    pub fn replay(&mut self, fresh: SessionId) -> Vec<PlaybackEffect> {
        if self.state != SessionState::CompletedOverlay {
            return Vec::new();
        }
        self.id = fresh;
        self.state = SessionState::Playing;
        vec![
            PlaybackEffect::SeekTo(0.0),
            PlaybackEffect::Play,
            PlaybackEffect::StartWatchdog(fresh),
        ]
    }

    /// User marked the lesson complete by hand.
    pub fn mark_complete(&mut self) -> Vec<PlaybackEffect> {
        if self.state == SessionState::CompletedOverlay {
            return Vec::new();
        }
        self.complete()
    }

    fn enter_playing(&mut self) -> Vec<PlaybackEffect> {
        self.state = SessionState::Playing;
        vec![PlaybackEffect::StartWatchdog(self.id)]
    }

    fn enter_paused(&mut self) -> Vec<PlaybackEffect> {
        let was_playing = self.is_playing();
        self.state = SessionState::PausedOverlay;
        if was_playing {
            vec![PlaybackEffect::StopWatchdog(self.id)]
        } else {
            Vec::new()
        }
    }

    fn complete(&mut self) -> Vec<PlaybackEffect> {
        let mut effects = Vec::with_capacity(3);
        if self.is_playing() {
            effects.push(PlaybackEffect::StopWatchdog(self.id));
        }
        self.state = SessionState::CompletedOverlay;
        effects.push(PlaybackEffect::Pause);
        if !self.completion_emitted {
            self.completion_emitted = true;
            effects.push(PlaybackEffect::MarkWatched(self.lesson.video_id().clone()));
        }
        effects
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use learn_core::model::{CourseId, CourseSnapshot, LessonRef, UserAction, UserIdentity, VideoId};
use learn_core::playback::{
    OverlayMode, PlaybackConfig, PlaybackEffect, PlaybackPosition, PlaybackSession, Player,
    PlayerError, PlayerSignal, SessionId,
};
use learn_core::progress::completion_percentage;
use storage::StorageError;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, warn};

use super::loader::{CourseLoader, LoadedCourse};
use super::watchdog::Watchdog;
use crate::sync::RemoteSync;
use crate::watched::{MarkOutcome, WatchTracker};

/// Identifies one course navigation; responses for older tickets are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct LoadTicket(u64);

impl LoadTicket {
    #[must_use]
    pub fn value(&self) -> u64 {
        self.0
    }

    fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

/// Input to [`PlaybackMonitor::handle`].
#[derive(Debug)]
pub enum MonitorEvent {
    Player(PlayerSignal),
    WatchdogTick(SessionId),
    CourseLoaded {
        ticket: LoadTicket,
        result: Result<LoadedCourse, StorageError>,
    },
}

pub type MonitorEvents = UnboundedReceiver<MonitorEvent>;

/// What the player view renders.
#[derive(Debug, Clone, PartialEq)]
pub struct MonitorView {
    pub course_id: Option<CourseId>,
    pub lesson: Option<LessonRef>,
    pub next_lesson: Option<LessonRef>,
    pub overlay: OverlayMode,
    pub watched: HashSet<VideoId>,
    /// Share of this course's lessons in `watched`.
    pub percentage: u8,
    pub note_draft: String,
}

struct ActiveCourse {
    snapshot: CourseSnapshot,
    tracker: WatchTracker,
    notes: HashMap<VideoId, String>,
    note_draft: String,
}

impl ActiveCourse {
    fn percentage(&self) -> u8 {
        let lessons = self.snapshot.lessons();
        let watched = lessons
            .iter()
            .filter(|lesson| self.tracker.is_watched(lesson.video_id()))
            .count();
        completion_percentage(
            u32::try_from(watched).unwrap_or(u32::MAX),
            u32::try_from(lessons.len()).unwrap_or(u32::MAX),
        )
    }
}

/// Drives playback of one course for one user.
///
/// Owns the active [`PlaybackSession`], runs its effects against the attached
/// player, and keeps at most one watchdog alive: the one tagged with the
/// current session id. Player signals, watchdog ticks and load results all
/// arrive through a single event channel and are applied in order by
/// [`handle`](Self::handle).
pub struct PlaybackMonitor {
    identity: UserIdentity,
    config: PlaybackConfig,
    loader: CourseLoader,
    sync: RemoteSync,
    events: UnboundedSender<MonitorEvent>,
    player: Option<Arc<dyn Player>>,
    navigation: LoadTicket,
    course: Option<ActiveCourse>,
    session: Option<PlaybackSession>,
    watchdog: Option<Watchdog>,
    last_session: SessionId,
}

impl PlaybackMonitor {
    #[must_use]
    pub fn new(
        identity: UserIdentity,
        config: PlaybackConfig,
        loader: CourseLoader,
        sync: RemoteSync,
    ) -> (Self, MonitorEvents) {
        let (events, receiver) = mpsc::unbounded_channel();
        let monitor = Self {
            identity,
            config,
            loader,
            sync,
            events,
            player: None,
            navigation: LoadTicket::default(),
            course: None,
            session: None,
            watchdog: None,
            last_session: SessionId::new(0),
        };
        (monitor, receiver)
    }

    /// Sender for player adapters that forward native state changes.
    #[must_use]
    pub fn sender(&self) -> UnboundedSender<MonitorEvent> {
        self.events.clone()
    }

    pub fn attach_player(&mut self, player: Arc<dyn Player>) {
        self.player = Some(player);
    }

    /// Navigate to a course and fetch it in the background.
    ///
    /// Playback of the previous course stops at once; the new course becomes
    /// active when its `CourseLoaded` event is handled.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn open_course(&mut self, course_id: CourseId) -> LoadTicket {
        let ticket = self.begin_navigation();
        let loader = self.loader.clone();
        let identity = self.identity.clone();
        let events = self.events.clone();
        info!(course = %course_id, ticket = ticket.value(), "opening course");
        tokio::spawn(async move {
            let result = loader.load(&identity, &course_id).await;
            let _ = events.send(MonitorEvent::CourseLoaded { ticket, result });
        });
        ticket
    }

    /// Invalidate any in-flight load and tear down the current course.
    pub fn begin_navigation(&mut self) -> LoadTicket {
        self.navigation = self.navigation.next();
        self.end_session();
        self.course = None;
        self.navigation
    }

    /// Wait for the next event and apply it. Returns `false` once the channel
    /// is closed.
    pub async fn handle_next(&mut self, events: &mut MonitorEvents) -> bool {
        match events.recv().await {
            Some(event) => {
                self.handle(event);
                true
            }
            None => false,
        }
    }

    pub fn handle(&mut self, event: MonitorEvent) {
        match event {
            MonitorEvent::Player(signal) => self.on_player_signal(signal),
            MonitorEvent::WatchdogTick(tick) => self.on_watchdog_tick(tick),
            MonitorEvent::CourseLoaded { ticket, result } => self.on_course_loaded(ticket, result),
        }
    }

    /// Switch to a lesson of the open course. Unknown ids and the active
    /// lesson itself are ignored.
    pub fn select_lesson(&mut self, video_id: &VideoId) -> bool {
        if self
            .session
            .as_ref()
            .is_some_and(|s| s.lesson().video_id() == video_id)
        {
            return false;
        }
        let Some(lesson) = self
            .course
            .as_ref()
            .and_then(|c| c.snapshot.lesson(video_id))
            .cloned()
        else {
            debug!(video = %video_id, "ignoring selection of unknown lesson");
            return false;
        };
        self.activate(lesson);
        true
    }

    /// Move to the lesson after the active one, if any.
    pub fn advance(&mut self) -> bool {
        let Some(next) = self.session.as_ref().and_then(|s| s.next_lesson()).cloned() else {
            return false;
        };
        self.activate(next);
        true
    }

    pub fn resume(&mut self) {
        if let Some(session) = self.session.as_mut() {
            let effects = session.resume();
            self.run_effects(effects);
        }
    }

    pub fn replay(&mut self) {
        if self.overlay() != OverlayMode::Completed {
            return;
        }
        let fresh = self.allocate_session();
        if let Some(session) = self.session.as_mut() {
            let effects = session.replay(fresh);
            self.run_effects(effects);
        }
    }

    /// Manual "mark as watched".
    pub fn mark_watched(&mut self) {
        if let Some(session) = self.session.as_mut() {
            let effects = session.mark_complete();
            self.run_effects(effects);
        }
    }

    pub fn set_note_draft(&mut self, text: impl Into<String>) {
        if let Some(course) = self.course.as_mut() {
            course.note_draft = text.into();
        }
    }

    /// Keep the draft as the active lesson's note and send it.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn save_note(&mut self) -> bool {
        let (Some(course), Some(session)) = (self.course.as_mut(), self.session.as_ref()) else {
            return false;
        };
        let video_id = session.lesson().video_id().clone();
        let text = course.note_draft.clone();
        course.notes.insert(video_id.clone(), text.clone());
        self.sync.submit(
            self.identity.user_id(),
            UserAction::Note {
                course_id: course.snapshot.id().clone(),
                video_id,
                text,
            },
        );
        true
    }

    #[must_use]
    pub fn overlay(&self) -> OverlayMode {
        self.session
            .as_ref()
            .map_or(OverlayMode::None, PlaybackSession::overlay)
    }

    #[must_use]
    pub fn session_id(&self) -> Option<SessionId> {
        self.session.as_ref().map(PlaybackSession::id)
    }

    #[must_use]
    pub fn active_lesson(&self) -> Option<&LessonRef> {
        self.session.as_ref().map(PlaybackSession::lesson)
    }

    #[must_use]
    pub fn is_watched(&self, video_id: &VideoId) -> bool {
        self.course
            .as_ref()
            .is_some_and(|c| c.tracker.is_watched(video_id))
    }

    /// Session id of the running watchdog, if one is running.
    #[must_use]
    pub fn watchdog_session(&self) -> Option<SessionId> {
        self.watchdog.as_ref().map(Watchdog::session)
    }

    #[must_use]
    pub fn view(&self) -> MonitorView {
        let course = self.course.as_ref();
        MonitorView {
            course_id: course.map(|c| c.snapshot.id().clone()),
            lesson: self.active_lesson().cloned(),
            next_lesson: self.session.as_ref().and_then(|s| s.next_lesson()).cloned(),
            overlay: self.overlay(),
            watched: course.map(|c| c.tracker.watched().clone()).unwrap_or_default(),
            percentage: course.map_or(0, ActiveCourse::percentage),
            note_draft: course.map(|c| c.note_draft.clone()).unwrap_or_default(),
        }
    }

    fn on_course_loaded(&mut self, ticket: LoadTicket, result: Result<LoadedCourse, StorageError>) {
        if ticket != self.navigation || self.course.is_some() {
            debug!(
                ticket = ticket.value(),
                current = self.navigation.value(),
                "discarding stale course load"
            );
            return;
        }
        let loaded = match result {
            Ok(loaded) => loaded,
            Err(err) => {
                warn!(%err, "course load failed");
                return;
            }
        };

        let tracker = WatchTracker::new(
            self.identity.user_id().clone(),
            loaded.course.id().clone(),
            loaded.watched,
            self.sync.clone(),
        );
        let first = loaded.course.first_lesson().cloned();
        info!(
            course = %loaded.course.id(),
            lessons = loaded.course.lesson_count(),
            "course ready"
        );
        self.course = Some(ActiveCourse {
            snapshot: loaded.course,
            tracker,
            notes: loaded.notes,
            note_draft: String::new(),
        });
        if let Some(first) = first {
            self.activate(first);
        }
    }

    fn on_player_signal(&mut self, signal: PlayerSignal) {
        let Some(session) = self.session.as_mut() else {
            debug!(?signal, "player signal with no active lesson");
            return;
        };
        let effects = session.on_signal(signal);
        self.run_effects(effects);
    }

    fn on_watchdog_tick(&mut self, tick: SessionId) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if !session.accepts_tick(tick) {
            debug!(%tick, current = %session.id(), "ignoring stale watchdog tick");
            return;
        }
        let sample = match &self.player {
            Some(player) => PlaybackPosition::sample(player.as_ref()),
            None => Err(PlayerError::NotReady),
        };
        if let Err(err) = &sample {
            debug!(%err, "position unavailable this tick");
        }
        let effects = session.on_watchdog_sample(tick, sample);
        if !effects.is_empty() {
            info!(session = %tick, "lesson near its end; completing");
        }
        self.run_effects(effects);
    }

    fn activate(&mut self, lesson: LessonRef) {
        self.end_session();
        let id = self.allocate_session();
        let Some(course) = self.course.as_mut() else {
            return;
        };
        course.note_draft = course
            .notes
            .get(lesson.video_id())
            .cloned()
            .unwrap_or_default();
        info!(session = %id, lesson = %lesson.video_id(), "lesson active");
        self.session = Some(PlaybackSession::new(
            id,
            &course.snapshot,
            lesson,
            &self.config,
        ));
    }

    fn end_session(&mut self) {
        self.end_watchdog();
        self.session = None;
    }

    fn allocate_session(&mut self) -> SessionId {
        self.last_session = self.last_session.next();
        self.last_session
    }

    fn run_effects(&mut self, effects: Vec<PlaybackEffect>) {
        for effect in effects {
            match effect {
                PlaybackEffect::StartWatchdog(session) => self.start_watchdog(session),
                PlaybackEffect::StopWatchdog(session) => {
                    if self.watchdog_session() == Some(session) {
                        self.end_watchdog();
                    }
                }
                PlaybackEffect::Play => self.command("play", |p| p.play()),
                PlaybackEffect::Pause => self.command("pause", |p| p.pause()),
                PlaybackEffect::SeekTo(seconds) => self.command("seek", |p| p.seek_to(seconds)),
                PlaybackEffect::MarkWatched(video_id) => self.record_watched(&video_id),
            }
        }
    }

    fn start_watchdog(&mut self, session: SessionId) {
        if self.watchdog_session() == Some(session) {
            return;
        }
        self.end_watchdog();
        self.watchdog = Some(Watchdog::spawn(
            session,
            self.config.watchdog_period(),
            self.events.clone(),
        ));
    }

    fn end_watchdog(&mut self) {
        if let Some(watchdog) = self.watchdog.take() {
            watchdog.stop();
        }
    }

    fn command(
        &self,
        name: &'static str,
        call: impl FnOnce(&dyn Player) -> Result<(), PlayerError>,
    ) {
        let Some(player) = self.player.as_deref() else {
            debug!(command = name, "no player attached");
            return;
        };
        if let Err(err) = call(player) {
            warn!(command = name, %err, "player command failed");
        }
    }

    fn record_watched(&mut self, video_id: &VideoId) {
        let Some(course) = self.course.as_mut() else {
            return;
        };
        if course.tracker.mark_watched(video_id) == MarkOutcome::Recorded {
            info!(video = %video_id, course = %course.snapshot.id(), "lesson watched");
        }
    }
}

impl fmt::Debug for PlaybackMonitor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlaybackMonitor")
            .field("user", self.identity.user_id())
            .field("navigation", &self.navigation)
            .field("session", &self.session_id())
            .field("watchdog", &self.watchdog_session())
            .field("player_attached", &self.player.is_some())
            .finish_non_exhaustive()
    }
}

use std::sync::{Arc, Mutex};
use std::time::Duration;

use learn_core::model::{
    CourseId, CourseSnapshot, UserAction, UserId, UserIdentity, UserRecord, VideoId, WatchRecord,
};
use learn_core::playback::{OverlayMode, PlaybackConfig, Player, PlayerError, PlayerSignal};
use learn_core::time::fixed_clock;
use services::{
    AppServices, MonitorEvent, MonitorEvents, PlaybackMonitor, SyncEvent, SyncOutcome,
};
use storage::{InMemoryRepository, Storage};
use tokio::sync::broadcast;
use tokio::time;

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Play,
    Pause,
    Seek(f64),
}

#[derive(Default)]
struct FakeState {
    current: f64,
    duration: f64,
    calls: Vec<Call>,
}

#[derive(Default)]
struct FakePlayer {
    state: Mutex<FakeState>,
}

impl FakePlayer {
    fn set_position(&self, current: f64, duration: f64) {
        let mut state = self.state.lock().unwrap();
        state.current = current;
        state.duration = duration;
    }

    fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }
}

impl Player for FakePlayer {
    fn current_time(&self) -> Result<f64, PlayerError> {
        Ok(self.state.lock().unwrap().current)
    }

    fn duration(&self) -> Result<f64, PlayerError> {
        Ok(self.state.lock().unwrap().duration)
    }

    fn play(&self) -> Result<(), PlayerError> {
        self.state.lock().unwrap().calls.push(Call::Play);
        Ok(())
    }

    fn pause(&self) -> Result<(), PlayerError> {
        self.state.lock().unwrap().calls.push(Call::Pause);
        Ok(())
    }

    fn seek_to(&self, seconds: f64) -> Result<(), PlayerError> {
        self.state.lock().unwrap().calls.push(Call::Seek(seconds));
        Ok(())
    }
}

struct Harness {
    repo: InMemoryRepository,
    monitor: PlaybackMonitor,
    events: MonitorEvents,
    player: Arc<FakePlayer>,
    sync: broadcast::Receiver<SyncEvent>,
}

fn course_id() -> CourseId {
    CourseId::new("rust").unwrap()
}

fn video(id: &str) -> VideoId {
    VideoId::new(id).unwrap()
}

fn user() -> UserId {
    UserId::new("ana").unwrap()
}

fn publish(repo: &InMemoryRepository, id: &str, lessons: &[&str]) {
    let lessons = lessons
        .iter()
        .map(|v| (video(v), format!("Lesson {v}")))
        .collect::<Vec<_>>();
    let total = u32::try_from(lessons.len()).unwrap();
    repo.publish_course(
        CourseSnapshot::new(CourseId::new(id).unwrap(), format!("Course {id}"), lessons),
        Some(total),
    )
    .unwrap();
}

async fn open(repo: InMemoryRepository) -> Harness {
    let services = AppServices::new(
        &Storage::from_in_memory(&repo),
        fixed_clock(),
        PlaybackConfig::default(),
    );
    let sync = services.sync_events();
    let (mut monitor, mut events) = services.playback_monitor(UserIdentity::new(user()));
    let player = Arc::new(FakePlayer::default());
    monitor.attach_player(player.clone());

    monitor.open_course(course_id());
    assert!(monitor.handle_next(&mut events).await);
    assert_eq!(monitor.active_lesson().unwrap().video_id(), &video("v1"));

    Harness {
        repo,
        monitor,
        events,
        player,
        sync,
    }
}

async fn open_default() -> Harness {
    let repo = InMemoryRepository::new();
    publish(&repo, "rust", &["v1", "v2", "v3"]);
    open(repo).await
}

fn watch_actions(repo: &InMemoryRepository) -> Vec<UserAction> {
    repo.applied_actions()
        .unwrap()
        .into_iter()
        .map(|(_, action)| action)
        .filter(|action| matches!(action, UserAction::Watch { .. }))
        .collect()
}

#[tokio::test(start_paused = true)]
async fn watchdog_completes_inside_threshold() {
    let mut h = open_default().await;
    h.player.set_position(281.0, 300.0);

    h.monitor.handle(MonitorEvent::Player(PlayerSignal::Playing));
    assert!(h.monitor.watchdog_session().is_some());
    assert!(h.monitor.handle_next(&mut h.events).await);

    assert_eq!(h.monitor.overlay(), OverlayMode::Completed);
    assert!(h.monitor.watchdog_session().is_none());
    assert!(h.player.calls().contains(&Call::Pause));
    assert!(h.monitor.is_watched(&video("v1")));
    assert_eq!(h.monitor.view().percentage, 33);

    let event = h.sync.recv().await.unwrap();
    assert_eq!(event.outcome, SyncOutcome::Confirmed);
    assert_eq!(
        watch_actions(&h.repo),
        vec![UserAction::Watch {
            course_id: course_id(),
            video_id: video("v1"),
        }]
    );
}

#[tokio::test(start_paused = true)]
async fn watchdog_waits_outside_threshold() {
    let mut h = open_default().await;
    h.player.set_position(270.0, 300.0);
    h.monitor.handle(MonitorEvent::Player(PlayerSignal::Playing));

    for _ in 0..2 {
        assert!(h.monitor.handle_next(&mut h.events).await);
        assert_eq!(h.monitor.overlay(), OverlayMode::None);
    }
    assert!(watch_actions(&h.repo).is_empty());

    h.player.set_position(285.0, 300.0);
    assert!(h.monitor.handle_next(&mut h.events).await);
    assert_eq!(h.monitor.overlay(), OverlayMode::Completed);
}

#[tokio::test(start_paused = true)]
async fn unknown_duration_never_completes() {
    let mut h = open_default().await;
    h.player.set_position(5.0, 0.0);
    h.monitor.handle(MonitorEvent::Player(PlayerSignal::Playing));

    for _ in 0..3 {
        assert!(h.monitor.handle_next(&mut h.events).await);
    }
    assert_eq!(h.monitor.overlay(), OverlayMode::None);
}

#[tokio::test(start_paused = true)]
async fn late_tick_from_previous_lesson_is_ignored() {
    let mut h = open_default().await;
    h.monitor.handle(MonitorEvent::Player(PlayerSignal::Playing));
    let old_session = h.monitor.watchdog_session().unwrap();

    // Let a tick land in the queue, then switch before it is handled.
    time::sleep(Duration::from_millis(1100)).await;
    h.player.set_position(295.0, 300.0);
    assert!(h.monitor.select_lesson(&video("v2")));

    assert!(h.monitor.handle_next(&mut h.events).await);
    assert_eq!(h.monitor.active_lesson().unwrap().video_id(), &video("v2"));
    assert_eq!(h.monitor.overlay(), OverlayMode::None);
    assert!(!h.monitor.is_watched(&video("v1")));
    assert!(!h.monitor.is_watched(&video("v2")));

    // The old watchdog is gone for good.
    time::sleep(Duration::from_secs(5)).await;
    assert!(h.events.try_recv().is_err());

    h.player.set_position(10.0, 300.0);
    h.monitor.handle(MonitorEvent::Player(PlayerSignal::Playing));
    let new_session = h.monitor.watchdog_session().unwrap();
    assert_ne!(new_session, old_session);

    time::sleep(Duration::from_millis(3500)).await;
    let mut ticks = 0;
    while let Ok(event) = h.events.try_recv() {
        assert!(matches!(event, MonitorEvent::WatchdogTick(id) if id == new_session));
        ticks += 1;
    }
    assert_eq!(ticks, 3);
    assert!(watch_actions(&h.repo).is_empty());
}

#[tokio::test(start_paused = true)]
async fn manual_mark_then_ended_sends_one_write() {
    let mut h = open_default().await;
    h.monitor.handle(MonitorEvent::Player(PlayerSignal::Playing));

    h.monitor.mark_watched();
    assert_eq!(h.monitor.overlay(), OverlayMode::Completed);
    h.monitor.mark_watched();
    h.monitor.handle(MonitorEvent::Player(PlayerSignal::Ended));

    h.sync.recv().await.unwrap();
    tokio::task::yield_now().await;
    assert_eq!(watch_actions(&h.repo).len(), 1);
}

#[tokio::test(start_paused = true)]
async fn completion_is_sticky_until_replay() {
    let mut h = open_default().await;
    h.monitor.handle(MonitorEvent::Player(PlayerSignal::Ended));
    assert_eq!(h.monitor.overlay(), OverlayMode::Completed);

    // Autoplay after completion is paused again.
    h.monitor.handle(MonitorEvent::Player(PlayerSignal::Playing));
    assert_eq!(h.monitor.overlay(), OverlayMode::Completed);
    assert_eq!(h.player.calls(), vec![Call::Pause, Call::Pause]);
    assert!(h.monitor.watchdog_session().is_none());

    h.monitor.resume();
    assert_eq!(h.monitor.overlay(), OverlayMode::Completed);

    h.monitor.replay();
    assert_eq!(h.monitor.overlay(), OverlayMode::None);
    assert_eq!(h.player.calls()[2..], [Call::Seek(0.0), Call::Play]);
    assert!(h.monitor.watchdog_session().is_some());

    h.player.set_position(299.0, 300.0);
    assert!(h.monitor.handle_next(&mut h.events).await);
    assert_eq!(h.monitor.overlay(), OverlayMode::Completed);

    h.sync.recv().await.unwrap();
    tokio::task::yield_now().await;
    assert_eq!(watch_actions(&h.repo).len(), 1);
}

#[tokio::test(start_paused = true)]
async fn pause_overlay_stops_and_resume_restarts_watchdog() {
    let mut h = open_default().await;
    h.monitor.handle(MonitorEvent::Player(PlayerSignal::Playing));
    h.monitor.handle(MonitorEvent::Player(PlayerSignal::Paused));

    assert_eq!(h.monitor.overlay(), OverlayMode::Paused);
    assert!(h.monitor.watchdog_session().is_none());

    h.monitor.resume();
    assert_eq!(h.monitor.overlay(), OverlayMode::None);
    assert_eq!(h.player.calls(), vec![Call::Play]);
    assert!(h.monitor.watchdog_session().is_some());
}

#[tokio::test(start_paused = true)]
async fn advance_moves_to_next_lesson_and_stops_at_end() {
    let mut h = open_default().await;
    assert_eq!(
        h.monitor.view().next_lesson.unwrap().video_id(),
        &video("v2")
    );

    assert!(h.monitor.advance());
    assert!(h.monitor.advance());
    assert_eq!(h.monitor.active_lesson().unwrap().video_id(), &video("v3"));
    assert!(h.monitor.view().next_lesson.is_none());
    assert!(!h.monitor.advance());
}

#[tokio::test(start_paused = true)]
async fn previously_watched_lesson_is_not_written_again() {
    let repo = InMemoryRepository::new();
    publish(&repo, "rust", &["v1", "v2"]);
    repo.insert_records(
        &user(),
        [UserRecord::Watched(WatchRecord {
            course_id: Some(course_id()),
            video_id: video("v1"),
        })],
    )
    .unwrap();
    let mut h = open(repo).await;
    assert!(h.monitor.is_watched(&video("v1")));

    h.monitor.handle(MonitorEvent::Player(PlayerSignal::Ended));
    assert_eq!(h.monitor.overlay(), OverlayMode::Completed);
    tokio::task::yield_now().await;
    assert!(watch_actions(&h.repo).is_empty());
    assert!(h.sync.try_recv().is_err());
}

#[tokio::test(start_paused = true)]
async fn failed_write_keeps_lesson_watched() {
    let repo = InMemoryRepository::new();
    publish(&repo, "rust", &["v1", "v2"]);
    repo.reject_writes(true);
    let mut h = open(repo).await;

    h.monitor.mark_watched();
    let event = h.sync.recv().await.unwrap();

    assert!(matches!(event.outcome, SyncOutcome::Failed(_)));
    assert!(h.monitor.is_watched(&video("v1")));
    assert_eq!(h.monitor.overlay(), OverlayMode::Completed);
}

#[tokio::test(start_paused = true)]
async fn note_draft_follows_the_active_lesson() {
    let mut h = open_default().await;
    h.monitor.set_note_draft("lifetimes");
    assert!(h.monitor.save_note());
    h.sync.recv().await.unwrap();

    h.monitor.select_lesson(&video("v2"));
    assert_eq!(h.monitor.view().note_draft, "");

    h.monitor.select_lesson(&video("v1"));
    assert_eq!(h.monitor.view().note_draft, "lifetimes");

    let applied = h.repo.applied_actions().unwrap();
    assert_eq!(
        applied[0].1,
        UserAction::Note {
            course_id: course_id(),
            video_id: video("v1"),
            text: "lifetimes".into(),
        }
    );
}

#[tokio::test(start_paused = true)]
async fn unknown_lesson_selection_is_ignored() {
    let mut h = open_default().await;
    let before = h.monitor.session_id();
    assert!(!h.monitor.select_lesson(&video("missing")));
    assert!(!h.monitor.select_lesson(&video("v1")));
    assert_eq!(h.monitor.session_id(), before);
}

#[tokio::test(start_paused = true)]
async fn only_the_latest_course_load_is_applied() {
    let repo = InMemoryRepository::new();
    publish(&repo, "rust", &["v1"]);
    publish(&repo, "go", &["g1", "g2"]);
    let mut h = open(repo).await;

    h.monitor.open_course(course_id());
    h.monitor.open_course(CourseId::new("go").unwrap());
    assert!(h.monitor.active_lesson().is_none());

    for _ in 0..2 {
        assert!(h.monitor.handle_next(&mut h.events).await);
    }
    let view = h.monitor.view();
    assert_eq!(view.course_id.unwrap().as_str(), "go");
    assert_eq!(view.lesson.unwrap().video_id(), &video("g1"));
}

#[tokio::test(start_paused = true)]
async fn missing_course_leaves_monitor_idle() {
    let mut h = open_default().await;
    h.monitor.open_course(CourseId::new("nope").unwrap());
    assert!(h.monitor.handle_next(&mut h.events).await);

    assert!(h.monitor.view().course_id.is_none());
    h.monitor.handle(MonitorEvent::Player(PlayerSignal::Playing));
    assert!(h.monitor.watchdog_session().is_none());
}

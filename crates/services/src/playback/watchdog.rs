use std::time::Duration;

use learn_core::playback::SessionId;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::debug;

use super::MonitorEvent;

/// Periodic tick source bound to one playback session.
///
/// Ticks carry the session id so a tick queued before a switch can be told
/// apart from the current session's. The task is aborted on drop.
#[derive(Debug)]
pub(crate) struct Watchdog {
    session: SessionId,
    task: JoinHandle<()>,
}

impl Watchdog {
    pub(crate) fn spawn(
        session: SessionId,
        period: Duration,
        events: UnboundedSender<MonitorEvent>,
    ) -> Self {
        let task = tokio::spawn(async move {
            let mut ticker = time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if events.send(MonitorEvent::WatchdogTick(session)).is_err() {
                    break;
                }
            }
        });
        debug!(%session, ?period, "watchdog started");
        Self { session, task }
    }

    pub(crate) fn session(&self) -> SessionId {
        self.session
    }

    pub(crate) fn stop(self) {
        drop(self);
    }
}

impl Drop for Watchdog {
    fn drop(&mut self) {
        self.task.abort();
        debug!(session = %self.session, "watchdog stopped");
    }
}

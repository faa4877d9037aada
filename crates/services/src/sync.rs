//! Best-effort delivery of user writes to the remote record store.
//!
//! Callers apply a change locally first and hand the write to [`RemoteSync`].
//! The write runs in the background; its outcome is published as a
//! [`SyncEvent`] and never fed back into local state.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use learn_core::Clock;
use learn_core::model::{UserAction, UserId};
use storage::UserRecordRepository;
use tokio::sync::broadcast;
use tracing::{debug, warn};

const SYNC_EVENT_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    Confirmed,
    Failed(String),
}

/// Result of one background write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncEvent {
    pub user_id: UserId,
    pub action: UserAction,
    pub outcome: SyncOutcome,
    pub finished_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct RemoteSync {
    records: Arc<dyn UserRecordRepository>,
    events: broadcast::Sender<SyncEvent>,
    clock: Clock,
}

impl RemoteSync {
    #[must_use]
    pub fn new(records: Arc<dyn UserRecordRepository>, clock: Clock) -> Self {
        let (events, _) = broadcast::channel(SYNC_EVENT_CAPACITY);
        Self {
            records,
            events,
            clock,
        }
    }

    /// Observe outcomes of writes submitted after this call.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SyncEvent> {
        self.events.subscribe()
    }

    /// Send `action` in the background and return immediately.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn submit(&self, user_id: &UserId, action: UserAction) {
        let records = Arc::clone(&self.records);
        let events = self.events.clone();
        let clock = self.clock;
        let user_id = user_id.clone();

        debug!(kind = %action.kind(), course = %action.course_id(), "queueing remote write");
        tokio::spawn(async move {
            let outcome = match records.apply_action(&user_id, &action).await {
                Ok(()) => SyncOutcome::Confirmed,
                Err(err) => {
                    warn!(
                        kind = %action.kind(),
                        course = %action.course_id(),
                        %err,
                        "remote write failed; local state kept"
                    );
                    SyncOutcome::Failed(err.to_string())
                }
            };
            // Nobody listening is fine.
            let _ = events.send(SyncEvent {
                user_id,
                action,
                outcome,
                finished_at: clock.now(),
            });
        });
    }
}

impl fmt::Debug for RemoteSync {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteSync")
            .field("subscribers", &self.events.receiver_count())
            .field("clock", &self.clock)
            .finish_non_exhaustive()
    }
}

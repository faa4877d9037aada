//! Single-lesson playback lifecycle.
//!
//! [`PlaybackSession`] is a plain state machine: it consumes player signals,
//! watchdog samples and user actions, and answers with the
//! [`PlaybackEffect`]s the caller must carry out. It performs no I/O and owns
//! no timers, so the services layer decides how the watchdog is scheduled.

mod config;
mod player;
mod session;

pub use config::PlaybackConfig;
pub use player::{Player, PlayerError, PlayerSignal, PlaybackPosition};
pub use session::{OverlayMode, PlaybackEffect, PlaybackSession, SessionId, SessionState};

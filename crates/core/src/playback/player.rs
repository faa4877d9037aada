use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum PlayerError {
    #[error("player is not ready")]
    NotReady,
    #[error("player call failed: {0}")]
    Failed(String),
}

/// Capability exposed by the embedded video player.
///
/// Implementations wrap an external surface, so every call may fail while the
/// player is loading or buffering. Reads may also return non-positive values
/// transiently.
pub trait Player: Send + Sync {
    /// Current playback position in seconds.
    ///
    /// # Errors
    ///
    /// Returns `PlayerError` if the position cannot be read right now.
    fn current_time(&self) -> Result<f64, PlayerError>;

    /// Total media duration in seconds; `0` while unknown.
    ///
    /// # Errors
    ///
    /// Returns `PlayerError` if the duration cannot be read right now.
    fn duration(&self) -> Result<f64, PlayerError>;

    /// # Errors
    ///
    /// Returns `PlayerError` if the player rejects the command.
    fn play(&self) -> Result<(), PlayerError>;

    /// # Errors
    ///
    /// Returns `PlayerError` if the player rejects the command.
    fn pause(&self) -> Result<(), PlayerError>;

    /// # Errors
    ///
    /// Returns `PlayerError` if the player rejects the command.
    fn seek_to(&self, seconds: f64) -> Result<(), PlayerError>;
}

/// State-change notification emitted by the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlayerSignal {
    Playing,
    Paused,
    Ended,
    Buffering,
    Other,
}

impl PlayerSignal {
    /// Map the numeric state codes used by common embeddable players
    /// (`0` ended, `1` playing, `2` paused, `3` buffering).
    #[must_use]
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => Self::Ended,
            1 => Self::Playing,
            2 => Self::Paused,
            3 => Self::Buffering,
            _ => Self::Other,
        }
    }
}

/// One watchdog reading of the player.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackPosition {
    pub current: f64,
    pub duration: f64,
}

impl PlaybackPosition {
    /// Read position and duration from the player in one go.
    ///
    /// # Errors
    ///
    /// Propagates the first failing read.
    pub fn sample(player: &dyn Player) -> Result<Self, PlayerError> {
        Ok(Self {
            current: player.current_time()?,
            duration: player.duration()?,
        })
    }

    /// Seconds left, or `None` while the reading is not usable.
    #[must_use]
    pub fn remaining(&self) -> Option<f64> {
        let usable = self.duration.is_finite()
            && self.duration > 0.0
            && self.current.is_finite()
            && self.current >= 0.0;
        usable.then(|| self.duration - self.current)
    }
}

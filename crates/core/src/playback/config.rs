use std::time::Duration;

const DEFAULT_WATCHDOG_PERIOD: Duration = Duration::from_secs(1);
const DEFAULT_COMPLETION_THRESHOLD: Duration = Duration::from_secs(20);

/// Timing knobs for the end-of-video watchdog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackConfig {
    watchdog_period: Duration,
    completion_threshold: Duration,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            watchdog_period: DEFAULT_WATCHDOG_PERIOD,
            completion_threshold: DEFAULT_COMPLETION_THRESHOLD,
        }
    }
}

impl PlaybackConfig {
    /// How often the watchdog samples the player while playing.
    ///
    /// A zero period is replaced by the default.
    #[must_use]
    pub fn with_watchdog_period(mut self, period: Duration) -> Self {
        self.watchdog_period = if period.is_zero() {
            DEFAULT_WATCHDOG_PERIOD
        } else {
            period
        };
        self
    }

    /// Remaining playback time under which a lesson counts as finished.
    #[must_use]
    pub fn with_completion_threshold(mut self, threshold: Duration) -> Self {
        self.completion_threshold = threshold;
        self
    }

    #[must_use]
    pub fn watchdog_period(&self) -> Duration {
        self.watchdog_period
    }

    #[must_use]
    pub fn completion_threshold(&self) -> Duration {
        self.completion_threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_nominal_timings() {
        let config = PlaybackConfig::default();
        assert_eq!(config.watchdog_period(), Duration::from_secs(1));
        assert_eq!(config.completion_threshold(), Duration::from_secs(20));
    }

    #[test]
    fn zero_period_keeps_default() {
        let config = PlaybackConfig::default().with_watchdog_period(Duration::ZERO);
        assert_eq!(config.watchdog_period(), Duration::from_secs(1));
    }
}

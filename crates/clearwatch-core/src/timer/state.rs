use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Gap-tolerance buffer absorbing poll-interval skew around activity ends.
pub const GAP_GRACE_BUFFER_SECS: i64 = 40;

/// How long a finished run keeps suppressing restarts in persistent mode.
pub const COMPLETION_GRACE_SECS: i64 = 3;

/// Shown after an explicit clear.
pub const CLEARED_LABEL: &str = "--:--:--";

const FAST_TICK: Duration = Duration::from_millis(16);
const SLOW_TICK: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerMode {
    /// Runs only while a trackable activity is reported.
    #[default]
    Default,
    /// Survives polling gaps and holds the final time after a completion.
    Persistent,
}

/// The observable timer state pushed to subscribers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerState {
    pub elapsed_label: String,
    pub elapsed_millis_label: String,
    pub is_running: bool,
    pub mode: TimerMode,
}

impl TimerState {
    pub fn idle(mode: TimerMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerConfig {
    pub mode: TimerMode,
    pub display_milliseconds: bool,
    /// Overrides the render cadence; `None` picks it from `display_milliseconds`.
    #[serde(default)]
    pub update_rate_hz: Option<u32>,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            mode: TimerMode::Default,
            display_milliseconds: true,
            update_rate_hz: None,
        }
    }
}

impl TimerConfig {
    pub fn new(mode: TimerMode, display_milliseconds: bool) -> Self {
        Self {
            mode,
            display_milliseconds,
            update_rate_hz: None,
        }
    }

    /// Interval between render ticks.
    pub fn tick_period(&self) -> Duration {
        match self.update_rate_hz {
            Some(hz) if hz > 0 => Duration::from_millis((1000 / u64::from(hz)).max(1)),
            _ if self.display_milliseconds => FAST_TICK,
            _ => SLOW_TICK,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cadence_follows_millisecond_display() {
        assert_eq!(TimerConfig::new(TimerMode::Default, true).tick_period(), FAST_TICK);
        assert_eq!(TimerConfig::new(TimerMode::Default, false).tick_period(), SLOW_TICK);
    }

    #[test]
    fn explicit_rate_wins() {
        let config = TimerConfig {
            update_rate_hz: Some(4),
            ..TimerConfig::default()
        };
        assert_eq!(config.tick_period(), Duration::from_millis(250));

        let absurd = TimerConfig {
            update_rate_hz: Some(5_000),
            ..TimerConfig::default()
        };
        assert_eq!(absurd.tick_period(), Duration::from_millis(1));
    }
}

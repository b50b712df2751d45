use std::time::Duration;

use crate::error::{non_zero, secs, ConfigError};

pub const DEFAULT_SLEEP_TIMEOUT: Duration = Duration::from_secs(1);
pub const DEFAULT_DEBOUNCE_WINDOW: Duration = Duration::from_millis(125);
pub const DEFAULT_HOLD_THRESHOLD: Duration = Duration::from_millis(750);

/// Keypad tunables. Every `with_*` validates, so a `Config` in hand is
/// always usable.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    pub(crate) sleep_enabled: bool,
    pub(crate) sleep_timeout: Duration,
    pub(crate) debounce_window: Duration,
    pub(crate) hold_threshold: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sleep_enabled: true,
            sleep_timeout: DEFAULT_SLEEP_TIMEOUT,
            debounce_window: DEFAULT_DEBOUNCE_WINDOW,
            hold_threshold: DEFAULT_HOLD_THRESHOLD,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sleep_enabled(mut self, enabled: bool) -> Self {
        self.sleep_enabled = enabled;
        self
    }

    pub fn with_sleep_timeout(mut self, timeout: Duration) -> Result<Self, ConfigError> {
        self.sleep_timeout = validate_sleep_timeout(timeout)?;
        Ok(self)
    }

    pub fn with_sleep_timeout_secs(self, timeout: f32) -> Result<Self, ConfigError> {
        self.with_sleep_timeout(secs("sleep_timeout", timeout)?)
    }

    /// A zero window disables debouncing.
    pub fn with_debounce_window(mut self, window: Duration) -> Self {
        self.debounce_window = window;
        self
    }

    pub fn with_debounce_window_secs(self, window: f32) -> Result<Self, ConfigError> {
        Ok(self.with_debounce_window(secs("debounce_window", window)?))
    }

    pub fn with_hold_threshold(mut self, threshold: Duration) -> Result<Self, ConfigError> {
        self.hold_threshold = validate_hold_threshold(threshold)?;
        Ok(self)
    }

    pub fn with_hold_threshold_secs(self, threshold: f32) -> Result<Self, ConfigError> {
        self.with_hold_threshold(secs("hold_threshold", threshold)?)
    }

    pub fn sleep_enabled(&self) -> bool {
        self.sleep_enabled
    }

    pub fn sleep_timeout(&self) -> Duration {
        self.sleep_timeout
    }

    pub fn debounce_window(&self) -> Duration {
        self.debounce_window
    }

    pub fn hold_threshold(&self) -> Duration {
        self.hold_threshold
    }
}

pub(crate) fn validate_sleep_timeout(timeout: Duration) -> Result<Duration, ConfigError> {
    non_zero("sleep_timeout", timeout)
}

pub(crate) fn validate_hold_threshold(threshold: Duration) -> Result<Duration, ConfigError> {
    non_zero("hold_threshold", threshold)
}

//! Idle dimming.
//!
//! After `timeout` without a press the coordinator saves what every LED shows
//! and blanks them all. The next press puts the saved colours back. The saved
//! colours only exist inside [`SleepState::Sleeping`], so they are taken
//! exactly once per sleep and can't be read while awake.

use std::{
    mem,
    time::{Duration, Instant},
};

use crate::{
    color::Rgb,
    config::{validate_sleep_timeout, DEFAULT_SLEEP_TIMEOUT},
    error::ConfigError,
    key::{Key, KEYPAD_SIZE},
};

#[derive(Clone, Debug, PartialEq)]
pub enum SleepState {
    Awake,
    Sleeping { saved: [Rgb; KEYPAD_SIZE] },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    FellAsleep,
    WokeUp,
}

pub struct SleepCoordinator {
    enabled: bool,
    timeout: Duration,
    last_press_time: Option<Instant>,
    state: SleepState,
}

impl SleepCoordinator {
    pub fn new(enabled: bool, timeout: Duration) -> Result<Self, ConfigError> {
        Ok(Self {
            enabled,
            timeout: validate_sleep_timeout(timeout)?,
            last_press_time: None,
            state: SleepState::Awake,
        })
    }

    /// Checks this cycle's key states. Runs after every key has been updated.
    ///
    /// A press wakes the keypad before the timeout is even looked at.
    pub fn run(&mut self, keys: &mut [Key; KEYPAD_SIZE], now: Instant) -> Option<Transition> {
        if keys.iter().any(Key::is_pressed) {
            self.last_press_time = Some(now);
            return if self.wake(keys) {
                Some(Transition::WokeUp)
            } else {
                None
            };
        }

        // The idle clock starts on the first cycle seen.
        let last_press = *self.last_press_time.get_or_insert(now);
        let idle = now.saturating_duration_since(last_press);
        if !self.is_sleeping() && idle > self.timeout {
            self.sleep(keys);
            return Some(Transition::FellAsleep);
        }
        None
    }

    fn sleep(&mut self, keys: &mut [Key; KEYPAD_SIZE]) {
        let mut saved = [Rgb::BLACK; KEYPAD_SIZE];
        for (slot, key) in saved.iter_mut().zip(keys.iter_mut()) {
            if key.is_lit() {
                *slot = key.color();
            }
            key.led_off();
        }
        self.state = SleepState::Sleeping { saved };
    }

    /// Restores the saved colours. Returns false if there was nothing to wake.
    pub fn wake(&mut self, keys: &mut [Key; KEYPAD_SIZE]) -> bool {
        match mem::replace(&mut self.state, SleepState::Awake) {
            SleepState::Sleeping { saved } => {
                for (key, rgb) in keys.iter_mut().zip(saved.iter()) {
                    key.set_rgb(*rgb);
                }
                true
            }
            SleepState::Awake => false,
        }
    }

    pub fn state(&self) -> &SleepState {
        &self.state
    }

    pub fn is_sleeping(&self) -> bool {
        matches!(self.state, SleepState::Sleeping { .. })
    }

    pub fn saved_illumination(&self) -> Option<&[Rgb; KEYPAD_SIZE]> {
        match &self.state {
            SleepState::Sleeping { saved } => Some(saved),
            SleepState::Awake => None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    // Re-enabling restarts the idle clock.
    pub fn set_enabled(&mut self, enabled: bool) {
        if enabled && !self.enabled {
            self.last_press_time = None;
        }
        self.enabled = enabled;
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn set_timeout(&mut self, timeout: Duration) -> Result<(), ConfigError> {
        self.timeout = validate_sleep_timeout(timeout)?;
        Ok(())
    }

    pub(crate) fn configure_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    pub fn last_press_time(&self) -> Option<Instant> {
        self.last_press_time
    }
}

impl Default for SleepCoordinator {
    fn default() -> Self {
        Self {
            enabled: true,
            timeout: DEFAULT_SLEEP_TIMEOUT,
            last_press_time: None,
            state: SleepState::Awake,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::{SleepCoordinator, SleepState, Transition};
    use crate::{
        color::Rgb,
        key::{Key, KEYPAD_SIZE},
    };

    fn keys() -> [Key; KEYPAD_SIZE] {
        std::array::from_fn(Key::new)
    }

    #[test]
    fn falls_asleep_test() {
        let mut sleep = SleepCoordinator::default();
        let mut keys = keys();
        keys[2].set_led(1, 2, 3);
        keys[9].set_led(200, 0, 0);
        keys[9].led_off();

        let t0 = Instant::now();
        assert_eq!(sleep.run(&mut keys, t0), None);
        assert_eq!(sleep.run(&mut keys, t0 + Duration::from_secs(1)), None);
        assert_eq!(
            sleep.run(&mut keys, t0 + Duration::from_millis(1001)),
            Some(Transition::FellAsleep)
        );

        assert!(keys.iter().all(|key| key.output() == Rgb::BLACK));
        let saved = sleep.saved_illumination().expect("asleep");
        assert_eq!(saved[2], Rgb::new(1, 2, 3));
        // Keys that were off are saved as black
        assert_eq!(saved[9], Rgb::BLACK);

        // Stays asleep
        assert_eq!(sleep.run(&mut keys, t0 + Duration::from_secs(5)), None);
        assert!(sleep.is_sleeping());
    }

    #[test]
    fn press_wakes_test() {
        let mut sleep = SleepCoordinator::default();
        let mut keys = keys();
        keys[0].set_led(0, 0, 9);

        let t0 = Instant::now();
        sleep.run(&mut keys, t0);
        sleep.run(&mut keys, t0 + Duration::from_secs(2));
        assert!(sleep.is_sleeping());

        let t1 = t0 + Duration::from_secs(60);
        keys[7].update(true, t1);
        assert_eq!(sleep.run(&mut keys, t1), Some(Transition::WokeUp));
        assert_eq!(sleep.state(), &SleepState::Awake);
        assert!(sleep.saved_illumination().is_none());
        assert_eq!(keys[0].output(), Rgb::new(0, 0, 9));
        assert_eq!(sleep.last_press_time(), Some(t1));

        // Held keys keep it awake
        assert_eq!(sleep.run(&mut keys, t1 + Duration::from_secs(3)), None);
        assert!(!sleep.is_sleeping());
    }

    #[test]
    fn wake_when_awake_test() {
        let mut sleep = SleepCoordinator::default();
        let mut keys = keys();
        assert!(!sleep.wake(&mut keys));
    }

    #[test]
    fn reenable_restarts_clock_test() {
        let mut sleep = SleepCoordinator::default();
        let mut keys = keys();
        let t0 = Instant::now();
        sleep.run(&mut keys, t0);

        sleep.set_enabled(false);
        sleep.set_enabled(true);
        assert_eq!(sleep.last_press_time(), None);
        assert_eq!(sleep.run(&mut keys, t0 + Duration::from_secs(10)), None);
    }

    #[test]
    fn timeout_validation_test() {
        assert!(SleepCoordinator::new(true, Duration::ZERO).is_err());
        let mut sleep = SleepCoordinator::new(true, Duration::from_millis(500)).expect("valid");
        assert!(sleep.set_timeout(Duration::ZERO).is_err());
        assert_eq!(sleep.timeout(), Duration::from_millis(500));
    }
}

use std::time::{Duration, Instant};

use crate::{
    bus::{key_pressed, KeypadBus},
    color::Rgb,
    config::Config,
    error::{ConfigError, KeypadError},
    key::{Key, KEYPAD_SIZE},
    sleep::{SleepCoordinator, Transition},
};

/// The 16 keys, their LEDs, and the bus they sit behind.
///
/// Call [`Keypad::update`] once per loop iteration. Within a call the mask
/// is read first, then every key is updated (firing handlers), then the sleep
/// coordinator runs, then changed LEDs are written out.
pub struct Keypad<B: KeypadBus> {
    bus: B,
    keys: [Key; KEYPAD_SIZE],
    sleep: SleepCoordinator,
}

impl<B: KeypadBus> Keypad<B> {
    pub fn new(bus: B) -> Self {
        Self {
            bus,
            keys: std::array::from_fn(Key::new),
            sleep: SleepCoordinator::default(),
        }
    }

    pub fn with_config(bus: B, config: Config) -> Self {
        let mut keypad = Self::new(bus);
        keypad.apply(&config);
        keypad
    }

    fn apply(&mut self, config: &Config) {
        for key in self.keys.iter_mut() {
            key.set_debounce_window(config.debounce_window);
            key.configure_hold_threshold(config.hold_threshold);
        }
        self.sleep.set_enabled(config.sleep_enabled);
        self.sleep.configure_timeout(config.sleep_timeout);
    }

    /// Runs one poll cycle at `now`.
    ///
    /// A failed read returns before any key is touched, so the previous
    /// cycle's states stay valid.
    pub fn update(&mut self, now: Instant) -> Result<(), KeypadError<B::Error>> {
        let mask = self.bus.read_raw_key_mask().map_err(|err| {
            log::warn!("Error reading the key mask: {err:?}");
            KeypadError::Read(err)
        })?;

        for (index, key) in self.keys.iter_mut().enumerate() {
            key.update(key_pressed(mask, index), now);
        }

        if self.sleep.is_enabled() {
            match self.sleep.run(&mut self.keys, now) {
                Some(Transition::FellAsleep) => log::debug!("No presses, LEDs asleep"),
                Some(Transition::WokeUp) => log::debug!("Key pressed, LEDs restored"),
                None => (),
            }
        }

        self.flush()
    }

    /// Writes every LED whose colour changed since it was last written.
    ///
    /// Needed after changing LEDs through [`Keypad::key_mut`]; the keypad
    /// level LED calls flush on their own.
    pub fn flush(&mut self) -> Result<(), KeypadError<B::Error>> {
        for (index, key) in self.keys.iter_mut().enumerate() {
            if let Some(rgb) = key.pending_output() {
                self.bus.write_led(index, rgb).map_err(|source| {
                    log::warn!("Error writing LED {index}: {source:?}");
                    KeypadError::WriteLed { index, source }
                })?;
                key.mark_written();
            }
        }
        Ok(())
    }

    // Illumination

    /// Sets one key's LED. While asleep the LED is turned off instead.
    pub fn set_led(
        &mut self,
        index: usize,
        r: u8,
        g: u8,
        b: u8,
    ) -> Result<(), KeypadError<B::Error>> {
        let sleeping = self.sleep.is_sleeping();
        let key = self.key_at(index)?;
        if sleeping {
            key.led_off();
        } else {
            key.set_led(r, g, b);
        }
        self.flush()
    }

    pub fn set_all(&mut self, r: u8, g: u8, b: u8) -> Result<(), KeypadError<B::Error>> {
        let sleeping = self.sleep.is_sleeping();
        for key in self.keys.iter_mut() {
            if sleeping {
                key.led_off();
            } else {
                key.set_led(r, g, b);
            }
        }
        self.flush()
    }

    pub fn clear_all(&mut self) -> Result<(), KeypadError<B::Error>> {
        for key in self.keys.iter_mut() {
            key.led_off();
        }
        self.flush()
    }

    // Queries

    pub fn get_states(&self) -> [bool; KEYPAD_SIZE] {
        let mut states = [false; KEYPAD_SIZE];
        for (state, key) in states.iter_mut().zip(self.keys.iter()) {
            *state = key.is_pressed();
        }
        states
    }

    pub fn get_pressed(&self) -> Vec<usize> {
        self.keys
            .iter()
            .filter(|key| key.is_pressed())
            .map(Key::index)
            .collect()
    }

    pub fn any_pressed(&self) -> bool {
        self.keys.iter().any(Key::is_pressed)
    }

    pub fn none_pressed(&self) -> bool {
        !self.any_pressed()
    }

    // Keys and handlers

    pub fn key(&self, index: usize) -> Option<&Key> {
        self.keys.get(index)
    }

    pub fn key_mut(&mut self, index: usize) -> Option<&mut Key> {
        self.keys.get_mut(index)
    }

    fn key_at(&mut self, index: usize) -> Result<&mut Key, KeypadError<B::Error>> {
        self.keys
            .get_mut(index)
            .ok_or(KeypadError::InvalidIndex(index))
    }

    pub fn keys(&self) -> &[Key; KEYPAD_SIZE] {
        &self.keys
    }

    pub fn on_press<F>(
        &mut self,
        index: usize,
        mode: &str,
        handler: F,
    ) -> Result<(), KeypadError<B::Error>>
    where
        F: FnMut(&mut Key) + 'static,
    {
        self.key_at(index)?.on_press(mode, handler);
        Ok(())
    }

    pub fn on_release<F>(
        &mut self,
        index: usize,
        mode: &str,
        handler: F,
    ) -> Result<(), KeypadError<B::Error>>
    where
        F: FnMut(&mut Key) + 'static,
    {
        self.key_at(index)?.on_release(mode, handler);
        Ok(())
    }

    pub fn on_hold<F>(
        &mut self,
        index: usize,
        mode: &str,
        handler: F,
    ) -> Result<(), KeypadError<B::Error>>
    where
        F: FnMut(&mut Key) + 'static,
    {
        self.key_at(index)?.on_hold(mode, handler);
        Ok(())
    }

    /// Switches every key to `mode`, effective from the next update.
    pub fn set_mode(&mut self, mode: &str) {
        for key in self.keys.iter_mut() {
            key.set_mode(mode);
        }
    }

    // Sleep

    pub fn is_sleeping(&self) -> bool {
        self.sleep.is_sleeping()
    }

    pub fn saved_illumination(&self) -> Option<&[Rgb; KEYPAD_SIZE]> {
        self.sleep.saved_illumination()
    }

    pub fn sleep_enabled(&self) -> bool {
        self.sleep.is_enabled()
    }

    /// Disabling sleep while asleep wakes the keypad right away.
    pub fn set_sleep_enabled(&mut self, enabled: bool) -> Result<(), KeypadError<B::Error>> {
        self.sleep.set_enabled(enabled);
        if !enabled && self.sleep.wake(&mut self.keys) {
            log::debug!("Sleep disabled, LEDs restored");
            self.flush()?;
        }
        Ok(())
    }

    pub fn sleep_timeout(&self) -> Duration {
        self.sleep.timeout()
    }

    pub fn set_sleep_timeout(&mut self, timeout: Duration) -> Result<(), ConfigError> {
        self.sleep.set_timeout(timeout)
    }

    pub fn last_press_time(&self) -> Option<Instant> {
        self.sleep.last_press_time()
    }

    pub fn time_since_last_press(&self, now: Instant) -> Option<Duration> {
        self.sleep
            .last_press_time()
            .map(|last| now.saturating_duration_since(last))
    }

    // Per key timing, applied to all keys

    pub fn set_debounce_window(&mut self, window: Duration) {
        for key in self.keys.iter_mut() {
            key.set_debounce_window(window);
        }
    }

    pub fn set_hold_threshold(&mut self, threshold: Duration) -> Result<(), ConfigError> {
        for key in self.keys.iter_mut() {
            key.set_hold_threshold(threshold)?;
        }
        Ok(())
    }

    // Bus

    pub fn bus(&self) -> &B {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }
}

use std::{
    rc::Rc,
    time::{Duration, Instant},
};

use crate::{
    color::Rgb,
    config::{validate_hold_threshold, DEFAULT_DEBOUNCE_WINDOW, DEFAULT_HOLD_THRESHOLD},
    error::{secs, ConfigError},
    handlers::{Event, Handlers, DEFAULT_MODE},
};

// Layout
pub const KEYPAD_COLUMNS: usize = 4;
pub const KEYPAD_ROWS: usize = 4;
pub const KEYPAD_SIZE: usize = KEYPAD_COLUMNS * KEYPAD_ROWS;

#[inline]
pub fn xy_to_index(x: usize, y: usize) -> usize {
    x + y * KEYPAD_COLUMNS
}

#[inline]
pub fn index_to_xy(index: usize) -> (usize, usize) {
    (index % KEYPAD_COLUMNS, index / KEYPAD_COLUMNS)
}

/// One button and the LED underneath it.
///
/// Input state only changes inside [`Key::update`]. LED calls change what the
/// key wants to show; the owning keypad pushes that to the bus when it
/// flushes.
pub struct Key {
    index: usize,
    // Input
    is_pressed: bool,
    was_pressed: bool,
    locked: bool,
    last_transition_time: Option<Instant>,
    time_since_last_transition: Option<Duration>,
    held_duration: Duration,
    is_held: bool,
    press_fired: bool,
    hold_fired: bool,
    debounce_window: Duration,
    hold_threshold: Duration,
    mode: Rc<str>,
    modifier: bool,
    handlers: Handlers,
    // Illumination
    illumination_color: Rgb,
    is_lit: bool,
    output: Rgb,
    pending: bool,
}

impl Key {
    pub fn new(index: usize) -> Self {
        Self {
            index,
            is_pressed: false,
            was_pressed: false,
            locked: false,
            last_transition_time: None,
            time_since_last_transition: None,
            held_duration: Duration::ZERO,
            is_held: false,
            press_fired: false,
            hold_fired: false,
            debounce_window: DEFAULT_DEBOUNCE_WINDOW,
            hold_threshold: DEFAULT_HOLD_THRESHOLD,
            mode: Rc::from(DEFAULT_MODE),
            modifier: false,
            handlers: Handlers::default(),
            illumination_color: Rgb::BLACK,
            is_lit: false,
            output: Rgb::BLACK,
            // Blank the LED on the first flush
            pending: true,
        }
    }

    /// Advances the key by one poll cycle.
    ///
    /// Handlers fire from in here, with the key itself as argument. All
    /// lookups of this cycle use the mode the key had on entry.
    pub fn update(&mut self, current_state: bool, now: Instant) {
        let mode = Rc::clone(&self.mode);

        self.time_since_last_transition = self
            .last_transition_time
            .map(|last| now.saturating_duration_since(last));
        self.locked = matches!(
            self.time_since_last_transition,
            Some(elapsed) if elapsed < self.debounce_window
        );

        self.is_pressed = current_state;

        if self.is_pressed
            && !self.press_fired
            && !self.locked
            && self.handlers.press.contains(&mode)
        {
            self.dispatch(Event::Press, &mode);
            self.press_fired = true;
        }

        // Checked against the previous cycle, before `was_pressed` moves on.
        if !self.is_pressed && self.was_pressed {
            self.dispatch(Event::Release, &mode);
            self.press_fired = false;
        }

        if !self.is_pressed {
            self.held_duration = Duration::ZERO;
            self.was_pressed = false;
        } else if !self.was_pressed {
            self.last_transition_time = Some(now);
            self.was_pressed = true;
        } else if let Some(last) = self.last_transition_time {
            self.held_duration = now.saturating_duration_since(last);
        }

        if self.held_duration > self.hold_threshold {
            self.is_held = true;
            if !self.hold_fired {
                self.dispatch(Event::Hold, &mode);
                self.hold_fired = true;
            }
        } else {
            self.is_held = false;
            self.hold_fired = false;
        }
    }

    fn dispatch(&mut self, event: Event, mode: &str) {
        if let Some(mut handler) = self.handlers.table_mut(event).take(mode) {
            log::trace!("key {}: {:?} handler for mode {:?}", self.index, event, mode);
            handler(self);
            self.handlers.table_mut(event).put_back(mode, handler);
        }
    }

    // Handlers

    pub fn on_press<F: FnMut(&mut Key) + 'static>(&mut self, mode: &str, handler: F) {
        self.handlers.press.insert(mode, Box::new(handler));
    }

    pub fn on_release<F: FnMut(&mut Key) + 'static>(&mut self, mode: &str, handler: F) {
        self.handlers.release.insert(mode, Box::new(handler));
    }

    pub fn on_hold<F: FnMut(&mut Key) + 'static>(&mut self, mode: &str, handler: F) {
        self.handlers.hold.insert(mode, Box::new(handler));
    }

    // Illumination

    pub fn set_led(&mut self, r: u8, g: u8, b: u8) {
        self.set_rgb(Rgb::new(r, g, b))
    }

    /// Shows `rgb`. Black turns the LED off without forgetting the colour
    /// `led_on` and `toggle_led` come back to.
    pub fn set_rgb(&mut self, rgb: Rgb) {
        if rgb.is_black() {
            self.is_lit = false;
        } else {
            self.is_lit = true;
            self.illumination_color = rgb;
        }
        self.show(rgb);
    }

    pub fn led_on(&mut self) {
        self.set_rgb(self.illumination_color)
    }

    pub fn led_off(&mut self) {
        self.set_rgb(Rgb::BLACK)
    }

    pub fn led_state(&mut self, on: bool) {
        if on {
            self.led_on()
        } else {
            self.led_off()
        }
    }

    /// Flips the LED. A given colour replaces the remembered one first.
    pub fn toggle_led(&mut self, rgb: Option<Rgb>) {
        if let Some(rgb) = rgb {
            self.illumination_color = rgb;
        }
        if self.is_lit {
            self.led_off()
        } else {
            self.led_on()
        }
    }

    fn show(&mut self, rgb: Rgb) {
        if self.output != rgb {
            self.output = rgb;
            self.pending = true;
        }
    }

    pub(crate) fn pending_output(&self) -> Option<Rgb> {
        if self.pending {
            Some(self.output)
        } else {
            None
        }
    }

    pub(crate) fn mark_written(&mut self) {
        self.pending = false;
    }

    // Accessors

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn xy(&self) -> (usize, usize) {
        index_to_xy(self.index)
    }

    pub fn is_pressed(&self) -> bool {
        self.is_pressed
    }

    pub fn is_held(&self) -> bool {
        self.is_held
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn held_duration(&self) -> Duration {
        self.held_duration
    }

    pub fn last_transition_time(&self) -> Option<Instant> {
        self.last_transition_time
    }

    pub fn time_since_last_transition(&self) -> Option<Duration> {
        self.time_since_last_transition
    }

    pub fn mode(&self) -> &str {
        &self.mode
    }

    /// Picks the handler set used from the next update on.
    pub fn set_mode(&mut self, mode: &str) {
        if *self.mode != *mode {
            self.mode = Rc::from(mode);
        }
    }

    pub fn is_modifier(&self) -> bool {
        self.modifier
    }

    pub fn set_modifier(&mut self, modifier: bool) {
        self.modifier = modifier;
    }

    pub fn is_lit(&self) -> bool {
        self.is_lit
    }

    pub fn color(&self) -> Rgb {
        self.illumination_color
    }

    pub fn output(&self) -> Rgb {
        self.output
    }

    pub fn debounce_window(&self) -> Duration {
        self.debounce_window
    }

    pub fn set_debounce_window(&mut self, window: Duration) {
        self.debounce_window = window;
    }

    pub fn set_debounce_window_secs(&mut self, window: f32) -> Result<(), ConfigError> {
        self.debounce_window = secs("debounce_window", window)?;
        Ok(())
    }

    pub fn hold_threshold(&self) -> Duration {
        self.hold_threshold
    }

    pub fn set_hold_threshold(&mut self, threshold: Duration) -> Result<(), ConfigError> {
        self.hold_threshold = validate_hold_threshold(threshold)?;
        Ok(())
    }

    // Only for values already validated through `Config`.
    pub(crate) fn configure_hold_threshold(&mut self, threshold: Duration) {
        self.hold_threshold = threshold;
    }

    pub fn set_hold_threshold_secs(&mut self, threshold: f32) -> Result<(), ConfigError> {
        self.set_hold_threshold(secs("hold_threshold", threshold)?)
    }
}

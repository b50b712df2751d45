//! Driver core for a 4x4 RGB backlit keypad.
//!
//! The hardware is reached through [`KeypadBus`]: one read returning all 16
//! switch states as an active-low mask, and single LED writes. On top of that
//! [`Keypad`] debounces each key, fires press, release and hold handlers
//! registered per mode label, and blanks the LEDs after a period without
//! presses, putting them back on the next press.
//!
//! ```
//! use std::time::Instant;
//! use rgbkeypad::{hsv_to_rgb, Keypad, SimBus};
//!
//! let mut keypad = Keypad::new(SimBus::new());
//! keypad
//!     .on_press(0, "default", |key| key.toggle_led(Some(hsv_to_rgb(0.5, 1.0, 1.0))))
//!     .unwrap();
//!
//! keypad.bus_mut().push_pressed(&[0]);
//! keypad.update(Instant::now()).unwrap();
//! assert!(keypad.key(0).unwrap().is_lit());
//! ```

pub mod bus;
pub mod color;
pub mod config;
pub mod error;
pub mod handlers;
pub mod key;
pub mod keypad;
pub mod sleep;
pub mod timing;

pub use bus::{KeypadBus, SimBus, SimError};
pub use color::{hsv_to_rgb, Rgb};
pub use config::Config;
pub use error::{ConfigError, KeypadError};
pub use handlers::{Handler, DEFAULT_MODE};
pub use key::{index_to_xy, xy_to_index, Key, KEYPAD_SIZE};
pub use keypad::Keypad;
pub use sleep::{SleepState, Transition};

//! The hardware boundary.
//!
//! The keypad only needs two things from its hardware: one transaction that
//! returns the state of all 16 switches, and a way to set an LED. Both are
//! behind [`KeypadBus`]. [`SimBus`] is an in-memory implementation for tests
//! and the demo.

use std::{collections::VecDeque, error, fmt};

use crate::{color::Rgb, key::KEYPAD_SIZE};

/// Mask read when nothing is pressed. Bits are active low.
pub const RELEASED_MASK: u16 = 0xFFFF;

pub trait KeypadBus {
    type Error: fmt::Debug;

    /// Reads all keys at once. Bit `i` is 0 while key `i` is pressed.
    fn read_raw_key_mask(&mut self) -> Result<u16, Self::Error>;

    /// Sets LED `index`. Writing the same colour twice has no further effect.
    fn write_led(&mut self, index: usize, rgb: Rgb) -> Result<(), Self::Error>;
}

#[inline]
pub fn key_pressed(mask: u16, index: usize) -> bool {
    mask & (1u16 << index) == 0
}

pub fn mask_for_pressed(indices: &[usize]) -> u16 {
    indices
        .iter()
        .filter(|index| **index < KEYPAD_SIZE)
        .fold(RELEASED_MASK, |mask, index| mask & !(1u16 << *index))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimError {
    Read,
    Write(usize),
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read => write!(f, "simulated read failure"),
            Self::Write(index) => write!(f, "simulated write failure on LED {index}"),
        }
    }
}

impl error::Error for SimError {}

/// Scripted keypad.
///
/// Queued masks are handed out one per read; once the queue is empty the
/// last mask keeps being returned, like a switch that stays where it is.
pub struct SimBus {
    queued: VecDeque<u16>,
    current: u16,
    leds: [Rgb; KEYPAD_SIZE],
    writes: Vec<(usize, Rgb)>,
    reads: usize,
    fail_reads: usize,
    fail_writes: usize,
}

impl SimBus {
    pub fn new() -> Self {
        Self {
            queued: VecDeque::new(),
            current: RELEASED_MASK,
            leds: [Rgb::BLACK; KEYPAD_SIZE],
            writes: Vec::new(),
            reads: 0,
            fail_reads: 0,
            fail_writes: 0,
        }
    }

    pub fn push_mask(&mut self, mask: u16) {
        self.queued.push_back(mask);
    }

    pub fn push_pressed(&mut self, indices: &[usize]) {
        self.push_mask(mask_for_pressed(indices));
    }

    pub fn fail_reads(&mut self, count: usize) {
        self.fail_reads = count;
    }

    pub fn fail_writes(&mut self, count: usize) {
        self.fail_writes = count;
    }

    pub fn led(&self, index: usize) -> Option<Rgb> {
        self.leds.get(index).copied()
    }

    pub fn leds(&self) -> &[Rgb; KEYPAD_SIZE] {
        &self.leds
    }

    /// Successful writes since the last `clear_writes`, in order.
    pub fn writes(&self) -> &[(usize, Rgb)] {
        &self.writes
    }

    pub fn clear_writes(&mut self) {
        self.writes.clear();
    }

    pub fn reads(&self) -> usize {
        self.reads
    }
}

impl Default for SimBus {
    fn default() -> Self {
        Self::new()
    }
}

impl KeypadBus for SimBus {
    type Error = SimError;

    fn read_raw_key_mask(&mut self) -> Result<u16, Self::Error> {
        if self.fail_reads > 0 {
            self.fail_reads -= 1;
            return Err(SimError::Read);
        }
        if let Some(mask) = self.queued.pop_front() {
            self.current = mask;
        }
        self.reads += 1;
        Ok(self.current)
    }

    fn write_led(&mut self, index: usize, rgb: Rgb) -> Result<(), Self::Error> {
        if self.fail_writes > 0 {
            self.fail_writes -= 1;
            return Err(SimError::Write(index));
        }
        let led = self.leds.get_mut(index).ok_or(SimError::Write(index))?;
        log::trace!("LED {index} <- {rgb:?}");
        *led = rgb;
        self.writes.push((index, rgb));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{key_pressed, mask_for_pressed, KeypadBus, SimBus, SimError, RELEASED_MASK};
    use crate::color::Rgb;

    #[test]
    fn mask_test() {
        assert_eq!(mask_for_pressed(&[]), RELEASED_MASK);
        assert_eq!(mask_for_pressed(&[0, 3]), 0xFFF6);
        assert_eq!(mask_for_pressed(&[15]), 0x7FFF);
        // Out of range indices are ignored
        assert_eq!(mask_for_pressed(&[16]), RELEASED_MASK);

        assert!(key_pressed(0xFFF6, 3));
        assert!(!key_pressed(0xFFF6, 1));
    }

    #[test]
    fn script_test() {
        let mut bus = SimBus::new();
        assert_eq!(bus.read_raw_key_mask(), Ok(RELEASED_MASK));

        bus.push_pressed(&[2]);
        bus.push_mask(RELEASED_MASK);
        assert_eq!(bus.read_raw_key_mask(), Ok(0xFFFB));
        assert_eq!(bus.read_raw_key_mask(), Ok(RELEASED_MASK));
        // Empty queue repeats the last mask
        bus.push_pressed(&[1]);
        assert_eq!(bus.read_raw_key_mask(), Ok(0xFFFD));
        assert_eq!(bus.read_raw_key_mask(), Ok(0xFFFD));
        assert_eq!(bus.reads(), 5);
    }

    #[test]
    fn failure_test() {
        let mut bus = SimBus::new();
        bus.push_pressed(&[0]);
        bus.fail_reads(1);
        assert_eq!(bus.read_raw_key_mask(), Err(SimError::Read));
        // The queued mask was not consumed
        assert_eq!(bus.read_raw_key_mask(), Ok(0xFFFE));

        bus.fail_writes(1);
        assert_eq!(bus.write_led(4, Rgb::new(1, 1, 1)), Err(SimError::Write(4)));
        assert!(bus.writes().is_empty());
        assert_eq!(bus.write_led(4, Rgb::new(1, 1, 1)), Ok(()));
        assert_eq!(bus.led(4), Some(Rgb::new(1, 1, 1)));
        assert_eq!(bus.writes(), &[(4, Rgb::new(1, 1, 1))]);

        // No LED 16
        assert_eq!(bus.write_led(16, Rgb::new(1, 1, 1)), Err(SimError::Write(16)));
        assert_eq!(bus.led(16), None);
        assert_eq!(bus.writes().len(), 1);
        bus.clear_writes();
        assert!(bus.writes().is_empty());
    }
}

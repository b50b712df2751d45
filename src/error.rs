//! Error types for the keypad.

use std::{error, fmt, time::Duration};

/// Failures at the bus boundary, wrapping the collaborator's own error.
#[derive(Debug)]
pub enum KeypadError<E> {
    /// Reading the raw key mask failed. No key state was touched.
    Read(E),
    /// Writing an LED failed. The write stays pending for the next flush.
    WriteLed { index: usize, source: E },
    /// A key index outside `0..KEYPAD_SIZE`.
    InvalidIndex(usize),
}

impl<E: fmt::Debug> fmt::Display for KeypadError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read(err) => write!(f, "failed to read key mask: {err:?}"),
            Self::WriteLed { index, source } => {
                write!(f, "failed to write LED {index}: {source:?}")
            }
            Self::InvalidIndex(index) => write!(f, "no key with index {index}"),
        }
    }
}

impl<E: fmt::Debug> error::Error for KeypadError<E> {}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ConfigError {
    /// A duration given in seconds was negative, NaN or infinite.
    InvalidSeconds { knob: &'static str, value: f32 },
    /// The knob needs a non-zero duration.
    ZeroDuration { knob: &'static str },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSeconds { knob, value } => {
                write!(f, "{knob}: {value} is not a valid number of seconds")
            }
            Self::ZeroDuration { knob } => write!(f, "{knob} must be longer than zero"),
        }
    }
}

impl error::Error for ConfigError {}

pub(crate) fn secs(knob: &'static str, value: f32) -> Result<Duration, ConfigError> {
    Duration::try_from_secs_f32(value).map_err(|_| ConfigError::InvalidSeconds { knob, value })
}

pub(crate) fn non_zero(knob: &'static str, value: Duration) -> Result<Duration, ConfigError> {
    if value == Duration::ZERO {
        Err(ConfigError::ZeroDuration { knob })
    } else {
        Ok(value)
    }
}

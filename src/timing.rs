use std::time::{Duration, Instant};

use spin_sleep::SpinSleeper;

// Polls per second
pub const DEFAULT_POLL_RATE: u64 = 100;

pub struct Timing {
    pub poll_rate: u64,
    last_poll: Instant,
    sleeper: SpinSleeper,
}

impl Timing {
    pub fn new(poll_rate: u64) -> Self {
        Self {
            // Guards the division below
            poll_rate: poll_rate.max(1),
            last_poll: Instant::now(),
            sleeper: SpinSleeper::default(),
        }
    }

    pub fn should_poll(&self) -> bool {
        self.calc_next_poll() == 0
    }

    pub fn mark_poll(&mut self) {
        self.last_poll = Instant::now();
    }

    pub fn try_sleep(&self) {
        let sleep_for = self.calc_next_poll();
        if sleep_for > 0 {
            // accounts for platform dependent sleep resolution
            self.sleeper.sleep(Duration::from_millis(sleep_for));
        }
    }

    fn calc_next_poll(&self) -> u64 {
        calc_next_timeout(&self.last_poll, 1000 / self.poll_rate.max(1))
    }
}

impl Default for Timing {
    fn default() -> Self {
        Self::new(DEFAULT_POLL_RATE)
    }
}

#[inline]
fn calc_next_timeout(last: &Instant, timeout: u64) -> u64 {
    let elapsed = last.elapsed().as_millis() as u64;
    timeout.saturating_sub(elapsed)
}

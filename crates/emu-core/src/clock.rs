//! Wall-clock time source.

use std::thread;
use std::time::{Duration, Instant};

/// Monotonic microsecond clock with a blocking sleep.
///
/// Machines that pace themselves against real time take a `Clock` instead
/// of calling `std::time` directly.
pub trait Clock {
    /// Microseconds elapsed since an arbitrary fixed origin.
    fn now_micros(&self) -> u64;

    /// Block the calling thread for at least `micros` microseconds.
    fn sleep_micros(&mut self, micros: u64);
}

/// Real time, measured from construction.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_micros(&self) -> u64 {
        u64::try_from(self.origin.elapsed().as_micros()).unwrap_or(u64::MAX)
    }

    fn sleep_micros(&mut self, micros: u64) {
        thread::sleep(Duration::from_micros(micros));
    }
}

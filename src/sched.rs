//! Tick pacing for the polling loop
//!
//! Keeps the worker's poll cadence at a fixed interval measured from tick
//! start to tick start, so time spent reading the device does not stretch the
//! period. A tick that overruns its slot starts the next one immediately
//! rather than trying to catch up on missed slots.

use std::time::{Duration, Instant};

/// Fixed-interval pacer for the poll loop
pub struct Pacer {
    interval: Duration,
    last: Instant,
}

impl Pacer {
    /// Create a pacer; the first call to [`Pacer::pace`] waits a full interval
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: Instant::now(),
        }
    }

    /// Sleep out the remainder of the current slot
    pub fn pace(&mut self) {
        let elapsed = self.last.elapsed();
        if let Some(remaining) = self.interval.checked_sub(elapsed) {
            std::thread::sleep(remaining);
        }
        self.last = Instant::now();
    }

    /// The configured interval
    pub fn interval(&self) -> Duration {
        self.interval
    }
}

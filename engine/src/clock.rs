//! Time sources that drive frames and stamp submissions.

use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

/// Source of monotonic frame time and wall-clock timestamps.
pub trait Clock {
    /// Monotonic time elapsed since the clock was created.
    fn now(&self) -> Duration;

    /// Milliseconds since the Unix epoch.
    fn unix_millis(&self) -> u64;
}

/// Clock backed by the operating system.
#[derive(Clone, Copy, Debug)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    /// Creates a clock whose monotonic origin is the current instant.
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
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    fn unix_millis(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |elapsed| {
                u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
            })
    }
}

/// Clock that only moves when told to. Used by tests and the fast-forward driver.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ManualClock {
    now: Duration,
    epoch_millis: u64,
}

impl ManualClock {
    /// Creates a clock at monotonic zero whose wall clock starts at `epoch_millis`.
    #[must_use]
    pub const fn new(epoch_millis: u64) -> Self {
        Self {
            now: Duration::ZERO,
            epoch_millis,
        }
    }

    /// Moves the clock forward.
    pub fn advance(&mut self, dt: Duration) {
        self.now = self.now.saturating_add(dt);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now
    }

    fn unix_millis(&self) -> u64 {
        let elapsed = u64::try_from(self.now.as_millis()).unwrap_or(u64::MAX);
        self.epoch_millis.saturating_add(elapsed)
    }
}

//! Time sources for driving a queue.

use std::cell::Cell;
use std::time::Instant;

use super::Time;

/// Where "now" comes from.
///
/// The queue never reads a clock itself; the owning loop samples its
/// `TimeSource` and passes the result to
/// [`dispatch_due`](crate::TimerQueue::dispatch_due). Swapping the source is
/// how the same loop runs against wall-clock time in production and virtual
/// time in tests.
pub trait TimeSource {
    /// Returns the current time.
    fn now(&self) -> Time;
}

/// Wall clock time source for production use.
///
/// Uses `std::time::Instant` internally; the epoch is the moment the clock
/// was created.
#[derive(Debug)]
pub struct WallClock {
    epoch: Instant,
}

impl WallClock {
    /// Creates a new wall clock time source.
    #[must_use]
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }
}

impl Default for WallClock {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for WallClock {
    fn now(&self) -> Time {
        let nanos = self.epoch.elapsed().as_nanos().min(u128::from(u64::MAX)) as u64;
        Time::from_nanos(nanos)
    }
}

/// Virtual time source for deterministic tests.
///
/// Time only advances when explicitly told to, so a test controls exactly
/// which timers a dispatch sees as due.
///
/// # Example
///
/// ```
/// use deadline_queue::{Time, TimeSource, VirtualClock};
///
/// let clock = VirtualClock::new();
/// assert_eq!(clock.now(), Time::ZERO);
///
/// clock.advance(1_000_000_000);
/// assert_eq!(clock.now(), Time::from_secs(1));
/// ```
#[derive(Debug)]
pub struct VirtualClock {
    now: Cell<u64>,
}

impl VirtualClock {
    /// Creates a new virtual clock starting at time zero.
    #[must_use]
    pub fn new() -> Self {
        Self { now: Cell::new(0) }
    }

    /// Creates a virtual clock starting at the given time.
    #[must_use]
    pub fn starting_at(time: Time) -> Self {
        Self {
            now: Cell::new(time.as_nanos()),
        }
    }

    /// Advances time by the given number of nanoseconds.
    pub fn advance(&self, nanos: u64) {
        self.now.set(self.now.get().saturating_add(nanos));
    }

    /// Advances time to the given absolute time.
    ///
    /// A target in the past is a no-op; the clock never runs backwards
    /// through this method.
    pub fn advance_to(&self, time: Time) {
        if time.as_nanos() > self.now.get() {
            self.now.set(time.as_nanos());
        }
    }

    /// Sets the current time, forwards or backwards (for tests).
    pub fn set(&self, time: Time) {
        self.now.set(time.as_nanos());
    }
}

impl Default for VirtualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for VirtualClock {
    fn now(&self) -> Time {
        Time::from_nanos(self.now.get())
    }
}

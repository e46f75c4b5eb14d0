//! Sliding-window counter over monotonic event timestamps.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Bounded-duration record of recent event timestamps, oldest first.
///
/// The container is not independently thread-safe; the owning tier holds its
/// lock across append, expiry, and count so each firing decision reads one
/// consistent snapshot.
#[derive(Debug, Clone)]
pub struct SlidingWindow {
    duration: Duration,
    times: VecDeque<Instant>,
}

impl SlidingWindow {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            times: VecDeque::new(),
        }
    }

    /// Append an event timestamp. Timestamps arrive in lock-acquisition
    /// order, which is non-decreasing for a monotonic clock.
    pub fn record(&mut self, now: Instant) {
        self.times.push_back(now);
    }

    /// Drop leading entries strictly older than `cutoff`.
    pub fn expire_before(&mut self, cutoff: Instant) {
        while self.times.front().is_some_and(|&t| t < cutoff) {
            self.times.pop_front();
        }
    }

    /// Drop entries that have fallen out of the window ending at `now`.
    ///
    /// `checked_sub` covers the first moments after process start, when
    /// `now - duration` would precede the clock's origin; nothing can be
    /// stale that early.
    pub fn expire_older_than(&mut self, now: Instant) {
        if let Some(cutoff) = now.checked_sub(self.duration) {
            self.expire_before(cutoff);
        }
    }

    pub fn count(&self) -> usize {
        self.times.len()
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Events per second over the configured window duration.
    pub fn rate_per_sec(&self) -> f64 {
        self.times.len() as f64 / self.duration.as_secs_f64()
    }
}

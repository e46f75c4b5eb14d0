//! Tier 3: read-then-write latency correlation.

use std::time::{Duration, Instant};

use crate::config::Tier3Config;
use crate::types::{AlertRule, Finding, Severity};

pub struct ReadWriteLatencyTier {
    max_latency: Duration,
    max_latency_ms: u64,
    /// Most recent monitor read; overwritten on every read, no history.
    /// Only the latest read is a plausible cause for the next write.
    last_monitor_read: Option<Instant>,
}

impl ReadWriteLatencyTier {
    pub fn new(config: Tier3Config) -> Self {
        Self {
            max_latency: Duration::from_millis(config.max_read_write_latency_ms),
            max_latency_ms: config.max_read_write_latency_ms,
            last_monitor_read: None,
        }
    }

    pub fn observe_read(&mut self, now: Instant) {
        self.last_monitor_read = Some(now);
    }

    /// Correlate an actuator write against the latest monitor read.
    ///
    /// Fires on every sub-threshold pairing; an automated read-modify-write
    /// loop produces one alert per iteration, which is the intended signal.
    pub fn observe_write(&mut self, now: Instant, remote_addr: &str) -> Option<Finding> {
        let last_read = self.last_monitor_read?;
        let elapsed = now.saturating_duration_since(last_read);
        if elapsed >= self.max_latency {
            return None;
        }

        Some(Finding {
            rule: AlertRule::ReadWriteSequence,
            severity: Severity::Medium,
            message: format!(
                "monitor read followed by actuator write after {} ms from {} \
                 (threshold {} ms); sub-reaction-time pairing indicates an \
                 automated read-modify-write loop",
                elapsed.as_millis(),
                remote_addr,
                self.max_latency_ms,
            ),
        })
    }
}

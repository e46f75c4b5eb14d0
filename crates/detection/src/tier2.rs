//! Tier 2: actuator write-rate detection.

use std::time::{Duration, Instant};

use crate::config::Tier2Config;
use crate::types::{AlertRule, Finding, Severity};
use crate::window::SlidingWindow;

pub struct WriteRateTier {
    config: Tier2Config,
    window: SlidingWindow,
}

impl WriteRateTier {
    pub fn new(config: Tier2Config) -> Self {
        let window = SlidingWindow::new(Duration::from_secs(config.window_secs));
        Self { config, window }
    }

    /// Record one actuator write and re-evaluate the windowed rate.
    ///
    /// No latch: scripted actuation can start, stop, and resume, and each
    /// sustained episode is independently reportable.
    pub fn observe_write(&mut self, now: Instant, remote_addr: &str) -> Option<Finding> {
        self.window.record(now);
        self.window.expire_older_than(now);
        let rate = self.window.rate_per_sec();
        if rate <= self.config.rate_threshold_per_sec {
            return None;
        }

        Some(Finding {
            rule: AlertRule::WriteRate,
            severity: Severity::High,
            message: format!(
                "actuator write rate {:.1}/s from {} exceeds {:.1}/s; \
                 machine-speed writes are inconsistent with human operation",
                rate, remote_addr, self.config.rate_threshold_per_sec,
            ),
        })
    }

    /// Window occupancy after the most recent expiry pass.
    pub fn window_count(&self) -> usize {
        self.window.count()
    }
}

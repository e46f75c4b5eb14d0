//! Tier 1: persistence-indicator detection (service-worker installs).
//!
//! A web-delivered PLC implant survives the browser tab that dropped it by
//! registering a service worker, which then re-fetches its payload script on
//! a timer to check it is still served. Both observable sides of that
//! mechanism are covered here as alternative strategies: the periodic
//! re-fetch pattern, and the registration fetch itself.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::config::{Tier1Config, Tier1Strategy};
use crate::types::{AlertRule, Finding, Severity};
use crate::window::SlidingWindow;

/// Request header a browser attaches when fetching a script for service
/// worker registration.
const SERVICE_WORKER_HEADER: &str = "service-worker";
const SERVICE_WORKER_HEADER_VALUE: &str = "script";

pub struct PersistenceTier {
    config: Tier1Config,
    window: SlidingWindow,
    /// One-shot latch: an installed persistence mechanism is a single
    /// ongoing condition, so the tier fires at most once per lifetime.
    fired: bool,
}

impl PersistenceTier {
    pub fn new(config: Tier1Config) -> Self {
        let window = SlidingWindow::new(Duration::from_secs(config.poll_window_secs));
        Self {
            config,
            window,
            fired: false,
        }
    }

    pub fn has_fired(&self) -> bool {
        self.fired
    }

    pub fn observe(
        &mut self,
        now: Instant,
        path: &str,
        method: &str,
        remote_addr: &str,
        headers: &HashMap<String, String>,
    ) -> Option<Finding> {
        if self.fired {
            return None;
        }

        match self.config.strategy {
            Tier1Strategy::PollingPattern => self.observe_polling(now, path, method, remote_addr),
            Tier1Strategy::RegistrationHeader => {
                self.observe_registration(path, remote_addr, headers)
            }
        }
    }

    fn observe_polling(
        &mut self,
        now: Instant,
        path: &str,
        method: &str,
        remote_addr: &str,
    ) -> Option<Finding> {
        if method != "GET" || !path.contains(&self.config.payload_path_fragment) {
            return None;
        }

        self.window.record(now);
        self.window.expire_older_than(now);
        let count = self.window.count();
        if count < self.config.poll_threshold {
            return None;
        }

        self.fired = true;
        Some(Finding {
            rule: AlertRule::SwPolling,
            severity: Severity::Critical,
            message: format!(
                "GET {} received {} times within {} s from {} (threshold {}); \
                 repeated cache-bypassing fetches of a static script match a \
                 service-worker existence-check loop, not any browser page load",
                path, count, self.config.poll_window_secs, remote_addr, self.config.poll_threshold,
            ),
        })
    }

    fn observe_registration(
        &mut self,
        path: &str,
        remote_addr: &str,
        headers: &HashMap<String, String>,
    ) -> Option<Finding> {
        if !has_service_worker_marker(headers) {
            return None;
        }

        self.fired = true;
        Some(Finding {
            rule: AlertRule::SwRegistration,
            severity: Severity::Critical,
            message: format!(
                "service-worker registration fetch of {} from {}; a background \
                 persistence mechanism is being installed on the operator's browser",
                path, remote_addr,
            ),
        })
    }
}

/// Header keys are matched case-insensitively; absence means "not a service
/// worker request", never an error.
fn has_service_worker_marker(headers: &HashMap<String, String>) -> bool {
    headers.iter().any(|(k, v)| {
        k.eq_ignore_ascii_case(SERVICE_WORKER_HEADER)
            && v.trim().eq_ignore_ascii_case(SERVICE_WORKER_HEADER_VALUE)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spaced_polling_fires_once_at_the_third_fetch() {
        let mut tier = PersistenceTier::new(Tier1Config::default());
        let base = Instant::now();
        let headers = HashMap::new();

        let mut observe_at = |secs: u64| {
            tier.observe(
                base + Duration::from_secs(secs),
                "/static/malware.js",
                "GET",
                "10.0.0.5",
                &headers,
            )
        };

        // Fetches at t=0, 31, 61 all land inside the 90 s window.
        assert!(observe_at(0).is_none());
        assert!(observe_at(31).is_none());
        let finding = observe_at(61);
        assert!(finding.is_some());
        assert_eq!(finding.as_ref().map(|f| f.rule), Some(AlertRule::SwPolling));

        assert!(observe_at(62).is_none());
    }

    #[test]
    fn stale_fetches_age_out_before_the_threshold() {
        let mut tier = PersistenceTier::new(Tier1Config::default());
        let base = Instant::now();
        let headers = HashMap::new();

        for secs in [0, 100, 200] {
            let finding = tier.observe(
                base + Duration::from_secs(secs),
                "/static/malware.js",
                "GET",
                "10.0.0.5",
                &headers,
            );
            assert!(finding.is_none());
        }
        assert!(!tier.has_fired());
    }

    #[test]
    fn marker_header_is_case_insensitive() {
        let mut headers = HashMap::new();
        headers.insert("Service-Worker".to_string(), "script".to_string());
        assert!(has_service_worker_marker(&headers));

        let mut headers = HashMap::new();
        headers.insert("service-worker".to_string(), "SCRIPT".to_string());
        assert!(has_service_worker_marker(&headers));

        let mut headers = HashMap::new();
        headers.insert("service-worker".to_string(), "no-script".to_string());
        assert!(!has_service_worker_marker(&headers));

        assert!(!has_service_worker_marker(&HashMap::new()));
    }
}

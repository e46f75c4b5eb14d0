//! Alert surfacing seam.
//!
//! Detection only commits structured records; how an alert reaches a human
//! (log line, metrics pipeline, webhook) is the observer's concern and is
//! swappable at detector construction.

use tracing::warn;

use crate::types::Alert;

pub trait AlertObserver: Send + Sync {
    fn on_alert(&self, alert: &Alert);
}

/// Default observer: one structured `warn` event per alert.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl AlertObserver for TracingObserver {
    fn on_alert(&self, alert: &Alert) {
        warn!(
            rule = alert.rule.as_str(),
            severity = alert.severity.as_str(),
            message = %alert.message,
            "boundary detection alert"
        );
    }
}

/// Discards alerts; for hosts that poll the sink themselves, and for tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullObserver;

impl AlertObserver for NullObserver {
    fn on_alert(&self, _alert: &Alert) {}
}

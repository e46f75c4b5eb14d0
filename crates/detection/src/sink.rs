//! Append-only, thread-safe alert log.

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::types::{Alert, Severity};

/// Counts per severity at a point in time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AlertSummary {
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
    pub total: usize,
}

/// The only mutation entry point is `commit`; readers get defensive copies.
/// The sink's lock is independent of every tier lock: commits are
/// fire-and-forget appends with no dependency back into tier state.
#[derive(Default)]
pub struct AlertSink {
    alerts: Mutex<Vec<Alert>>,
}

impl AlertSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commit(&self, alert: Alert) {
        self.lock().push(alert);
    }

    /// Snapshot of all alerts, insertion order, oldest first.
    pub fn snapshot(&self) -> Vec<Alert> {
        self.lock().clone()
    }

    /// Per-severity counts, recomputed by a full scan under the lock.
    /// O(n) per call, safe against concurrent commits; alert volume stays
    /// small in this threat model. Growth itself is unbounded, a deployment
    /// concern rather than a correctness one.
    pub fn summary(&self) -> AlertSummary {
        let alerts = self.lock();
        let mut out = AlertSummary {
            total: alerts.len(),
            ..AlertSummary::default()
        };
        for alert in alerts.iter() {
            match alert.severity {
                Severity::Critical => out.critical += 1,
                Severity::High => out.high += 1,
                Severity::Medium => out.medium += 1,
            }
        }
        out
    }

    /// A poisoned log keeps its committed records, which are plain data;
    /// recovering the guard loses nothing, while propagating the poison
    /// would silently drop every later alert.
    fn lock(&self) -> MutexGuard<'_, Vec<Alert>> {
        self.alerts.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

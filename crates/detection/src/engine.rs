//! Detector façade: the single entry point on the host's request path.

use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use tracing::error;

use crate::config::DetectorConfig;
use crate::observer::{AlertObserver, TracingObserver};
use crate::sink::{AlertSink, AlertSummary};
use crate::tier1::PersistenceTier;
use crate::tier2::WriteRateTier;
use crate::tier3::ReadWriteLatencyTier;
use crate::types::{Alert, Finding};

/// One detector instance per protected boundary. Each tier holds its own
/// lock so a slow evaluation in one never blocks the others; the sink has
/// its own lock as well, independent of all tier locks.
pub struct BoundaryDetector {
    actuator_write_fragment: String,
    monitor_read_fragment: String,
    tier1: Mutex<PersistenceTier>,
    tier2: Mutex<WriteRateTier>,
    tier3: Mutex<ReadWriteLatencyTier>,
    sink: AlertSink,
    observer: Box<dyn AlertObserver>,
}

impl BoundaryDetector {
    pub fn new(config: DetectorConfig) -> Self {
        Self::with_observer(config, Box::new(TracingObserver))
    }

    pub fn with_observer(config: DetectorConfig, observer: Box<dyn AlertObserver>) -> Self {
        Self {
            actuator_write_fragment: config.actuator_write_fragment,
            monitor_read_fragment: config.monitor_read_fragment,
            tier1: Mutex::new(PersistenceTier::new(config.tier1)),
            tier2: Mutex::new(WriteRateTier::new(config.tier2)),
            tier3: Mutex::new(ReadWriteLatencyTier::new(config.tier3)),
            sink: AlertSink::new(),
            observer,
        }
    }

    /// Screen one request. Never blocks the caller on detection outcomes
    /// and never propagates a detector fault into request handling: a panic
    /// inside evaluation is caught, logged, and the request proceeds.
    pub fn on_request(
        &self,
        path: &str,
        method: &str,
        remote_addr: &str,
        headers: &HashMap<String, String>,
    ) {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            self.evaluate(path, method, remote_addr, headers);
        }));
        if outcome.is_err() {
            error!(path, method, "detector fault swallowed; request served unscreened");
        }
    }

    fn evaluate(
        &self,
        path: &str,
        method: &str,
        remote_addr: &str,
        headers: &HashMap<String, String>,
    ) {
        let now = Instant::now();

        if let Some(finding) =
            lock_recovering(&self.tier1).observe(now, path, method, remote_addr, headers)
        {
            self.commit(finding);
        }

        if path.contains(&self.actuator_write_fragment) {
            // Tiers 2 and 3 evaluate the same write independently; a single
            // request can legitimately raise both a rate and a latency alert.
            if let Some(finding) = lock_recovering(&self.tier2).observe_write(now, remote_addr) {
                self.commit(finding);
            }
            if let Some(finding) = lock_recovering(&self.tier3).observe_write(now, remote_addr) {
                self.commit(finding);
            }
        }

        // Read tracking runs after write correlation so a write is compared
        // against the latest read that preceded it, never against itself.
        if path.contains(&self.monitor_read_fragment) {
            lock_recovering(&self.tier3).observe_read(now);
        }
    }

    fn commit(&self, finding: Finding) {
        let alert = Alert {
            ts_unix_ms: unix_millis(),
            rule: finding.rule,
            severity: finding.severity,
            message: finding.message,
        };
        self.sink.commit(alert.clone());
        self.observer.on_alert(&alert);
    }

    pub fn alerts(&self) -> Vec<Alert> {
        self.sink.snapshot()
    }

    pub fn summary(&self) -> AlertSummary {
        self.sink.summary()
    }

    /// Tier-2 window occupancy; diagnostic visibility for hosts and tests.
    pub fn write_window_count(&self) -> usize {
        lock_recovering(&self.tier2).window_count()
    }
}

/// A poisoned tier keeps structurally valid state (timestamp windows and
/// plain flags), so recovering the guard is always safe; propagating the
/// poison would disable that tier for the rest of the process.
fn lock_recovering<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn unix_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or_default()
}

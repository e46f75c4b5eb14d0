use std::collections::HashMap;
use std::sync::Arc;

use detection::{Alert, AlertObserver, AlertSummary, BoundaryDetector, DetectorConfig};

use crate::config::GuardConfig;

/// Cloneable handle to one detector instance, shared across request-handler
/// threads. The detector locks internally per tier, so the handle is a bare
/// `Arc` with no outer lock of its own.
#[derive(Clone)]
pub struct SharedDetector {
    inner: Arc<BoundaryDetector>,
}

impl SharedDetector {
    pub fn new(config: GuardConfig) -> Self {
        Self {
            inner: Arc::new(BoundaryDetector::new(config.detector)),
        }
    }

    pub fn with_observer(config: DetectorConfig, observer: Box<dyn AlertObserver>) -> Self {
        Self {
            inner: Arc::new(BoundaryDetector::with_observer(config, observer)),
        }
    }

    pub fn on_request(
        &self,
        path: &str,
        method: &str,
        remote_addr: &str,
        headers: &HashMap<String, String>,
    ) {
        self.inner.on_request(path, method, remote_addr, headers);
    }

    pub fn alerts(&self) -> Vec<Alert> {
        self.inner.alerts()
    }

    pub fn summary(&self) -> AlertSummary {
        self.inner.summary()
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use detection::NullObserver;

    use super::*;

    #[test]
    fn clones_share_one_detector() {
        let state = SharedDetector::with_observer(
            DetectorConfig::default(),
            Box::new(NullObserver),
        );
        let headers = HashMap::new();

        let clones: Vec<_> = (0..4).map(|_| state.clone()).collect();
        let handles: Vec<_> = clones
            .into_iter()
            .map(|clone| {
                thread::spawn(move || {
                    let headers = HashMap::new();
                    clone.on_request("/static/malware.js", "GET", "10.0.0.5", &headers);
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        // Four polling fetches across four clones trip the shared threshold
        // of three exactly once.
        state.on_request("/static/malware.js", "GET", "10.0.0.5", &headers);
        assert_eq!(state.alerts().len(), 1);
        assert_eq!(state.summary().critical, 1);
    }
}

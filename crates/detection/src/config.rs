//! Compiled-in detection policy with overridable defaults.
//!
//! The thresholds below are policy parameters, not tunables discovered at
//! runtime: they encode how fast a human operator can plausibly drive the
//! process-control UI, and how often a browser legitimately re-fetches a
//! static script.

/// Which Tier-1 detection strategy is active.
///
/// The polling-pattern strategy watches for repeated cache-bypassing fetches
/// of the known payload path and cannot false-positive on any clean firmware.
/// The registration-header strategy keys on the service-worker registration
/// marker instead, so it survives payload renames at the cost of depending on
/// a client-controlled header. Only one runs at a time; the selection is a
/// deployment decision, deliberately not hardcoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier1Strategy {
    PollingPattern,
    RegistrationHeader,
}

#[derive(Debug, Clone)]
pub struct Tier1Config {
    pub strategy: Tier1Strategy,
    /// Path substring identifying a fetch of the persisted payload script.
    pub payload_path_fragment: String,
    /// Fetch count within the window that confirms machine-timed polling.
    /// One fetch is the page load itself; a browser serves later navigations
    /// from cache, so three in-window fetches require at least two
    /// machine-timed re-fetches.
    pub poll_threshold: usize,
    pub poll_window_secs: u64,
}

impl Default for Tier1Config {
    fn default() -> Self {
        Self {
            strategy: Tier1Strategy::PollingPattern,
            payload_path_fragment: "/static/malware.js".to_string(),
            poll_threshold: 3,
            poll_window_secs: 90,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Tier2Config {
    /// Writes per second above which the writer is not a human operator.
    /// Human ceiling is roughly 1–2 writes/sec; scripted actuation runs an
    /// order of magnitude faster.
    pub rate_threshold_per_sec: f64,
    pub window_secs: u64,
}

impl Default for Tier2Config {
    fn default() -> Self {
        Self {
            rate_threshold_per_sec: 2.0,
            window_secs: 5,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Tier3Config {
    /// Read-to-write latency below which the pairing is machine-paced.
    /// An operator reads a value, decides, then acts; 500 ms is already a
    /// generous floor for that loop.
    pub max_read_write_latency_ms: u64,
}

impl Default for Tier3Config {
    fn default() -> Self {
        Self {
            max_read_write_latency_ms: 500,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DetectorConfig {
    pub tier1: Tier1Config,
    pub tier2: Tier2Config,
    pub tier3: Tier3Config,
    /// Path substring denoting an actuator-write call.
    pub actuator_write_fragment: String,
    /// Path substring denoting a sensor/monitor read.
    pub monitor_read_fragment: String,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            tier1: Tier1Config::default(),
            tier2: Tier2Config::default(),
            tier3: Tier3Config::default(),
            actuator_write_fragment: "/point-write".to_string(),
            monitor_read_fragment: "/monitor-update".to_string(),
        }
    }
}

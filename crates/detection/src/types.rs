use serde::{Deserialize, Serialize};

/// Alert severity, ordered by escalation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
            Self::Critical => "CRITICAL",
        }
    }
}

/// Which detection tier produced an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AlertRule {
    /// Tier 1, polling-pattern strategy: repeated no-cache fetches of the
    /// payload script.
    SwPolling,
    /// Tier 1, registration-header strategy: explicit service-worker
    /// registration fetch.
    SwRegistration,
    /// Tier 2: actuator write rate above human speed.
    WriteRate,
    /// Tier 3: sensor read followed by actuator write at machine speed.
    ReadWriteSequence,
}

impl AlertRule {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SwPolling => "sw_polling",
            Self::SwRegistration => "sw_registration",
            Self::WriteRate => "write_rate",
            Self::ReadWriteSequence => "read_write_sequence",
        }
    }
}

/// A committed, immutable alert record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    /// Wall-clock commit time, unix milliseconds.
    pub ts_unix_ms: i64,
    pub rule: AlertRule,
    pub severity: Severity,
    pub message: String,
}

/// A positive tier verdict, not yet stamped with wall-clock time.
#[derive(Debug, Clone, PartialEq)]
pub struct Finding {
    pub rule: AlertRule,
    pub severity: Severity,
    pub message: String,
}

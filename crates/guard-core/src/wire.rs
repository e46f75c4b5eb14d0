//! JSON shapes served to operator dashboards.
//!
//! Severity keys are uppercase on the wire; existing HMI panels key their
//! banner colors on those exact strings.

use detection::{Alert, AlertSummary};
use serde::Serialize;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AlertWire {
    /// Wall-clock time of day, `HH:MM:SS.mmm`, UTC.
    pub time: String,
    pub rule: String,
    pub severity: String,
    pub message: String,
}

impl AlertWire {
    pub fn from_alert(alert: &Alert) -> Self {
        Self {
            time: format_time_of_day(alert.ts_unix_ms),
            rule: alert.rule.as_str().to_string(),
            severity: alert.severity.as_str().to_string(),
            message: alert.message.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct SummaryWire {
    #[serde(rename = "CRITICAL")]
    pub critical: usize,
    #[serde(rename = "HIGH")]
    pub high: usize,
    #[serde(rename = "MEDIUM")]
    pub medium: usize,
    pub total: usize,
}

impl SummaryWire {
    pub fn from_summary(summary: &AlertSummary) -> Self {
        Self {
            critical: summary.critical,
            high: summary.high,
            medium: summary.medium,
            total: summary.total,
        }
    }
}

/// Time-of-day formatting without a calendar dependency; alert timestamps
/// only ever render as intra-day times on the dashboard.
fn format_time_of_day(ts_unix_ms: i64) -> String {
    const MS_PER_DAY: i64 = 86_400_000;
    let ms_of_day = ts_unix_ms.rem_euclid(MS_PER_DAY);
    let millis = ms_of_day % 1000;
    let secs = ms_of_day / 1000;
    format!(
        "{:02}:{:02}:{:02}.{:03}",
        secs / 3600,
        (secs / 60) % 60,
        secs % 60,
        millis
    )
}

#[cfg(test)]
mod tests {
    use detection::{AlertRule, Severity};

    use super::*;

    #[test]
    fn time_of_day_formatting() {
        assert_eq!(format_time_of_day(0), "00:00:00.000");

        let ms = ((12 * 3600 + 34 * 60 + 56) * 1000 + 789) as i64;
        assert_eq!(format_time_of_day(ms), "12:34:56.789");

        // Day boundaries wrap; only the intra-day remainder renders.
        assert_eq!(format_time_of_day(86_400_000 + 1), "00:00:00.001");
    }

    #[test]
    fn alert_wire_carries_rule_and_severity_names() {
        let alert = Alert {
            ts_unix_ms: 1000,
            rule: AlertRule::WriteRate,
            severity: Severity::High,
            message: "m".to_string(),
        };
        let wire = AlertWire::from_alert(&alert);
        assert_eq!(wire.time, "00:00:01.000");
        assert_eq!(wire.rule, "write_rate");
        assert_eq!(wire.severity, "HIGH");
    }

    #[test]
    fn summary_wire_uses_uppercase_severity_keys() {
        let wire = SummaryWire::from_summary(&AlertSummary {
            critical: 1,
            high: 2,
            medium: 3,
            total: 6,
        });
        let json = serde_json::to_value(wire).unwrap();
        assert_eq!(json["CRITICAL"], 1);
        assert_eq!(json["HIGH"], 2);
        assert_eq!(json["MEDIUM"], 3);
        assert_eq!(json["total"], 6);
    }
}

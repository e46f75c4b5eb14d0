//! Layered configuration: built-in defaults, then an optional TOML file
//! named by `PLCGUARD_CONFIG`, then `PLCGUARD_*` environment overrides.
//! Later layers win field by field; an unset field leaves the earlier
//! layer's value in place.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use detection::{DetectorConfig, Tier1Strategy};
use serde::Deserialize;
use tracing::info;

#[derive(Debug, Clone, Default)]
pub struct GuardConfig {
    pub detector: DetectorConfig,
}

impl GuardConfig {
    pub fn load() -> Result<Self> {
        let mut cfg = Self::default();
        cfg.apply_file_config()?;
        cfg.apply_env_overrides();
        Ok(cfg)
    }

    fn apply_file_config(&mut self) -> Result<bool> {
        let Some(path) = env_non_empty("PLCGUARD_CONFIG") else {
            return Ok(false);
        };
        self.apply_file(Path::new(&path))?;
        info!(path = %path, "applied config file");
        Ok(true)
    }

    fn apply_file(&mut self, path: &Path) -> Result<()> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed reading config file {}", path.display()))?;
        let file_cfg: FileConfig = toml::from_str(&raw)
            .with_context(|| format!("failed parsing TOML config {}", path.display()))?;

        self.apply_file_tier1(file_cfg.tier1);
        self.apply_file_tier2(file_cfg.tier2);
        self.apply_file_tier3(file_cfg.tier3);
        self.apply_file_paths(file_cfg.paths);
        Ok(())
    }

    fn apply_file_tier1(&mut self, tier1: Option<FileTier1Config>) {
        let Some(tier1) = tier1 else {
            return;
        };
        if let Some(v) = tier1.strategy.as_deref().and_then(parse_strategy) {
            self.detector.tier1.strategy = v;
        }
        if let Some(v) = non_empty(tier1.payload_path_fragment) {
            self.detector.tier1.payload_path_fragment = v;
        }
        if let Some(v) = tier1.poll_threshold {
            self.detector.tier1.poll_threshold = v;
        }
        if let Some(v) = tier1.poll_window_secs {
            self.detector.tier1.poll_window_secs = v;
        }
    }

    fn apply_file_tier2(&mut self, tier2: Option<FileTier2Config>) {
        let Some(tier2) = tier2 else {
            return;
        };
        if let Some(v) = tier2.rate_threshold_per_sec {
            self.detector.tier2.rate_threshold_per_sec = v;
        }
        if let Some(v) = tier2.window_secs {
            self.detector.tier2.window_secs = v;
        }
    }

    fn apply_file_tier3(&mut self, tier3: Option<FileTier3Config>) {
        let Some(tier3) = tier3 else {
            return;
        };
        if let Some(v) = tier3.max_read_write_latency_ms {
            self.detector.tier3.max_read_write_latency_ms = v;
        }
    }

    fn apply_file_paths(&mut self, paths: Option<FilePathsConfig>) {
        let Some(paths) = paths else {
            return;
        };
        if let Some(v) = non_empty(paths.actuator_write_fragment) {
            self.detector.actuator_write_fragment = v;
        }
        if let Some(v) = non_empty(paths.monitor_read_fragment) {
            self.detector.monitor_read_fragment = v;
        }
    }

    fn apply_env_overrides(&mut self) {
        self.apply_env_tier1();
        self.apply_env_tier2();
        self.apply_env_tier3();
        self.apply_env_paths();
    }

    fn apply_env_tier1(&mut self) {
        if let Some(v) = env_non_empty("PLCGUARD_TIER1_STRATEGY") {
            if let Some(parsed) = parse_strategy(&v) {
                self.detector.tier1.strategy = parsed;
            }
        }
        if let Some(v) = env_non_empty("PLCGUARD_PAYLOAD_PATH_FRAGMENT") {
            self.detector.tier1.payload_path_fragment = v;
        }
        if let Some(v) = env_non_empty("PLCGUARD_POLL_THRESHOLD") {
            if let Ok(parsed) = v.parse::<usize>() {
                self.detector.tier1.poll_threshold = parsed;
            }
        }
        if let Some(v) = env_non_empty("PLCGUARD_POLL_WINDOW_SECS") {
            if let Ok(parsed) = v.parse::<u64>() {
                self.detector.tier1.poll_window_secs = parsed;
            }
        }
    }

    fn apply_env_tier2(&mut self) {
        if let Some(v) = env_non_empty("PLCGUARD_WRITE_RATE_THRESHOLD") {
            if let Ok(parsed) = v.parse::<f64>() {
                self.detector.tier2.rate_threshold_per_sec = parsed;
            }
        }
        if let Some(v) = env_non_empty("PLCGUARD_WRITE_RATE_WINDOW_SECS") {
            if let Ok(parsed) = v.parse::<u64>() {
                self.detector.tier2.window_secs = parsed;
            }
        }
    }

    fn apply_env_tier3(&mut self) {
        if let Some(v) = env_non_empty("PLCGUARD_MAX_READ_WRITE_LATENCY_MS") {
            if let Ok(parsed) = v.parse::<u64>() {
                self.detector.tier3.max_read_write_latency_ms = parsed;
            }
        }
    }

    fn apply_env_paths(&mut self) {
        if let Some(v) = env_non_empty("PLCGUARD_ACTUATOR_WRITE_FRAGMENT") {
            self.detector.actuator_write_fragment = v;
        }
        if let Some(v) = env_non_empty("PLCGUARD_MONITOR_READ_FRAGMENT") {
            self.detector.monitor_read_fragment = v;
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
struct FileConfig {
    #[serde(default)]
    tier1: Option<FileTier1Config>,
    #[serde(default)]
    tier2: Option<FileTier2Config>,
    #[serde(default)]
    tier3: Option<FileTier3Config>,
    #[serde(default)]
    paths: Option<FilePathsConfig>,
}

#[derive(Debug, Clone, Deserialize, Default)]
struct FileTier1Config {
    #[serde(default)]
    strategy: Option<String>,
    #[serde(default)]
    payload_path_fragment: Option<String>,
    #[serde(default)]
    poll_threshold: Option<usize>,
    #[serde(default)]
    poll_window_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
struct FileTier2Config {
    #[serde(default)]
    rate_threshold_per_sec: Option<f64>,
    #[serde(default)]
    window_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
struct FileTier3Config {
    #[serde(default)]
    max_read_write_latency_ms: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
struct FilePathsConfig {
    #[serde(default)]
    actuator_write_fragment: Option<String>,
    #[serde(default)]
    monitor_read_fragment: Option<String>,
}

/// Unknown strategy names are ignored so a stale config cannot disable
/// detection outright.
fn parse_strategy(raw: &str) -> Option<Tier1Strategy> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "polling" | "polling-pattern" => Some(Tier1Strategy::PollingPattern),
        "registration" | "registration-header" => Some(Tier1Strategy::RegistrationHeader),
        _ => None,
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use std::io::Write as _;

    use super::*;

    #[test]
    fn defaults_match_detector_defaults() {
        let cfg = GuardConfig::default();
        assert_eq!(cfg.detector.tier1.poll_threshold, 3);
        assert_eq!(cfg.detector.tier1.poll_window_secs, 90);
        assert_eq!(cfg.detector.tier2.rate_threshold_per_sec, 2.0);
        assert_eq!(cfg.detector.tier2.window_secs, 5);
        assert_eq!(cfg.detector.tier3.max_read_write_latency_ms, 500);
        assert_eq!(cfg.detector.actuator_write_fragment, "/point-write");
        assert_eq!(cfg.detector.monitor_read_fragment, "/monitor-update");
    }

    #[test]
    fn file_config_overrides_only_named_fields() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
[tier1]
poll_threshold = 5

[tier2]
rate_threshold_per_sec = 4.5

[paths]
actuator_write_fragment = "/api/write-coil"
"#
        )
        .unwrap();

        let mut cfg = GuardConfig::default();
        cfg.apply_file(file.path()).unwrap();

        assert_eq!(cfg.detector.tier1.poll_threshold, 5);
        assert_eq!(cfg.detector.tier1.poll_window_secs, 90);
        assert_eq!(cfg.detector.tier2.rate_threshold_per_sec, 4.5);
        assert_eq!(cfg.detector.tier2.window_secs, 5);
        assert_eq!(cfg.detector.actuator_write_fragment, "/api/write-coil");
        assert_eq!(cfg.detector.monitor_read_fragment, "/monitor-update");
    }

    #[test]
    fn file_config_switches_tier1_strategy() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
[tier1]
strategy = "registration-header"
"#
        )
        .unwrap();

        let mut cfg = GuardConfig::default();
        cfg.apply_file(file.path()).unwrap();
        assert_eq!(
            cfg.detector.tier1.strategy,
            Tier1Strategy::RegistrationHeader
        );
    }

    #[test]
    fn malformed_toml_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "tier1 = not-a-table").unwrap();

        let mut cfg = GuardConfig::default();
        assert!(cfg.apply_file(file.path()).is_err());
    }

    #[test]
    fn strategy_names_parse_case_insensitively() {
        assert_eq!(
            parse_strategy("Polling-Pattern"),
            Some(Tier1Strategy::PollingPattern)
        );
        assert_eq!(parse_strategy("polling"), Some(Tier1Strategy::PollingPattern));
        assert_eq!(
            parse_strategy(" REGISTRATION "),
            Some(Tier1Strategy::RegistrationHeader)
        );
        assert_eq!(parse_strategy("heuristic"), None);
        assert_eq!(parse_strategy(""), None);
    }

    #[test]
    fn env_overrides_win_over_defaults() {
        std::env::set_var("PLCGUARD_POLL_THRESHOLD", "7");
        std::env::set_var("PLCGUARD_WRITE_RATE_THRESHOLD", "not-a-number");
        std::env::set_var("PLCGUARD_MONITOR_READ_FRAGMENT", "/api/read-points");

        let mut cfg = GuardConfig::default();
        cfg.apply_env_overrides();

        std::env::remove_var("PLCGUARD_POLL_THRESHOLD");
        std::env::remove_var("PLCGUARD_WRITE_RATE_THRESHOLD");
        std::env::remove_var("PLCGUARD_MONITOR_READ_FRAGMENT");

        assert_eq!(cfg.detector.tier1.poll_threshold, 7);
        // Unparsable numeric overrides are ignored, not fatal.
        assert_eq!(cfg.detector.tier2.rate_threshold_per_sec, 2.0);
        assert_eq!(cfg.detector.monitor_read_fragment, "/api/read-points");
    }
}

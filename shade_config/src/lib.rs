#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schema for a time-simulated window covering.
//!
//! - `Config` and sub-structs are deserialized from TOML and validated.
//! - Durations are expressed in seconds in the file; the core converts them
//!   to `Duration` once at build time.
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Default lag between a start pulse and visible motion (seconds).
pub const DEFAULT_INITIAL_DELAY_S: f64 = 0.1;
/// Default full-travel time in either direction (seconds).
pub const DEFAULT_TOTAL_DURATION_S: f64 = 45.0;
/// Default recompute tick while moving (milliseconds).
pub const DEFAULT_TICK_MS: u64 = 100;
/// Upper bound for any configured duration (seconds).
pub const MAX_DURATION_S: f64 = 24.0 * 60.0 * 60.0;
/// Upper bound for the recompute tick (milliseconds).
pub const MAX_TICK_MS: u64 = 60_000;

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Timing {
    /// Delay between issuing a start code and the covering actually moving
    pub initial_delay_s: f64,
    /// Time to travel 0% -> 100%
    pub total_duration_open_s: f64,
    /// Time to travel 100% -> 0%
    pub total_duration_close_s: f64,
    /// Position recompute interval while moving
    pub tick_ms: u64,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            initial_delay_s: DEFAULT_INITIAL_DELAY_S,
            total_duration_open_s: DEFAULT_TOTAL_DURATION_S,
            total_duration_close_s: DEFAULT_TOTAL_DURATION_S,
            tick_ms: DEFAULT_TICK_MS,
        }
    }
}

/// Logical code -> transport payload.
///
/// Example:
/// [data]
/// open = "2600500000012..."
/// close = "2600500000013..."
/// stop = "2600500000014..."
#[derive(Debug, Deserialize, Clone)]
pub struct Codes {
    pub open: String,
    pub close: String,
    pub stop: String,
    /// Drives all the way to the open end stop; the device halts by itself.
    #[serde(default)]
    pub open_completely: Option<String>,
    /// Drives all the way to the closed end stop; the device halts by itself.
    #[serde(default)]
    pub close_completely: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogRotation {
    #[default]
    Never,
    Daily,
    Hourly,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    pub file: Option<PathBuf>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    pub rotation: LogRotation,
}

fn default_name() -> String {
    "window covering".to_string()
}

#[derive(Debug, Deserialize)]
pub struct Config {
    /// Display name used in log events
    #[serde(default = "default_name")]
    pub name: String,
    /// Save the settled position and restore it on startup
    #[serde(default)]
    pub persist_state: bool,
    /// JSON file holding the persisted position; required with `persist_state`
    #[serde(default)]
    pub state_file: Option<PathBuf>,
    /// Starting position when nothing was persisted
    #[serde(default)]
    pub initial_position: u8,
    #[serde(default)]
    pub timing: Timing,
    pub data: Codes,
    #[serde(default)]
    pub logging: Logging,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

/// Read, parse and validate a config file.
pub fn load_file(path: &Path) -> eyre::Result<Config> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| eyre::eyre!("read config {:?}: {}", path, e))?;
    let cfg = load_toml(&text).map_err(|e| eyre::eyre!("parse config {:?}: {}", path, e))?;
    cfg.validate()?;
    Ok(cfg)
}

fn check_positive_secs(name: &str, v: f64) -> eyre::Result<()> {
    if !v.is_finite() {
        eyre::bail!("{name} must be a finite number of seconds");
    }
    if v <= 0.0 {
        eyre::bail!("{name} must be > 0");
    }
    Ok(())
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Timing
        check_positive_secs("timing.initial_delay_s", self.timing.initial_delay_s)?;
        check_positive_secs(
            "timing.total_duration_open_s",
            self.timing.total_duration_open_s,
        )?;
        check_positive_secs(
            "timing.total_duration_close_s",
            self.timing.total_duration_close_s,
        )?;
        if self.timing.total_duration_open_s > MAX_DURATION_S
            || self.timing.total_duration_close_s > MAX_DURATION_S
        {
            eyre::bail!("timing.total_duration_*_s is unreasonably large (>24h)");
        }
        if self.timing.initial_delay_s > MAX_DURATION_S {
            eyre::bail!("timing.initial_delay_s is unreasonably large (>24h)");
        }
        if self.timing.tick_ms == 0 {
            eyre::bail!("timing.tick_ms must be >= 1");
        }
        if self.timing.tick_ms > MAX_TICK_MS {
            eyre::bail!("timing.tick_ms must be <= {MAX_TICK_MS}");
        }

        // Codes
        for (name, payload) in [
            ("data.open", Some(&self.data.open)),
            ("data.close", Some(&self.data.close)),
            ("data.stop", Some(&self.data.stop)),
            ("data.open_completely", self.data.open_completely.as_ref()),
            ("data.close_completely", self.data.close_completely.as_ref()),
        ] {
            if let Some(p) = payload
                && p.trim().is_empty()
            {
                eyre::bail!("{name} must not be empty");
            }
        }

        // State
        if self.initial_position > 100 {
            eyre::bail!("initial_position must be in [0, 100]");
        }
        if self.persist_state && self.state_file.is_none() {
            eyre::bail!("state_file is required when persist_state = true");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
[data]
open = "OPEN"
close = "CLOSE"
stop = "STOP"
"#;

    #[test]
    fn defaults_match_documented_values() {
        let cfg = load_toml(MINIMAL).expect("parse");
        assert_eq!(cfg.timing.initial_delay_s, 0.1);
        assert_eq!(cfg.timing.total_duration_open_s, 45.0);
        assert_eq!(cfg.timing.total_duration_close_s, 45.0);
        assert_eq!(cfg.timing.tick_ms, 100);
        assert!(!cfg.persist_state);
        assert_eq!(cfg.initial_position, 0);
        assert_eq!(cfg.logging.rotation, LogRotation::Never);
        cfg.validate().expect("defaults are valid");
    }

    #[test]
    fn missing_data_section_is_a_parse_error() {
        assert!(load_toml("name = \"x\"").is_err());
    }
}

//! `From` implementations bridging `shade_config` types to `shade_core` types.

use std::time::Duration;

use crate::config::{CodeMap, TimingCfg};

/// Seconds from the config file. Anything unrepresentable maps to zero and is
/// rejected by the builder; positive values never round down to zero.
fn secs(s: f64) -> Duration {
    match Duration::try_from_secs_f64(s) {
        Ok(d) if d.is_zero() && s > 0.0 => Duration::from_nanos(1),
        Ok(d) => d,
        Err(_) => Duration::ZERO,
    }
}

impl From<&shade_config::Timing> for TimingCfg {
    fn from(t: &shade_config::Timing) -> Self {
        Self {
            initial_delay: secs(t.initial_delay_s),
            total_open: secs(t.total_duration_open_s),
            total_close: secs(t.total_duration_close_s),
            tick: Duration::from_millis(t.tick_ms),
        }
    }
}

impl From<&shade_config::Codes> for CodeMap {
    fn from(c: &shade_config::Codes) -> Self {
        Self {
            open: c.open.clone(),
            close: c.close.clone(),
            stop: c.stop.clone(),
            open_completely: c.open_completely.clone(),
            close_completely: c.close_completely.clone(),
        }
    }
}

//! Runtime configuration for the movement engine.

use std::fmt;
use std::time::Duration;

/// Timing characteristics of one covering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimingCfg {
    /// Wait between accepting a target and sending the start code.
    pub initial_delay: Duration,
    /// Full 0% -> 100% travel.
    pub total_open: Duration,
    /// Full 100% -> 0% travel.
    pub total_close: Duration,
    /// Position recompute interval while moving.
    pub tick: Duration,
}

impl Default for TimingCfg {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(100),
            total_open: Duration::from_secs(45),
            total_close: Duration::from_secs(45),
            tick: Duration::from_millis(100),
        }
    }
}

/// Named command understood by the covering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalCode {
    Open,
    Close,
    Stop,
    OpenCompletely,
    CloseCompletely,
}

impl LogicalCode {
    pub fn as_str(self) -> &'static str {
        match self {
            LogicalCode::Open => "OPEN",
            LogicalCode::Close => "CLOSE",
            LogicalCode::Stop => "STOP",
            LogicalCode::OpenCompletely => "OPEN_COMPLETELY",
            LogicalCode::CloseCompletely => "CLOSE_COMPLETELY",
        }
    }
}

impl fmt::Display for LogicalCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Transport payload for each logical code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeMap {
    pub open: String,
    pub close: String,
    pub stop: String,
    pub open_completely: Option<String>,
    pub close_completely: Option<String>,
}

impl CodeMap {
    pub fn payload(&self, code: LogicalCode) -> Option<&str> {
        match code {
            LogicalCode::Open => Some(&self.open),
            LogicalCode::Close => Some(&self.close),
            LogicalCode::Stop => Some(&self.stop),
            LogicalCode::OpenCompletely => self.open_completely.as_deref(),
            LogicalCode::CloseCompletely => self.close_completely.as_deref(),
        }
    }

    pub(crate) fn any_empty(&self) -> bool {
        [&self.open, &self.close, &self.stop].iter().any(|p| p.is_empty())
            || self.open_completely.as_ref().is_some_and(String::is_empty)
            || self.close_completely.as_ref().is_some_and(String::is_empty)
    }
}

impl Default for CodeMap {
    /// Payloads equal to the logical names; handy with the simulated transmitter.
    fn default() -> Self {
        Self {
            open: LogicalCode::Open.as_str().to_string(),
            close: LogicalCode::Close.as_str().to_string(),
            stop: LogicalCode::Stop.as_str().to_string(),
            open_completely: None,
            close_completely: None,
        }
    }
}

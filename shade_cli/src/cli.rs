//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::OnceLock;
use std::time::Duration;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();
/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(name = "shade", version, about = "Time-simulated window covering")]
pub struct Cli {
    /// Path to config TOML
    #[arg(long, value_name = "FILE", default_value = "etc/shade.toml")]
    pub config: PathBuf,

    /// Print results and logs as JSON lines
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace); overrides [logging].level
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Simulate time instead of waiting for it; runs finish immediately
    #[arg(long, action = ArgAction::SetTrue)]
    pub virtual_time: bool,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Move to a target position and wait until the covering settles
    Move {
        /// Target position in percent (0 = closed, 100 = open)
        #[arg(long, allow_negative_numbers = true)]
        percent: i32,
        /// Assume this starting position instead of the persisted one
        #[arg(long, value_name = "PERCENT", value_parser = clap::value_parser!(u8).range(0..=100))]
        from: Option<u8>,
    },
    /// Issue several targets in a row; STEP is `P` or `P@SECONDS`
    /// (SECONDS after the previous request)
    Sequence {
        #[arg(required = true, value_name = "STEP", value_parser = parse_step)]
        steps: Vec<(Duration, i32)>,
        /// Assume this starting position instead of the persisted one
        #[arg(long, value_name = "PERCENT", value_parser = clap::value_parser!(u8).range(0..=100))]
        from: Option<u8>,
    },
    /// Show direction, timing and codes for a move without sending anything
    Plan {
        /// Target position in percent
        #[arg(long, allow_negative_numbers = true)]
        percent: i32,
        /// Starting position (defaults to the persisted or configured one)
        #[arg(long, value_name = "PERCENT", value_parser = clap::value_parser!(u8).range(0..=100))]
        from: Option<u8>,
    },
    /// Read targets (or `stop`) line by line from stdin until EOF or Ctrl-C
    Listen,
    /// Load and validate the config, then report effective settings
    SelfCheck,
}

/// Parse `P` or `P@SECONDS`.
pub fn parse_step(s: &str) -> Result<(Duration, i32), String> {
    let (pct, delay) = match s.split_once('@') {
        Some((p, d)) => (p, Some(d)),
        None => (s, None),
    };
    let percent: i32 = pct
        .trim()
        .parse()
        .map_err(|_| format!("invalid percent `{pct}`"))?;
    let delay = match delay {
        None => Duration::ZERO,
        Some(d) => {
            let secs: f64 = d
                .trim()
                .parse()
                .map_err(|_| format!("invalid delay `{d}`"))?;
            Duration::try_from_secs_f64(secs)
                .map_err(|_| format!("delay must be a non-negative number of seconds, got `{d}`"))?
        }
    };
    Ok((delay, percent))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steps_parse_with_and_without_delay() {
        assert_eq!(parse_step("40"), Ok((Duration::ZERO, 40)));
        assert_eq!(parse_step("60@2.5"), Ok((Duration::from_millis(2500), 60)));
        assert!(parse_step("x@1").is_err());
        assert!(parse_step("10@-1").is_err());
        assert!(parse_step("10@soon").is_err());
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}

//! Subcommand execution: controller assembly, runs, and result output.

use std::io::BufRead;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use eyre::WrapErr;
use serde_json::json;
use shade_config::Config;
use shade_core::error::Result as CoreResult;
use shade_core::runner::{self, Request};
use shade_core::{
    CodeMap, Direction, MoveController, TimingCfg, clamp_percent, per_percent_duration,
    start_code_for, travel_duration,
};
use shade_hardware::{FileStateStore, SimulatedTransmitter};
use shade_traits::{Clock, ManualClock, MonotonicClock, StateStore};

/// Outcome of a finished run, printed as text or one JSON line.
#[derive(Debug)]
pub struct RunReport {
    pub start_position: u8,
    pub final_position: u8,
    pub codes: Vec<&'static str>,
    pub elapsed_ms: u64,
}

impl RunReport {
    pub fn print(&self, json: bool) {
        if json {
            println!(
                "{}",
                json!({
                    "start_position": self.start_position,
                    "final_position": self.final_position,
                    "codes": self.codes,
                    "elapsed_ms": self.elapsed_ms,
                })
            );
        } else {
            println!("final position: {}%", self.final_position);
            println!("codes sent: {}", self.codes.join(", "));
            println!("elapsed: {} ms", self.elapsed_ms);
        }
    }
}

/// Milliseconds with sub-millisecond precision.
fn ms(d: Duration) -> f64 {
    d.as_nanos() as f64 / 1e6
}

fn state_store(cfg: &Config) -> Option<FileStateStore> {
    if cfg.persist_state {
        cfg.state_file.as_ref().map(FileStateStore::new)
    } else {
        None
    }
}

/// Assemble a controller from config. `from` pins the starting position and
/// bypasses persistence entirely.
pub fn build_controller(
    cfg: &Config,
    from: Option<u8>,
    clock: Box<dyn Clock + Send + Sync>,
) -> CoreResult<MoveController> {
    let mut builder = MoveController::builder()
        .with_transmitter(SimulatedTransmitter::new().with_echo(true))
        .with_config(cfg)
        .with_clock(clock);
    match from {
        Some(p) => builder = builder.with_initial_position(p),
        None => {
            if let Some(store) = state_store(cfg) {
                builder = builder.with_state_store(store);
            }
        }
    }
    builder.build().wrap_err("build controller")
}

fn clock_for(virtual_time: bool) -> Box<dyn Clock + Send + Sync> {
    if virtual_time {
        Box::new(ManualClock::new())
    } else {
        Box::new(MonotonicClock::new())
    }
}

/// Generous upper bound for a run of `requests` moves plus scripted delays.
fn max_wait(timing: &TimingCfg, requests: usize, scripted: Duration) -> Duration {
    let per_move = timing.initial_delay + timing.total_open.max(timing.total_close);
    let moves = u32::try_from(requests).unwrap_or(u32::MAX).saturating_add(1);
    per_move
        .saturating_mul(moves)
        .saturating_add(scripted)
        .saturating_add(Duration::from_secs(1))
}

pub fn run_move(
    cfg: &Config,
    percent: i32,
    from: Option<u8>,
    virtual_time: bool,
) -> CoreResult<RunReport> {
    run_sequence(cfg, &[(Duration::ZERO, percent)], from, virtual_time)
}

pub fn run_sequence(
    cfg: &Config,
    steps: &[(Duration, i32)],
    from: Option<u8>,
    virtual_time: bool,
) -> CoreResult<RunReport> {
    let mut ctrl = build_controller(cfg, from, clock_for(virtual_time))?;
    let start_position = ctrl.read_current_position();
    let started = ctrl.now();
    let scripted = steps.iter().map(|(d, _)| *d).sum();
    let limit = max_wait(ctrl.timing(), steps.len(), scripted);

    tracing::info!(
        name = %cfg.name,
        start_position,
        steps = steps.len(),
        virtual_time,
        "run start"
    );
    let final_position = runner::run_script(&mut ctrl, steps, limit)?;
    let elapsed = ctrl.now().saturating_duration_since(started);
    tracing::info!(final_position, elapsed_ms = elapsed.as_millis() as u64, "run complete");

    Ok(RunReport {
        start_position,
        final_position,
        codes: ctrl.sent_codes(),
        elapsed_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
    })
}

/// Print what a move would do, without sending anything.
pub fn plan(cfg: &Config, percent: i32, from: Option<u8>, json: bool) -> CoreResult<()> {
    let timing = TimingCfg::from(&cfg.timing);
    let codes = CodeMap::from(&cfg.data);
    let start = match from {
        Some(p) => p,
        None => match state_store(cfg).map(|s| s.load()) {
            Some(Ok(Some(p))) => p.min(100),
            _ => cfg.initial_position,
        },
    };
    let target = clamp_percent(percent);
    let direction = Direction::between(start, target);
    let opening = direction == Direction::Opening;
    let per = per_percent_duration(opening, timing.total_open, timing.total_close);
    let travel = travel_duration(start, target, &timing);

    let planned: Vec<&'static str> = if direction == Direction::Idle {
        Vec::new()
    } else {
        let (code, self_stopping) = start_code_for(opening, target, &codes);
        if self_stopping {
            vec![code.as_str()]
        } else {
            vec![code.as_str(), "STOP"]
        }
    };
    let total = if direction == Direction::Idle {
        Duration::ZERO
    } else {
        timing.initial_delay + travel
    };

    if json {
        println!(
            "{}",
            json!({
                "from": start,
                "target": target,
                "direction": direction.as_str(),
                "per_percent_ms": ms(per),
                "travel_ms": ms(travel),
                "total_ms": ms(total),
                "codes": planned,
            })
        );
    } else {
        println!("from {start}% to {target}% ({direction})");
        println!("per percent: {:.1} ms", ms(per));
        println!(
            "travel: {:.1} ms after a {:.1} ms start delay",
            ms(travel),
            ms(timing.initial_delay)
        );
        println!("codes: {}", planned.join(", "));
    }
    Ok(())
}

fn parse_line(line: &str) -> Option<Request> {
    let l = line.trim();
    if l.eq_ignore_ascii_case("stop") || l.eq_ignore_ascii_case("halt") {
        return Some(Request::Halt);
    }
    l.trim_end_matches('%').parse::<i32>().ok().map(Request::Target)
}

/// Feed stdin lines to the controller until EOF or Ctrl-C.
pub fn listen(
    cfg: &Config,
    virtual_time: bool,
    shutdown: Arc<AtomicBool>,
) -> CoreResult<RunReport> {
    if virtual_time {
        tracing::warn!("listen always runs on the wall clock; ignoring --virtual-time");
    }
    let mut ctrl = build_controller(cfg, None, Box::new(MonotonicClock::new()))?;
    let start_position = ctrl.read_current_position();
    let started = ctrl.now();

    let (tx, rx) = crossbeam_channel::unbounded();
    let reader_shutdown = shutdown.clone();
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if line.trim().is_empty() {
                continue;
            }
            match parse_line(&line) {
                Some(req) => {
                    if tx.send(req).is_err() {
                        break;
                    }
                }
                None => tracing::warn!(input = %line.trim(), "ignoring unrecognised input"),
            }
            if reader_shutdown.load(Ordering::Relaxed) {
                break;
            }
        }
        // Dropping the sender ends `serve`.
    });

    let final_position = runner::serve(&mut ctrl, &rx, &shutdown)?;
    let elapsed = ctrl.now().saturating_duration_since(started);
    Ok(RunReport {
        start_position,
        final_position,
        codes: ctrl.sent_codes(),
        elapsed_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
    })
}

/// Report effective settings after validation.
pub fn self_check(cfg: &Config, json: bool) -> CoreResult<()> {
    let timing = TimingCfg::from(&cfg.timing);
    // Building proves the settings are accepted by the engine as well.
    let ctrl = build_controller(cfg, None, Box::new(ManualClock::new()))?;
    let per_open = per_percent_duration(true, timing.total_open, timing.total_close);
    let per_close = per_percent_duration(false, timing.total_open, timing.total_close);
    let completely: Vec<&str> = [
        cfg.data.open_completely.as_ref().map(|_| "OPEN_COMPLETELY"),
        cfg.data.close_completely.as_ref().map(|_| "CLOSE_COMPLETELY"),
    ]
    .into_iter()
    .flatten()
    .collect();

    if json {
        println!(
            "{}",
            json!({
                "ok": true,
                "name": cfg.name,
                "position": ctrl.read_current_position(),
                "initial_delay_ms": ms(timing.initial_delay),
                "per_percent_open_ms": ms(per_open),
                "per_percent_close_ms": ms(per_close),
                "tick_ms": cfg.timing.tick_ms,
                "persist_state": cfg.persist_state,
                "extra_codes": completely,
            })
        );
    } else {
        println!("OK: {}", cfg.name);
        println!("position: {}%", ctrl.read_current_position());
        println!(
            "timing: delay {:.1} ms, open {:.1} s, close {:.1} s, tick {} ms",
            ms(timing.initial_delay),
            timing.total_open.as_secs_f64(),
            timing.total_close.as_secs_f64(),
            cfg.timing.tick_ms
        );
        match (&cfg.state_file, cfg.persist_state) {
            (Some(path), true) => println!("persistence: {}", path.display()),
            _ => println!("persistence: off"),
        }
        if !completely.is_empty() {
            println!("extra codes: {}", completely.join(", "));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listen_lines_map_to_requests() {
        assert_eq!(parse_line("42"), Some(Request::Target(42)));
        assert_eq!(parse_line(" 70% "), Some(Request::Target(70)));
        assert_eq!(parse_line("STOP"), Some(Request::Halt));
        assert_eq!(parse_line("halt"), Some(Request::Halt));
        assert_eq!(parse_line("open please"), None);
    }

    #[test]
    fn max_wait_covers_every_move() {
        let t = TimingCfg::default();
        let w = max_wait(&t, 2, Duration::from_secs(3));
        assert!(w >= (t.initial_delay + t.total_open) * 2 + Duration::from_secs(3));
    }
}

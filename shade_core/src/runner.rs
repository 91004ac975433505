//! Drivers for the controller's timeline.
//!
//! `run_until_idle` and `run_script` sleep through the controller's own clock,
//! so with a `ManualClock` they complete instantly. `serve` waits on a
//! channel with real timeouts and is meant for a wall clock.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError};
use eyre::WrapErr;

use crate::controller::MoveController;
use crate::error::{Result, ShadeError};

/// Longest `serve` blocks on the channel before re-checking the shutdown flag.
pub const SERVE_IDLE_WAIT: Duration = Duration::from_millis(100);

/// Message accepted by [`serve`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Request {
    Target(i32),
    Halt,
}

/// Poll and sleep until no move is in flight; returns the final position.
pub fn run_until_idle(ctrl: &mut MoveController, max_wait: Duration) -> Result<u8> {
    let started = ctrl.now();
    loop {
        let status = ctrl.poll();
        if status.is_at_rest() {
            return Ok(ctrl.read_current_position());
        }
        let now = ctrl.now();
        let waited = now.saturating_duration_since(started);
        if waited >= max_wait {
            return Err(eyre::Report::new(ShadeError::Timeout)).wrap_err_with(|| {
                format!(
                    "still {:?} at {}% after {} ms (target {}%)",
                    status,
                    ctrl.read_current_position(),
                    waited.as_millis(),
                    ctrl.target_position()
                )
            });
        }
        let until = ctrl
            .next_deadline()
            .unwrap_or(now + ctrl.timing().tick)
            .min(started + max_wait);
        ctrl.sleep(until.saturating_duration_since(now));
    }
}

/// Poll and sleep until `at`, firing every continuation due before it.
fn advance_to(ctrl: &mut MoveController, at: Instant) {
    loop {
        ctrl.poll();
        let now = ctrl.now();
        if now >= at {
            return;
        }
        let until = ctrl.next_deadline().map_or(at, |d| d.min(at));
        ctrl.sleep(until.saturating_duration_since(now));
    }
}

/// Apply each `(delay, percent)` request `delay` after the previous one on the
/// controller's timeline, then run until idle.
pub fn run_script(
    ctrl: &mut MoveController,
    steps: &[(Duration, i32)],
    max_wait: Duration,
) -> Result<u8> {
    for (i, &(delay, percent)) in steps.iter().enumerate() {
        let at = ctrl.now() + delay;
        advance_to(ctrl, at);
        tracing::info!(step = i, percent, "request");
        ctrl.request_target(percent);
    }
    run_until_idle(ctrl, max_wait)
}

/// Serve requests from `requests` until the channel closes or `shutdown` is
/// set, then halt any move still in flight. Returns the final position.
pub fn serve(
    ctrl: &mut MoveController,
    requests: &Receiver<Request>,
    shutdown: &AtomicBool,
) -> Result<u8> {
    tracing::info!(position = ctrl.read_current_position(), "serving requests");
    loop {
        if shutdown.load(Ordering::Relaxed) {
            tracing::info!("shutdown requested");
            break;
        }
        ctrl.poll();
        let wait = ctrl
            .next_deadline()
            .map_or(SERVE_IDLE_WAIT, |d| d.saturating_duration_since(ctrl.now()))
            .min(SERVE_IDLE_WAIT);
        match requests.recv_timeout(wait) {
            Ok(Request::Target(percent)) => {
                tracing::info!(percent, "request");
                ctrl.request_target(percent);
            }
            Ok(Request::Halt) => ctrl.halt(),
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => {
                tracing::debug!("request channel closed");
                break;
            }
        }
    }
    ctrl.halt();
    Ok(ctrl.read_current_position())
}

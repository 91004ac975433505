//! Position simulation state machine.
//!
//! The simulator owns the current and target position, the active movement
//! token, and a queue of pending continuations (the initial-delay wake-up and
//! the recompute tick). Continuations carry the token that was active when
//! they were scheduled; when one fires under a newer token it is dropped.
//! Nothing is ever cancelled in place.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::time::{Duration, Instant};

use crate::config::{CodeMap, LogicalCode, TimingCfg};
use crate::dispatcher::CodeDispatcher;
use crate::duration::{per_percent_duration, steps_covered};
use crate::status::MotionStatus;
use crate::types::{Direction, MovementToken};

/// Start code for a move toward `target`, and whether the device halts by
/// itself at the end stop.
///
/// Moves started with OPEN_COMPLETELY or CLOSE_COMPLETELY get no STOP on
/// arrival. STOP is still sent if such a move is superseded.
pub fn start_code_for(opening: bool, target: u8, codes: &CodeMap) -> (LogicalCode, bool) {
    match (opening, target) {
        (true, 100) if codes.open_completely.is_some() => (LogicalCode::OpenCompletely, true),
        (false, 0) if codes.close_completely.is_some() => (LogicalCode::CloseCompletely, true),
        (true, _) => (LogicalCode::Open, false),
        (false, _) => (LogicalCode::Close, false),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Continuation {
    BeginMotion,
    Tick,
}

#[derive(Debug)]
struct Scheduled {
    due: Instant,
    seq: u64,
    token: MovementToken,
    kind: Continuation,
}

// Min-heap on (due, seq): earliest first, FIFO among equal deadlines.
impl Ord for Scheduled {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .due
            .cmp(&self.due)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for Scheduled {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Scheduled {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Scheduled {}

#[derive(Debug, Clone, Copy)]
enum Phase {
    Idle,
    AwaitingInitialDelay {
        direction: Direction,
    },
    Moving {
        direction: Direction,
        from: u8,
        started_at: Instant,
        per_percent: Duration,
        /// Started with a fully-open/close code; the device stops itself.
        self_stopping: bool,
    },
}

#[derive(Debug)]
pub struct PositionSimulator {
    timing: TimingCfg,
    dispatcher: CodeDispatcher,
    current: u8,
    target: u8,
    token: MovementToken,
    phase: Phase,
    queue: BinaryHeap<Scheduled>,
    seq: u64,
}

impl PositionSimulator {
    /// Timing must already be validated; see `MoveControllerBuilder`.
    pub(crate) fn new(timing: TimingCfg, dispatcher: CodeDispatcher, position: u8) -> Self {
        let position = position.min(100);
        Self {
            timing,
            dispatcher,
            current: position,
            target: position,
            token: MovementToken::default(),
            phase: Phase::Idle,
            queue: BinaryHeap::new(),
            seq: 0,
        }
    }

    pub fn timing(&self) -> &TimingCfg {
        &self.timing
    }

    pub fn dispatcher(&self) -> &CodeDispatcher {
        &self.dispatcher
    }

    /// Last frozen or tick-computed position.
    pub fn current(&self) -> u8 {
        self.current
    }

    pub fn target(&self) -> u8 {
        self.target
    }

    pub fn token(&self) -> MovementToken {
        self.token
    }

    pub fn direction(&self) -> Direction {
        match self.phase {
            Phase::Idle => Direction::Idle,
            Phase::AwaitingInitialDelay { direction } | Phase::Moving { direction, .. } => {
                direction
            }
        }
    }

    pub fn is_active(&self) -> bool {
        !matches!(self.phase, Phase::Idle)
    }

    /// Status of the movement in flight, without advancing time.
    pub fn status(&self) -> MotionStatus {
        match self.phase {
            Phase::Idle => MotionStatus::Idle,
            Phase::AwaitingInitialDelay { .. } => MotionStatus::AwaitingInitialDelay,
            Phase::Moving { direction, .. } => MotionStatus::Moving(direction),
        }
    }

    /// Position at `now`: derived from elapsed time while moving, the frozen
    /// value otherwise.
    pub fn estimate(&self, now: Instant) -> u8 {
        match self.phase {
            Phase::Moving {
                from,
                started_at,
                per_percent,
                ..
            } => {
                let elapsed = now.saturating_duration_since(started_at);
                let span = u64::from(from.abs_diff(self.target));
                let steps = steps_covered(elapsed, per_percent).min(span);
                // steps <= span <= 100
                let steps = u8::try_from(steps).unwrap_or(u8::MAX);
                if self.target >= from {
                    from.saturating_add(steps).min(self.target)
                } else {
                    from.saturating_sub(steps).max(self.target)
                }
            }
            _ => self.current,
        }
    }

    /// Earliest deadline belonging to the active movement.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.queue
            .iter()
            .filter(|s| s.token == self.token)
            .map(|s| s.due)
            .min()
    }

    /// Accept a new (already clamped) target at `now`.
    ///
    /// Returns `Stopped(position)` when the request brought an active move
    /// to rest where it stands, otherwise the status after the request.
    pub fn set_target(&mut self, target: u8, now: Instant) -> MotionStatus {
        let target = target.min(100);
        let was_active = self.is_active();

        if was_active {
            if target == self.target {
                tracing::trace!(target, "already heading to target");
                return self.status();
            }
            self.abandon(now);
        } else if target == self.current {
            self.target = target;
            return MotionStatus::Idle;
        }

        self.target = target;
        self.token = self.token.next();

        if target == self.current {
            // Superseded onto the position we already hold.
            self.phase = Phase::Idle;
            tracing::debug!(position = self.current, "retarget to current position; idle");
            return MotionStatus::Stopped(self.current);
        }

        let direction = Direction::between(self.current, target);
        self.phase = Phase::AwaitingInitialDelay { direction };
        self.schedule(now + self.timing.initial_delay, Continuation::BeginMotion);
        tracing::debug!(
            from = self.current,
            target,
            %direction,
            token = self.token.get(),
            delay_ms = self.timing.initial_delay.as_millis() as u64,
            "move accepted"
        );
        self.status()
    }

    /// Fire every continuation due at or before `now`, in deadline order.
    ///
    /// Returns `Stopped(position)` if a move settled during this call,
    /// otherwise the status after processing.
    pub fn poll(&mut self, now: Instant) -> MotionStatus {
        let mut settled = None;
        while self.queue.peek().is_some_and(|s| s.due <= now) {
            let Some(entry) = self.queue.pop() else { break };
            if entry.token != self.token {
                tracing::trace!(
                    stale = entry.token.get(),
                    active = self.token.get(),
                    kind = ?entry.kind,
                    "stale continuation dropped"
                );
                continue;
            }
            match entry.kind {
                Continuation::BeginMotion => self.begin_motion(now),
                Continuation::Tick => {
                    if let Some(p) = self.tick(now) {
                        settled = Some(p);
                    }
                }
            }
        }
        match settled {
            Some(p) if !self.is_active() => MotionStatus::Stopped(p),
            _ => self.status(),
        }
    }

    /// Stop tracking the in-flight move: freeze the position where it is and
    /// send STOP if a start code went out.
    fn abandon(&mut self, now: Instant) {
        if let Phase::Moving { .. } = self.phase {
            self.current = self.estimate(now);
            self.dispatcher.send(LogicalCode::Stop);
            tracing::debug!(
                position = self.current,
                token = self.token.get(),
                "move superseded; stopped"
            );
        } else {
            tracing::debug!(token = self.token.get(), "move superseded before start");
        }
        self.phase = Phase::Idle;
    }

    fn begin_motion(&mut self, now: Instant) {
        let Phase::AwaitingInitialDelay { direction } = self.phase else {
            return;
        };
        let opening = direction == Direction::Opening;
        let (code, self_stopping) = start_code_for(opening, self.target, self.dispatcher.codes());
        self.dispatcher.send(code);

        // At least 1 ns so arrival always lies strictly in the future.
        let per_percent =
            per_percent_duration(opening, self.timing.total_open, self.timing.total_close)
                .max(Duration::from_nanos(1));
        self.phase = Phase::Moving {
            direction,
            from: self.current,
            started_at: now,
            per_percent,
            self_stopping,
        };
        tracing::debug!(
            code = code.as_str(),
            from = self.current,
            target = self.target,
            per_percent_ms = per_percent.as_secs_f64() * 1000.0,
            "motion started"
        );
        self.schedule_tick(now);
    }

    fn tick(&mut self, now: Instant) -> Option<u8> {
        let Phase::Moving { self_stopping, .. } = self.phase else {
            return None;
        };
        let position = self.estimate(now);
        if position != self.current {
            tracing::trace!(position, target = self.target, "tick");
            self.current = position;
        }
        if position == self.target {
            if !self_stopping {
                self.dispatcher.send(LogicalCode::Stop);
            }
            self.phase = Phase::Idle;
            tracing::debug!(position, token = self.token.get(), "target reached");
            return Some(position);
        }
        self.schedule_tick(now);
        None
    }

    /// Next recompute at the earlier of one tick from now or the predicted
    /// arrival.
    fn schedule_tick(&mut self, now: Instant) {
        let Phase::Moving {
            from,
            started_at,
            per_percent,
            ..
        } = self.phase
        else {
            return;
        };
        let arrival = started_at + per_percent * u32::from(from.abs_diff(self.target));
        let due = (now + self.timing.tick).min(arrival).max(now);
        self.schedule(due, Continuation::Tick);
    }

    fn schedule(&mut self, due: Instant, kind: Continuation) {
        self.seq = self.seq.wrapping_add(1);
        self.queue.push(Scheduled {
            due,
            seq: self.seq,
            token: self.token,
            kind,
        });
    }
}

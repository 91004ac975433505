//! Caller-facing API for one covering.

use std::sync::Arc;
use std::time::{Duration, Instant};

use shade_traits::{Clock, StateStore};

use crate::builder::{Missing, MoveControllerBuilder};
use crate::config::TimingCfg;
use crate::dispatcher::SentCode;
use crate::hw_error::{Boundary, map_hw_error};
use crate::simulator::PositionSimulator;
use crate::status::MotionStatus;
use crate::types::{Direction, MovementToken, clamp_percent};

/// Accepts target positions and reports the simulated position.
///
/// All methods take `&mut self` or `&self` on the owning thread; there is
/// exactly one timeline per controller. Time only advances through
/// [`MoveController::poll`], which runners call at each deadline.
pub struct MoveController {
    pub(crate) sim: PositionSimulator,
    pub(crate) clock: Arc<dyn Clock + Send + Sync>,
    pub(crate) store: Option<Box<dyn StateStore>>,
}

impl std::fmt::Debug for MoveController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MoveController")
            .field("current", &self.sim.current())
            .field("target", &self.sim.target())
            .field("status", &self.sim.status())
            .field("persist", &self.store.is_some())
            .finish()
    }
}

impl MoveController {
    /// Start building a controller.
    pub fn builder() -> MoveControllerBuilder<Missing> {
        MoveControllerBuilder::default()
    }

    /// Request a new target. Values outside 0..=100 are clamped.
    ///
    /// Any move in flight is superseded; if its start code already went out,
    /// STOP is sent before anything else.
    pub fn request_target(&mut self, percent: i32) {
        let target = clamp_percent(percent);
        if i32::from(target) != percent {
            tracing::debug!(requested = percent, target, "target clamped");
        }
        // Let anything already due fire first so the timeline stays ordered.
        self.poll();
        let now = self.clock.now();
        if let MotionStatus::Stopped(position) = self.sim.set_target(target, now) {
            tracing::info!(position, "covering settled");
            self.persist(position);
        }
    }

    /// Latest position estimate. Never blocks, never fails.
    pub fn read_current_position(&self) -> u8 {
        self.sim.estimate(self.clock.now())
    }

    /// Fire due continuations.
    pub fn poll(&mut self) -> MotionStatus {
        let now = self.clock.now();
        let status = self.sim.poll(now);
        if let MotionStatus::Stopped(position) = status {
            tracing::info!(position, "covering settled");
            self.persist(position);
        }
        status
    }

    /// Stop wherever the covering is now and keep that as the target.
    pub fn halt(&mut self) {
        self.poll();
        if self.sim.is_active() {
            let now = self.clock.now();
            let position = self.sim.estimate(now);
            self.sim.set_target(position, now);
            tracing::info!(position, "halted");
        }
        self.persist(self.sim.current());
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.sim.next_deadline()
    }

    pub fn target_position(&self) -> u8 {
        self.sim.target()
    }

    pub fn direction(&self) -> Direction {
        self.sim.direction()
    }

    pub fn movement_token(&self) -> MovementToken {
        self.sim.token()
    }

    pub fn status(&self) -> MotionStatus {
        self.sim.status()
    }

    pub fn timing(&self) -> &TimingCfg {
        self.sim.timing()
    }

    /// Every code dispatch attempted so far.
    pub fn sent(&self) -> &[SentCode] {
        self.sim.dispatcher().sent()
    }

    /// Logical names of every code dispatched so far.
    pub fn sent_codes(&self) -> Vec<&'static str> {
        self.sim.dispatcher().sent_codes()
    }

    /// Current instant on the controller's clock.
    pub fn now(&self) -> Instant {
        self.clock.now()
    }

    pub(crate) fn sleep(&self, d: Duration) {
        self.clock.sleep(d);
    }

    fn persist(&mut self, position: u8) {
        let Some(store) = self.store.as_mut() else {
            return;
        };
        match store.save(position) {
            Ok(()) => tracing::debug!(position, "position persisted"),
            Err(e) => {
                let err = map_hw_error(Boundary::StateStore, e.as_ref());
                tracing::warn!(position, error = %err, "failed to persist position");
            }
        }
    }
}

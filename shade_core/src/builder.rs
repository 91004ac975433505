//! Type-state builder for `MoveController`.
//!
//! The builder enforces at compile time that a transmitter is provided before
//! `build()` is available. `try_build()` is always available for dynamic checks.

use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use shade_traits::{Clock, MonotonicClock, StateStore, Transmitter};

use crate::config::{CodeMap, TimingCfg};
use crate::controller::MoveController;
use crate::dispatcher::CodeDispatcher;
use crate::error::{BuildError, Result};
use crate::hw_error::{Boundary, map_hw_error};
use crate::simulator::PositionSimulator;

const MAX_DURATION: Duration = Duration::from_secs(24 * 60 * 60);
const MAX_TICK: Duration = Duration::from_secs(60);

// ── Type-state markers ───────────────────────────────────────────────────────

pub struct Missing;
pub struct Set;

/// Builder for `MoveController`. All fields are validated on `build()`.
pub struct MoveControllerBuilder<T> {
    transmitter: Option<Box<dyn Transmitter>>,
    timing: Option<TimingCfg>,
    codes: Option<CodeMap>,
    clock: Option<Box<dyn Clock + Send + Sync>>,
    store: Option<Box<dyn StateStore>>,
    initial_position: Option<u8>,
    _t: PhantomData<T>,
}

impl Default for MoveControllerBuilder<Missing> {
    fn default() -> Self {
        Self {
            transmitter: None,
            timing: None,
            codes: None,
            clock: None,
            store: None,
            initial_position: None,
            _t: PhantomData,
        }
    }
}

fn invalid(msg: &'static str) -> eyre::Report {
    eyre::Report::new(BuildError::InvalidConfig(msg))
}

/// Validate configuration and construct the controller, seeding the position
/// from the state store when one is attached.
fn validate_and_build(
    transmitter: Box<dyn Transmitter>,
    timing: TimingCfg,
    codes: CodeMap,
    clock: Option<Box<dyn Clock + Send + Sync>>,
    store: Option<Box<dyn StateStore>>,
    initial_position: u8,
) -> Result<MoveController> {
    // ── Validation ───────────────────────────────────────────────────────────
    if timing.initial_delay.is_zero() {
        return Err(invalid("initial_delay must be > 0"));
    }
    if timing.total_open.is_zero() {
        return Err(invalid("total_open must be > 0"));
    }
    if timing.total_close.is_zero() {
        return Err(invalid("total_close must be > 0"));
    }
    if timing.tick.is_zero() {
        return Err(invalid("tick must be > 0"));
    }
    if [timing.initial_delay, timing.total_open, timing.total_close]
        .iter()
        .any(|d| *d > MAX_DURATION)
    {
        return Err(invalid("durations must be <= 24h"));
    }
    if timing.tick > MAX_TICK {
        return Err(invalid("tick must be <= 60 s"));
    }
    if initial_position > 100 {
        return Err(invalid("initial_position must be in [0, 100]"));
    }
    if codes.any_empty() {
        return Err(invalid("code payloads must not be empty"));
    }

    // ── Seed position ────────────────────────────────────────────────────────
    let position = match store.as_ref().map(|s| s.load()) {
        Some(Ok(Some(p))) if p <= 100 => {
            tracing::debug!(position = p, "restored persisted position");
            p
        }
        Some(Ok(Some(p))) => {
            tracing::warn!(stored = p, "persisted position out of range; ignoring");
            initial_position
        }
        Some(Ok(None)) | None => initial_position,
        Some(Err(e)) => {
            let err = map_hw_error(Boundary::StateStore, e.as_ref());
            tracing::warn!(error = %err, "could not load persisted position");
            initial_position
        }
    };

    let clock: Arc<dyn Clock + Send + Sync> = match clock {
        Some(b) => Arc::from(b),
        None => Arc::new(MonotonicClock::new()),
    };

    let dispatcher = CodeDispatcher::new(transmitter, codes);
    Ok(MoveController {
        sim: PositionSimulator::new(timing, dispatcher, position),
        clock,
        store,
    })
}

impl<T> MoveControllerBuilder<T> {
    /// Fallible build available in any type-state; returns detailed error for missing pieces.
    pub fn try_build(self) -> Result<MoveController> {
        let transmitter = self
            .transmitter
            .ok_or_else(|| eyre::Report::new(BuildError::MissingTransmitter))?;
        validate_and_build(
            transmitter,
            self.timing.unwrap_or_default(),
            self.codes.unwrap_or_default(),
            self.clock,
            self.store,
            self.initial_position.unwrap_or(0),
        )
    }
}

/// Chainable setters that do not affect type-state.
impl<T> MoveControllerBuilder<T> {
    pub fn with_timing(mut self, timing: TimingCfg) -> Self {
        self.timing = Some(timing);
        self
    }
    pub fn with_codes(mut self, codes: CodeMap) -> Self {
        self.codes = Some(codes);
        self
    }
    /// Position used when no persisted value is available.
    pub fn with_initial_position(mut self, position: u8) -> Self {
        self.initial_position = Some(position);
        self
    }
    /// Attach persistence; the controller saves on every settle and on halt.
    pub fn with_state_store(mut self, store: impl StateStore + 'static) -> Self {
        self.store = Some(Box::new(store));
        self
    }
    /// Provide a custom clock implementation; defaults to `MonotonicClock` when not provided.
    pub fn with_clock(mut self, clock: Box<dyn Clock + Send + Sync>) -> Self {
        self.clock = Some(clock);
        self
    }
    /// Timing, codes and initial position from a loaded config file.
    pub fn with_config(self, cfg: &shade_config::Config) -> Self {
        self.with_timing(TimingCfg::from(&cfg.timing))
            .with_codes(CodeMap::from(&cfg.data))
            .with_initial_position(cfg.initial_position)
    }
}

// Setter that advances type-state
impl MoveControllerBuilder<Missing> {
    pub fn with_transmitter(
        self,
        transmitter: impl Transmitter + 'static,
    ) -> MoveControllerBuilder<Set> {
        MoveControllerBuilder {
            transmitter: Some(Box::new(transmitter)),
            timing: self.timing,
            codes: self.codes,
            clock: self.clock,
            store: self.store,
            initial_position: self.initial_position,
            _t: PhantomData,
        }
    }
}

impl MoveControllerBuilder<Set> {
    /// Build once the transmitter is set.
    pub fn build(self) -> Result<MoveController> {
        self.try_build()
    }
}

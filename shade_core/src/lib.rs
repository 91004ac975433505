#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Time-simulated position engine for a window covering.
//!
//! The covering only understands stateless OPEN / CLOSE / STOP pulses and
//! reports nothing back. This crate derives its position from elapsed time
//! and the codes it has sent. All transport and persistence goes through
//! `shade_traits::Transmitter` and `shade_traits::StateStore`.
//!
//! ## Architecture
//!
//! - **Duration model**: per-percent travel cost, direction-aware (`duration`)
//! - **Dispatch**: fire-and-forget code delivery with a record (`dispatcher`)
//! - **Simulation**: token-guarded state machine and timer queue (`simulator`)
//! - **Control**: target requests, halt, persistence (`controller`)
//! - **Runners**: drive the timeline to rest or from a channel (`runner`)
//!
//! Positions are whole percents (`u8`, 0..=100). Timing math is done in
//! integer nanoseconds.

pub mod builder;
pub mod config;
pub mod controller;
pub mod conversions;
pub mod dispatcher;
pub mod duration;
pub mod error;
pub mod hw_error;
pub mod runner;
pub mod simulator;
pub mod status;
pub mod types;

pub use builder::{Missing, MoveControllerBuilder, Set};
pub use config::{CodeMap, LogicalCode, TimingCfg};
pub use controller::MoveController;
pub use dispatcher::{CodeDispatcher, SentCode};
pub use duration::{per_percent_duration, travel_duration};
pub use simulator::{PositionSimulator, start_code_for};
pub use status::MotionStatus;
pub use types::{Direction, MovementToken, clamp_percent};

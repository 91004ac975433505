//! Movement status returned from each poll of the timeline.

use crate::types::Direction;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionStatus {
    /// Nothing in flight.
    Idle,
    /// A target was accepted; the start code has not been sent yet.
    AwaitingInitialDelay,
    /// Start code sent; position is advancing.
    Moving(Direction),
    /// A move settled during this poll at the given position.
    Stopped(u8),
}

impl MotionStatus {
    /// True when no further continuation is pending.
    pub fn is_at_rest(self) -> bool {
        matches!(self, MotionStatus::Idle | MotionStatus::Stopped(_))
    }
}

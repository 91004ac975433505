//! Small value types shared across the engine.

use std::fmt;

/// Direction of travel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Direction {
    Opening,
    Closing,
    #[default]
    Idle,
}

impl Direction {
    /// Direction needed to get from `from` to `to`.
    pub fn between(from: u8, to: u8) -> Self {
        match to.cmp(&from) {
            std::cmp::Ordering::Greater => Direction::Opening,
            std::cmp::Ordering::Less => Direction::Closing,
            std::cmp::Ordering::Equal => Direction::Idle,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Opening => "opening",
            Direction::Closing => "closing",
            Direction::Idle => "idle",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Generation counter for movements. Continuations scheduled under an older
/// token are ignored when they fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct MovementToken(u64);

impl MovementToken {
    pub(crate) fn next(self) -> Self {
        MovementToken(self.0.wrapping_add(1))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

/// Clamp an arbitrary request into the 0..=100 position range.
#[inline]
pub fn clamp_percent(percent: i32) -> u8 {
    // clamp guarantees the value fits
    u8::try_from(percent.clamp(0, 100)).unwrap_or(100)
}

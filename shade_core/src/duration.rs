//! Time cost of travel.
//!
//! All arithmetic is integer nanoseconds so that, for example, 2.5 s at
//! 50 ms per percent is exactly 50 steps.

use std::time::Duration;

use crate::config::TimingCfg;

/// Time to move one percent in the given direction.
#[inline]
pub fn per_percent_duration(opening: bool, total_open: Duration, total_close: Duration) -> Duration {
    if opening {
        total_open / 100
    } else {
        total_close / 100
    }
}

/// Time to travel from `from` to `to` at the configured speed for that
/// direction. Zero when the positions are equal.
pub fn travel_duration(from: u8, to: u8, timing: &TimingCfg) -> Duration {
    let per = per_percent_duration(to > from, timing.total_open, timing.total_close);
    per * u32::from(from.abs_diff(to))
}

/// Whole percent steps covered after `elapsed`.
#[inline]
pub(crate) fn steps_covered(elapsed: Duration, per_percent: Duration) -> u64 {
    let per = per_percent.as_nanos().max(1);
    u64::try_from(elapsed.as_nanos() / per).unwrap_or(u64::MAX)
}

//! Tick-based timing
//!
//! The host advances time in discrete ticks. Twenty ticks make one second,
//! so one tick is 50 ms of wall-clock time.
//!
//! # Representations
//!
//! 1. **Ticks (Internal)**: u64 values at 20 Hz - countdowns and scheduling
//! 2. **Seconds (Storage)**: u32 values - the duration store and admin output
//!
//! Seconds → ticks is exact. Ticks → seconds truncates.
//!
//! # Examples
//!
//! ```rust
//! use mbx_common::timing::*;
//!
//! assert_eq!(seconds_to_ticks(180), 3600);
//! assert_eq!(ticks_to_seconds(3600), 180);
//! assert_eq!(ticks_to_seconds(39), 1);
//! ```

use std::time::Duration;

/// Ticks per second: 20
pub const TICKS_PER_SECOND: u64 = 20;

/// Wall-clock length of one tick in milliseconds
pub const TICK_MS: u64 = 1000 / TICKS_PER_SECOND;

/// Convert whole seconds to ticks
pub fn seconds_to_ticks(seconds: u32) -> u64 {
    seconds as u64 * TICKS_PER_SECOND
}

/// Convert ticks to whole seconds (truncating)
pub fn ticks_to_seconds(ticks: u64) -> u64 {
    ticks / TICKS_PER_SECOND
}

/// Wall-clock duration of `ticks` at the given tick length
pub fn ticks_to_duration(ticks: u64, tick_ms: u64) -> Duration {
    Duration::from_millis(ticks.saturating_mul(tick_ms))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seconds_to_ticks() {
        assert_eq!(seconds_to_ticks(0), 0);
        assert_eq!(seconds_to_ticks(1), 20);
        assert_eq!(seconds_to_ticks(345), 6900);
    }

    #[test]
    fn test_ticks_to_seconds_truncates() {
        assert_eq!(ticks_to_seconds(19), 0);
        assert_eq!(ticks_to_seconds(20), 1);
        assert_eq!(ticks_to_seconds(399), 19);
    }

    #[test]
    fn test_seconds_round_trip_is_exact() {
        for secs in [1u32, 71, 178, 345] {
            assert_eq!(ticks_to_seconds(seconds_to_ticks(secs)), secs as u64);
        }
    }

    #[test]
    fn test_ticks_to_duration() {
        assert_eq!(ticks_to_duration(20, TICK_MS), Duration::from_secs(1));
        assert_eq!(ticks_to_duration(10, TICK_MS), Duration::from_millis(500));
    }

    #[test]
    fn test_ticks_to_duration_saturates() {
        let d = ticks_to_duration(u64::MAX, TICK_MS);
        assert_eq!(d, Duration::from_millis(u64::MAX));
    }
}

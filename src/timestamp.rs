//! Monotonic millisecond timestamps.
//!
//! Hardware millisecond counters are 32 bits wide and wrap after ~49 days.
//! All elapsed-time math goes through wrapping subtraction so a wrap
//! between two stamps still yields the correct distance.

use embassy_time::{Duration, Instant};

/// Wrapping 32-bit millisecond timestamp
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Timestamp(u32);

impl Timestamp {
    pub const ZERO: Self = Self(0);

    pub const fn from_millis(millis: u32) -> Self {
        Self(millis)
    }

    pub const fn as_millis(self) -> u32 {
        self.0
    }

    /// Milliseconds elapsed since `earlier`, correct across a counter wrap
    pub const fn millis_since(self, earlier: Self) -> u32 {
        self.0.wrapping_sub(earlier.0)
    }

    /// Signed distance from `other`, negative if `other` lies ahead
    ///
    /// Valid while the two stamps are less than ~24 days apart.
    #[allow(clippy::cast_possible_wrap)]
    pub const fn signed_millis_since(self, other: Self) -> i32 {
        self.0.wrapping_sub(other.0) as i32
    }

    /// Time elapsed since `earlier`, correct across a counter wrap
    #[allow(clippy::cast_lossless)]
    pub const fn duration_since(self, earlier: Self) -> Duration {
        Duration::from_millis(self.millis_since(earlier) as u64)
    }

    /// Timestamp `duration` later, wrapping like the hardware counter
    #[allow(clippy::cast_possible_truncation)]
    pub const fn wrapping_add(self, duration: Duration) -> Self {
        Self(self.0.wrapping_add(duration.as_millis() as u32))
    }
}

impl From<Instant> for Timestamp {
    #[allow(clippy::cast_possible_truncation)]
    fn from(instant: Instant) -> Self {
        // Truncation is the wrap.
        Self(instant.as_millis() as u32)
    }
}

/// Source of the current time
pub trait Clock {
    fn now(&self) -> Timestamp;
}

/// [`Clock`] backed by the `embassy-time` driver
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbassyClock;

impl Clock for EmbassyClock {
    fn now(&self) -> Timestamp {
        Instant::now().into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elapsed_survives_counter_wrap() {
        let before = Timestamp::from_millis(u32::MAX - 9);
        let after = before.wrapping_add(Duration::from_millis(25));
        assert_eq!(after.as_millis(), 15);
        assert_eq!(after.millis_since(before), 25);
        assert_eq!(after.duration_since(before), Duration::from_millis(25));
    }

    #[test]
    fn signed_distance_across_counter_wrap() {
        let before = Timestamp::from_millis(u32::MAX - 2);
        let after = Timestamp::from_millis(4);
        assert_eq!(after.signed_millis_since(before), 7);
        assert_eq!(before.signed_millis_since(after), -7);
    }
}

use embassy_time::Duration;

use crate::timestamp::Timestamp;

/// Linear ramp of a 16-bit value over a bounded duration
///
/// A zero duration is an instantaneous jump to the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    /// Value at the start of the ramp
    start_value: u16,
    /// Value the ramp ends at
    target_value: u16,
    /// Time at which the ramp started
    start: Timestamp,
    /// Total ramp duration
    duration: Duration,
}

impl Transition {
    /// Create a ramp from `start_value` to `target_value`
    pub const fn new(start_value: u16, target_value: u16, start: Timestamp, duration: Duration) -> Self {
        Self {
            start_value,
            target_value,
            start,
            duration,
        }
    }

    /// Create a transition that already rests at `value`
    pub const fn settled(value: u16) -> Self {
        Self::new(value, value, Timestamp::ZERO, Duration::from_millis(0))
    }

    pub const fn start_value(&self) -> u16 {
        self.start_value
    }

    pub const fn target_value(&self) -> u16 {
        self.target_value
    }

    pub const fn duration(&self) -> Duration {
        self.duration
    }

    /// Check if the ramp has reached its target at `now`
    pub fn is_complete(&self, now: Timestamp) -> bool {
        now.duration_since(self.start) >= self.duration
    }

    /// Value of the ramp at `now`
    ///
    /// Once the ramp is complete the start value is latched to the target,
    /// so later calls keep returning the target even if the millisecond
    /// counter wraps past the start stamp.
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap, clippy::cast_sign_loss)]
    pub fn present_value(&mut self, now: Timestamp) -> u16 {
        let elapsed = now.duration_since(self.start);
        if elapsed >= self.duration {
            self.start_value = self.target_value;
            return self.target_value;
        }

        let delta = i64::from(self.target_value) - i64::from(self.start_value);
        let step = delta * elapsed.as_millis() as i64 / self.duration.as_millis() as i64;

        (i64::from(self.start_value) + step) as u16
    }
}

impl Default for Transition {
    fn default() -> Self {
        Self::settled(0)
    }
}

//! Dimming tick pacing for boards without a spare hardware timer.
//!
//! The dimming tick normally runs from a 5 ms timer interrupt calling
//! [`Dimmer::drive`]. Where no timer is free, a task can call
//! [`DimmingScheduler::tick`] in a loop and sleep for the returned time.

use embassy_time::Duration;

use crate::OutputDriver;
use crate::dimmer::Dimmer;
use crate::timestamp::{Clock, Timestamp};

/// Default dimming tick period
pub const DIMMING_PERIOD: Duration = Duration::from_millis(5);

/// Paces [`Dimmer::drive`] at a fixed period read from a [`Clock`]
///
/// A tick up to one period late is absorbed by a shorter sleep; a later one
/// restarts the cadence from the current time instead of bursting through
/// the missed ticks.
pub struct DimmingScheduler<'a, O, C> {
    dimmer: &'a Dimmer,
    output: O,
    clock: C,
    period: Duration,
    deadline: Option<Timestamp>,
}

impl<'a, O: OutputDriver, C: Clock> DimmingScheduler<'a, O, C> {
    /// Create a new scheduler ticking every [`DIMMING_PERIOD`]
    pub const fn new(dimmer: &'a Dimmer, output: O, clock: C) -> Self {
        Self::with_period(dimmer, output, clock, DIMMING_PERIOD)
    }

    pub const fn with_period(dimmer: &'a Dimmer, output: O, clock: C, period: Duration) -> Self {
        Self {
            dimmer,
            output,
            clock,
            period,
            deadline: None,
        }
    }

    /// Deadline of the next tick, `None` before the first tick
    pub const fn deadline(&self) -> Option<Timestamp> {
        self.deadline
    }

    /// Drive the output once
    ///
    /// Returns how long to wait before calling `tick` again.
    pub fn tick(&mut self) -> Duration {
        let now = self.clock.now();
        let period = i64::from(u32::try_from(self.period.as_millis()).unwrap_or(u32::MAX));

        let mut deadline = self.deadline.unwrap_or(now);
        let mut lateness = i64::from(now.signed_millis_since(deadline));
        if lateness > period {
            deadline = now;
            lateness = 0;
        }

        self.dimmer.drive(now, &mut self.output);
        self.deadline = Some(deadline.wrapping_add(self.period));

        Duration::from_millis(u64::try_from(period - lateness).unwrap_or(0))
    }

    /// Stop pacing and give the output driver back
    pub fn release(self) -> O {
        self.output
    }
}

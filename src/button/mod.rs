//! Rocker switch buttons.
//!
//! Each rocker is a pair of buttons (on / off) controlling one mesh client
//! instance. Short presses toggle, long presses dim in fixed steps.

mod gesture;
mod input;

use embassy_time::Duration;

pub use gesture::{
    Button, ButtonKind, FIRST_STEP_REPEATS, GestureState, SETTLE_COMMANDS, STEP_REPEATS,
    TOGGLE_REPEATS,
};
pub use input::{ButtonAction, ButtonInput, DEBOUNCE_TIME};

use crate::mesh::MeshTransport;
use crate::timestamp::Timestamp;

/// Generic Delta change per dimming step
pub const DIMMING_STEP: i32 = 0x0A00;

/// Steps covering the full lightness range, dimming stops there
#[allow(clippy::cast_possible_truncation)]
pub const MAX_DIMMING_STEPS: i16 = (0x1_0000 / DIMMING_STEP) as i16;

/// Gesture timing thresholds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonTimings {
    /// Hold time after which a press becomes a long press
    pub short_press: Duration,
    /// Interval before the second dimming step
    pub first_step: Duration,
    /// Interval between subsequent dimming steps
    pub next_step: Duration,
}

impl ButtonTimings {
    pub const DEFAULT: Self = Self {
        short_press: Duration::from_millis(400),
        first_step: Duration::from_millis(250),
        next_step: Duration::from_millis(100),
    };
}

impl Default for ButtonTimings {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Two-button rocker
///
/// Only one half of the rocker runs a gesture at a time.
pub struct Rocker<'a> {
    on: Button<'a>,
    off: Button<'a>,
}

impl<'a> Rocker<'a> {
    /// Create a new rocker sending to the client `instance_index`
    pub const fn new(on: &'a ButtonInput, off: &'a ButtonInput, instance_index: u8, timings: ButtonTimings) -> Self {
        Self {
            on: Button::new(on, ButtonKind::On, instance_index, timings),
            off: Button::new(off, ButtonKind::Off, instance_index, timings),
        }
    }

    pub const fn on(&self) -> &Button<'a> {
        &self.on
    }

    pub const fn off(&self) -> &Button<'a> {
        &self.off
    }

    /// Poll the on half, then the off half
    pub fn poll<T: MeshTransport>(&mut self, now: Timestamp, transport: &mut T) {
        let off_idle = self.off.is_idle();
        self.on.poll(off_idle, now, transport);
        let on_idle = self.on.is_idle();
        self.off.poll(on_idle, now, transport);
    }
}

/// The node's two rockers
///
/// Inputs are ordered `[on 1, off 1, on 2, off 2]`; rocker 1 drives the
/// Light LC client, rocker 2 the Light CTL client.
pub struct ButtonPanel<'a> {
    rockers: [Rocker<'a>; 2],
}

impl<'a> ButtonPanel<'a> {
    pub const fn new(
        inputs: &'a [ButtonInput; 4],
        lc_instance_index: u8,
        ctl_instance_index: u8,
        timings: ButtonTimings,
    ) -> Self {
        Self {
            rockers: [
                Rocker::new(&inputs[0], &inputs[1], lc_instance_index, timings),
                Rocker::new(&inputs[2], &inputs[3], ctl_instance_index, timings),
            ],
        }
    }

    /// Rocker by position (0 or 1)
    pub fn rocker(&self, index: usize) -> Option<&Rocker<'a>> {
        self.rockers.get(index)
    }

    /// Poll every button in input order
    pub fn poll<T: MeshTransport>(&mut self, now: Timestamp, transport: &mut T) {
        for rocker in &mut self.rockers {
            rocker.poll(now, transport);
        }
    }
}

use embassy_time::Duration;

use super::input::{ButtonAction, ButtonInput};
use super::{ButtonTimings, DIMMING_STEP, MAX_DIMMING_STEPS};
use crate::log::log_info;
use crate::mesh::{GenericDeltaSet, GenericOnOffSet, MeshTransport};
use crate::timestamp::Timestamp;

const ON_OFF_TRANSITION_TIME: Duration = Duration::from_millis(1000);
const ON_OFF_DELAY: Duration = Duration::from_millis(0);
const DELTA_TRANSITION_TIME: Duration = Duration::from_millis(200);
const DELTA_DELAY: Duration = Duration::from_millis(0);
const REPEATS_INTERVAL: Duration = Duration::from_millis(50);

/// Repeats of the on/off command after a short press
pub const TOGGLE_REPEATS: u8 = 3;
/// Repeats of the first delta command of a long press
pub const FIRST_STEP_REPEATS: u8 = 3;
/// Repeats of the delta commands while dimming
pub const STEP_REPEATS: u8 = 0;
/// Number of staggered settle commands sent when dimming ends
pub const SETTLE_COMMANDS: u8 = 4;

/// Half of a rocker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonKind {
    /// Turns off, dims down
    Off,
    /// Turns on, dims up
    On,
}

impl ButtonKind {
    /// Sign of the dimming steps of this button
    pub const fn direction(self) -> i16 {
        match self {
            Self::Off => -1,
            Self::On => 1,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Off => "OFF",
            Self::On => "ON",
        }
    }
}

/// Gesture state of a button
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GestureState {
    #[default]
    Idle,
    Press,
    LongPress,
}

/// Press / long-press gesture state machine of one button
///
/// - Short press: one Generic OnOff Set
/// - Long press: Generic Delta Set every step interval while held, the
///   accumulated delta growing by [`DIMMING_STEP`] each step
/// - Release after a long press: a burst of staggered settle deltas with a
///   correction for the unfinished step
pub struct Button<'a> {
    input: &'a ButtonInput,
    kind: ButtonKind,
    instance_index: u8,
    timings: ButtonTimings,

    state: GestureState,
    event_time: Timestamp,
    timeout: Duration,
    delta_steps: i16,
}

impl<'a> Button<'a> {
    /// Create a new idle button sending to the client `instance_index`
    pub const fn new(input: &'a ButtonInput, kind: ButtonKind, instance_index: u8, timings: ButtonTimings) -> Self {
        Self {
            input,
            kind,
            instance_index,
            timings,
            state: GestureState::Idle,
            event_time: Timestamp::ZERO,
            timeout: Duration::from_millis(0),
            delta_steps: 0,
        }
    }

    pub const fn kind(&self) -> ButtonKind {
        self.kind
    }

    pub const fn state(&self) -> GestureState {
        self.state
    }

    pub const fn is_idle(&self) -> bool {
        matches!(self.state, GestureState::Idle)
    }

    /// Dimming steps accumulated in the current long press
    pub const fn delta_steps(&self) -> i16 {
        self.delta_steps
    }

    /// Advance the state machine
    ///
    /// Nothing happens while the paired button of the rocker is busy; any
    /// edge stays in the mailbox until it is idle again.
    pub fn poll<T: MeshTransport>(&mut self, paired_idle: bool, now: Timestamp, transport: &mut T) {
        if !paired_idle {
            return;
        }

        match self.state {
            GestureState::Idle => match self.input.take_if(|_| true) {
                Some(ButtonAction::Pressed) => {
                    self.log("pressed");
                    self.state = GestureState::Press;
                    self.event_time = now;
                    self.timeout = self.timings.short_press;
                }
                Some(ButtonAction::Released) => self.reset(),
                None => {}
            },
            GestureState::Press => {
                if self.take_release() {
                    self.log("short press - turn on/off lightness");
                    self.reset();
                    transport.send_generic_onoff(&self.toggle_command());
                    return;
                }

                if now.duration_since(self.event_time) > self.timeout {
                    self.log("long press - dim lightness");
                    self.state = GestureState::LongPress;
                    self.event_time = now;
                    self.timeout = self.timings.first_step;
                    self.delta_steps += self.kind.direction();

                    transport.send_generic_delta(&self.delta_command(FIRST_STEP_REPEATS, true));
                }
            }
            GestureState::LongPress => {
                let elapsed = now.duration_since(self.event_time);

                if self.take_release() {
                    self.log("released long press");
                    let delta = self.accumulated_delta() + self.end_correction(elapsed);
                    self.send_settle(delta, transport);
                    self.reset();
                    return;
                }

                if elapsed <= self.timeout {
                    return;
                }

                self.log("long press dimming");
                self.delta_steps += self.kind.direction();

                if self.delta_steps.abs() >= MAX_DIMMING_STEPS {
                    // Full range covered, stop dimming while still held.
                    self.send_settle(self.accumulated_delta(), transport);
                    self.input.clear();
                    self.reset();
                } else {
                    self.event_time = now;
                    self.timeout = self.timings.next_step;
                    transport.send_generic_delta(&self.delta_command(STEP_REPEATS, false));
                }
            }
        }
    }

    fn take_release(&self) -> bool {
        self.input
            .take_if(|action| action == ButtonAction::Released)
            .is_some()
    }

    fn accumulated_delta(&self) -> i32 {
        DIMMING_STEP * i32::from(self.delta_steps)
    }

    /// Fraction of a step proportional to the progress into the current step
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    fn end_correction(&self, elapsed: Duration) -> i32 {
        let timeout = self.timeout.as_millis();
        if timeout == 0 {
            return 0;
        }
        let elapsed = elapsed.as_millis().min(timeout);
        let correction = (i64::from(DIMMING_STEP) * elapsed as i64 / timeout as i64) as i32;

        correction * i32::from(self.kind.direction())
    }

    fn toggle_command(&self) -> GenericOnOffSet {
        GenericOnOffSet {
            instance_index: self.instance_index,
            on: matches!(self.kind, ButtonKind::On),
            transition_time: ON_OFF_TRANSITION_TIME,
            delay: ON_OFF_DELAY,
            repeats: TOGGLE_REPEATS,
            repeat_interval: REPEATS_INTERVAL,
            new_transaction: true,
        }
    }

    fn delta_command(&self, repeats: u8, new_transaction: bool) -> GenericDeltaSet {
        GenericDeltaSet {
            instance_index: self.instance_index,
            delta: self.accumulated_delta(),
            transition_time: DELTA_TRANSITION_TIME,
            delay: DELTA_DELAY,
            repeats,
            repeat_interval: REPEATS_INTERVAL,
            dispatch_delay: Duration::from_millis(0),
            new_transaction,
        }
    }

    /// Final delta, sent several times with staggered dispatch
    fn send_settle<T: MeshTransport>(&self, delta: i32, transport: &mut T) {
        for i in 0..SETTLE_COMMANDS {
            transport.send_generic_delta(&GenericDeltaSet {
                instance_index: self.instance_index,
                delta,
                transition_time: DELTA_TRANSITION_TIME,
                delay: DELTA_DELAY,
                repeats: 0,
                repeat_interval: REPEATS_INTERVAL,
                dispatch_delay: REPEATS_INTERVAL * u32::from(i),
                new_transaction: false,
            });
        }
    }

    fn reset(&mut self) {
        self.state = GestureState::Idle;
        self.event_time = Timestamp::ZERO;
        self.timeout = Duration::from_millis(0);
        self.delta_steps = 0;
    }

    fn log(&self, event: &str) {
        log_info!("[Button {}] {}", self.kind.as_str(), event);
    }
}

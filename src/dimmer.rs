//! Lightness and temperature transitions shared with the dimming interrupt.
//!
//! The poll loop replaces transitions, the 5 ms dimming tick evaluates them.
//! All shared state sits in one critical-section cell so the tick never sees
//! a new target paired with a stale start value.

use core::cell::RefCell;

use critical_section::Mutex;
use embassy_time::Duration;

use crate::OutputDriver;
use crate::log::log_info;
use crate::mesh::MeshTransport;
use crate::output::{ChannelLevels, OutputMapper, TemperatureRange};
use crate::timestamp::Timestamp;
use crate::transition::Transition;

/// Lightness shown while attention is active and the LED phase is on
pub const ATTENTION_LIGHTNESS_ON: u16 = 0xFFFF;

/// Lightness shown while attention is active and the LED phase is off
#[allow(clippy::cast_possible_truncation)]
pub const ATTENTION_LIGHTNESS_OFF: u16 = (0xFFFF_u32 * 4 / 10) as u16;

/// Transition channels driven by the dimmer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DimmerChannel {
    Lightness,
    Temperature,
}

/// Configuration for the dimmer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DimmerConfig {
    /// Lowest physical level of a lit output
    pub output_floor: u16,
    /// Temperature bounds for the warm/cold split
    pub temperature_range: TemperatureRange,
}

impl Default for DimmerConfig {
    fn default() -> Self {
        Self {
            output_floor: 0,
            temperature_range: TemperatureRange::default(),
        }
    }
}

#[derive(Debug)]
struct DimmerState {
    enabled: bool,
    ctl_support: bool,
    instance_index: Option<u8>,
    /// LED phase while attention is active
    attention: Option<bool>,
    lightness: Transition,
    temperature: Transition,
}

/// Dimmer - owns the lightness and temperature transitions
///
/// Methods take `&self`, so the dimmer can live in a `static` shared by the
/// dimming interrupt and the poll loop. Every entry point is a no-op until
/// [`Dimmer::setup`] is called.
pub struct Dimmer {
    mapper: OutputMapper,
    state: Mutex<RefCell<DimmerState>>,
}

impl Dimmer {
    /// Create a new disabled dimmer
    pub const fn new(config: DimmerConfig) -> Self {
        let range = config.temperature_range;
        Self {
            mapper: OutputMapper::new(config.output_floor, range),
            state: Mutex::new(RefCell::new(DimmerState {
                enabled: false,
                ctl_support: false,
                instance_index: None,
                attention: None,
                lightness: Transition::settled(0),
                temperature: Transition::new(
                    range.min(),
                    range.midpoint(),
                    Timestamp::ZERO,
                    Duration::from_millis(0),
                ),
            })),
        }
    }

    /// Enable the dimmer
    pub fn setup(&self) {
        self.with_state(|state| state.enabled = true);
    }

    pub fn is_enabled(&self) -> bool {
        self.with_state(|state| state.enabled)
    }

    pub const fn mapper(&self) -> &OutputMapper {
        &self.mapper
    }

    /// Register the Light Lightness server instance
    pub fn set_instance_index(&self, index: u8) {
        self.with_enabled(|state| state.instance_index = Some(index));
    }

    pub fn instance_index(&self) -> Option<u8> {
        self.with_state(|state| state.instance_index)
    }

    /// Enable or disable the warm/cold split
    pub fn set_ctl_support(&self, support: bool) {
        self.with_enabled(|state| state.ctl_support = support);
    }

    pub fn ctl_support(&self) -> bool {
        self.with_state(|state| state.ctl_support)
    }

    /// Start a new lightness transition
    pub fn process_target_lightness(&self, present: u16, target: u16, transition: Duration, now: Timestamp) {
        if !self.is_enabled() {
            return;
        }
        log_info!(
            "[Dimmer] lightness: {} -> {}, transition_time {}",
            present,
            target,
            transition.as_millis()
        );
        self.set_target(DimmerChannel::Lightness, present, target, transition, now);
    }

    /// Start a new temperature transition
    pub fn process_target_temperature(&self, present: u16, target: u16, transition: Duration, now: Timestamp) {
        if !self.is_enabled() {
            return;
        }
        log_info!(
            "[Dimmer] temperature: {} -> {}, transition_time {}",
            present,
            target,
            transition.as_millis()
        );
        self.set_target(DimmerChannel::Temperature, present, target, transition, now);
    }

    /// Replace a channel transition with a ramp starting at `now`
    pub fn set_target(&self, channel: DimmerChannel, present: u16, target: u16, duration: Duration, now: Timestamp) {
        let transition = Transition::new(present, target, now, duration);
        self.with_state(|state| match channel {
            DimmerChannel::Lightness => state.lightness = transition,
            DimmerChannel::Temperature => state.temperature = transition,
        });
    }

    /// Current transition of a channel
    pub fn transition(&self, channel: DimmerChannel) -> Transition {
        self.with_state(|state| match channel {
            DimmerChannel::Lightness => state.lightness,
            DimmerChannel::Temperature => state.temperature,
        })
    }

    /// Present value of a channel
    pub fn present_value(&self, channel: DimmerChannel, now: Timestamp) -> u16 {
        self.with_state(|state| match channel {
            DimmerChannel::Lightness => state.lightness.present_value(now),
            DimmerChannel::Temperature => state.temperature.present_value(now),
        })
    }

    /// Override the output with the attention blink pattern
    pub fn indicate_attention(&self, attention: bool, led_on: bool) {
        self.with_enabled(|state| {
            state.attention = attention.then_some(led_on);
        });
    }

    /// Compute the channel levels for `now`
    ///
    /// This is the body of the dimming interrupt.
    pub fn tick(&self, now: Timestamp) -> ChannelLevels {
        let (lightness, temperature) = self.with_state(|state| {
            if !state.enabled {
                return (0, None);
            }
            let lightness = match state.attention {
                Some(true) => ATTENTION_LIGHTNESS_ON,
                Some(false) => ATTENTION_LIGHTNESS_OFF,
                None => state.lightness.present_value(now),
            };
            let temperature = state
                .ctl_support
                .then(|| state.temperature.present_value(now));
            (lightness, temperature)
        });

        self.mapper.render(lightness, temperature)
    }

    /// Compute the channel levels for `now` and write them out
    pub fn drive<O: OutputDriver>(&self, now: Timestamp, output: &mut O) {
        if !self.is_enabled() {
            return;
        }
        output.write(self.tick(now));
    }

    /// Ask the registered lightness server for its present state
    pub fn synchronize<T: MeshTransport>(&self, transport: &mut T) {
        if !self.is_enabled() {
            return;
        }
        if let Some(index) = self.instance_index() {
            transport.send_light_lightness_get(index);
        }
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut DimmerState) -> R) -> R {
        critical_section::with(|cs| f(&mut self.state.borrow(cs).borrow_mut()))
    }

    fn with_enabled(&self, f: impl FnOnce(&mut DimmerState)) {
        self.with_state(|state| {
            if state.enabled {
                f(state);
            }
        });
    }
}

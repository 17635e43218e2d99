//! Lightness to physical output mapping.
//!
//! The mapping pipeline is:
//! 1. Zero lightness switches every channel fully off
//! 2. Square-law perceptual correction of the lightness value
//! 3. Rescale into the physical range above the output floor
//! 4. Split between warm and cold channels by color temperature

use embedded_hal::pwm::SetDutyCycle;

use crate::OutputDriver;

/// Full-scale lightness value
pub const LIGHTNESS_MAX: u16 = u16::MAX;

/// Full-scale physical output level
pub const OUTPUT_MAX: u16 = u16::MAX;

/// Output floor for 1-10 V dimming drivers (12 % of full scale)
#[allow(clippy::cast_possible_truncation)]
pub const ONE_TO_TEN_VOLT_FLOOR: u16 = (OUTPUT_MAX as u32 * 12 / 100) as u16;

/// Steps of the perceptual curve input
const CURVE_STEPS: u32 = u8::MAX as u32;

/// Output levels for the two physical channels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChannelLevels {
    pub warm: u16,
    pub cold: u16,
}

impl ChannelLevels {
    pub const OFF: Self = Self { warm: 0, cold: 0 };
}

/// Supported color temperature range in kelvin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemperatureRange {
    min: u16,
    max: u16,
}

impl TemperatureRange {
    /// Create a new range, bounds may be passed in any order
    pub const fn new(a: u16, b: u16) -> Self {
        if a <= b {
            Self { min: a, max: b }
        } else {
            Self { min: b, max: a }
        }
    }

    pub const fn min(self) -> u16 {
        self.min
    }

    pub const fn max(self) -> u16 {
        self.max
    }

    /// Default temperature, halfway through the range
    pub const fn midpoint(self) -> u16 {
        (self.max - self.min) / 2 + self.min
    }

    /// Clamp a temperature into the range
    pub const fn clamp(self, temperature: u16) -> u16 {
        if temperature < self.min {
            self.min
        } else if temperature > self.max {
            self.max
        } else {
            temperature
        }
    }
}

impl Default for TemperatureRange {
    /// Full Light CTL temperature range
    fn default() -> Self {
        Self::new(800, 20_000)
    }
}

/// Convert a lightness value to linear output with a square-law curve
///
/// The input is quantized to 8 bits before squaring, full lightness maps to
/// full scale.
pub const fn lightness_to_linear(value: u16) -> u32 {
    let scaled = value as u32 * CURVE_STEPS / LIGHTNESS_MAX as u32;
    LIGHTNESS_MAX as u32 * (scaled * scaled) / (CURVE_STEPS * CURVE_STEPS)
}

/// Maps lightness and temperature to physical channel levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputMapper {
    /// Lowest level a lit output may have
    floor: u16,
    temperature_range: TemperatureRange,
}

impl OutputMapper {
    pub const fn new(floor: u16, temperature_range: TemperatureRange) -> Self {
        Self {
            floor,
            temperature_range,
        }
    }

    pub const fn floor(&self) -> u16 {
        self.floor
    }

    pub const fn temperature_range(&self) -> TemperatureRange {
        self.temperature_range
    }

    /// Physical level for a lightness value, before the channel split
    #[allow(clippy::cast_possible_truncation)]
    pub const fn level(&self, lightness: u16) -> u16 {
        if lightness == 0 {
            return 0;
        }
        let linear = lightness_to_linear(lightness);
        let span = (OUTPUT_MAX - self.floor) as u32;

        (span * linear / LIGHTNESS_MAX as u32) as u16 + self.floor
    }

    /// Render lightness into channel levels
    ///
    /// With `temperature` set the level is split between the warm and cold
    /// channels, the minimum temperature going fully warm. Without it the
    /// whole level goes to the cold channel.
    #[allow(clippy::cast_possible_truncation)]
    pub fn render(&self, lightness: u16, temperature: Option<u16>) -> ChannelLevels {
        let level = self.level(lightness);
        if level == 0 {
            return ChannelLevels::OFF;
        }

        let Some(temperature) = temperature else {
            return ChannelLevels {
                warm: 0,
                cold: level,
            };
        };

        let range = self.temperature_range;
        let span = u64::from(range.max() - range.min());
        if span == 0 {
            return ChannelLevels {
                warm: 0,
                cold: level,
            };
        }

        let temperature = range.clamp(temperature);
        let level = u64::from(level);
        let warm = u64::from(range.max() - temperature) * level / span;
        let cold = u64::from(temperature - range.min()) * level / span;

        ChannelLevels {
            warm: warm as u16,
            cold: cold as u16,
        }
    }
}

/// [`OutputDriver`] over two PWM channels
pub struct PwmOutput<W, C> {
    warm: W,
    cold: C,
}

impl<W: SetDutyCycle, C: SetDutyCycle> PwmOutput<W, C> {
    pub const fn new(warm: W, cold: C) -> Self {
        Self { warm, cold }
    }

    /// Release the underlying PWM channels
    pub fn release(self) -> (W, C) {
        (self.warm, self.cold)
    }
}

impl<W: SetDutyCycle, C: SetDutyCycle> OutputDriver for PwmOutput<W, C> {
    fn write(&mut self, levels: ChannelLevels) {
        // A failed duty write leaves the previous level, the next tick retries.
        let _ = self.warm.set_duty_cycle_fraction(levels.warm, OUTPUT_MAX);
        let _ = self.cold.set_duty_cycle_fraction(levels.cold, OUTPUT_MAX);
    }
}

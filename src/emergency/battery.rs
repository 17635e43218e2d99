//! Emergency battery gauge and Generic Battery status.

/// Analog input sampled as a 10-bit reading
pub trait AnalogInput {
    /// Read the input, `0..=ANALOG_MAX_READOUT`
    fn read(&mut self) -> u16;
}

/// Full-scale analog reading
pub const ANALOG_MAX_READOUT: u16 = 1023;

/// Counts at each end of the scale treated as fully empty / fully charged
pub const ANALOG_DEAD_RANGE: u16 = 10;

pub const BATTERY_LEVEL_MAX: u8 = 100;
pub const BATTERY_LEVEL_LOW: u8 = 30;
pub const BATTERY_LEVEL_CRITICALLY_LOW: u8 = 10;

/// Time to charge/discharge value meaning "unknown"
pub const BATTERY_TIME_UNKNOWN: u32 = 0x00FF_FFFF;

/// Convert a raw reading into a battery level
///
/// The sense input reads inverted; readings inside the dead range at either
/// end snap to 0 % and 100 %.
#[allow(clippy::cast_possible_truncation)]
pub fn battery_level_percent(raw: u16) -> u8 {
    let value = ANALOG_MAX_READOUT.saturating_sub(raw).clamp(
        ANALOG_DEAD_RANGE,
        ANALOG_MAX_READOUT - ANALOG_DEAD_RANGE,
    );
    let span = u32::from(ANALOG_MAX_READOUT - 2 * ANALOG_DEAD_RANGE);

    (u32::from(value - ANALOG_DEAD_RANGE) * u32::from(BATTERY_LEVEL_MAX) / span) as u8
}

/// Battery presence flag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum BatteryPresence {
    NotPresent = 0b00,
    PresentRemovable = 0b01,
    PresentNonRemovable = 0b10,
    Unknown = 0b11,
}

/// Battery charge level indicator flag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum BatteryIndicator {
    CriticallyLow = 0b00,
    Low = 0b01,
    Good = 0b10,
    Unknown = 0b11,
}

impl BatteryIndicator {
    /// Indicator for a battery level
    pub const fn from_level(level_percent: u8) -> Self {
        if level_percent <= BATTERY_LEVEL_CRITICALLY_LOW {
            Self::CriticallyLow
        } else if level_percent <= BATTERY_LEVEL_LOW {
            Self::Low
        } else {
            Self::Good
        }
    }
}

/// Battery charging flag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum BatteryCharging {
    NotChargeable = 0b00,
    ChargeableNotCharging = 0b01,
    ChargeableCharging = 0b10,
    Unknown = 0b11,
}

/// Battery serviceability flag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum BatteryServiceability {
    ServiceNotRequired = 0b01,
    ServiceRequired = 0b10,
    Unknown = 0b11,
}

/// Generic Battery flags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatteryFlags {
    pub presence: BatteryPresence,
    pub indicator: BatteryIndicator,
    pub charging: BatteryCharging,
    pub serviceability: BatteryServiceability,
}

impl BatteryFlags {
    /// Flags of the built-in emergency battery at `level_percent`
    pub const fn emergency(level_percent: u8) -> Self {
        Self {
            presence: BatteryPresence::PresentNonRemovable,
            indicator: BatteryIndicator::from_level(level_percent),
            charging: BatteryCharging::ChargeableNotCharging,
            serviceability: BatteryServiceability::ServiceNotRequired,
        }
    }

    pub const fn bits(self) -> u8 {
        self.presence as u8
            | (self.indicator as u8) << 2
            | (self.charging as u8) << 4
            | (self.serviceability as u8) << 6
    }
}

/// Generic Battery Status published by the node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatteryStatus {
    pub instance_index: u8,
    pub level_percent: u8,
    /// Minutes, `None` when unknown
    pub time_to_discharge: Option<u32>,
    /// Minutes, `None` when unknown
    pub time_to_charge: Option<u32>,
    pub flags: BatteryFlags,
}

impl BatteryStatus {
    pub const SIZE: usize = 9;

    /// Status of the emergency battery, times unknown
    pub const fn emergency(instance_index: u8, level_percent: u8) -> Self {
        Self {
            instance_index,
            level_percent,
            time_to_discharge: None,
            time_to_charge: None,
            flags: BatteryFlags::emergency(level_percent),
        }
    }

    /// Encode `[instance, level, discharge u24, charge u24, flags]`
    pub fn encode(&self) -> [u8; Self::SIZE] {
        let discharge = self.time_to_discharge.unwrap_or(BATTERY_TIME_UNKNOWN).to_le_bytes();
        let charge = self.time_to_charge.unwrap_or(BATTERY_TIME_UNKNOWN).to_le_bytes();
        [
            self.instance_index,
            self.level_percent,
            discharge[0],
            discharge[1],
            discharge[2],
            charge[0],
            charge[1],
            charge[2],
            self.flags.bits(),
        ]
    }
}

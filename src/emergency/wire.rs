//! Emergency Lighting (EL) and Emergency Lighting Test (ELT) wire records.
//!
//! Every record is fixed size and little-endian.

use crate::error::{DecodeError, expect_len};

/// Emergency Lighting server vendor opcode
pub const EL_OPCODE: u32 = 0x00EA_3601;

/// Emergency Lighting Test server vendor opcode
pub const ELT_OPCODE: u32 = 0x00E9_3601;

/// Test length reported while no duration test result is known
pub const TEST_LENGTH_UNKNOWN: u16 = 0xFFFF;

/// EL subopcodes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ElSubOpcode {
    InhibitEnter = 0x00,
    InhibitExit = 0x02,
    StateGet = 0x04,
    StateStatus = 0x05,
    PropertyStatus = 0x09,
    LampOperationTimeGet = 0x0A,
    LampOperationTimeClear = 0x0B,
    LampOperationTimeStatus = 0x0D,
    RestEnter = 0x0E,
    RestExit = 0x10,
}

impl TryFrom<u8> for ElSubOpcode {
    type Error = DecodeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Ok(match value {
            0x00 => Self::InhibitEnter,
            0x02 => Self::InhibitExit,
            0x04 => Self::StateGet,
            0x05 => Self::StateStatus,
            0x09 => Self::PropertyStatus,
            0x0A => Self::LampOperationTimeGet,
            0x0B => Self::LampOperationTimeClear,
            0x0D => Self::LampOperationTimeStatus,
            0x0E => Self::RestEnter,
            0x10 => Self::RestExit,
            other => return Err(DecodeError::UnknownSubOpcode(other)),
        })
    }
}

/// ELT subopcodes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum EltSubOpcode {
    FunctionalTestGet = 0x00,
    FunctionalTestStart = 0x01,
    FunctionalTestStop = 0x02,
    FunctionalTestStatus = 0x03,
    DurationTestGet = 0x04,
    DurationTestStart = 0x05,
    DurationTestStop = 0x06,
    DurationTestStatus = 0x07,
}

impl TryFrom<u8> for EltSubOpcode {
    type Error = DecodeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Ok(match value {
            0x00 => Self::FunctionalTestGet,
            0x01 => Self::FunctionalTestStart,
            0x02 => Self::FunctionalTestStop,
            0x03 => Self::FunctionalTestStatus,
            0x04 => Self::DurationTestGet,
            0x05 => Self::DurationTestStart,
            0x06 => Self::DurationTestStop,
            0x07 => Self::DurationTestStatus,
            other => return Err(DecodeError::UnknownSubOpcode(other)),
        })
    }
}

/// Emergency lighting state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ElState {
    Normal = 0x03,
    /// Also reported for extended emergency, both share one wire value
    Emergency = 0x05,
    Rest = 0x08,
    Inhibit = 0x0A,
    DurationTestInProgress = 0x0C,
    FunctionalTestInProgress = 0x0E,
    BatteryDischarged = 0x0F,
}

impl ElState {
    pub const EXTENDED_EMERGENCY: Self = Self::Emergency;
}

impl TryFrom<u8> for ElState {
    type Error = DecodeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Ok(match value {
            0x03 => Self::Normal,
            0x05 => Self::Emergency,
            0x08 => Self::Rest,
            0x0A => Self::Inhibit,
            0x0C => Self::DurationTestInProgress,
            0x0E => Self::FunctionalTestInProgress,
            0x0F => Self::BatteryDischarged,
            other => return Err(DecodeError::UnknownState(other)),
        })
    }
}

/// Properties reported through EL Property Status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum PropertyId {
    Lightness = 0xFF80,
    ProlongTime = 0xFF83,
}

impl TryFrom<u16> for PropertyId {
    type Error = DecodeError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            0xFF80 => Ok(Self::Lightness),
            0xFF83 => Ok(Self::ProlongTime),
            other => Err(DecodeError::UnknownProperty(other)),
        }
    }
}

/// Execution status of a self-test
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum TestStatus {
    Finished = 0x00,
    #[default]
    Unknown = 0x07,
}

/// Fault flags of a self-test result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TestFaults {
    pub lamp: bool,
    pub battery: bool,
    pub circuit: bool,
    pub battery_duration: bool,
}

impl TestFaults {
    const LAMP: u8 = 1 << 0;
    const BATTERY: u8 = 1 << 1;
    const CIRCUIT: u8 = 1 << 2;
    const BATTERY_DURATION: u8 = 1 << 3;

    pub const fn bits(self) -> u8 {
        let mut bits = 0;
        if self.lamp {
            bits |= Self::LAMP;
        }
        if self.battery {
            bits |= Self::BATTERY;
        }
        if self.circuit {
            bits |= Self::CIRCUIT;
        }
        if self.battery_duration {
            bits |= Self::BATTERY_DURATION;
        }
        bits
    }

    /// Decode flags, reserved bits are ignored
    pub const fn from_bits(bits: u8) -> Self {
        Self {
            lamp: bits & Self::LAMP != 0,
            battery: bits & Self::BATTERY != 0,
            circuit: bits & Self::CIRCUIT != 0,
            battery_duration: bits & Self::BATTERY_DURATION != 0,
        }
    }
}

/// EL State Status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateStatus {
    pub state: ElState,
}

impl StateStatus {
    pub const SIZE: usize = 1;

    pub const fn encode(&self) -> [u8; Self::SIZE] {
        [self.state as u8]
    }
}

/// EL Property Status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropertyStatus {
    pub property_id: u16,
    pub value: u16,
}

impl PropertyStatus {
    pub const SIZE: usize = 4;

    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        expect_len(bytes, Self::SIZE)?;
        Ok(Self {
            property_id: u16::from_le_bytes([bytes[0], bytes[1]]),
            value: u16::from_le_bytes([bytes[2], bytes[3]]),
        })
    }

    pub fn encode(&self) -> [u8; Self::SIZE] {
        let [id_lo, id_hi] = self.property_id.to_le_bytes();
        let [value_lo, value_hi] = self.value.to_le_bytes();
        [id_lo, id_hi, value_lo, value_hi]
    }
}

/// EL Lamp Operation Time Status, both times in seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OperationTimeStatus {
    pub total_operation_time: u32,
    pub emergency_time: u32,
}

impl OperationTimeStatus {
    pub const SIZE: usize = 8;

    pub fn encode(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0; Self::SIZE];
        bytes[..4].copy_from_slice(&self.total_operation_time.to_le_bytes());
        bytes[4..].copy_from_slice(&self.emergency_time.to_le_bytes());
        bytes
    }
}

/// ELT Functional Test Status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FunctionalTestStatus {
    pub status: TestStatus,
    pub faults: TestFaults,
}

impl FunctionalTestStatus {
    pub const SIZE: usize = 2;

    pub const fn encode(&self) -> [u8; Self::SIZE] {
        [self.status as u8, self.faults.bits()]
    }
}

/// ELT Duration Test Status, test length in seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DurationTestStatus {
    pub status: TestStatus,
    pub faults: TestFaults,
    pub test_length: u16,
}

impl DurationTestStatus {
    pub const SIZE: usize = 4;

    pub const fn encode(&self) -> [u8; Self::SIZE] {
        let [length_lo, length_hi] = self.test_length.to_le_bytes();
        [self.status as u8, self.faults.bits(), length_lo, length_hi]
    }
}

/// Inbound EL request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElRequest {
    InhibitEnter,
    InhibitExit,
    StateGet,
    PropertyStatus(PropertyStatus),
    LampOperationTimeGet,
    LampOperationTimeClear,
    RestEnter,
    RestExit,
}

impl ElRequest {
    /// Decode `[subopcode, record..]`
    pub fn decode(payload: &[u8]) -> Result<Self, DecodeError> {
        let (&subopcode, body) = payload.split_first().ok_or(DecodeError::Empty)?;
        let request = match ElSubOpcode::try_from(subopcode)? {
            ElSubOpcode::InhibitEnter => Self::InhibitEnter,
            ElSubOpcode::InhibitExit => Self::InhibitExit,
            ElSubOpcode::StateGet => Self::StateGet,
            ElSubOpcode::PropertyStatus => return Ok(Self::PropertyStatus(PropertyStatus::decode(body)?)),
            ElSubOpcode::LampOperationTimeGet => Self::LampOperationTimeGet,
            ElSubOpcode::LampOperationTimeClear => Self::LampOperationTimeClear,
            ElSubOpcode::RestEnter => Self::RestEnter,
            ElSubOpcode::RestExit => Self::RestExit,
            ElSubOpcode::StateStatus | ElSubOpcode::LampOperationTimeStatus => {
                return Err(DecodeError::UnknownSubOpcode(subopcode));
            }
        };
        expect_len(body, 0)?;
        Ok(request)
    }
}

/// Inbound ELT request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EltRequest {
    FunctionalTestGet,
    FunctionalTestStart,
    FunctionalTestStop,
    DurationTestGet,
    DurationTestStart,
    DurationTestStop,
}

impl EltRequest {
    /// Decode `[subopcode]`, every ELT request has an empty body
    pub fn decode(payload: &[u8]) -> Result<Self, DecodeError> {
        let (&subopcode, body) = payload.split_first().ok_or(DecodeError::Empty)?;
        let request = match EltSubOpcode::try_from(subopcode)? {
            EltSubOpcode::FunctionalTestGet => Self::FunctionalTestGet,
            EltSubOpcode::FunctionalTestStart => Self::FunctionalTestStart,
            EltSubOpcode::FunctionalTestStop => Self::FunctionalTestStop,
            EltSubOpcode::DurationTestGet => Self::DurationTestGet,
            EltSubOpcode::DurationTestStart => Self::DurationTestStart,
            EltSubOpcode::DurationTestStop => Self::DurationTestStop,
            EltSubOpcode::FunctionalTestStatus | EltSubOpcode::DurationTestStatus => {
                return Err(DecodeError::UnknownSubOpcode(subopcode));
            }
        };
        expect_len(body, 0)?;
        Ok(request)
    }
}

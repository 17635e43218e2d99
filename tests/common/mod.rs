#![allow(dead_code)]

use std::cell::Cell;
use std::convert::Infallible;
use std::rc::Rc;

use embedded_hal::digital::{ErrorType, InputPin};
use mesh_lighting_node::emergency::BatteryStatus;
use mesh_lighting_node::{
    AnalogInput, ChannelLevels, GenericDeltaSet, GenericOnOffSet, MeshTransport, MessageHeader,
    OutputDriver, Request1Message, Timestamp,
};
use mesh_lighting_node::timestamp::Clock;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sent {
    Request1(Request1Message),
    OnOff(GenericOnOffSet),
    Delta(GenericDeltaSet),
    LightnessGet(u8),
    Battery(BatteryStatus),
}

/// Transport recording everything sent through it
#[derive(Debug, Default)]
pub struct RecordingTransport {
    pub sent: Vec<Sent>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take(&mut self) -> Vec<Sent> {
        std::mem::take(&mut self.sent)
    }

    pub fn responses(&self) -> Vec<&Request1Message> {
        self.sent
            .iter()
            .filter_map(|sent| match sent {
                Sent::Request1(message) => Some(message),
                _ => None,
            })
            .collect()
    }

    pub fn deltas(&self) -> Vec<&GenericDeltaSet> {
        self.sent
            .iter()
            .filter_map(|sent| match sent {
                Sent::Delta(delta) => Some(delta),
                _ => None,
            })
            .collect()
    }

    pub fn toggles(&self) -> Vec<&GenericOnOffSet> {
        self.sent
            .iter()
            .filter_map(|sent| match sent {
                Sent::OnOff(onoff) => Some(onoff),
                _ => None,
            })
            .collect()
    }
}

impl MeshTransport for RecordingTransport {
    fn send_request1(&mut self, message: &Request1Message) {
        self.sent.push(Sent::Request1(message.clone()));
    }

    fn send_generic_onoff(&mut self, command: &GenericOnOffSet) {
        self.sent.push(Sent::OnOff(*command));
    }

    fn send_generic_delta(&mut self, command: &GenericDeltaSet) {
        self.sent.push(Sent::Delta(*command));
    }

    fn send_light_lightness_get(&mut self, instance_index: u8) {
        self.sent.push(Sent::LightnessGet(instance_index));
    }

    fn send_battery_status(&mut self, status: &BatteryStatus) {
        self.sent.push(Sent::Battery(*status));
    }
}

/// Output driver recording every write
#[derive(Debug, Default)]
pub struct RecordingOutput {
    pub writes: Vec<ChannelLevels>,
}

impl OutputDriver for RecordingOutput {
    fn write(&mut self, levels: ChannelLevels) {
        self.writes.push(levels);
    }
}

/// Digital pin whose level is set from the test
#[derive(Debug, Clone, Default)]
pub struct FakePin {
    pub low: Rc<Cell<bool>>,
}

impl FakePin {
    pub fn set_low(&self, low: bool) {
        self.low.set(low);
    }
}

impl ErrorType for FakePin {
    type Error = Infallible;
}

impl InputPin for FakePin {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.low.get())
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(self.low.get())
    }
}

/// Analog input whose reading is set from the test
#[derive(Debug, Clone, Default)]
pub struct FakeAnalog {
    pub raw: Rc<Cell<u16>>,
}

impl FakeAnalog {
    pub fn with_raw(raw: u16) -> Self {
        let analog = Self::default();
        analog.raw.set(raw);
        analog
    }

    pub fn set(&self, raw: u16) {
        self.raw.set(raw);
    }
}

impl AnalogInput for FakeAnalog {
    fn read(&mut self) -> u16 {
        self.raw.get()
    }
}

/// Clock whose time is set from the test
#[derive(Debug, Clone, Default)]
pub struct FakeClock {
    pub millis: Rc<Cell<u32>>,
}

impl FakeClock {
    pub fn set(&self, millis: u32) {
        self.millis.set(millis);
    }
}

impl Clock for FakeClock {
    fn now(&self) -> Timestamp {
        Timestamp::from_millis(self.millis.get())
    }
}

pub const EL_HEADER: MessageHeader = MessageHeader {
    instance_index: 4,
    instance_subindex: 0,
    opcode: 0x00EA_3601,
    opcode_size: 3,
};

pub const ELT_HEADER: MessageHeader = MessageHeader {
    instance_index: 4,
    instance_subindex: 0,
    opcode: 0x00E9_3601,
    opcode_size: 3,
};

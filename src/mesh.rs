//! Messages exchanged with the mesh stack.
//!
//! The UART framing itself lives behind [`MeshTransport`]; this module only
//! defines the typed commands and the request-1 response layout.

use embassy_time::Duration;
use heapless::Vec;

use crate::emergency::BatteryStatus;

/// Largest response record carried in a request-1 message
pub const MAX_RESPONSE_PAYLOAD: usize = 8;

/// Largest encoded request-1 frame: indices, 3-byte opcode, subopcode, record
pub const MAX_REQUEST1_FRAME: usize = 2 + 3 + 1 + MAX_RESPONSE_PAYLOAD;

/// Addressing of an inbound vendor message, echoed back in responses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageHeader {
    pub instance_index: u8,
    pub instance_subindex: u8,
    /// Mesh opcode, right-aligned
    pub opcode: u32,
    /// Number of opcode bytes on the wire (1-3)
    pub opcode_size: u8,
}

impl MessageHeader {
    /// Same addressing with another opcode of the same size
    pub const fn with_opcode(self, opcode: u32) -> Self {
        Self { opcode, ..self }
    }
}

/// Vendor message response sent back through the mesh stack
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request1Message {
    pub header: MessageHeader,
    pub subopcode: u8,
    pub payload: Vec<u8, MAX_RESPONSE_PAYLOAD>,
}

impl Request1Message {
    /// Create a new message
    ///
    /// Returns `None` if the payload does not fit a response record.
    pub fn new(header: MessageHeader, subopcode: u8, payload: &[u8]) -> Option<Self> {
        Some(Self {
            header,
            subopcode,
            payload: Vec::from_slice(payload).ok()?,
        })
    }

    /// Encode to the request-1 byte layout
    ///
    /// `[instance, subindex, opcode (big-endian, 1-3 bytes), subopcode, payload..]`
    pub fn encode(&self) -> Vec<u8, MAX_REQUEST1_FRAME> {
        let mut frame = Vec::new();
        let opcode = self.header.opcode.to_be_bytes();
        let opcode = match self.header.opcode_size {
            3 => &opcode[1..],
            2 => &opcode[2..],
            _ => &opcode[3..],
        };

        // Capacity covers the largest header and record.
        let _ = frame.push(self.header.instance_index);
        let _ = frame.push(self.header.instance_subindex);
        let _ = frame.extend_from_slice(opcode);
        let _ = frame.push(self.subopcode);
        let _ = frame.extend_from_slice(&self.payload);

        frame
    }
}

/// Generic OnOff Set Unacknowledged
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenericOnOffSet {
    pub instance_index: u8,
    pub on: bool,
    pub transition_time: Duration,
    pub delay: Duration,
    /// Extra transmissions after the first one
    pub repeats: u8,
    pub repeat_interval: Duration,
    pub new_transaction: bool,
}

/// Generic Delta Set Unacknowledged
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenericDeltaSet {
    pub instance_index: u8,
    /// Signed change relative to the value at transaction start
    pub delta: i32,
    pub transition_time: Duration,
    pub delay: Duration,
    /// Extra transmissions after the first one
    pub repeats: u8,
    pub repeat_interval: Duration,
    /// How long the transport should hold the message before sending it
    pub dispatch_delay: Duration,
    pub new_transaction: bool,
}

/// Outbound side of the mesh stack
///
/// Sends are fire-and-forget: reliability comes from the repeat counts
/// carried in the commands, not from delivery reports.
pub trait MeshTransport {
    /// Send a vendor message response
    fn send_request1(&mut self, message: &Request1Message);

    /// Send a Generic OnOff Set
    fn send_generic_onoff(&mut self, command: &GenericOnOffSet);

    /// Send a Generic Delta Set
    fn send_generic_delta(&mut self, command: &GenericDeltaSet);

    /// Ask a Light Lightness server for its present state
    fn send_light_lightness_get(&mut self, instance_index: u8);

    /// Publish the battery state of the node
    fn send_battery_status(&mut self, status: &BatteryStatus);
}

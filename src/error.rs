use core::fmt;

/// Reasons an inbound mesh payload is rejected
///
/// Rejected messages are logged and dropped, never answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    /// Payload carried no subopcode byte
    Empty,
    /// Payload length does not match the record expected for the subopcode
    Length { expected: usize, actual: usize },
    /// Subopcode is not handled by this server
    UnknownSubOpcode(u8),
    /// Raw value is not a known emergency lighting state
    UnknownState(u8),
    /// Property id is not one the server reports on
    UnknownProperty(u16),
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("empty payload"),
            Self::Length { expected, actual } => {
                write!(f, "wrong length: expected {expected}, got {actual}")
            }
            Self::UnknownSubOpcode(subopcode) => {
                write!(f, "subopcode 0x{subopcode:02X} not supported")
            }
            Self::UnknownState(state) => write!(f, "unknown state 0x{state:02X}"),
            Self::UnknownProperty(id) => write!(f, "property_id 0x{id:04X} not supported"),
        }
    }
}

/// Check that a payload has exactly `expected` bytes
pub(crate) const fn expect_len(payload: &[u8], expected: usize) -> Result<(), DecodeError> {
    if payload.len() == expected {
        Ok(())
    } else {
        Err(DecodeError::Length {
            expected,
            actual: payload.len(),
        })
    }
}

use crate::command::PayloadRule;

/// Errors that can occur during frame encoding/decoding.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The command identifier is not in the command table.
    #[error("command 0x{0:02X} not found")]
    UnknownCommand(u8),

    /// The parameters do not match the payload rule for the command.
    #[error("payload mismatch for {name} (0x{command:02X}): expected {expected}, got {actual}")]
    PayloadMismatch {
        command: u8,
        name: &'static str,
        expected: PayloadRule,
        actual: String,
    },

    /// The reply is too short to hold the fixed reply header.
    #[error("malformed reply ({len} bytes, need at least {min})")]
    MalformedReply { len: usize, min: usize },

    /// The header byte names neither the vendor nor the user protocol.
    #[error("invalid frame header 0x{0:02X}")]
    InvalidHeader(u8),

    /// The length byte cannot describe a frame.
    #[error("invalid frame length {0}")]
    InvalidLength(u8),

    /// The data does not fit in a one-byte length field.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },
}

pub type Result<T> = std::result::Result<T, FrameError>;

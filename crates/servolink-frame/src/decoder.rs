use bytes::Bytes;
use tracing::debug;

use crate::codec::{Header, LENGTH_OVERHEAD};
use crate::command::command_name;
use crate::error::{FrameError, Result};
use crate::status::Status;

/// Offset of the echoed command identifier.
pub const COMMAND_OFFSET: usize = 4;
/// Offset of the in-band status byte.
pub const STATUS_OFFSET: usize = 5;
/// Header, length, sequence, reserved, command, status.
pub const MIN_REPLY_SIZE: usize = 6;

/// A reply from the drive, with its command and status resolved to names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedReply {
    /// Raw header byte.
    pub header: u8,
    /// Raw length byte.
    pub length: u8,
    /// Sequence echoed by the drive.
    pub sequence: u8,
    /// Command the reply answers.
    pub command: u8,
    /// Display name of `command`, or `"Unknown command"`.
    pub command_name: &'static str,
    /// Raw status byte.
    pub status_code: u8,
    /// Cataloged category of `status_code`.
    pub status: Status,
    /// Bytes after the status, bounded by the length field.
    pub body: Bytes,
    /// The reply exactly as received.
    pub raw: Bytes,
}

impl DecodedReply {
    /// Protocol marker, if it is one of the known values.
    pub fn protocol(&self) -> Option<Header> {
        Header::from_byte(self.header).ok()
    }

    /// True when the drive reported success.
    pub fn is_ok(&self) -> bool {
        self.status.is_ok()
    }
}

/// Decode a raw reply.
///
/// Only the fixed six-byte prefix is required. An unknown command or an
/// unmapped status still decodes; they only change the names reported.
pub fn decode_reply(raw: &[u8]) -> Result<DecodedReply> {
    if raw.len() < MIN_REPLY_SIZE {
        return Err(FrameError::MalformedReply {
            len: raw.len(),
            min: MIN_REPLY_SIZE,
        });
    }

    let length = raw[1];
    let declared = length as usize + LENGTH_OVERHEAD;
    if declared != raw.len() {
        debug!(
            declared,
            received = raw.len(),
            "reply length field disagrees with received size"
        );
    }
    let end = declared.clamp(MIN_REPLY_SIZE, raw.len());

    let command = raw[COMMAND_OFFSET];
    let status_code = raw[STATUS_OFFSET];

    Ok(DecodedReply {
        header: raw[0],
        length,
        sequence: raw[2],
        command,
        command_name: command_name(command),
        status_code,
        status: Status::from_code(status_code),
        body: Bytes::copy_from_slice(&raw[MIN_REPLY_SIZE..end]),
        raw: Bytes::copy_from_slice(raw),
    })
}

use std::fmt;

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{FrameError, Result};

/// Fixed bytes before the data: header, length, sequence, reserved, command.
pub const HEADER_SIZE: usize = 5;

/// Bytes the length field does not count: header and length itself.
pub const LENGTH_OVERHEAD: usize = 2;

/// Largest data section a one-byte length field can describe.
pub const MAX_DATA: usize = u8::MAX as usize - 3;

/// Value of the reserved byte in every frame.
pub const RESERVED: u8 = 0x00;

/// Protocol marker in the first byte of every frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Header {
    /// Vendor protocol (`0xAA`).
    #[default]
    Vendor,
    /// User-defined protocol variant (`0x00`).
    User,
}

impl Header {
    pub const VENDOR_BYTE: u8 = 0xAA;
    pub const USER_BYTE: u8 = 0x00;

    pub fn as_byte(self) -> u8 {
        match self {
            Header::Vendor => Self::VENDOR_BYTE,
            Header::User => Self::USER_BYTE,
        }
    }

    pub fn from_byte(byte: u8) -> Result<Self> {
        match byte {
            Self::VENDOR_BYTE => Ok(Header::Vendor),
            Self::USER_BYTE => Ok(Header::User),
            other => Err(FrameError::InvalidHeader(other)),
        }
    }
}

/// One frame as exchanged with the drive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Protocol marker.
    pub header: Header,
    /// Sequence number the session stamped on this frame.
    pub sequence: u8,
    /// Command identifier (echoed on replies).
    pub command: u8,
    /// Command-specific data following the identifier.
    pub data: Bytes,
}

impl Frame {
    /// Create a new frame.
    pub fn new(header: Header, sequence: u8, command: u8, data: impl Into<Bytes>) -> Self {
        Self {
            header,
            sequence,
            command,
            data: data.into(),
        }
    }

    /// Value of the length field: sequence, reserved, command and data.
    pub fn length(&self) -> usize {
        3 + self.data.len()
    }

    /// The total wire size of this frame (`length + 2`).
    pub fn wire_size(&self) -> usize {
        self.length() + LENGTH_OVERHEAD
    }

    /// Encode into a fresh buffer.
    pub fn to_bytes(&self) -> Result<Bytes> {
        let mut buf = BytesMut::with_capacity(self.wire_size());
        encode_frame(self, &mut buf)?;
        Ok(buf.freeze())
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_bytes() {
            Ok(wire) => f.write_str(&to_hex(&wire)),
            Err(_) => write!(f, "<oversized frame: {} data bytes>", self.data.len()),
        }
    }
}

/// Encode a frame into the wire format.
///
/// Wire format:
/// ```text
/// ┌────────┬────────┬──────────┬──────────┬─────────┬────────────────┐
/// │ Header │ Length │ Sequence │ Reserved │ Command │ Data           │
/// │ (1B)   │ (1B)   │ (1B)     │ 0x00     │ (1B)    │ (Length-3 B)   │
/// └────────┴────────┴──────────┴──────────┴─────────┴────────────────┘
/// ```
pub fn encode_frame(frame: &Frame, dst: &mut BytesMut) -> Result<()> {
    if frame.data.len() > MAX_DATA {
        return Err(FrameError::PayloadTooLarge {
            size: frame.data.len(),
            max: MAX_DATA,
        });
    }
    dst.reserve(frame.wire_size());
    dst.put_u8(frame.header.as_byte());
    dst.put_u8(frame.length() as u8);
    dst.put_u8(frame.sequence);
    dst.put_u8(RESERVED);
    dst.put_u8(frame.command);
    dst.put_slice(&frame.data);
    Ok(())
}

/// Decode a frame from a buffer.
///
/// Returns `Ok(None)` if the buffer doesn't contain a complete frame yet.
/// On success, consumes the frame bytes from the buffer.
pub fn decode_frame(src: &mut BytesMut) -> Result<Option<Frame>> {
    if src.len() < LENGTH_OVERHEAD {
        return Ok(None);
    }

    let header = Header::from_byte(src[0])?;
    let length = src[1];
    if (length as usize) < 3 {
        return Err(FrameError::InvalidLength(length));
    }

    let total = length as usize + LENGTH_OVERHEAD;
    if src.len() < total {
        return Ok(None);
    }

    let sequence = src[2];
    let command = src[4];
    src.advance(HEADER_SIZE);
    let data = src.split_to(total - HEADER_SIZE).freeze();

    Ok(Some(Frame {
        header,
        sequence,
        command,
        data,
    }))
}

/// Space-separated upper-case hex, the way frames are shown to operators.
pub fn to_hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 3);
    for (i, byte) in bytes.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        out.push_str(&format!("{byte:02X}"));
    }
    out
}

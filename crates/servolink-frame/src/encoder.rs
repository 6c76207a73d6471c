use bytes::{BufMut, Bytes, BytesMut};
use tracing::trace;

use crate::codec::{Frame, Header, MAX_DATA};
use crate::command::{lookup, CommandSpec, PayloadRule};
use crate::error::{FrameError, Result};

/// Jog direction for velocity moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// `0` on the wire.
    Negative,
    /// `1` on the wire.
    Positive,
}

impl Direction {
    pub fn as_byte(self) -> u8 {
        match self {
            Direction::Negative => 0,
            Direction::Positive => 1,
        }
    }
}

/// Caller-supplied parameters for a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Params {
    /// For commands without data.
    None,
    /// One raw switch byte: `0x00` off, nonzero on.
    Switch(u8),
    /// Velocity magnitude and direction.
    Velocity { speed: u32, direction: Direction },
}

impl Params {
    /// Switch parameter from a boolean.
    pub fn servo(on: bool) -> Self {
        Params::Switch(u8::from(on))
    }

    fn describe(&self) -> String {
        match self {
            Params::None => "no parameters".to_string(),
            Params::Switch(_) => "switch parameter".to_string(),
            Params::Velocity { .. } => "velocity parameters".to_string(),
        }
    }
}

/// Build a frame for `command`, checking `params` against the command table.
///
/// Pure: the caller supplies the sequence and advances it after sending.
pub fn encode(command: u8, sequence: u8, header: Header, params: &Params) -> Result<Frame> {
    let spec = lookup(command)?;

    let data = match (spec.rule, params) {
        (PayloadRule::Empty, Params::None) => Bytes::new(),
        (PayloadRule::Switch, Params::Switch(state)) => Bytes::copy_from_slice(&[*state]),
        (PayloadRule::Velocity, Params::Velocity { speed, direction }) => {
            let mut buf = BytesMut::with_capacity(PayloadRule::Velocity.data_len());
            buf.put_u32_le(*speed);
            buf.put_u8(direction.as_byte());
            buf.freeze()
        }
        (_, other) => return Err(mismatch(spec, other.describe())),
    };

    let frame = Frame::new(header, sequence, command, data);
    trace!(command = spec.name, sequence, length = frame.length(), "frame encoded");
    Ok(frame)
}

/// Build a frame from pre-assembled data bytes.
///
/// The command must be in the table and `data` must have exactly the
/// length its rule produces.
pub fn encode_raw(command: u8, sequence: u8, header: Header, data: &[u8]) -> Result<Frame> {
    let spec = lookup(command)?;
    if data.len() > MAX_DATA {
        return Err(FrameError::PayloadTooLarge {
            size: data.len(),
            max: MAX_DATA,
        });
    }
    if data.len() != spec.rule.data_len() {
        return Err(mismatch(spec, format!("{} data bytes", data.len())));
    }
    Ok(Frame::new(
        header,
        sequence,
        command,
        Bytes::copy_from_slice(data),
    ))
}

fn mismatch(spec: &CommandSpec, actual: String) -> FrameError {
    FrameError::PayloadMismatch {
        command: spec.id,
        name: spec.name,
        expected: spec.rule,
        actual,
    }
}

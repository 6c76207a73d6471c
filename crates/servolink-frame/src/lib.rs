//! Frame codec and command dispatch for servo drive links.
//!
//! Every frame on the wire carries:
//! - A 1-byte protocol header (`0xAA` vendor, `0x00` user)
//! - A 1-byte length counting everything after itself
//! - A 1-byte sequence number and a reserved zero byte
//! - A 1-byte command identifier followed by command-specific data
//!
//! The [`command`] table is the single source of truth for which commands
//! exist and what they carry; both [`encode`] and [`decode_reply`] consult it.

pub mod codec;
pub mod command;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod sequence;
pub mod status;

pub use codec::{
    decode_frame, encode_frame, to_hex, Frame, Header, HEADER_SIZE, LENGTH_OVERHEAD, MAX_DATA,
};
pub use command::{command_name, commands, find_by_slug, lookup, CommandSpec, PayloadRule};
pub use decoder::{decode_reply, DecodedReply, MIN_REPLY_SIZE};
pub use encoder::{encode, encode_raw, Direction, Params};
pub use error::{FrameError, Result};
pub use sequence::Sequence;
pub use status::{catalog, Status};

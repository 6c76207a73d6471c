//! Command servo drives over UDP or TCP.
//!
//! servolink encodes drive commands into the vendor frame format, sends
//! them over a deadline-bounded socket, and decodes the drive's reply into
//! a named command and status.
//!
//! # Crate Structure
//!
//! - [`transport`]: UDP/TCP sessions with connect and receive deadlines
//! - [`frame`]: frame codec, command table, reply decoder and status catalog
//! - [`peer`]: request/reply sessions that own the sequence counter

/// Re-export transport types.
pub mod transport {
    pub use servolink_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use servolink_frame::*;
}

/// Re-export peer types.
pub mod peer {
    pub use servolink_peer::*;
}

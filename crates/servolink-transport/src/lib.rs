//! Deadline-bounded transport for a single servo drive.
//!
//! Provides one session type over two socket families:
//! - UDP (connectionless, drive port 3001)
//! - TCP (connection-oriented, drive port 2001)
//!
//! This is the lowest layer of servolink. Connect and receive calls carry
//! their own deadline; a timeout is reported as its own error variant,
//! separate from refused or failed I/O.

pub mod error;
pub mod session;
pub mod socket;

#[cfg(feature = "async")]
pub mod tokio_session;

pub use error::{Result, TransportError};
pub use session::{
    parse_peer, SessionState, TransportConfig, TransportSession, DEFAULT_CONNECT_TIMEOUT,
    DEFAULT_WRITE_TIMEOUT, MAX_WIRE_FRAME,
};
pub use socket::{DriveSocket, TransportKind};

#[cfg(feature = "async")]
pub use tokio_session::AsyncTransportSession;

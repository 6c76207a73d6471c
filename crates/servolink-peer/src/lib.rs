//! Request/reply sessions with a servo drive.
//!
//! A [`Peer`] owns one transport session, the sequence counter and the
//! protocol header. Each request encodes a frame, sends it, and waits for
//! the reply within a deadline. Drive-side failures are returned as data in
//! [`DecodedReply`](servolink_frame::DecodedReply); only local failures
//! become [`PeerError`].

#[cfg(feature = "async")]
pub mod async_peer;
pub mod config;
pub mod connector;
pub mod error;
pub mod peer;

#[cfg(feature = "async")]
pub use async_peer::AsyncPeer;
pub use config::{PeerConfig, SequenceStart, DEFAULT_RECEIVE_TIMEOUT};
pub use connector::{connect, connect_with_config};
pub use error::{PeerError, Result};
pub use peer::Peer;

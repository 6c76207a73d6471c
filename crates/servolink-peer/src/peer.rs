use std::net::SocketAddr;
use std::time::Duration;

use servolink_frame::{
    decode_reply, encode, encode_raw, DecodedReply, Frame, Header, Params, Sequence,
};
use servolink_transport::{TransportKind, TransportSession};
use tracing::{debug, warn};

use crate::config::PeerConfig;
use crate::error::{PeerError, Result};

/// A connected session with one drive.
///
/// Owns the socket, the sequence counter and the protocol header. At most
/// one request is in flight: every method takes `&mut self` and blocks
/// until the reply, a failure, or the deadline.
#[derive(Debug)]
pub struct Peer {
    transport: TransportSession,
    sequence: Sequence,
    header: Header,
    receive_timeout: Duration,
}

impl Peer {
    pub(crate) fn from_parts(transport: TransportSession, config: &PeerConfig) -> Self {
        Self {
            transport,
            sequence: config.sequence.initial(),
            header: config.header,
            receive_timeout: config.receive_timeout,
        }
    }

    /// Send a command and wait for the matching reply.
    ///
    /// In-band failures come back as `Ok` with a non-OK [`DecodedReply::status`].
    pub fn request(&mut self, command: u8, params: &Params) -> Result<DecodedReply> {
        let frame = self.encode(command, params)?;
        self.request_frame(&frame)
    }

    /// Send a command with pre-assembled data bytes and wait for the reply.
    ///
    /// The data is checked against the command's payload rule by length only.
    pub fn request_raw(&mut self, command: u8, data: &[u8]) -> Result<DecodedReply> {
        let frame = self.encode_raw(command, data)?;
        self.request_frame(&frame)
    }

    /// Encode a command with the current sequence and header, without sending.
    pub fn encode(&self, command: u8, params: &Params) -> Result<Frame> {
        Ok(encode(command, self.sequence.current(), self.header, params)?)
    }

    /// Build a frame from pre-assembled data bytes, without sending.
    pub fn encode_raw(&self, command: u8, data: &[u8]) -> Result<Frame> {
        Ok(encode_raw(command, self.sequence.current(), self.header, data)?)
    }

    /// Send an already encoded frame and wait for the reply to its command.
    ///
    /// The frame is sent as is; build it with [`Peer::encode`] so it carries
    /// the session's sequence and header.
    pub fn request_frame(&mut self, frame: &Frame) -> Result<DecodedReply> {
        self.send_frame(frame)?;
        let reply = self.receive_reply()?;

        if reply.command != frame.command {
            warn!(
                expected = frame.command,
                actual = reply.command,
                "reply does not answer the command sent"
            );
            return Err(PeerError::UnexpectedReply {
                expected: frame.command,
                actual: reply.command,
            });
        }
        if reply.sequence != frame.sequence {
            debug!(
                sent = frame.sequence,
                echoed = reply.sequence,
                "drive echoed a different sequence"
            );
        }
        Ok(reply)
    }

    /// Write a frame and advance the sequence counter.
    pub fn send_frame(&mut self, frame: &Frame) -> Result<()> {
        let wire = frame.to_bytes()?;
        self.transport.send(&wire)?;
        debug!(command = frame.command, sequence = frame.sequence, frame = %frame, "sent");
        self.sequence.advance();
        Ok(())
    }

    /// Wait for one reply using the configured deadline.
    pub fn receive_reply(&mut self) -> Result<DecodedReply> {
        self.receive_reply_within(self.receive_timeout)
    }

    /// Wait at most `deadline` for one reply.
    ///
    /// A timeout leaves the peer connected; the caller decides whether to
    /// wait again or resend.
    pub fn receive_reply_within(&mut self, deadline: Duration) -> Result<DecodedReply> {
        let raw = self.receive_raw_within(deadline)?;
        Ok(decode_reply(&raw)?)
    }

    /// Wait at most `deadline` for one reply and return it undecoded.
    pub fn receive_raw_within(&mut self, deadline: Duration) -> Result<bytes::Bytes> {
        let raw = self.transport.receive(deadline)?;
        debug!(bytes = raw.len(), "reply received");
        Ok(raw)
    }

    /// Release the socket. Safe to call more than once.
    pub fn close(&mut self) {
        self.transport.close();
    }

    /// Current sequence counter.
    pub fn sequence(&self) -> Sequence {
        self.sequence
    }

    /// Replace the sequence counter; `0` disables sequencing.
    pub fn set_sequence(&mut self, value: u8) {
        self.sequence.set(value);
    }

    /// Protocol header stamped on outbound frames.
    pub fn header(&self) -> Header {
        self.header
    }

    pub fn set_header(&mut self, header: Header) {
        self.header = header;
    }

    /// Deadline used by [`Peer::receive_reply`].
    pub fn receive_timeout(&self) -> Duration {
        self.receive_timeout
    }

    pub fn set_receive_timeout(&mut self, timeout: Duration) {
        self.receive_timeout = timeout;
    }

    pub fn is_connected(&self) -> bool {
        self.transport.is_connected()
    }

    pub fn peer_addr(&self) -> Option<SocketAddr> {
        self.transport.peer_addr()
    }

    pub fn kind(&self) -> Option<TransportKind> {
        self.transport.kind()
    }
}

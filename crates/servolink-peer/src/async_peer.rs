//! Async drive peer on tokio.

use std::net::SocketAddr;
use std::time::Duration;

use servolink_frame::{
    decode_reply, encode, encode_raw, DecodedReply, Frame, Header, Params, Sequence,
};
use servolink_transport::{AsyncTransportSession, TransportKind};
use tracing::{debug, warn};

use crate::config::PeerConfig;
use crate::error::{PeerError, Result};

/// Async counterpart of [`Peer`](crate::Peer) with the same request semantics.
pub struct AsyncPeer {
    transport: AsyncTransportSession,
    sequence: Sequence,
    header: Header,
    receive_timeout: Duration,
}

impl AsyncPeer {
    /// Connect to a drive.
    pub async fn connect(peer: &str, kind: TransportKind, config: &PeerConfig) -> Result<Self> {
        let mut transport = AsyncTransportSession::new(config.transport.clone());
        transport.connect(peer, kind).await?;
        Ok(Self {
            transport,
            sequence: config.sequence.initial(),
            header: config.header,
            receive_timeout: config.receive_timeout,
        })
    }

    /// Send a command and wait for the matching reply.
    pub async fn request(&mut self, command: u8, params: &Params) -> Result<DecodedReply> {
        let frame = encode(command, self.sequence.current(), self.header, params)?;
        self.exchange(&frame).await
    }

    /// Send a command with pre-assembled data bytes.
    pub async fn request_raw(&mut self, command: u8, data: &[u8]) -> Result<DecodedReply> {
        let frame = encode_raw(command, self.sequence.current(), self.header, data)?;
        self.exchange(&frame).await
    }

    async fn exchange(&mut self, frame: &Frame) -> Result<DecodedReply> {
        let wire = frame.to_bytes()?;
        self.transport.send(&wire).await?;
        self.sequence.advance();

        let raw = self.transport.receive(self.receive_timeout).await?;
        let reply = decode_reply(&raw)?;
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
        debug!(command = reply.command, status = %reply.status, "reply decoded");
        Ok(reply)
    }

    pub fn sequence(&self) -> Sequence {
        self.sequence
    }

    pub fn set_sequence(&mut self, value: u8) {
        self.sequence.set(value);
    }

    pub fn set_header(&mut self, header: Header) {
        self.header = header;
    }

    pub fn peer_addr(&self) -> Option<SocketAddr> {
        self.transport.peer_addr()
    }

    pub fn close(&mut self) {
        self.transport.close();
    }
}

#[cfg(test)]
mod tests {
    use servolink_frame::command::SERVO_ENABLE;
    use servolink_frame::Status;
    use servolink_transport::TransportConfig;
    use tokio::net::UdpSocket;

    use super::*;
    use crate::config::SequenceStart;

    #[tokio::test]
    async fn async_request_round_trip() {
        let drive = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let port = drive.local_addr().unwrap().port();
        let responder = tokio::spawn(async move {
            let mut buf = [0u8; 64];
            let (n, from) = drive.recv_from(&mut buf).await.unwrap();
            drive
                .send_to(&[buf[0], 0x04, buf[2], 0x00, buf[4], 0x00], from)
                .await
                .unwrap();
            buf[..n].to_vec()
        });

        let config = PeerConfig {
            transport: TransportConfig {
                udp_port: port,
                ..TransportConfig::default()
            },
            sequence: SequenceStart::Fixed(5),
            ..PeerConfig::default()
        };
        let mut peer = AsyncPeer::connect("127.0.0.1", TransportKind::Udp, &config)
            .await
            .unwrap();
        let reply = peer
            .request(SERVO_ENABLE, &Params::servo(true))
            .await
            .unwrap();
        assert_eq!(reply.status, Status::Ok);
        assert_eq!(peer.sequence().current(), 6);

        let sent = responder.await.unwrap();
        assert_eq!(sent, vec![0xAA, 0x04, 0x05, 0x00, 0x2A, 0x01]);
    }
}

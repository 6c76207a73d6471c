//! Async variant of [`TransportSession`](crate::TransportSession) on tokio.
//!
//! Deadlines wrap each pending future in [`tokio::time::timeout`], so an
//! expired connect or receive is dropped instead of interrupted.

use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

use bytes::{Bytes, BytesMut};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpStream, UdpSocket};
use tokio::time::{timeout, Instant};
use tracing::{debug, info, warn};

use crate::error::{Result, TransportError};
use crate::session::{
    classify_connect_error, complete_frame_len, parse_peer, SessionState, TransportConfig,
    MAX_WIRE_FRAME,
};
use crate::socket::TransportKind;

enum AsyncSocket {
    Udp { socket: UdpSocket, peer: SocketAddr },
    Tcp(TcpStream),
}

/// Async drive session. Same states and outcomes as the blocking session.
pub struct AsyncTransportSession {
    config: TransportConfig,
    socket: Option<AsyncSocket>,
    peer: Option<SocketAddr>,
    state: SessionState,
    pending: BytesMut,
}

impl AsyncTransportSession {
    /// Create a disconnected session.
    pub fn new(config: TransportConfig) -> Self {
        Self {
            config,
            socket: None,
            peer: None,
            state: SessionState::Disconnected,
            pending: BytesMut::with_capacity(MAX_WIRE_FRAME),
        }
    }

    /// Connect to a drive at an IPv4 dotted-quad address.
    pub async fn connect(&mut self, peer: &str, kind: TransportKind) -> Result<()> {
        self.close();
        let addr = parse_peer(peer, self.config.port_for(kind))?;
        self.state = SessionState::Connecting;

        let opened = match kind {
            TransportKind::Udp => UdpSocket::bind(SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0)))
                .await
                .map(|socket| AsyncSocket::Udp { socket, peer: addr })
                .map_err(TransportError::SocketAllocation),
            TransportKind::Tcp if self.config.connect_timeout.is_zero() => {
                Err(TransportError::ConnectTimeout {
                    addr,
                    timeout: self.config.connect_timeout,
                })
            }
            TransportKind::Tcp => {
                let limit = self.config.connect_timeout;
                match timeout(limit, TcpStream::connect(addr)).await {
                    Ok(Ok(stream)) => stream
                        .set_nodelay(true)
                        .map(|()| AsyncSocket::Tcp(stream))
                        .map_err(|source| TransportError::ConnectFailed { addr, source }),
                    Ok(Err(err)) => Err(classify_connect_error(addr, limit, err)),
                    Err(_elapsed) => {
                        warn!(%addr, timeout = ?limit, "connect deadline expired");
                        Err(TransportError::ConnectTimeout {
                            addr,
                            timeout: limit,
                        })
                    }
                }
            }
        };

        match opened {
            Ok(socket) => {
                info!(%addr, transport = %kind, "drive session connected");
                self.socket = Some(socket);
                self.peer = Some(addr);
                self.state = SessionState::Connected;
                Ok(())
            }
            Err(err) => {
                self.state = SessionState::Disconnected;
                Err(err)
            }
        }
    }

    /// Write one wire frame verbatim.
    pub async fn send(&mut self, wire: &[u8]) -> Result<()> {
        let write_limit = self.config.write_timeout;
        let socket = self.socket.as_mut().ok_or(TransportError::NotConnected)?;
        let outcome = match socket {
            AsyncSocket::Udp { socket, peer } => match socket.send_to(wire, *peer).await {
                Ok(n) if n == wire.len() => Ok(()),
                Ok(n) => Err(TransportError::SendFailed(std::io::Error::new(
                    std::io::ErrorKind::WriteZero,
                    format!("short datagram ({n} of {} bytes)", wire.len()),
                ))),
                Err(err) => Err(TransportError::SendFailed(err)),
            },
            AsyncSocket::Tcp(stream) => match write_limit {
                Some(limit) => match timeout(limit, stream.write_all(wire)).await {
                    Ok(written) => written.map_err(TransportError::SendFailed),
                    Err(_elapsed) => Err(TransportError::SendFailed(std::io::Error::new(
                        std::io::ErrorKind::TimedOut,
                        format!("write deadline of {limit:?} expired"),
                    ))),
                },
                None => stream
                    .write_all(wire)
                    .await
                    .map_err(TransportError::SendFailed),
            },
        };
        if let Err(err) = outcome {
            warn!(error = %err, "send failed; closing session");
            self.close();
            return Err(err);
        }
        debug!(bytes = wire.len(), "frame sent");
        Ok(())
    }

    /// Wait at most `deadline` for one reply frame.
    pub async fn receive(&mut self, deadline: Duration) -> Result<Bytes> {
        let until = Instant::now() + deadline;
        match self.receive_until(until, deadline).await {
            Ok(bytes) => Ok(bytes),
            Err(TransportError::ReceiveTimeout(d)) => {
                warn!(timeout = ?d, "no reply before deadline");
                Err(TransportError::ReceiveTimeout(d))
            }
            Err(TransportError::NotConnected) => Err(TransportError::NotConnected),
            Err(err) => {
                warn!(error = %err, "receive failed; closing session");
                self.close();
                Err(err)
            }
        }
    }

    async fn receive_until(&mut self, until: Instant, deadline: Duration) -> Result<Bytes> {
        let socket = self.socket.as_mut().ok_or(TransportError::NotConnected)?;
        let mut chunk = [0u8; MAX_WIRE_FRAME];

        loop {
            match &mut *socket {
                AsyncSocket::Udp { socket, peer } => {
                    let received = tokio::time::timeout_at(until, socket.recv_from(&mut chunk))
                        .await
                        .map_err(|_| TransportError::ReceiveTimeout(deadline))?;
                    let (n, from) = received.map_err(TransportError::ReceiveFailed)?;
                    if from != *peer {
                        debug!(%from, expected = %peer, "dropping datagram from foreign address");
                        continue;
                    }
                    return Ok(Bytes::copy_from_slice(&chunk[..n]));
                }
                AsyncSocket::Tcp(stream) => {
                    if let Some(total) = complete_frame_len(&self.pending) {
                        return Ok(self.pending.split_to(total).freeze());
                    }
                    let read = tokio::time::timeout_at(until, stream.read(&mut chunk))
                        .await
                        .map_err(|_| TransportError::ReceiveTimeout(deadline))?
                        .map_err(TransportError::ReceiveFailed)?;
                    if read == 0 {
                        return Err(TransportError::Closed);
                    }
                    self.pending.extend_from_slice(&chunk[..read]);
                }
            }
        }
    }

    /// Release the socket. Safe to call any number of times.
    pub fn close(&mut self) {
        if self.socket.take().is_some() {
            debug!(peer = ?self.peer, "drive session closed");
        }
        self.pending.clear();
        self.state = SessionState::Disconnected;
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Peer address of the last successful connect.
    pub fn peer_addr(&self) -> Option<SocketAddr> {
        self.peer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn udp_round_trip() {
        let drive = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let port = drive.local_addr().unwrap().port();

        let responder = tokio::spawn(async move {
            let mut buf = [0u8; 64];
            let (n, from) = drive.recv_from(&mut buf).await.unwrap();
            assert_eq!(&buf[..n], &[0x00, 0x03, 0x11, 0x00, 0x2B]);
            drive
                .send_to(&[0x00, 0x04, 0x11, 0x00, 0x2B, 0x00], from)
                .await
                .unwrap();
        });

        let mut session = AsyncTransportSession::new(TransportConfig {
            udp_port: port,
            ..TransportConfig::default()
        });
        session.connect("127.0.0.1", TransportKind::Udp).await.unwrap();
        session.send(&[0x00, 0x03, 0x11, 0x00, 0x2B]).await.unwrap();
        let reply = session.receive(Duration::from_secs(2)).await.unwrap();
        assert_eq!(reply.as_ref(), &[0x00, 0x04, 0x11, 0x00, 0x2B, 0x00]);

        responder.await.unwrap();
    }

    #[tokio::test]
    async fn tcp_reassembles_split_frames() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let drive = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut req = [0u8; 5];
            stream.read_exact(&mut req).await.unwrap();
            // One reply split mid-frame, then a second glued to its tail.
            stream.write_all(&[0xAA, 0x04, 0x01]).await.unwrap();
            stream.flush().await.unwrap();
            tokio::time::sleep(Duration::from_millis(50)).await;
            stream
                .write_all(&[0x00, 0x31, 0x00, 0xAA, 0x04, 0x02, 0x00, 0x31, 0x85])
                .await
                .unwrap();
            req
        });

        let mut session = AsyncTransportSession::new(TransportConfig {
            tcp_port: port,
            ..TransportConfig::default()
        });
        session.connect("127.0.0.1", TransportKind::Tcp).await.unwrap();
        session.send(&[0xAA, 0x03, 0x01, 0x00, 0x31]).await.unwrap();

        let first = session.receive(Duration::from_secs(2)).await.unwrap();
        assert_eq!(first.as_ref(), &[0xAA, 0x04, 0x01, 0x00, 0x31, 0x00]);
        let second = session.receive(Duration::from_secs(2)).await.unwrap();
        assert_eq!(second.as_ref(), &[0xAA, 0x04, 0x02, 0x00, 0x31, 0x85]);

        assert_eq!(drive.await.unwrap(), [0xAA, 0x03, 0x01, 0x00, 0x31]);
    }

    #[tokio::test]
    async fn zero_connect_deadline_times_out() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let mut session = AsyncTransportSession::new(TransportConfig {
            tcp_port: listener.local_addr().unwrap().port(),
            connect_timeout: Duration::ZERO,
            ..TransportConfig::default()
        });

        let err = session
            .connect("127.0.0.1", TransportKind::Tcp)
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::ConnectTimeout { .. }));
        assert_eq!(session.state(), SessionState::Disconnected);
    }

    #[tokio::test]
    async fn stalled_tcp_peer_hits_write_deadline() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        // Accepts and never reads, so the socket buffers eventually fill.
        let drive = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(10)).await;
            drop(stream);
        });

        let mut session = AsyncTransportSession::new(TransportConfig {
            tcp_port: port,
            write_timeout: Some(Duration::from_millis(100)),
            ..TransportConfig::default()
        });
        session.connect("127.0.0.1", TransportKind::Tcp).await.unwrap();

        let frame = [0u8; MAX_WIRE_FRAME];
        let mut failure = None;
        for _ in 0..1_000_000 {
            if let Err(err) = session.send(&frame).await {
                failure = Some(err);
                break;
            }
        }

        let err = failure.expect("writes should stall");
        assert!(
            matches!(&err, TransportError::SendFailed(io) if io.kind() == std::io::ErrorKind::TimedOut),
            "{err}"
        );
        assert_eq!(session.state(), SessionState::Disconnected);
        drive.abort();
    }

    #[tokio::test]
    async fn receive_timeout_keeps_session_connected() {
        let silent = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let port = silent.local_addr().unwrap().port();

        let mut session = AsyncTransportSession::new(TransportConfig {
            udp_port: port,
            ..TransportConfig::default()
        });
        session.connect("127.0.0.1", TransportKind::Udp).await.unwrap();

        let err = session
            .receive(Duration::from_millis(100))
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::ReceiveTimeout(_)));
        assert_eq!(session.state(), SessionState::Connected);
    }
}

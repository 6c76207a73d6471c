use std::io::ErrorKind;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4, TcpStream, UdpSocket};
use std::time::{Duration, Instant};

use bytes::{Bytes, BytesMut};
use tracing::{debug, info, warn};

use crate::error::{Result, TransportError};
use crate::socket::{DriveSocket, TransportKind};

/// Largest frame the link can carry: `length` is one byte, plus header and length.
pub const MAX_WIRE_FRAME: usize = u8::MAX as usize + 2;

/// Default deadline for the TCP handshake.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(2);

/// Default deadline for writing one frame.
pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(2);

/// Configuration for a transport session.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Peer port for [`TransportKind::Udp`].
    pub udp_port: u16,
    /// Peer port for [`TransportKind::Tcp`].
    pub tcp_port: u16,
    /// Deadline for the TCP handshake.
    pub connect_timeout: Duration,
    /// Deadline for writing one frame.
    pub write_timeout: Option<Duration>,
}

impl TransportConfig {
    /// Peer port for the given transport kind.
    pub fn port_for(&self, kind: TransportKind) -> u16 {
        match kind {
            TransportKind::Udp => self.udp_port,
            TransportKind::Tcp => self.tcp_port,
        }
    }
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            udp_port: TransportKind::DEFAULT_UDP_PORT,
            tcp_port: TransportKind::DEFAULT_TCP_PORT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            write_timeout: Some(DEFAULT_WRITE_TIMEOUT),
        }
    }
}

/// Lifecycle of a transport session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No socket held; the initial state and the state after any failure.
    Disconnected,
    /// Address validated, socket being opened or handshake in progress.
    Connecting,
    /// Socket open; send and receive are allowed.
    Connected,
}

/// One socket bound to one drive.
///
/// Every call blocks the caller until it completes, fails, or its deadline
/// passes. A receive timeout leaves the session connected; every other
/// failure after connect closes it.
#[derive(Debug)]
pub struct TransportSession {
    config: TransportConfig,
    socket: Option<DriveSocket>,
    kind: Option<TransportKind>,
    peer: Option<SocketAddr>,
    state: SessionState,
    pending: BytesMut,
}

impl TransportSession {
    /// Create a disconnected session.
    pub fn new(config: TransportConfig) -> Self {
        Self {
            config,
            socket: None,
            kind: None,
            peer: None,
            state: SessionState::Disconnected,
            pending: BytesMut::with_capacity(MAX_WIRE_FRAME),
        }
    }

    /// Connect to a drive at an IPv4 dotted-quad address.
    ///
    /// For UDP this only validates the address and allocates a socket. For
    /// TCP the handshake runs under `connect_timeout`; an expired deadline
    /// drops the half-open socket and reports [`TransportError::ConnectTimeout`].
    pub fn connect(&mut self, peer: &str, kind: TransportKind) -> Result<()> {
        if self.state != SessionState::Disconnected {
            debug!(peer = ?self.peer, "reconnecting; closing previous socket");
            self.close();
        }

        let addr = parse_peer(peer, self.config.port_for(kind))?;
        self.state = SessionState::Connecting;

        let connected = match kind {
            TransportKind::Udp => open_udp(addr),
            TransportKind::Tcp => open_tcp(addr, self.config.connect_timeout),
        };
        let socket = match connected {
            Ok(socket) => socket,
            Err(err) => {
                self.state = SessionState::Disconnected;
                return Err(err);
            }
        };

        if let Err(err) = socket.set_write_timeout(self.config.write_timeout) {
            self.state = SessionState::Disconnected;
            return Err(TransportError::SocketAllocation(err));
        }

        info!(%addr, transport = %kind, "drive session connected");
        self.socket = Some(socket);
        self.kind = Some(kind);
        self.peer = Some(addr);
        self.pending.clear();
        self.state = SessionState::Connected;
        Ok(())
    }

    /// Write one wire frame verbatim.
    pub fn send(&mut self, wire: &[u8]) -> Result<()> {
        let socket = self.socket.as_mut().ok_or(TransportError::NotConnected)?;

        let mut offset = 0usize;
        let outcome = loop {
            if offset == wire.len() {
                break socket.flush().map_err(TransportError::SendFailed);
            }
            match socket.write(&wire[offset..]) {
                Ok(0) => {
                    break Err(TransportError::SendFailed(std::io::Error::new(
                        ErrorKind::WriteZero,
                        format!("short write ({offset} of {} bytes)", wire.len()),
                    )))
                }
                Ok(n) if socket.kind() == TransportKind::Udp && n != wire.len() => {
                    break Err(TransportError::SendFailed(std::io::Error::new(
                        ErrorKind::WriteZero,
                        format!("short datagram ({n} of {} bytes)", wire.len()),
                    )))
                }
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => break Err(TransportError::SendFailed(err)),
            }
        };

        match outcome {
            Ok(()) => {
                debug!(bytes = wire.len(), "frame sent");
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "send failed; closing session");
                self.close();
                Err(err)
            }
        }
    }

    /// Block for at most `deadline` waiting for one reply frame.
    ///
    /// Datagrams are returned whole. Stream bytes are buffered until the
    /// length byte says a frame is complete; surplus bytes are kept for the
    /// next call.
    pub fn receive(&mut self, deadline: Duration) -> Result<Bytes> {
        if self.socket.is_none() {
            return Err(TransportError::NotConnected);
        }
        let until = Instant::now() + deadline;

        match self.receive_until(until, deadline) {
            Ok(bytes) => Ok(bytes),
            Err(TransportError::ReceiveTimeout(d)) => {
                warn!(timeout = ?d, "no reply before deadline");
                Err(TransportError::ReceiveTimeout(d))
            }
            Err(err) => {
                warn!(error = %err, "receive failed; closing session");
                self.close();
                Err(err)
            }
        }
    }

    fn receive_until(&mut self, until: Instant, deadline: Duration) -> Result<Bytes> {
        let socket = self.socket.as_mut().ok_or(TransportError::NotConnected)?;
        let kind = socket.kind();

        if kind == TransportKind::Tcp {
            if let Some(total) = complete_frame_len(&self.pending) {
                return Ok(self.pending.split_to(total).freeze());
            }
        }

        let mut chunk = [0u8; MAX_WIRE_FRAME];
        loop {
            let remaining = until.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(TransportError::ReceiveTimeout(deadline));
            }
            socket
                .set_read_timeout(Some(remaining))
                .map_err(TransportError::ReceiveFailed)?;

            let read = match socket.read(&mut chunk) {
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if is_timeout_kind(err.kind()) => continue,
                Err(err) => return Err(TransportError::ReceiveFailed(err)),
            };

            match kind {
                TransportKind::Udp => {
                    debug!(bytes = read, "datagram received");
                    return Ok(Bytes::copy_from_slice(&chunk[..read]));
                }
                TransportKind::Tcp => {
                    if read == 0 {
                        return Err(TransportError::Closed);
                    }
                    self.pending.extend_from_slice(&chunk[..read]);
                    if let Some(total) = complete_frame_len(&self.pending) {
                        debug!(bytes = total, "stream frame received");
                        return Ok(self.pending.split_to(total).freeze());
                    }
                }
            }
        }
    }

    /// Release the socket. Safe to call any number of times.
    pub fn close(&mut self) {
        if let Some(socket) = self.socket.take() {
            socket.shutdown();
            debug!(peer = ?self.peer, "drive session closed");
        }
        self.pending.clear();
        self.state = SessionState::Disconnected;
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// True while a socket is held.
    pub fn is_connected(&self) -> bool {
        self.state == SessionState::Connected
    }

    /// Transport kind of the last successful connect.
    pub fn kind(&self) -> Option<TransportKind> {
        self.kind
    }

    /// Peer address of the last successful connect.
    pub fn peer_addr(&self) -> Option<SocketAddr> {
        self.peer
    }

    /// Local address of the open socket.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.socket.as_ref().and_then(|s| s.local_addr().ok())
    }

    /// Session configuration.
    pub fn config(&self) -> &TransportConfig {
        &self.config
    }
}

impl Drop for TransportSession {
    fn drop(&mut self) {
        self.close();
    }
}

/// Parse an IPv4 dotted-quad and attach the transport port.
pub fn parse_peer(peer: &str, port: u16) -> Result<SocketAddr> {
    let ip: Ipv4Addr = peer
        .trim()
        .parse()
        .map_err(|_| TransportError::InvalidAddress(peer.to_string()))?;
    Ok(SocketAddr::V4(SocketAddrV4::new(ip, port)))
}

/// Total size of the first complete frame in `buf`, if one is buffered.
pub(crate) fn complete_frame_len(buf: &[u8]) -> Option<usize> {
    if buf.len() < 2 {
        return None;
    }
    let total = buf[1] as usize + 2;
    (buf.len() >= total).then_some(total)
}

pub(crate) fn is_timeout_kind(kind: ErrorKind) -> bool {
    matches!(kind, ErrorKind::WouldBlock | ErrorKind::TimedOut)
}

/// Sort a failed handshake into refused, timed out, or other.
pub(crate) fn classify_connect_error(
    addr: SocketAddr,
    timeout: Duration,
    err: std::io::Error,
) -> TransportError {
    match err.kind() {
        kind if is_timeout_kind(kind) => TransportError::ConnectTimeout { addr, timeout },
        ErrorKind::ConnectionRefused => TransportError::ConnectRefused { addr, source: err },
        _ => TransportError::ConnectFailed { addr, source: err },
    }
}

fn open_udp(addr: SocketAddr) -> Result<DriveSocket> {
    let socket = UdpSocket::bind(SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0)))
        .map_err(TransportError::SocketAllocation)?;
    debug!(%addr, "udp socket allocated");
    Ok(DriveSocket::from_udp(socket, addr))
}

fn open_tcp(addr: SocketAddr, timeout: Duration) -> Result<DriveSocket> {
    if timeout.is_zero() {
        return Err(TransportError::ConnectTimeout { addr, timeout });
    }
    let stream = TcpStream::connect_timeout(&addr, timeout).map_err(|err| {
        let err = classify_connect_error(addr, timeout, err);
        if err.is_timeout() {
            warn!(%addr, ?timeout, "connect deadline expired");
        }
        err
    })?;
    stream
        .set_nodelay(true)
        .map_err(|source| TransportError::ConnectFailed { addr, source })?;
    Ok(DriveSocket::from_tcp(stream))
}

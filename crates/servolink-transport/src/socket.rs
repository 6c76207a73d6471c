use std::io::{ErrorKind, Read, Write};
use std::net::{SocketAddr, TcpStream, UdpSocket};
use std::time::Duration;

use tracing::debug;

/// Which socket family a session runs over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportKind {
    /// Connectionless datagrams, no handshake.
    Udp,
    /// Connection-oriented stream with a handshake under the connect deadline.
    Tcp,
}

impl TransportKind {
    /// UDP port the drive listens on.
    pub const DEFAULT_UDP_PORT: u16 = 3001;
    /// TCP port the drive listens on.
    pub const DEFAULT_TCP_PORT: u16 = 2001;

    /// Transport name for diagnostics.
    pub fn as_str(self) -> &'static str {
        match self {
            TransportKind::Udp => "udp",
            TransportKind::Tcp => "tcp",
        }
    }
}

impl std::fmt::Display for TransportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A socket bound to exactly one drive.
///
/// Datagram sockets address every write to the peer and drop datagrams
/// arriving from anywhere else; stream sockets are already connected.
pub struct DriveSocket {
    inner: DriveSocketInner,
}

enum DriveSocketInner {
    Udp { socket: UdpSocket, peer: SocketAddr },
    Tcp(TcpStream),
}

impl DriveSocket {
    pub(crate) fn from_udp(socket: UdpSocket, peer: SocketAddr) -> Self {
        Self {
            inner: DriveSocketInner::Udp { socket, peer },
        }
    }

    pub(crate) fn from_tcp(stream: TcpStream) -> Self {
        Self {
            inner: DriveSocketInner::Tcp(stream),
        }
    }

    /// Transport kind of the underlying socket.
    pub fn kind(&self) -> TransportKind {
        match &self.inner {
            DriveSocketInner::Udp { .. } => TransportKind::Udp,
            DriveSocketInner::Tcp(_) => TransportKind::Tcp,
        }
    }

    /// Write once. Datagrams go out whole or not at all.
    pub(crate) fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match &mut self.inner {
            DriveSocketInner::Udp { socket, peer } => socket.send_to(buf, *peer),
            DriveSocketInner::Tcp(stream) => stream.write(buf),
        }
    }

    pub(crate) fn flush(&mut self) -> std::io::Result<()> {
        match &mut self.inner {
            DriveSocketInner::Udp { .. } => Ok(()),
            DriveSocketInner::Tcp(stream) => stream.flush(),
        }
    }

    /// Read once, blocking for at most the configured read timeout.
    pub(crate) fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match &mut self.inner {
            DriveSocketInner::Udp { socket, peer } => {
                let (n, from) = socket.recv_from(buf)?;
                if from != *peer {
                    debug!(%from, expected = %peer, "dropping datagram from foreign address");
                    return Err(std::io::Error::new(
                        ErrorKind::Interrupted,
                        "datagram from foreign address",
                    ));
                }
                Ok(n)
            }
            DriveSocketInner::Tcp(stream) => stream.read(buf),
        }
    }

    /// Set the read timeout. `None` blocks indefinitely.
    pub(crate) fn set_read_timeout(&self, timeout: Option<Duration>) -> std::io::Result<()> {
        match &self.inner {
            DriveSocketInner::Udp { socket, .. } => socket.set_read_timeout(timeout),
            DriveSocketInner::Tcp(stream) => stream.set_read_timeout(timeout),
        }
    }

    /// Set the write timeout. `None` blocks indefinitely.
    pub(crate) fn set_write_timeout(&self, timeout: Option<Duration>) -> std::io::Result<()> {
        match &self.inner {
            DriveSocketInner::Udp { socket, .. } => socket.set_write_timeout(timeout),
            DriveSocketInner::Tcp(stream) => stream.set_write_timeout(timeout),
        }
    }

    /// Local address the socket is bound to.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        match &self.inner {
            DriveSocketInner::Udp { socket, .. } => socket.local_addr(),
            DriveSocketInner::Tcp(stream) => stream.local_addr(),
        }
    }

    pub(crate) fn shutdown(&self) {
        if let DriveSocketInner::Tcp(stream) = &self.inner {
            let _ = stream.shutdown(std::net::Shutdown::Both);
        }
    }
}

impl std::fmt::Debug for DriveSocket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.inner {
            DriveSocketInner::Udp { peer, .. } => f
                .debug_struct("DriveSocket")
                .field("type", &"udp")
                .field("peer", peer)
                .finish(),
            DriveSocketInner::Tcp(stream) => f
                .debug_struct("DriveSocket")
                .field("type", &"tcp")
                .field("peer", &stream.peer_addr().ok())
                .finish(),
        }
    }
}

use std::net::SocketAddr;
use std::time::Duration;

/// Errors that can occur in drive transport operations.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The operating system refused to allocate a socket.
    #[error("socket allocation failed: {0}")]
    SocketAllocation(std::io::Error),

    /// The peer address is not a valid IPv4 dotted-quad.
    #[error("invalid peer address: {0:?}")]
    InvalidAddress(String),

    /// The peer actively refused the connection.
    #[error("connection to {addr} refused: {source}")]
    ConnectRefused {
        addr: SocketAddr,
        source: std::io::Error,
    },

    /// The connection handshake did not complete before the deadline.
    #[error("connection to {addr} timed out after {timeout:?}")]
    ConnectTimeout { addr: SocketAddr, timeout: Duration },

    /// The connection failed for any other reason.
    #[error("failed to connect to {addr}: {source}")]
    ConnectFailed {
        addr: SocketAddr,
        source: std::io::Error,
    },

    /// An operation required a connected session.
    #[error("session is not connected")]
    NotConnected,

    /// The frame could not be written in full.
    #[error("send failed: {0}")]
    SendFailed(std::io::Error),

    /// No reply arrived before the deadline.
    #[error("receive timed out after {0:?}")]
    ReceiveTimeout(Duration),

    /// Reading the reply failed.
    #[error("receive failed: {0}")]
    ReceiveFailed(std::io::Error),

    /// The peer closed a connection-oriented link.
    #[error("connection closed by peer")]
    Closed,
}

impl TransportError {
    /// True for the two deadline outcomes.
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            TransportError::ConnectTimeout { .. } | TransportError::ReceiveTimeout(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, TransportError>;

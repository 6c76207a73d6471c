/// Errors that can occur in peer operations.
#[derive(Debug, thiserror::Error)]
pub enum PeerError {
    /// Transport-level error.
    #[error("transport error: {0}")]
    Transport(#[from] servolink_transport::TransportError),

    /// Frame-level error.
    #[error("frame error: {0}")]
    Frame(#[from] servolink_frame::FrameError),

    /// The reply echoes a different command than the one sent.
    #[error("reply answers command 0x{actual:02X}, expected 0x{expected:02X}")]
    UnexpectedReply { expected: u8, actual: u8 },
}

impl PeerError {
    /// True when a connect or receive deadline expired.
    pub fn is_timeout(&self) -> bool {
        matches!(self, PeerError::Transport(err) if err.is_timeout())
    }
}

pub type Result<T> = std::result::Result<T, PeerError>;

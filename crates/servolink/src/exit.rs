use std::fmt;

use servolink_frame::FrameError;
use servolink_peer::PeerError;
use servolink_transport::TransportError;

// Exit code constants aligned with sysexits / timeout(1) conventions.
pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const TRANSPORT_ERROR: i32 = 3;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const TIMEOUT: i32 = 124;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn transport_error(context: &str, err: TransportError) -> CliError {
    let code = match &err {
        TransportError::ConnectTimeout { .. } | TransportError::ReceiveTimeout(_) => TIMEOUT,
        TransportError::InvalidAddress(_) => USAGE,
        TransportError::SocketAllocation(_) => INTERNAL,
        TransportError::Closed => FAILURE,
        _ => TRANSPORT_ERROR,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn frame_error(context: &str, err: FrameError) -> CliError {
    let code = match &err {
        FrameError::MalformedReply { .. } => DATA_INVALID,
        FrameError::UnknownCommand(_)
        | FrameError::PayloadMismatch { .. }
        | FrameError::PayloadTooLarge { .. } => USAGE,
        FrameError::InvalidHeader(_) | FrameError::InvalidLength(_) => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn peer_error(context: &str, err: PeerError) -> CliError {
    match err {
        PeerError::Transport(err) => transport_error(context, err),
        PeerError::Frame(err) => frame_error(context, err),
        other @ PeerError::UnexpectedReply { .. } => {
            CliError::new(DATA_INVALID, format!("{context}: {other}"))
        }
    }
}

use servolink_transport::{TransportKind, TransportSession};
use tracing::info;

use crate::config::PeerConfig;
use crate::error::Result;
use crate::peer::Peer;

/// Connect to a drive with default ports, deadlines and a random sequence start.
pub fn connect(peer: &str, kind: TransportKind) -> Result<Peer> {
    connect_with_config(peer, kind, &PeerConfig::default())
}

/// Connect with explicit configuration.
pub fn connect_with_config(peer: &str, kind: TransportKind, config: &PeerConfig) -> Result<Peer> {
    let mut transport = TransportSession::new(config.transport.clone());
    transport.connect(peer, kind)?;

    let peer = Peer::from_parts(transport, config);
    info!(
        peer = ?peer.peer_addr(),
        transport = %kind,
        header = ?peer.header(),
        sequence = peer.sequence().current(),
        "drive session open"
    );
    Ok(peer)
}

#[cfg(test)]
mod tests {
    use std::net::{TcpListener, UdpSocket};

    use servolink_frame::Header;
    use servolink_transport::{TransportConfig, TransportError};

    use super::*;
    use crate::config::SequenceStart;
    use crate::error::PeerError;

    #[test]
    fn connect_udp_applies_config() {
        let drive = UdpSocket::bind("127.0.0.1:0").unwrap();
        let config = PeerConfig {
            transport: TransportConfig {
                udp_port: drive.local_addr().unwrap().port(),
                ..TransportConfig::default()
            },
            header: Header::User,
            sequence: SequenceStart::Fixed(42),
            ..PeerConfig::default()
        };

        let peer = connect_with_config("127.0.0.1", TransportKind::Udp, &config).unwrap();
        assert!(peer.is_connected());
        assert_eq!(peer.kind(), Some(TransportKind::Udp));
        assert_eq!(peer.peer_addr(), drive.local_addr().ok());
        assert_eq!(peer.header(), Header::User);
        assert_eq!(peer.sequence().current(), 42);
    }

    #[test]
    fn connect_tcp_to_listener() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let config = PeerConfig {
            transport: TransportConfig {
                tcp_port: listener.local_addr().unwrap().port(),
                ..TransportConfig::default()
            },
            ..PeerConfig::default()
        };

        let peer = connect_with_config("127.0.0.1", TransportKind::Tcp, &config).unwrap();
        assert_eq!(peer.kind(), Some(TransportKind::Tcp));
        assert!(peer.sequence().is_enabled());
    }

    #[test]
    fn invalid_address_fails_before_io() {
        let err = connect("drive.local", TransportKind::Udp).unwrap_err();
        assert!(matches!(
            err,
            PeerError::Transport(TransportError::InvalidAddress(_))
        ));
    }

    #[test]
    fn refused_tcp_connect_is_reported() {
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let config = PeerConfig {
            transport: TransportConfig {
                tcp_port: port,
                ..TransportConfig::default()
            },
            ..PeerConfig::default()
        };
        let err = connect_with_config("127.0.0.1", TransportKind::Tcp, &config).unwrap_err();
        assert!(matches!(
            err,
            PeerError::Transport(TransportError::ConnectRefused { .. })
        ));
    }
}

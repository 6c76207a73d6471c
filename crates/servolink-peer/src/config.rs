use std::time::Duration;

use rand::Rng;
use servolink_frame::{Header, Sequence};
use servolink_transport::TransportConfig;

/// Default deadline for one reply.
pub const DEFAULT_RECEIVE_TIMEOUT: Duration = Duration::from_secs(2);

/// Where the sequence counter starts when a peer connects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SequenceStart {
    /// A random nonzero value, so replies from an earlier session are unlikely
    /// to carry a matching number.
    #[default]
    Random,
    /// A fixed value; `0` disables sequencing.
    Fixed(u8),
}

impl SequenceStart {
    pub(crate) fn initial(self) -> Sequence {
        match self {
            SequenceStart::Random => Sequence::new(rand::thread_rng().gen_range(1..=u8::MAX)),
            SequenceStart::Fixed(value) => Sequence::new(value),
        }
    }
}

/// Runtime configuration for a drive peer.
#[derive(Debug, Clone)]
pub struct PeerConfig {
    /// Socket ports and connect deadline.
    pub transport: TransportConfig,
    /// Deadline for each reply.
    pub receive_timeout: Duration,
    /// Protocol header stamped on outbound frames.
    pub header: Header,
    /// Initial sequence counter.
    pub sequence: SequenceStart,
}

impl Default for PeerConfig {
    fn default() -> Self {
        Self {
            transport: TransportConfig::default(),
            receive_timeout: DEFAULT_RECEIVE_TIMEOUT,
            header: Header::Vendor,
            sequence: SequenceStart::Random,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_start_is_enabled() {
        for _ in 0..64 {
            let seq = SequenceStart::Random.initial();
            assert!(seq.is_enabled());
            assert_ne!(seq.current(), 0);
        }
    }

    #[test]
    fn fixed_zero_disables() {
        assert!(!SequenceStart::Fixed(0).initial().is_enabled());
        assert_eq!(SequenceStart::Fixed(17).initial().current(), 17);
    }

    #[test]
    fn defaults_match_drive_ports() {
        let config = PeerConfig::default();
        assert_eq!(config.transport.udp_port, 3001);
        assert_eq!(config.transport.tcp_port, 2001);
        assert_eq!(config.transport.connect_timeout, Duration::from_secs(2));
        assert_eq!(config.receive_timeout, DEFAULT_RECEIVE_TIMEOUT);
        assert_eq!(config.header, Header::Vendor);
    }
}

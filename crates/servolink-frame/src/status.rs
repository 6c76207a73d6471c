//! In-band status codes carried in drive replies.
//!
//! The catalog only names codes; a non-OK status is data for the caller,
//! never an error path.

use std::fmt;

/// Named category for a reply status byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    /// `0x00`: the command was accepted.
    Ok,
    /// `0x01`: the drive's port is not open.
    NotOpen,
    /// `0x02`: the port number is out of range.
    InvalidPortNum,
    /// `0x03`: the slave number is out of range.
    InvalidSlaveNum,
    /// `0x05`: the drive lost its link.
    Disconnected,
    /// `0x06`: the drive timed out waiting on its own bus.
    Timeout,
    /// `0x07`: a CRC check failed on the drive's bus.
    CrcFailed,
    /// `0x08`: the drive received a damaged packet.
    RecvPacketError,
    /// `0x09`: position table read or write failed.
    PosTableError,
    /// `0x80`: the drive does not know the command.
    FrameTypeError,
    /// `0x81`: a parameter is out of range.
    DataError,
    /// `0x82`: the frame was malformed.
    PacketError,
    /// `0x85`: a move was refused.
    RunFail,
    /// `0x86`: the alarm reset was refused.
    ResetFail,
    /// `0x87`: servo on refused (vendor class 1).
    ServoOnFail1,
    /// `0x88`: servo on refused (vendor class 2).
    ServoOnFail2,
    /// `0x89`: servo on refused (vendor class 3).
    ServoOnFail3,
    /// `0x8A`: servo off refused.
    ServoOffFail,
    /// `0x8B`: parameter storage could not be accessed.
    RomAccess,
    /// `0xAA`: the frame failed its checksum.
    PacketCrcError,
    /// Catch-all, also used for codes missing from the catalog.
    UnknownError,
}

const CATALOG: [(u8, Status, &str); 21] = [
    (0x00, Status::Ok, "FMM_OK"),
    (0x01, Status::NotOpen, "FMM_NOT_OPEN"),
    (0x02, Status::InvalidPortNum, "FMM_INVALID_PORT_NUM"),
    (0x03, Status::InvalidSlaveNum, "FMM_INVALID_SLAVE_NUM"),
    (0x05, Status::Disconnected, "FMC_DISCONNECTED"),
    (0x06, Status::Timeout, "FMC_TIMEOUT_ERROR"),
    (0x07, Status::CrcFailed, "FMC_CRCFAILED_ERROR"),
    (0x08, Status::RecvPacketError, "FMC_RECVPACKET_ERROR"),
    (0x09, Status::PosTableError, "FMM_POSTABLE_ERROR"),
    (0x80, Status::FrameTypeError, "FMP_FRAMETYPEERROR"),
    (0x81, Status::DataError, "FMP_DATAERROR"),
    (0x82, Status::PacketError, "FMP_PACKETERROR"),
    (0x85, Status::RunFail, "FMP_RUNFAIL"),
    (0x86, Status::ResetFail, "FMP_RESETFAIL"),
    (0x87, Status::ServoOnFail1, "FMP_SERVOONFAIL1"),
    (0x88, Status::ServoOnFail2, "FMP_SERVOONFAIL2"),
    (0x89, Status::ServoOnFail3, "FMP_SERVOONFAIL3"),
    (0x8A, Status::ServoOffFail, "FMP_SERVOOFF_FAIL"),
    (0x8B, Status::RomAccess, "FMP_ROMACCESS"),
    (0xAA, Status::PacketCrcError, "FMP_PACKETCRCERROR"),
    (0xFF, Status::UnknownError, "FMM_UNKNOWN_ERROR"),
];

impl Status {
    /// Resolve a status byte. Unmapped codes become [`Status::UnknownError`].
    pub fn from_code(code: u8) -> Self {
        CATALOG
            .iter()
            .find(|(c, _, _)| *c == code)
            .map(|(_, status, _)| *status)
            .unwrap_or(Status::UnknownError)
    }

    /// Canonical code for this category.
    pub fn code(self) -> u8 {
        CATALOG
            .iter()
            .find(|(_, status, _)| *status == self)
            .map(|(code, _, _)| *code)
            .unwrap_or(0xFF)
    }

    /// Vendor name of the category, as printed by the drive tooling.
    pub fn name(self) -> &'static str {
        CATALOG
            .iter()
            .find(|(_, status, _)| *status == self)
            .map(|(_, _, name)| *name)
            .unwrap_or("FMM_UNKNOWN_ERROR")
    }

    pub fn is_ok(self) -> bool {
        self == Status::Ok
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Every cataloged `(code, status)` pair, in code order.
pub fn catalog() -> impl Iterator<Item = (u8, Status)> {
    CATALOG.iter().map(|(code, status, _)| (*code, *status))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_codes_resolve() {
        assert_eq!(Status::from_code(0x00), Status::Ok);
        assert_eq!(Status::from_code(0x06), Status::Timeout);
        assert_eq!(Status::from_code(0x87), Status::ServoOnFail1);
        assert_eq!(Status::from_code(0x88), Status::ServoOnFail2);
        assert_eq!(Status::from_code(0x89), Status::ServoOnFail3);
        assert_eq!(Status::from_code(0xAA), Status::PacketCrcError);
    }

    #[test]
    fn unmapped_codes_fall_back_to_unknown() {
        for code in [0x04, 0x0A, 0x7F, 0x83, 0x84, 0x8C, 0xFE] {
            assert_eq!(Status::from_code(code), Status::UnknownError, "0x{code:02X}");
        }
    }

    #[test]
    fn catalog_is_consistent() {
        let mut last = None;
        for (code, status) in catalog() {
            assert_eq!(Status::from_code(code), status);
            assert_eq!(status.code(), code);
            assert!(last.map_or(true, |prev| prev < code), "codes must ascend");
            last = Some(code);
        }
        assert_eq!(catalog().count(), 21);
    }

    #[test]
    fn names_follow_vendor_table() {
        assert_eq!(Status::Ok.to_string(), "FMM_OK");
        assert_eq!(Status::ServoOffFail.name(), "FMP_SERVOOFF_FAIL");
        assert_eq!(Status::UnknownError.name(), "FMM_UNKNOWN_ERROR");
        assert!(Status::Ok.is_ok());
        assert!(!Status::RomAccess.is_ok());
    }
}

//! Command identifiers and the payload each one carries.
//!
//! One table drives both directions: the encoder checks outbound
//! parameters against it and the decoder names echoed commands from it.

use std::fmt;

use crate::error::{FrameError, Result};

/// Board information query.
pub const GET_BOARD_INFO: u8 = 0x01;
/// Motor information query.
pub const GET_MOTOR_INFO: u8 = 0x05;
/// Encoder information query.
pub const GET_ENCODER_INFO: u8 = 0x06;
/// Firmware information query.
pub const GET_FIRMWARE_INFO: u8 = 0x07;
/// Servo enable/disable (older identifier).
pub const SERVO_ENABLE_ALT: u8 = 0x09;
/// Store parameters in ROM.
pub const SAVE_ALL_PARAMETERS: u8 = 0x10;
/// Servo enable/disable.
pub const SERVO_ENABLE: u8 = 0x2A;
/// Clear the active alarm.
pub const SERVO_ALARM_RESET: u8 = 0x2B;
/// Query the active alarm.
pub const GET_ALARM_TYPE: u8 = 0x2E;
/// Decelerate to a stop.
pub const MOVE_STOP: u8 = 0x31;
/// Stop immediately.
pub const EMERGENCY_STOP: u8 = 0x32;
/// Run the origin search.
pub const MOVE_ORIGIN: u8 = 0x33;
/// Jog at a constant velocity.
pub const MOVE_VELOCITY: u8 = 0x37;

/// Name reported for identifiers missing from the table.
pub const UNKNOWN_COMMAND_NAME: &str = "Unknown command";

/// Shape of the data section a command carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PayloadRule {
    /// No data after the command identifier.
    Empty,
    /// One byte: `0x00` off, anything else on.
    Switch,
    /// Four bytes little-endian velocity, then one direction byte.
    Velocity,
}

impl PayloadRule {
    /// Number of data bytes the rule produces.
    pub const fn data_len(self) -> usize {
        match self {
            PayloadRule::Empty => 0,
            PayloadRule::Switch => 1,
            PayloadRule::Velocity => 5,
        }
    }
}

impl fmt::Display for PayloadRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PayloadRule::Empty => f.write_str("no payload"),
            PayloadRule::Switch => f.write_str("1-byte on/off"),
            PayloadRule::Velocity => f.write_str("4-byte velocity + 1-byte direction"),
        }
    }
}

/// One entry of the command table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandSpec {
    /// Identifier on the wire.
    pub id: u8,
    /// Vendor library name, shown to operators.
    pub name: &'static str,
    /// Short kebab-case name accepted on the command line.
    pub slug: &'static str,
    /// Data section shape.
    pub rule: PayloadRule,
}

const fn entry(id: u8, name: &'static str, slug: &'static str, rule: PayloadRule) -> CommandSpec {
    CommandSpec {
        id,
        name,
        slug,
        rule,
    }
}

const TABLE: [CommandSpec; 13] = [
    entry(GET_BOARD_INFO, "FAS_GetBoardInfo", "board-info", PayloadRule::Empty),
    entry(GET_MOTOR_INFO, "FAS_GetMotorInfo", "motor-info", PayloadRule::Empty),
    entry(GET_ENCODER_INFO, "FAS_GetEncoder", "encoder-info", PayloadRule::Empty),
    entry(GET_FIRMWARE_INFO, "FAS_GetFirmwareInfo", "firmware-info", PayloadRule::Empty),
    entry(SERVO_ENABLE_ALT, "FAS_ServoEnable", "servo-enable-alt", PayloadRule::Switch),
    entry(SAVE_ALL_PARAMETERS, "FAS_SaveAllParameters", "save-parameters", PayloadRule::Empty),
    entry(SERVO_ENABLE, "FAS_ServoEnable", "servo-enable", PayloadRule::Switch),
    entry(SERVO_ALARM_RESET, "FAS_ServoAlarmReset", "alarm-reset", PayloadRule::Empty),
    entry(GET_ALARM_TYPE, "FAS_GetAlarmType", "alarm-type", PayloadRule::Empty),
    entry(MOVE_STOP, "FAS_MoveStop", "move-stop", PayloadRule::Empty),
    entry(EMERGENCY_STOP, "FAS_EmergencyStop", "emergency-stop", PayloadRule::Empty),
    entry(MOVE_ORIGIN, "FAS_MoveOriginSingleAxis", "move-origin", PayloadRule::Empty),
    entry(MOVE_VELOCITY, "FAS_MoveVelocity", "move-velocity", PayloadRule::Velocity),
];

const NO_ENTRY: u8 = u8::MAX;

const fn build_index(table: &[CommandSpec]) -> [u8; 256] {
    let mut index = [NO_ENTRY; 256];
    let mut i = 0;
    while i < table.len() {
        index[table[i].id as usize] = i as u8;
        i += 1;
    }
    index
}

static COMMANDS: [CommandSpec; 13] = TABLE;
static INDEX: [u8; 256] = build_index(&TABLE);

/// Every known command, in identifier order.
pub fn commands() -> &'static [CommandSpec] {
    &COMMANDS
}

/// Look up a command by identifier.
pub fn lookup(id: u8) -> Result<&'static CommandSpec> {
    match INDEX[id as usize] {
        NO_ENTRY => Err(FrameError::UnknownCommand(id)),
        slot => Ok(&COMMANDS[slot as usize]),
    }
}

/// Display name for an identifier, or [`UNKNOWN_COMMAND_NAME`].
pub fn command_name(id: u8) -> &'static str {
    lookup(id).map(|spec| spec.name).unwrap_or(UNKNOWN_COMMAND_NAME)
}

/// Find a command by its command-line name (case-insensitive).
pub fn find_by_slug(slug: &str) -> Option<&'static CommandSpec> {
    COMMANDS
        .iter()
        .find(|spec| spec.slug.eq_ignore_ascii_case(slug.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_is_sorted_and_unique() {
        let ids: Vec<u8> = commands().iter().map(|c| c.id).collect();
        let mut sorted = ids.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(ids, sorted);

        let mut slugs: Vec<&str> = commands().iter().map(|c| c.slug).collect();
        slugs.sort_unstable();
        slugs.dedup();
        assert_eq!(slugs.len(), commands().len());
    }

    #[test]
    fn lookup_known_commands() {
        assert_eq!(lookup(MOVE_VELOCITY).unwrap().rule, PayloadRule::Velocity);
        assert_eq!(lookup(SERVO_ENABLE).unwrap().rule, PayloadRule::Switch);
        assert_eq!(lookup(SERVO_ENABLE_ALT).unwrap().rule, PayloadRule::Switch);
        assert_eq!(lookup(EMERGENCY_STOP).unwrap().rule, PayloadRule::Empty);
        assert_eq!(lookup(GET_BOARD_INFO).unwrap().name, "FAS_GetBoardInfo");
    }

    #[test]
    fn every_table_entry_is_reachable() {
        for spec in commands() {
            assert_eq!(lookup(spec.id).unwrap(), spec);
        }
    }

    #[test]
    fn lookup_unknown_command() {
        for id in [0x00, 0x02, 0x2C, 0x38, 0xFF] {
            assert!(matches!(lookup(id), Err(FrameError::UnknownCommand(got)) if got == id));
            assert_eq!(command_name(id), UNKNOWN_COMMAND_NAME);
        }
    }

    #[test]
    fn find_by_slug_ignores_case() {
        assert_eq!(find_by_slug("Move-Stop").unwrap().id, MOVE_STOP);
        assert_eq!(find_by_slug(" alarm-reset ").unwrap().id, SERVO_ALARM_RESET);
        assert!(find_by_slug("teleport").is_none());
    }

    #[test]
    fn rule_lengths() {
        assert_eq!(PayloadRule::Empty.data_len(), 0);
        assert_eq!(PayloadRule::Switch.data_len(), 1);
        assert_eq!(PayloadRule::Velocity.data_len(), 5);
    }
}

use std::time::Duration;

use clap::{Args, Subcommand, ValueEnum};
use servolink_frame::{Direction, Header};
use servolink_peer::{connect_with_config, Peer, PeerConfig, SequenceStart};
use servolink_transport::{TransportConfig, TransportKind};

use crate::exit::{peer_error, CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod codes;
pub mod commands;
pub mod raw;
pub mod send;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Send one command and print the drive's reply.
    Send(SendArgs),
    /// Send an operator-entered frame body (command id and data bytes).
    Raw(RawArgs),
    /// List the commands this tool can encode.
    Commands,
    /// List the drive status codes and their names.
    Codes,
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Send(args) => send::run(args, format),
        Command::Raw(args) => raw::run(args, format),
        Command::Commands => commands::run(format),
        Command::Codes => codes::run(format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum TransportArg {
    Udp,
    Tcp,
}

impl From<TransportArg> for TransportKind {
    fn from(arg: TransportArg) -> Self {
        match arg {
            TransportArg::Udp => TransportKind::Udp,
            TransportArg::Tcp => TransportKind::Tcp,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum DirectionArg {
    #[value(aliases = ["positive", "cw"])]
    Pos,
    #[value(aliases = ["negative", "ccw"])]
    Neg,
}

impl From<DirectionArg> for Direction {
    fn from(arg: DirectionArg) -> Self {
        match arg {
            DirectionArg::Pos => Direction::Positive,
            DirectionArg::Neg => Direction::Negative,
        }
    }
}

/// How to reach the drive. Shared by every command that talks to one.
#[derive(Args, Debug)]
pub struct LinkArgs {
    /// Drive IPv4 address.
    #[arg(env = "SERVOLINK_PEER")]
    pub peer: String,
    /// Transport to use.
    #[arg(long, short = 't', value_enum, default_value = "udp")]
    pub transport: TransportArg,
    /// Override the drive port (default 3001 for UDP, 2001 for TCP).
    #[arg(long)]
    pub port: Option<u16>,
    /// Reply deadline (e.g. 2s, 500ms).
    #[arg(long, default_value = "2s")]
    pub timeout: String,
    /// TCP connect deadline (e.g. 2s, 500ms).
    #[arg(long, default_value = "2s")]
    pub connect_timeout: String,
    /// Starting sequence number; 0 disables sequencing. Random if omitted.
    #[arg(long)]
    pub sequence: Option<u8>,
    /// Use the user-defined protocol header (0x00) instead of the vendor one.
    #[arg(long)]
    pub user_protocol: bool,
    /// Exit with code 60 when the drive reports a non-OK status.
    #[arg(long)]
    pub strict: bool,
}

impl LinkArgs {
    pub fn kind(&self) -> TransportKind {
        self.transport.into()
    }

    pub fn header(&self) -> Header {
        if self.user_protocol {
            Header::User
        } else {
            Header::Vendor
        }
    }

    pub fn peer_config(&self) -> CliResult<PeerConfig> {
        let mut transport = TransportConfig {
            connect_timeout: parse_duration(&self.connect_timeout)?,
            ..TransportConfig::default()
        };
        if let Some(port) = self.port {
            match self.kind() {
                TransportKind::Udp => transport.udp_port = port,
                TransportKind::Tcp => transport.tcp_port = port,
            }
        }

        Ok(PeerConfig {
            transport,
            receive_timeout: parse_duration(&self.timeout)?,
            header: self.header(),
            sequence: self
                .sequence
                .map_or(SequenceStart::Random, SequenceStart::Fixed),
        })
    }

    pub fn open(&self) -> CliResult<Peer> {
        let config = self.peer_config()?;
        connect_with_config(&self.peer, self.kind(), &config)
            .map_err(|err| peer_error("connect failed", err))
    }
}

#[derive(Args, Debug)]
pub struct SendArgs {
    #[command(flatten)]
    pub link: LinkArgs,
    /// Command name (see `servolink commands`) or hex identifier (0x2A).
    pub command: String,
    /// Switch on (servo enable).
    #[arg(long, conflicts_with_all = ["off", "velocity"])]
    pub on: bool,
    /// Switch off (servo enable).
    #[arg(long, conflicts_with_all = ["on", "velocity"])]
    pub off: bool,
    /// Jog velocity magnitude (move velocity).
    #[arg(long, conflicts_with_all = ["on", "off"])]
    pub velocity: Option<u32>,
    /// Jog direction.
    #[arg(long, value_enum, default_value = "pos", requires = "velocity")]
    pub direction: DirectionArg,
}

#[derive(Args, Debug)]
pub struct RawArgs {
    #[command(flatten)]
    pub link: LinkArgs,
    /// Command id and data, as `[2A 01]` hex or `42 1` decimal.
    #[arg(required = true, num_args = 1..)]
    pub frame: Vec<String>,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

pub fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, unit) = if let Some(num) = input.strip_suffix("ms") {
        (num, "ms")
    } else if let Some(num) = input.strip_suffix('s') {
        (num, "s")
    } else {
        (input, "s")
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;

    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    match unit {
        "ms" => Ok(Duration::from_millis(value)),
        _ => Ok(Duration::from_secs(value)),
    }
}

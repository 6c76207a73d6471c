use servolink_frame::{encode, find_by_slug, lookup, CommandSpec, Params};
use tracing::info;

use crate::cmd::SendArgs;
use crate::exit::{frame_error, peer_error, CliError, CliResult, DATA_INVALID, SUCCESS, USAGE};
use crate::output::{print_reply, Exchange, OutputFormat};

pub fn run(args: SendArgs, format: OutputFormat) -> CliResult<i32> {
    let spec = resolve_command(&args.command)?;
    let params = resolve_params(&args);
    // Checked before connecting so a bad command never reaches the drive.
    encode(spec.id, 0, args.link.header(), &params)
        .map_err(|err| frame_error("invalid parameters", err))?;

    let mut peer = args.link.open()?;
    let frame = peer
        .encode(spec.id, &params)
        .map_err(|err| peer_error("encode failed", err))?;
    let reply = peer
        .request_frame(&frame)
        .map_err(|err| peer_error("request failed", err))?;
    info!(command = spec.name, status = %reply.status, "drive replied");

    print_reply(
        &Exchange {
            peer: peer.peer_addr(),
            transport: args.link.kind(),
            sent: &frame,
            reply: &reply,
        },
        format,
    );
    peer.close();

    if args.link.strict && !reply.is_ok() {
        return Err(CliError::new(
            DATA_INVALID,
            format!("drive reported {} (0x{:02X})", reply.status, reply.status_code),
        ));
    }
    Ok(SUCCESS)
}

/// Accept a table slug (`servo-enable`) or a hex identifier (`0x2A`, `2A`).
fn resolve_command(input: &str) -> CliResult<&'static CommandSpec> {
    if let Some(spec) = find_by_slug(input) {
        return Ok(spec);
    }
    let digits = input
        .strip_prefix("0x")
        .or_else(|| input.strip_prefix("0X"))
        .unwrap_or(input);
    let id = u8::from_str_radix(digits, 16).map_err(|_| {
        CliError::new(
            USAGE,
            format!("unknown command {input:?} (see `servolink commands`)"),
        )
    })?;
    lookup(id).map_err(|err| frame_error("unknown command", err))
}

/// Flags become parameters; the encoder checks them against the command.
fn resolve_params(args: &SendArgs) -> Params {
    if let Some(speed) = args.velocity {
        Params::Velocity {
            speed,
            direction: args.direction.into(),
        }
    } else if args.on {
        Params::servo(true)
    } else if args.off {
        Params::servo(false)
    } else {
        Params::None
    }
}

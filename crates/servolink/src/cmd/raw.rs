use servolink_frame::encode_raw;
use tracing::info;

use crate::cmd::RawArgs;
use crate::exit::{frame_error, peer_error, CliError, CliResult, DATA_INVALID, SUCCESS, USAGE};
use crate::output::{print_reply, Exchange, OutputFormat};

pub fn run(args: RawArgs, format: OutputFormat) -> CliResult<i32> {
    let tokens = parse_frame_tokens(&args.frame.join(" "))?;
    let Some((&command, data)) = tokens.split_first() else {
        return Err(CliError::new(USAGE, "frame must contain a command id"));
    };
    encode_raw(command, 0, args.link.header(), data)
        .map_err(|err| frame_error("invalid frame", err))?;

    let mut peer = args.link.open()?;
    let frame = peer
        .encode_raw(command, data)
        .map_err(|err| peer_error("encode failed", err))?;
    let reply = peer
        .request_frame(&frame)
        .map_err(|err| peer_error("request failed", err))?;
    info!(command = reply.command_name, status = %reply.status, "drive replied");

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

/// Parse an operator-entered frame body.
///
/// `[2A 01]` is read as hex; bare tokens are decimal. Every token must be a
/// number that fits in a byte.
fn parse_frame_tokens(input: &str) -> CliResult<Vec<u8>> {
    let input = input.trim();
    let (body, radix) = match input
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
    {
        Some(inner) => (inner, 16),
        None => (input, 10),
    };

    let bytes = body
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|token| !token.is_empty())
        .map(|token| {
            u8::from_str_radix(token, radix).map_err(|_| {
                let kind = if radix == 16 { "hex" } else { "decimal" };
                CliError::new(USAGE, format!("invalid {kind} byte in frame: {token:?}"))
            })
        })
        .collect::<CliResult<Vec<u8>>>()?;

    if bytes.is_empty() {
        return Err(CliError::new(USAGE, "frame must not be empty"));
    }
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bracketed_tokens_are_hex() {
        assert_eq!(parse_frame_tokens("[2A 01]").unwrap(), vec![0x2A, 0x01]);
        assert_eq!(
            parse_frame_tokens(" [37 E8 03 00 00 01] ").unwrap(),
            vec![0x37, 0xE8, 0x03, 0x00, 0x00, 0x01]
        );
    }

    #[test]
    fn bare_tokens_are_decimal() {
        assert_eq!(parse_frame_tokens("42 1").unwrap(), vec![42, 1]);
        assert_eq!(parse_frame_tokens("49").unwrap(), vec![0x31]);
        assert_eq!(parse_frame_tokens("42,0").unwrap(), vec![42, 0]);
    }

    #[test]
    fn non_numeric_tokens_are_rejected() {
        for input in ["42 x", "[2A ZZ]", "300", "4.2", "[]", "", "-1"] {
            let err = parse_frame_tokens(input).unwrap_err();
            assert_eq!(err.code, USAGE, "{input:?}");
        }
    }
}

use servolink_frame::{commands, MAX_DATA};
use servolink_transport::TransportKind;

use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    if !args.extended {
        println!("servolink {}", env!("CARGO_PKG_VERSION"));
        return Ok(SUCCESS);
    }

    println!("name: servolink");
    println!("version: {}", env!("CARGO_PKG_VERSION"));
    println!(
        "target: {}",
        option_env!("SERVOLINK_BUILD_TARGET").unwrap_or("unknown")
    );
    println!("git_hash: {}", option_env!("GIT_HASH").unwrap_or("unknown"));
    println!("features: async={}, cli=true", cfg!(feature = "async"));
    println!("commands: {}", commands().len());
    println!("max_data_bytes: {MAX_DATA}");
    println!(
        "default_ports: udp={}, tcp={}",
        TransportKind::DEFAULT_UDP_PORT,
        TransportKind::DEFAULT_TCP_PORT
    );

    Ok(SUCCESS)
}

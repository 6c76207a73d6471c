//! Enable a drive, jog it briefly, then stop and disable it.
//!
//! Run with:
//!   cargo run --example jog -- 192.168.0.2
//!
//! The drive must be reachable on UDP port 3001.

use std::thread;
use std::time::Duration;

use servolink::frame::command::{MOVE_STOP, MOVE_VELOCITY, SERVO_ENABLE};
use servolink::frame::{Direction, Params};
use servolink::peer::connect;
use servolink::transport::TransportKind;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let addr = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "192.168.0.2".to_string());
    let mut drive = connect(&addr, TransportKind::Udp)?;

    let reply = drive.request(SERVO_ENABLE, &Params::servo(true))?;
    eprintln!("servo on: {}", reply.status);
    if !reply.is_ok() {
        return Ok(());
    }

    let jog = Params::Velocity {
        speed: 1000,
        direction: Direction::Positive,
    };
    let reply = drive.request(MOVE_VELOCITY, &jog)?;
    eprintln!("jog: {}", reply.status);

    thread::sleep(Duration::from_secs(1));

    drive.request(MOVE_STOP, &Params::None)?;
    drive.request(SERVO_ENABLE, &Params::servo(false))?;
    drive.close();
    Ok(())
}

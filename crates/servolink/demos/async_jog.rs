//! Async variant of the `jog` example.
//!
//! Run with:
//!   cargo run --example async-jog --features async -- 192.168.0.2

use std::time::Duration;

use servolink::frame::command::{MOVE_STOP, MOVE_VELOCITY, SERVO_ENABLE};
use servolink::frame::{Direction, Params};
use servolink::peer::{AsyncPeer, PeerConfig};
use servolink::transport::TransportKind;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let addr = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "192.168.0.2".to_string());
    let mut drive = AsyncPeer::connect(&addr, TransportKind::Udp, &PeerConfig::default()).await?;

    let reply = drive.request(SERVO_ENABLE, &Params::servo(true)).await?;
    eprintln!("servo on: {}", reply.status);

    let jog = Params::Velocity {
        speed: 500,
        direction: Direction::Negative,
    };
    drive.request(MOVE_VELOCITY, &jog).await?;
    tokio::time::sleep(Duration::from_millis(500)).await;

    drive.request(MOVE_STOP, &Params::None).await?;
    drive.request(SERVO_ENABLE, &Params::servo(false)).await?;
    drive.close();
    Ok(())
}

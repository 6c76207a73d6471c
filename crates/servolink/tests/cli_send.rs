#![cfg(feature = "cli")]

use std::io::ErrorKind;
use std::net::{TcpListener, UdpSocket};
use std::process::{Command, Output};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// One-shot drive: answers the first request with `status`, echoing header,
/// sequence and command, then returns the request bytes.
fn fake_drive(status: u8, body: &'static [u8]) -> (u16, JoinHandle<Vec<u8>>) {
    let socket = UdpSocket::bind("127.0.0.1:0").expect("bind fake drive");
    socket
        .set_read_timeout(Some(Duration::from_secs(10)))
        .expect("set timeout");
    let port = socket.local_addr().expect("local addr").port();
    let handle = thread::spawn(move || {
        let mut buf = [0u8; 300];
        let (n, from) = socket.recv_from(&mut buf).expect("request should arrive");
        let req = buf[..n].to_vec();
        let mut reply = vec![req[0], 4 + body.len() as u8, req[2], 0x00, req[4], status];
        reply.extend_from_slice(body);
        socket.send_to(&reply, from).expect("reply");
        req
    });
    (port, handle)
}

fn servolink(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_servolink"))
        .args(["--log-level", "error"])
        .args(args)
        .env_remove("SERVOLINK_PEER")
        .output()
        .expect("servolink should run")
}

fn json(output: &Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).expect("stdout should be json")
}

#[test]
fn send_servo_enable_prints_reply() {
    let (port, drive) = fake_drive(0x00, b"");
    let port = port.to_string();

    let output = servolink(&[
        "--format",
        "json",
        "send",
        "127.0.0.1",
        "servo-enable",
        "--on",
        "--port",
        &port,
        "--sequence",
        "5",
    ]);

    assert!(output.status.success(), "{output:?}");
    let reply = json(&output);
    assert_eq!(reply["sent"], "AA 04 05 00 2A 01");
    assert_eq!(reply["command_name"], "FAS_ServoEnable");
    assert_eq!(reply["status"], "FMM_OK");
    assert_eq!(reply["ok"], true);
    assert_eq!(reply["sequence"], 5);

    assert_eq!(drive.join().unwrap(), vec![0xAA, 0x04, 0x05, 0x00, 0x2A, 0x01]);
}

#[test]
fn send_move_velocity_encodes_little_endian() {
    let (port, drive) = fake_drive(0x00, b"");
    let port = port.to_string();

    let output = servolink(&[
        "--format",
        "json",
        "send",
        "127.0.0.1",
        "move-velocity",
        "--velocity",
        "1000",
        "--direction",
        "neg",
        "--port",
        &port,
        "--sequence",
        "7",
    ]);

    assert!(output.status.success(), "{output:?}");
    assert_eq!(
        drive.join().unwrap(),
        vec![0xAA, 0x08, 0x07, 0x00, 0x37, 0xE8, 0x03, 0x00, 0x00, 0x00]
    );
}

#[test]
fn user_protocol_and_info_body() {
    let (port, drive) = fake_drive(0x00, b"v3.1");
    let port = port.to_string();

    let output = servolink(&[
        "--format",
        "json",
        "send",
        "127.0.0.1",
        "0x07",
        "--user-protocol",
        "--port",
        &port,
        "--sequence",
        "0",
    ]);

    assert!(output.status.success(), "{output:?}");
    let reply = json(&output);
    assert_eq!(reply["protocol"], "user");
    assert_eq!(reply["body"], "76 33 2E 31");
    assert_eq!(drive.join().unwrap(), vec![0x00, 0x03, 0x00, 0x00, 0x07]);
}

#[test]
fn non_ok_status_is_data_unless_strict() {
    let (port, drive) = fake_drive(0x87, b"");
    let output = servolink(&[
        "--format",
        "json",
        "send",
        "127.0.0.1",
        "servo-enable",
        "--on",
        "--port",
        &port.to_string(),
    ]);
    assert!(output.status.success(), "{output:?}");
    assert_eq!(json(&output)["status"], "FMP_SERVOONFAIL1");
    drive.join().unwrap();

    let (port, drive) = fake_drive(0x87, b"");
    let output = servolink(&[
        "send",
        "127.0.0.1",
        "servo-enable",
        "--on",
        "--strict",
        "--port",
        &port.to_string(),
    ]);
    assert_eq!(output.status.code(), Some(60));
    drive.join().unwrap();
}

#[test]
fn raw_hex_frame_is_sent_with_session_sequence() {
    let (port, drive) = fake_drive(0x00, b"");
    let output = servolink(&[
        "--format",
        "raw",
        "raw",
        "127.0.0.1",
        "[2A 01]",
        "--port",
        &port.to_string(),
        "--sequence",
        "9",
    ]);

    assert!(output.status.success(), "{output:?}");
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        "AA 04 09 00 2A 00"
    );
    assert_eq!(drive.join().unwrap(), vec![0xAA, 0x04, 0x09, 0x00, 0x2A, 0x01]);
}

#[test]
fn silent_drive_times_out_with_124() {
    let silent = UdpSocket::bind("127.0.0.1:0").unwrap();
    let port = silent.local_addr().unwrap().port().to_string();

    let output = servolink(&[
        "send",
        "127.0.0.1",
        "move-stop",
        "--port",
        &port,
        "--timeout",
        "200ms",
    ]);
    assert_eq!(output.status.code(), Some(124));
}

#[test]
fn usage_errors_exit_64() {
    let silent = UdpSocket::bind("127.0.0.1:0").unwrap();
    let port = silent.local_addr().unwrap().port().to_string();

    let cases: [&[&str]; 4] = [
        &["send", "127.0.0.1", "spin", "--port", &port],
        &["send", "127.0.0.1", "servo-enable", "--port", &port],
        &["send", "drive.local", "move-stop"],
        &["raw", "127.0.0.1", "42", "x", "--port", &port],
    ];
    for args in cases {
        let output = servolink(args);
        assert_eq!(output.status.code(), Some(64), "{args:?}");
    }
}

#[test]
fn usage_errors_are_raised_before_connecting() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    listener.set_nonblocking(true).unwrap();
    let port = listener.local_addr().unwrap().port().to_string();

    let cases: [&[&str]; 3] = [
        &["send", "127.0.0.1", "servo-enable", "--transport", "tcp", "--port", &port],
        &["send", "127.0.0.1", "move-stop", "--on", "--transport", "tcp", "--port", &port],
        &["raw", "127.0.0.1", "[99]", "--transport", "tcp", "--port", &port],
    ];
    for args in cases {
        let output = servolink(args);
        assert_eq!(output.status.code(), Some(64), "{args:?}");
    }

    match listener.accept() {
        Err(err) if err.kind() == ErrorKind::WouldBlock => {}
        Ok((_, from)) => panic!("drive was contacted by {from}"),
        Err(err) => panic!("accept failed: {err}"),
    }
}

#[test]
fn listings_are_json() {
    let output = servolink(&["--format", "json", "commands"]);
    assert!(output.status.success());
    let rows = json(&output);
    let rows = rows.as_array().expect("array");
    assert_eq!(rows.len(), 13);
    assert!(rows
        .iter()
        .any(|row| row["slug"] == "servo-enable" && row["id"] == 0x2A));

    let output = servolink(&["--format", "json", "codes"]);
    assert!(output.status.success());
    let rows = json(&output);
    let rows = rows.as_array().expect("array");
    assert_eq!(rows.first().map(|row| &row["name"]), Some(&"FMM_OK".into()));
}

#[test]
fn version_reports_crate_version() {
    let output = servolink(&["version"]);
    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        format!("servolink {}", env!("CARGO_PKG_VERSION"))
    );
}

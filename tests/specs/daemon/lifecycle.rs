//! Daemon startup, single-instance locking, and shutdown.

use crate::prelude::*;
use serial_test::serial;

#[test]
#[serial]
fn daemon_binds_its_control_socket_and_answers_ping() {
    let daemon = Daemon::start();
    let output = daemon.ctl().arg("ping").output().unwrap();
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "pong");
    assert!(daemon.shutdown(), "daemon should exit cleanly on shutdown");
}

#[test]
#[serial]
fn second_instance_refuses_to_start_while_the_lock_is_held() {
    let daemon = Daemon::start();

    let mut second = std::process::Command::new(brokerd_binary())
        .env("OJB_STATE_DIR", daemon.state_dir())
        .env("BROKER_AUTHORIZED_THREAD", "owner")
        .stdout(std::process::Stdio::piped())
        .stderr(std::process::Stdio::piped())
        .spawn()
        .unwrap();
    let status = second.wait().unwrap();
    assert!(!status.success(), "second instance should refuse to start");

    daemon.shutdown();
}

#[test]
#[serial]
fn shutdown_request_stops_the_process() {
    let daemon = Daemon::start();
    assert!(daemon.shutdown(), "daemon should exit on its own after shutdown");
}

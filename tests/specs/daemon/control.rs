//! `oddjob-brokerctl status` against a freshly started, session-less daemon.

use crate::prelude::*;
use serial_test::serial;

#[test]
#[serial]
fn status_reports_zero_sessions_and_no_emergency_on_a_fresh_daemon() {
    let daemon = Daemon::start();
    let output = daemon.ctl().arg("status").output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(stdout.contains("active sessions:      0"), "stdout: {stdout}");
    assert!(stdout.contains("paused sessions:      0"), "stdout: {stdout}");
    assert!(stdout.contains("terminated sessions:  0"), "stdout: {stdout}");
    assert!(stdout.contains("emergency mode:       off"), "stdout: {stdout}");
    assert!(stdout.contains("pending approvals:    0"), "stdout: {stdout}");

    daemon.shutdown();
}

#[test]
#[serial]
fn ctl_fails_clearly_when_no_daemon_is_listening() {
    let dir = tempfile::tempdir().unwrap();
    let output = brokerctl_cmd()
        .env("OJB_STATE_DIR", dir.path())
        .arg("ping")
        .output()
        .unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("connecting to"), "expected connection error, got: {stderr}");
}

//! Version/help flags for both binaries, verified without ever touching
//! the daemon lock or state directory.

use crate::prelude::*;

#[test]
fn brokerd_version_shows_version() {
    let output = brokerd_cmd().arg("--version").output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.starts_with("oddjob-brokerd "),
        "expected version line, got: {stdout}"
    );
}

#[test]
fn brokerd_short_version_flag_shows_version() {
    let output = brokerd_cmd().arg("-V").output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("oddjob-brokerd "));
}

#[test]
fn brokerd_help_shows_usage() {
    let output = brokerd_cmd().arg("--help").output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("oddjob-brokerctl"), "expected help to mention the control CLI, got: {stdout}");
}

#[test]
fn brokerd_unknown_arg_fails() {
    let output = brokerd_cmd().arg("--bogus").output().unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unexpected argument"), "expected error message, got: {stderr}");
}

#[test]
fn brokerctl_help_shows_usage() {
    let output = brokerctl_cmd().arg("--help").output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("ping"), "expected ping subcommand listed, got: {stdout}");
    assert!(stdout.contains("status"), "expected status subcommand listed, got: {stdout}");
    assert!(stdout.contains("shutdown"), "expected shutdown subcommand listed, got: {stdout}");
}

#[test]
fn brokerctl_version_shows_version() {
    let output = brokerctl_cmd().arg("--version").output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(env!("CARGO_PKG_VERSION")) || stdout.to_lowercase().contains("oddjob-brokerctl"));
}

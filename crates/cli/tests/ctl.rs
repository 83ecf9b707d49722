// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! End-to-end tests for `oddjob-brokerctl` against a fake daemon socket.

use assert_cmd::Command;
use serial_test::serial;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::UnixListener;

fn env_dir() -> tempfile::TempDir {
    tempfile::tempdir().expect("tempdir")
}

/// Spawns a one-shot fake daemon that answers a single `Ping` with `Pong`
/// on the given socket path, then exits.
async fn spawn_fake_ping_daemon(socket_path: std::path::PathBuf) {
    let listener = UnixListener::bind(&socket_path).expect("bind fake socket");
    tokio::spawn(async move {
        if let Ok((mut stream, _)) = listener.accept().await {
            let mut len_buf = [0u8; 4];
            if stream.read_exact(&mut len_buf).await.is_err() {
                return;
            }
            let len = u32::from_be_bytes(len_buf) as usize;
            let mut buf = vec![0u8; len];
            let _ = stream.read_exact(&mut buf).await;

            let payload = serde_json::to_vec(&serde_json::json!({"type": "Pong"})).unwrap();
            let _ = stream.write_all(&(payload.len() as u32).to_be_bytes()).await;
            let _ = stream.write_all(&payload).await;
            let _ = stream.flush().await;
        }
    });
    // Give the listener a moment to be ready for the CLI's connect().
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
}

#[tokio::test]
#[serial]
async fn ping_reaches_daemon_and_prints_pong() {
    let dir = env_dir();
    let socket_path = dir.path().join("daemon.sock");
    spawn_fake_ping_daemon(socket_path.clone()).await;

    let mut cmd = Command::cargo_bin("oddjob-brokerctl").expect("binary built");
    cmd.env("OJB_STATE_DIR", dir.path());
    cmd.arg("ping");
    cmd.assert().success().stdout("pong\n");
}

#[test]
#[serial]
fn ping_without_a_running_daemon_fails() {
    let dir = env_dir();
    let mut cmd = Command::cargo_bin("oddjob-brokerctl").expect("binary built");
    cmd.env("OJB_STATE_DIR", dir.path());
    cmd.arg("ping");
    cmd.assert().failure();
}

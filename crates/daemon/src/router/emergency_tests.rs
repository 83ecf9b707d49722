// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::config::Config;
use crate::state::AppState;
use tempfile::tempdir;

fn test_state(dir: &std::path::Path) -> AppState {
    let config = Config {
        authorized_thread_id: "owner".to_string(),
        state_dir: dir.to_path_buf(),
        wal_path: dir.join("events.wal"),
        snapshot_path: dir.join("snapshot.zst"),
        socket_path: dir.join("daemon.sock"),
        lock_path: dir.join("daemon.pid"),
        log_path: dir.join("daemon.log"),
        custom_commands_dir: dir.join("commands"),
        assistant_program: "true".to_string(),
        assistant_args: vec![],
        graceful_stop_timeout: std::time::Duration::from_secs(1),
        batch_interval: std::time::Duration::from_millis(0),
        outbound_buffer_capacity: 10,
        rate_limit_burst: 10,
        rate_limit_per_min: 600,
        attachment_warn_bytes: 1024,
        attachment_reject_bytes: 2048,
        chunk_max_chars: 1600,
    };
    AppState::open(&config).unwrap()
}

#[test]
fn non_emergency_text_falls_through() {
    let dir = tempdir().unwrap();
    let state = test_state(dir.path());
    assert!(handle(&state, "owner", "/session list").is_none());
}

#[test]
fn activate_then_status_reports_emergency() {
    let dir = tempdir().unwrap();
    let state = test_state(dir.path());
    handle(&state, "owner", "/emergency activate").unwrap();
    let status = handle(&state, "owner", "/emergency status").unwrap();
    assert!(status.contains("EMERGENCY"));
    assert!(status.contains("owner"));
}

#[test]
fn deactivate_returns_to_normal() {
    let dir = tempdir().unwrap();
    let state = test_state(dir.path());
    handle(&state, "owner", "/emergency activate").unwrap();
    handle(&state, "owner", "/emergency deactivate").unwrap();
    let status = handle(&state, "owner", "/emergency status").unwrap();
    assert_eq!(status, "NORMAL");
}

#[test]
fn help_lists_subcommands() {
    let dir = tempdir().unwrap();
    let state = test_state(dir.path());
    let reply = handle(&state, "owner", "/emergency help").unwrap();
    assert!(reply.contains("activate"));
}

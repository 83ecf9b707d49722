// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::config::Config;
use crate::state::AppState;
use std::collections::BTreeMap;
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
fn list_empty_catalog() {
    let dir = tempdir().unwrap();
    let state = test_state(dir.path());
    let reply = handle(&state, "/custom list").unwrap();
    assert!(reply.contains("No custom commands"));
}

#[test]
fn show_unknown_command_is_an_error() {
    let dir = tempdir().unwrap();
    let state = test_state(dir.path());
    let reply = handle(&state, "/custom show standup").unwrap();
    assert!(reply.contains("not found"));
}

#[test]
fn list_and_show_after_sync() {
    let dir = tempdir().unwrap();
    let state = test_state(dir.path());
    state
        .commands
        .sync("standup", dir.path().join("standup.md"), BTreeMap::new())
        .unwrap();

    let list = handle(&state, "/custom list").unwrap();
    assert!(list.contains("/standup"));

    let show = handle(&state, "/custom show standup").unwrap();
    assert!(show.contains("standup.md"));
}

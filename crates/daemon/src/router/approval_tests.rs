// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::config::Config;
use crate::state::AppState;
use broker_engine::ToolCall;
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
fn unknown_command_falls_through() {
    let dir = tempdir().unwrap();
    let state = test_state(dir.path());
    assert!(handle(&state, "/session list").is_none());
}

#[test]
fn approve_all_reports_a_count() {
    let dir = tempdir().unwrap();
    let state = test_state(dir.path());
    state.approvals.request(
        ToolCall { tool: "Edit".to_string(), detail: "a.rs".to_string() },
        "can modify state".to_string(),
    );
    let reply = handle(&state, "approve all").unwrap();
    assert!(reply.contains('1'));
}

#[test]
fn approve_by_id_reports_tool_and_target() {
    let dir = tempdir().unwrap();
    let state = test_state(dir.path());
    let request = state.approvals.request(
        ToolCall { tool: "Bash".to_string(), detail: "rm -rf tmp".to_string() },
        "can modify state".to_string(),
    );
    let reply = handle(&state, &format!("approve {}", request.id.as_str())).unwrap();
    assert!(reply.contains("Bash"));
    assert!(reply.contains("rm -rf tmp"));
}

#[test]
fn reject_unknown_id_reports_not_found() {
    let dir = tempdir().unwrap();
    let state = test_state(dir.path());
    let reply = handle(&state, "reject missing-id").unwrap();
    assert!(reply.contains("not found"));
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::state::AppState;
use tempfile::tempdir;

fn test_config(dir: &std::path::Path) -> Config {
    Config {
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
    }
}

fn project_dir(dir: &std::path::Path, name: &str) -> String {
    let path = dir.join(name);
    std::fs::create_dir_all(&path).unwrap();
    path.display().to_string()
}

#[tokio::test]
async fn start_creates_and_activates_a_session() {
    let dir = tempdir().unwrap();
    let config = test_config(dir.path());
    let state = AppState::open(&config).unwrap();
    let project = project_dir(dir.path(), "project");

    let reply = handle(&state, "owner", &format!("/session start {project}"), &config)
        .await
        .unwrap();
    assert!(reply.starts_with("Started session"));

    let sessions = state.sessions.list();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].status, broker_core::SessionStatus::Active);
    assert_eq!(sessions[0].project_path, project);
}

#[tokio::test]
async fn list_reports_sessions_for_the_requesting_thread() {
    let dir = tempdir().unwrap();
    let config = test_config(dir.path());
    let state = AppState::open(&config).unwrap();
    let project = project_dir(dir.path(), "a");

    handle(&state, "owner", &format!("/session start {project}"), &config).await.unwrap();
    let reply = handle(&state, "owner", "/session list", &config).await.unwrap();
    assert!(reply.contains(&project));
    assert!(reply.contains("ACTIVE"));
}

#[tokio::test]
async fn stop_terminates_a_running_session() {
    let dir = tempdir().unwrap();
    let config = test_config(dir.path());
    let state = AppState::open(&config).unwrap();
    let project = project_dir(dir.path(), "b");

    handle(&state, "owner", &format!("/session start {project}"), &config).await.unwrap();
    let id = state.sessions.list()[0].id.clone();

    let reply = handle(&state, "owner", &format!("/session stop {}", id.as_str()), &config)
        .await
        .unwrap();
    assert!(reply.starts_with("Stopped session"));

    let session = state.sessions.get(&id).unwrap();
    assert_eq!(session.status, broker_core::SessionStatus::Terminated);
}

#[tokio::test]
async fn resume_requires_a_paused_session() {
    let dir = tempdir().unwrap();
    let config = test_config(dir.path());
    let state = AppState::open(&config).unwrap();
    let project = project_dir(dir.path(), "c");

    handle(&state, "owner", &format!("/session start {project}"), &config).await.unwrap();
    let id = state.sessions.list()[0].id.clone();

    let reply = handle(&state, "owner", &format!("/session resume {}", id.as_str()), &config)
        .await
        .unwrap();
    assert!(reply.contains('\u{274C}'));
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::notification_manager::NotificationManager;
use crate::transport_client::ResilientTransport;
use broker_adapters::{FakeTransport, TransportClient};
use std::sync::Arc;
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

#[tokio::test]
async fn unauthorized_sender_is_dropped_silently() {
    let dir = tempdir().unwrap();
    let config = test_config(dir.path());
    let state = AppState::open(&config).unwrap();
    let fake = Arc::new(FakeTransport::new());
    fake.connect().await.unwrap();
    let transport = ResilientTransport::new(fake.clone(), 10, 10, 600);
    let notifications = NotificationManager::new(state.notifications.clone(), fake.clone());

    dispatch(&state, &transport, &notifications, &config, "stranger", "/session list").await;

    assert!(fake.sent_messages().is_empty());
}

#[tokio::test]
async fn approval_commands_take_priority_over_fallback() {
    let dir = tempdir().unwrap();
    let config = test_config(dir.path());
    let state = AppState::open(&config).unwrap();
    let fake = Arc::new(FakeTransport::new());
    fake.connect().await.unwrap();
    let transport = ResilientTransport::new(fake.clone(), 10, 10, 600);
    let notifications = NotificationManager::new(state.notifications.clone(), fake.clone());

    dispatch(&state, &transport, &notifications, &config, "owner", "approve all").await;

    let sent = fake.sent_messages();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].1.contains("Approved 0"));
}

#[tokio::test]
async fn no_matching_handler_and_no_active_session_reports_that() {
    let dir = tempdir().unwrap();
    let config = test_config(dir.path());
    let state = AppState::open(&config).unwrap();
    let fake = Arc::new(FakeTransport::new());
    fake.connect().await.unwrap();
    let transport = ResilientTransport::new(fake.clone(), 10, 10, 600);
    let notifications = NotificationManager::new(state.notifications.clone(), fake.clone());

    dispatch(&state, &transport, &notifications, &config, "owner", "hello there").await;

    let sent = fake.sent_messages();
    assert_eq!(sent, vec![("owner".to_string(), "no active session".to_string())]);
}

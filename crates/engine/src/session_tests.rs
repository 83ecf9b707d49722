// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::store::Store;
use tempfile::tempdir;

fn lifecycle() -> SessionLifecycle {
    let dir = tempdir().unwrap();
    let store = Store::open(&dir.path().join("wal.jsonl")).unwrap();
    SessionLifecycle::new(store)
}

#[test]
fn create_then_get_round_trips() {
    let lc = lifecycle();
    let session = lc.create("/tmp/proj", "thread-1").unwrap();
    assert_eq!(session.status, SessionStatus::Created);
    assert_eq!(lc.get(&session.id).unwrap().project_path, "/tmp/proj");
}

#[test]
fn transition_rejects_state_mismatch() {
    let lc = lifecycle();
    let session = lc.create("/tmp/proj", "thread-1").unwrap();
    let err = lc
        .transition(&session.id, SessionStatus::Active, SessionStatus::Paused)
        .unwrap_err();
    assert!(matches!(err, EngineError::StateMismatch { .. }));
}

#[test]
fn transition_rejects_invalid_edge() {
    let lc = lifecycle();
    let session = lc.create("/tmp/proj", "thread-1").unwrap();
    let err = lc
        .transition(&session.id, SessionStatus::Created, SessionStatus::Paused)
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidTransition { .. }));
}

#[test]
fn full_lifecycle_walk() {
    let lc = lifecycle();
    let session = lc.create("/tmp/proj", "thread-1").unwrap();
    let session = lc
        .transition(&session.id, SessionStatus::Created, SessionStatus::Active)
        .unwrap();
    let session = lc
        .transition(&session.id, SessionStatus::Active, SessionStatus::Paused)
        .unwrap();
    let session = lc
        .transition(&session.id, SessionStatus::Paused, SessionStatus::Active)
        .unwrap();
    let session = lc
        .transition(&session.id, SessionStatus::Active, SessionStatus::Terminated)
        .unwrap();
    assert_eq!(session.status, SessionStatus::Terminated);
}

#[test]
fn track_activity_caps_and_catchup_clears() {
    let lc = lifecycle();
    let session = lc.create("/tmp/proj", "thread-1").unwrap();
    for i in 0..3 {
        lc.track_activity(&session.id, "note", &format!("did {i}")).unwrap();
    }

    let summary = lc.generate_catchup_summary(&session.id).unwrap();
    assert!(summary.contains("3 thing(s)"));

    let second = lc.generate_catchup_summary(&session.id).unwrap();
    assert_eq!(second, "No activity since your last check-in.");
}

#[test]
fn update_context_merges_without_clobbering_existing_keys() {
    let lc = lifecycle();
    let session = lc.create("/tmp/proj", "thread-1").unwrap();

    let mut first = BTreeMap::new();
    first.insert("a".to_string(), Value::String("1".into()));
    lc.update_context(&session.id, first).unwrap();

    let mut second = BTreeMap::new();
    second.insert("b".to_string(), Value::String("2".into()));
    let session = lc.update_context(&session.id, second).unwrap();

    assert_eq!(session.context.get("a").unwrap(), "1");
    assert_eq!(session.context.get("b").unwrap(), "2");
}

#[test]
fn recover_pauses_only_active_sessions_and_is_idempotent() {
    let lc = lifecycle();
    let active = lc.create("/tmp/a", "thread-1").unwrap();
    lc.transition(&active.id, SessionStatus::Created, SessionStatus::Active)
        .unwrap();
    let created_only = lc.create("/tmp/b", "thread-2").unwrap();

    let recovered = lc.recover().unwrap();
    assert_eq!(recovered, vec![active.id.clone()]);
    assert_eq!(lc.get(&active.id).unwrap().status, SessionStatus::Paused);
    assert_eq!(lc.get(&created_only.id).unwrap().status, SessionStatus::Created);

    let second_run = lc.recover().unwrap();
    assert!(second_run.is_empty());
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::MaterializedState;
use broker_core::{Session, SessionId, SessionStatus};
use std::io::Write as _;
use tempfile::tempdir;

fn sample_state() -> MaterializedState {
    let mut state = MaterializedState::default();
    let id = SessionId::new("s1");
    state.sessions.insert(
        id.clone(),
        Session::new(id, "/tmp/proj".into(), "thread-1".into(), Utc::now()),
    );
    state
}

#[test]
fn save_then_load_round_trips() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("snapshot.json");
    let snapshot = Snapshot::new(42, sample_state());
    snapshot.save(&path).unwrap();

    let loaded = Snapshot::load(&path).unwrap().unwrap();
    assert_eq!(loaded.seq, 42);
    assert_eq!(loaded.version, CURRENT_SNAPSHOT_VERSION);
    assert!(loaded.state.get_session(&SessionId::new("s1")).is_some());
}

#[test]
fn load_missing_file_returns_none() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nonexistent.json");
    assert!(Snapshot::load(&path).unwrap().is_none());
}

#[test]
fn snapshot_atomic_write_leaves_no_tmp_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("snapshot.json");
    let tmp_path = path.with_extension("tmp");

    Snapshot::new(1, sample_state()).save(&path).unwrap();

    assert!(!tmp_path.exists());
    assert!(path.exists());
}

#[test]
fn load_corrupt_file_quarantines_and_returns_none() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("snapshot.json");
    let mut f = File::create(&path).unwrap();
    f.write_all(b"\xe5\x03\x01binary-garbage").unwrap();
    drop(f);

    let result = Snapshot::load(&path).unwrap();
    assert!(result.is_none());
    assert!(!path.exists());
    assert!(path.with_extension("bak").exists());
}

#[test]
fn load_corrupt_snapshot_rotates_bak_files() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("snapshot.json");

    for i in 1..=4u8 {
        let mut f = File::create(&path).unwrap();
        f.write_all(&[i; 4]).unwrap();
        drop(f);
        assert!(Snapshot::load(&path).unwrap().is_none());
    }

    assert_eq!(fs::read(path.with_extension("bak")).unwrap(), vec![4u8; 4]);
    assert_eq!(fs::read(path.with_extension("bak.2")).unwrap(), vec![3u8; 4]);
    assert_eq!(fs::read(path.with_extension("bak.3")).unwrap(), vec![2u8; 4]);
    assert!(!path.with_extension("bak.4").exists());
}

#[test]
fn load_missing_version_field_defaults_to_current() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("snapshot.json");
    let state = sample_state();
    let body = serde_json::json!({
        "seq": 7,
        "state": state,
        "created_at": Utc::now(),
    });
    std::fs::write(&path, serde_json::to_vec(&body).unwrap()).unwrap();

    let loaded = Snapshot::load(&path).unwrap().unwrap();
    assert_eq!(loaded.version, CURRENT_SNAPSHOT_VERSION);
    assert_eq!(loaded.seq, 7);
}

#[test]
fn session_status_round_trips_through_json() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("snapshot.json");
    let mut state = sample_state();
    if let Some(session) = state.sessions.get_mut(&SessionId::new("s1")) {
        session.status = SessionStatus::Active;
    }
    Snapshot::new(1, state).save(&path).unwrap();

    let loaded = Snapshot::load(&path).unwrap().unwrap();
    let session = loaded.state.get_session(&SessionId::new("s1")).unwrap();
    assert_eq!(session.status, SessionStatus::Active);
}

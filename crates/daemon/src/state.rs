// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared daemon state: the single-writer [`Store`] plus every engine
//! service built on top of it, and the registry of per-session process
//! supervisors (§4.2) that sits alongside — a process is not an event,
//! so it isn't part of the WAL-backed projection.

use std::collections::HashMap;
use std::sync::Arc;

use broker_adapters::ProcessSupervisor;
use broker_core::SessionId;
use broker_engine::{
    ApprovalLedger, CustomCommandCatalog, EmergencyMode, NotificationPreferences,
    SessionLifecycle, Store, ThreadMappingService,
};
use broker_storage::{load_snapshot, Checkpointer};
use parking_lot::Mutex;
use thiserror::Error;

use crate::config::Config;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("snapshot load failed: {0}")]
    Snapshot(#[from] broker_storage::SnapshotError),
    #[error("wal open failed: {0}")]
    Wal(#[from] broker_storage::WalError),
}

/// Everything the daemon's long-lived tasks share, cloned cheaply (every
/// field is internally `Arc`/`Clone`-backed).
#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub sessions: SessionLifecycle,
    pub approvals: Arc<ApprovalLedger>,
    pub emergency: EmergencyMode,
    pub threads: ThreadMappingService,
    pub commands: CustomCommandCatalog,
    pub notifications: NotificationPreferences,
    pub checkpointer: Arc<Checkpointer>,
    supervisors: Arc<Mutex<HashMap<SessionId, Arc<ProcessSupervisor>>>>,
}

impl AppState {
    /// Loads the latest snapshot (if any) and replays the WAL on top of it.
    pub fn open(config: &Config) -> Result<Self, StartupError> {
        let snapshot = load_snapshot(&config.snapshot_path)?;
        let (state, checkpoint_seq) = match snapshot {
            Some(snap) => (snap.state, snap.seq),
            None => (Default::default(), 0),
        };
        let store = Store::open_from(&config.wal_path, state, checkpoint_seq)?;

        Ok(Self {
            sessions: SessionLifecycle::new(store.clone()),
            approvals: Arc::new(ApprovalLedger::new()),
            emergency: EmergencyMode::new(store.clone()),
            threads: ThreadMappingService::new(store.clone()),
            commands: CustomCommandCatalog::new(store.clone()),
            notifications: NotificationPreferences::new(store.clone()),
            checkpointer: Arc::new(Checkpointer::new(config.snapshot_path.clone())),
            supervisors: Arc::new(Mutex::new(HashMap::new())),
            store,
        })
    }

    /// The supervisor for `session_id`, creating a fresh (not-yet-started)
    /// one on first access.
    pub fn supervisor_for(&self, session_id: &SessionId) -> Arc<ProcessSupervisor> {
        self.supervisors
            .lock()
            .entry(session_id.clone())
            .or_insert_with(|| Arc::new(ProcessSupervisor::new()))
            .clone()
    }

    pub fn drop_supervisor(&self, session_id: &SessionId) {
        self.supervisors.lock().remove(session_id);
    }
}

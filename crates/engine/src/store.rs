// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The single-writer event store every engine subsystem mutates through:
//! append the [`Event`] to the WAL, then fold it into the shared
//! [`MaterializedState`]. Modeled on the originating daemon's
//! `EventBus` + engine-loop pair, collapsed into one synchronous call
//! since this daemon has exactly one task issuing domain commands
//! (§5: "single-process, cooperative tasks on a shared scheduler").

use std::path::Path;
use std::sync::Arc;

use broker_core::Event;
use broker_storage::{MaterializedState, Wal, WalError};
use parking_lot::RwLock;

/// Owns the WAL writer and the materialized projection it replays into.
/// Writers serialize through the inner `Wal`'s own mutex; reads of
/// `MaterializedState` may run concurrently with each other.
#[derive(Clone)]
pub struct Store {
    wal: Arc<parking_lot::Mutex<Wal>>,
    state: Arc<RwLock<MaterializedState>>,
}

impl Store {
    /// Opens the WAL at `path`, replaying any unprocessed entries into a
    /// fresh `MaterializedState`.
    pub fn open(path: &Path) -> Result<Self, WalError> {
        Self::open_from(path, MaterializedState::default(), 0)
    }

    /// Opens the WAL at `path`, replaying entries after `checkpoint_seq` on
    /// top of a `MaterializedState` seeded from a loaded snapshot.
    pub fn open_from(
        path: &Path,
        mut state: MaterializedState,
        checkpoint_seq: u64,
    ) -> Result<Self, WalError> {
        let mut wal = Wal::open(path, checkpoint_seq)?;
        while let Some(entry) = wal.next_unprocessed()? {
            state.apply(&entry.event);
            wal.mark_processed(entry.seq);
        }
        Ok(Self {
            wal: Arc::new(parking_lot::Mutex::new(wal)),
            state: Arc::new(RwLock::new(state)),
        })
    }

    /// Appends `event` to the WAL and folds it into the materialized
    /// state. Returns the assigned sequence number.
    pub fn apply(&self, event: Event) -> Result<u64, WalError> {
        let seq = {
            let mut wal = self.wal.lock();
            let seq = wal.append(&event)?;
            wal.mark_processed(seq);
            seq
        };
        self.state.write().apply(&event);
        Ok(seq)
    }

    pub fn state(&self) -> parking_lot::RwLockReadGuard<'_, MaterializedState> {
        self.state.read()
    }

    pub fn needs_flush(&self) -> bool {
        self.wal.lock().needs_flush()
    }

    pub fn flush(&self) -> Result<(), WalError> {
        self.wal.lock().flush()
    }

    pub fn processed_seq(&self) -> u64 {
        self.wal.lock().processed_seq()
    }

    pub fn wal(&self) -> Arc<parking_lot::Mutex<Wal>> {
        Arc::clone(&self.wal)
    }

    /// A snapshot copy of the current materialized state, for checkpointing.
    pub fn snapshot_state(&self) -> MaterializedState {
        self.state.read().clone()
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;

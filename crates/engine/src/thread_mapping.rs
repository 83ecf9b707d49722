// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Thread mapping (§3, §4.8 `/thread`): the `thread_id <-> project_path`
//! bijection. Uniqueness on both sides is enforced here, before the event
//! is emitted — the materialized reducer in `broker_storage` never
//! re-derives it.

use broker_core::{Event, ThreadMapping};
use chrono::Utc;

use crate::error::EngineError;
use crate::store::Store;

#[derive(Clone)]
pub struct ThreadMappingService {
    store: Store,
}

impl ThreadMappingService {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Creates or repoints the mapping for `thread_id`. Rejects when either
    /// side is already claimed by a different peer.
    pub fn map(&self, thread_id: &str, project_path: &str) -> Result<ThreadMapping, EngineError> {
        let state = self.store.state();
        if let Some(existing) = state.thread_mappings.get(thread_id) {
            if existing.project_path != project_path {
                return Err(EngineError::ThreadAlreadyMapped {
                    thread_id: thread_id.to_string(),
                    project_path: existing.project_path.clone(),
                });
            }
        } else if let Some(other_thread) = state.thread_for_project(project_path) {
            return Err(EngineError::ProjectAlreadyMapped {
                project_path: project_path.to_string(),
                thread_id: other_thread.to_string(),
            });
        }
        drop(state);

        self.store.apply(Event::ThreadMapped {
            thread_id: thread_id.to_string(),
            project_path: project_path.to_string(),
            at: Utc::now(),
        })?;

        self.get(thread_id)
    }

    pub fn get(&self, thread_id: &str) -> Result<ThreadMapping, EngineError> {
        self.store
            .state()
            .thread_mappings
            .get(thread_id)
            .cloned()
            .ok_or_else(|| EngineError::ThreadMappingNotFound(thread_id.to_string()))
    }

    pub fn list(&self) -> Vec<ThreadMapping> {
        self.store.state().thread_mappings.values().cloned().collect()
    }

    pub fn unmap(&self, thread_id: &str) -> Result<(), EngineError> {
        self.get(thread_id)?;
        self.store.apply(Event::ThreadUnmapped {
            thread_id: thread_id.to_string(),
            at: Utc::now(),
        })?;
        Ok(())
    }

    pub fn project_for_thread(&self, thread_id: &str) -> Option<String> {
        self.store.state().project_for_thread(thread_id).map(str::to_string)
    }
}

#[cfg(test)]
#[path = "thread_mapping_tests.rs"]
mod tests;

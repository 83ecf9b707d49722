// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session Lifecycle (§4.1): the persistent CREATED/ACTIVE/PAUSED/
//! TERMINATED state machine, its bounded activity log, and crash
//! recovery on daemon startup.

use std::collections::BTreeMap;

use broker_core::session::ActivityEntry;
use broker_core::{Event, Session, SessionId, SessionStatus};
use chrono::Utc;
use serde_json::Value;

use crate::error::EngineError;
use crate::store::Store;

/// Owns every mutation of session records, through the shared [`Store`].
#[derive(Clone)]
pub struct SessionLifecycle {
    store: Store,
}

impl SessionLifecycle {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    pub fn create(&self, project_path: &str, thread_id: &str) -> Result<Session, EngineError> {
        let id = SessionId::generate();
        let now = Utc::now();
        self.store.apply(Event::SessionCreated {
            id: id.clone(),
            project_path: project_path.to_string(),
            thread_id: thread_id.to_string(),
            at: now,
        })?;
        self.get(&id)
    }

    pub fn get(&self, id: &SessionId) -> Result<Session, EngineError> {
        self.store
            .state()
            .get_session(id)
            .cloned()
            .ok_or_else(|| EngineError::SessionNotFound(id.to_string()))
    }

    pub fn list(&self) -> Vec<Session> {
        self.store.state().sessions.values().cloned().collect()
    }

    /// Transitions `id` from `from` to `to`. Verifies the on-disk state
    /// still equals `from` (optimistic concurrency) before applying.
    pub fn transition(
        &self,
        id: &SessionId,
        from: SessionStatus,
        to: SessionStatus,
    ) -> Result<Session, EngineError> {
        let current = self.get(id)?;
        if current.status != from {
            return Err(EngineError::StateMismatch {
                id: id.to_string(),
                expected: from.to_string(),
                actual: current.status.to_string(),
            });
        }
        if !from.can_transition_to(to) {
            return Err(EngineError::InvalidTransition {
                from: from.to_string(),
                to: to.to_string(),
            });
        }
        self.store.apply(Event::SessionTransitioned {
            id: id.clone(),
            from,
            to,
            at: Utc::now(),
        })?;
        self.get(id)
    }

    /// Union-merges `updates` into the session's opaque context bag.
    pub fn update_context(
        &self,
        id: &SessionId,
        updates: BTreeMap<String, Value>,
    ) -> Result<Session, EngineError> {
        self.get(id)?;
        self.store.apply(Event::SessionContextUpdated {
            id: id.clone(),
            updates,
            at: Utc::now(),
        })?;
        self.get(id)
    }

    pub fn track_activity(
        &self,
        id: &SessionId,
        activity_type: &str,
        details: &str,
    ) -> Result<Session, EngineError> {
        self.get(id)?;
        self.store.apply(Event::SessionActivityTracked {
            id: id.clone(),
            entry: ActivityEntry {
                timestamp: Utc::now(),
                activity_type: activity_type.to_string(),
                details: details.to_string(),
            },
            at: Utc::now(),
        })?;
        self.get(id)
    }

    /// Renders the bounded activity log into a plain-English paragraph and
    /// clears it atomically with reading it.
    pub fn generate_catchup_summary(&self, id: &SessionId) -> Result<String, EngineError> {
        let session = self.get(id)?;
        let log = session.activity_log();
        self.store.apply(Event::SessionActivityLogCleared {
            id: id.clone(),
            at: Utc::now(),
        })?;

        if log.is_empty() {
            return Ok("No activity since your last check-in.".to_string());
        }

        let lines: Vec<String> = log
            .iter()
            .map(|entry| format!("- {} ({})", entry.details, entry.activity_type))
            .collect();
        Ok(format!(
            "While you were away, {} thing(s) happened:\n{}",
            log.len(),
            lines.join("\n")
        ))
    }

    /// Crash recovery: every `ACTIVE` session is paused and stamped with
    /// `recovered_at`, preserving existing context keys. Idempotent — a
    /// second run finds no ACTIVE sessions.
    pub fn recover(&self) -> Result<Vec<SessionId>, EngineError> {
        let active_ids: Vec<SessionId> = self
            .store
            .state()
            .sessions
            .values()
            .filter(|s| s.status == SessionStatus::Active)
            .map(|s| s.id.clone())
            .collect();

        for id in &active_ids {
            self.store.apply(Event::SessionRecovered {
                id: id.clone(),
                recovered_at: Utc::now(),
            })?;
        }
        Ok(active_ids)
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;

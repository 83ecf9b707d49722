// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Materialized state: the in-memory reduction of the full event log,
//! rebuilt at startup from the latest snapshot plus any WAL entries
//! appended after it. `apply` is a pure, idempotent reducer — replaying
//! the same event twice must never change the result, which is what makes
//! crash recovery and WAL replay safe.

use broker_core::session::{ACTIVITY_LOG_CAP, CONTEXT_RECOVERED_AT};
use broker_core::{CustomCommand, Event, SessionId, SessionStatus, ThreadMapping};
use broker_core::{EmergencyState, Session};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The full in-memory projection of every persisted store in §6.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MaterializedState {
    pub sessions: BTreeMap<SessionId, Session>,
    /// Keyed by `thread_id`; `project_path` uniqueness is enforced by the
    /// caller (Session Lifecycle / Thread commands) before the event is
    /// emitted, not re-derived here.
    pub thread_mappings: BTreeMap<String, ThreadMapping>,
    /// Keyed by command name.
    pub commands: BTreeMap<String, CustomCommand>,
    /// `thread_id -> event_type -> enabled`.
    pub notification_prefs: BTreeMap<String, BTreeMap<String, bool>>,
    pub emergency: EmergencyState,
}

impl MaterializedState {
    /// Apply one WAL event, mutating the projection in place.
    pub fn apply(&mut self, event: &Event) {
        match event {
            Event::SessionCreated {
                id,
                project_path,
                thread_id,
                at,
            } => {
                self.sessions.entry(id.clone()).or_insert_with(|| {
                    Session::new(id.clone(), project_path.clone(), thread_id.clone(), *at)
                });
            }
            Event::SessionTransitioned { id, from, to, at } => {
                if let Some(session) = self.sessions.get_mut(id) {
                    if session.status == *from || session.status == *to {
                        session.status = *to;
                        session.updated_at = *at;
                    }
                }
            }
            Event::SessionContextUpdated { id, updates, at } => {
                if let Some(session) = self.sessions.get_mut(id) {
                    for (k, v) in updates {
                        session.context.insert(k.clone(), v.clone());
                    }
                    session.updated_at = *at;
                }
            }
            Event::SessionActivityTracked { id, entry, at } => {
                if let Some(session) = self.sessions.get_mut(id) {
                    let mut log = session.activity_log();
                    log.push(entry.clone());
                    if log.len() > ACTIVITY_LOG_CAP {
                        let excess = log.len() - ACTIVITY_LOG_CAP;
                        log.drain(0..excess);
                    }
                    session.set_activity_log(log);
                    session.updated_at = *at;
                }
            }
            Event::SessionActivityLogCleared { id, at } => {
                if let Some(session) = self.sessions.get_mut(id) {
                    session.set_activity_log(Vec::new());
                    session.updated_at = *at;
                }
            }
            Event::SessionRecovered { id, recovered_at } => {
                if let Some(session) = self.sessions.get_mut(id) {
                    if session.status == SessionStatus::Active {
                        session.status = SessionStatus::Paused;
                    }
                    session.context.insert(
                        CONTEXT_RECOVERED_AT.to_string(),
                        serde_json::Value::String(recovered_at.to_rfc3339()),
                    );
                    session.updated_at = *recovered_at;
                }
            }
            Event::ThreadMapped {
                thread_id,
                project_path,
                at,
            } => {
                self.thread_mappings
                    .entry(thread_id.clone())
                    .and_modify(|m| {
                        m.project_path = project_path.clone();
                        m.updated_at = *at;
                    })
                    .or_insert_with(|| ThreadMapping {
                        thread_id: thread_id.clone(),
                        project_path: project_path.clone(),
                        created_at: *at,
                        updated_at: *at,
                    });
            }
            Event::ThreadUnmapped { thread_id, .. } => {
                self.thread_mappings.remove(thread_id);
            }
            Event::CustomCommandSynced { command } => {
                self.commands.insert(command.name.clone(), command.clone());
            }
            Event::CustomCommandRemoved { name } => {
                self.commands.remove(name);
            }
            Event::NotificationPreferenceSet {
                thread_id,
                event_type,
                enabled,
            } => {
                self.notification_prefs
                    .entry(thread_id.clone())
                    .or_default()
                    .insert(event_type.clone(), *enabled);
            }
            Event::EmergencyActivated { thread_id, at } => {
                self.emergency.activate(thread_id, *at);
            }
            Event::EmergencyDeactivated => {
                self.emergency.deactivate();
            }
        }
    }

    pub fn get_session(&self, id: &SessionId) -> Option<&Session> {
        self.sessions.get(id)
    }

    pub fn sessions_for_thread(&self, thread_id: &str) -> Vec<&Session> {
        self.sessions
            .values()
            .filter(|s| s.thread_id == thread_id)
            .collect()
    }

    /// The thread's single ACTIVE session, if any (§4.8 fallback dispatch).
    pub fn active_session_for_thread(&self, thread_id: &str) -> Option<&Session> {
        self.sessions
            .values()
            .find(|s| s.thread_id == thread_id && s.status == SessionStatus::Active)
    }

    pub fn active_sessions(&self) -> Vec<&Session> {
        self.sessions
            .values()
            .filter(|s| s.status == SessionStatus::Active)
            .collect()
    }

    pub fn project_for_thread(&self, thread_id: &str) -> Option<&str> {
        self.thread_mappings
            .get(thread_id)
            .map(|m| m.project_path.as_str())
    }

    pub fn thread_for_project(&self, project_path: &str) -> Option<&str> {
        self.thread_mappings
            .values()
            .find(|m| m.project_path == project_path)
            .map(|m| m.thread_id.as_str())
    }

    pub fn notification_pref(&self, thread_id: &str, event_type: &str) -> Option<bool> {
        self.notification_prefs
            .get(thread_id)
            .and_then(|m| m.get(event_type))
            .copied()
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The durable session record: identity, lifecycle status, and the
//! opaque per-session context bag.

use crate::SessionId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Lifecycle status of a session. See [`SessionStatus::can_transition_to`]
/// for the allowed transition graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SessionStatus {
    Created,
    Active,
    Paused,
    Terminated,
}

impl SessionStatus {
    /// Whether `self -> to` is an edge in the transition graph (including
    /// the idempotent self-edges the spec calls out explicitly).
    pub fn can_transition_to(self, to: SessionStatus) -> bool {
        use SessionStatus::*;
        matches!(
            (self, to),
            (Created, Active)
                | (Created, Terminated)
                | (Active, Active)
                | (Active, Paused)
                | (Active, Terminated)
                | (Paused, Paused)
                | (Paused, Active)
                | (Paused, Terminated)
                | (Terminated, Terminated)
        )
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SessionStatus::Created => "CREATED",
            SessionStatus::Active => "ACTIVE",
            SessionStatus::Paused => "PAUSED",
            SessionStatus::Terminated => "TERMINATED",
        };
        write!(f, "{s}")
    }
}

/// Context key reserved for the bounded activity log (last 10 entries).
pub const CONTEXT_ACTIVITY_LOG: &str = "activity_log";
/// Context key written by crash recovery with the recovery timestamp.
pub const CONTEXT_RECOVERED_AT: &str = "recovered_at";
/// Context key threading the coding assistant's resumable history.
pub const CONTEXT_CONVERSATION_HISTORY: &str = "conversation_history";
/// Context key backing `/code full`.
pub const CONTEXT_LAST_CODE_OUTPUT: &str = "last_code_output";

/// Maximum number of entries retained in `activity_log`.
pub const ACTIVITY_LOG_CAP: usize = 10;

/// One entry in a session's bounded activity log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "type")]
    pub activity_type: String,
    pub details: String,
}

/// The durable session record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub project_path: String,
    pub thread_id: String,
    pub status: SessionStatus,
    /// Opaque key -> JSON value map. A handful of keys are reserved (see the
    /// `CONTEXT_*` constants) but the rest round-trip unchanged.
    #[serde(default)]
    pub context: BTreeMap<String, Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    pub fn new(id: SessionId, project_path: String, thread_id: String, now: DateTime<Utc>) -> Self {
        Self {
            id,
            project_path,
            thread_id,
            status: SessionStatus::Created,
            context: BTreeMap::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Read the bounded activity log out of context, returning an empty
    /// vec if absent or malformed.
    pub fn activity_log(&self) -> Vec<ActivityEntry> {
        self.context
            .get(CONTEXT_ACTIVITY_LOG)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
            .unwrap_or_default()
    }

    pub fn set_activity_log(&mut self, log: Vec<ActivityEntry>) {
        self.context.insert(
            CONTEXT_ACTIVITY_LOG.to_string(),
            serde_json::to_value(log).unwrap_or(Value::Array(vec![])),
        );
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;

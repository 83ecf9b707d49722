// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The WAL wire format: every durable mutation across the four conceptual
//! stores in §6 is recorded as one variant of this closed, serde-tagged
//! union. `broker_storage::MaterializedState::apply` is the pure,
//! idempotent reducer over it.

use crate::session::ActivityEntry;
use crate::{CustomCommand, SessionId, SessionStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    SessionCreated {
        id: SessionId,
        project_path: String,
        thread_id: String,
        at: DateTime<Utc>,
    },
    SessionTransitioned {
        id: SessionId,
        from: SessionStatus,
        to: SessionStatus,
        at: DateTime<Utc>,
    },
    SessionContextUpdated {
        id: SessionId,
        updates: BTreeMap<String, Value>,
        at: DateTime<Utc>,
    },
    SessionActivityTracked {
        id: SessionId,
        entry: ActivityEntry,
        at: DateTime<Utc>,
    },
    SessionActivityLogCleared {
        id: SessionId,
        at: DateTime<Utc>,
    },
    SessionRecovered {
        id: SessionId,
        recovered_at: DateTime<Utc>,
    },
    ThreadMapped {
        thread_id: String,
        project_path: String,
        at: DateTime<Utc>,
    },
    ThreadUnmapped {
        thread_id: String,
        at: DateTime<Utc>,
    },
    CustomCommandSynced {
        command: CustomCommand,
    },
    CustomCommandRemoved {
        name: String,
    },
    NotificationPreferenceSet {
        thread_id: String,
        event_type: String,
        enabled: bool,
    },
    EmergencyActivated {
        thread_id: String,
        at: DateTime<Utc>,
    },
    EmergencyDeactivated,
}

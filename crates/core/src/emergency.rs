// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Emergency mode: a persisted singleton that auto-approves safe tools.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EmergencyStatus {
    Normal,
    Emergency,
}

/// Singleton record described in §3/§4.5.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmergencyState {
    pub status: EmergencyStatus,
    pub activated_at: Option<DateTime<Utc>>,
    pub activated_by_thread: Option<String>,
}

impl Default for EmergencyState {
    fn default() -> Self {
        Self {
            status: EmergencyStatus::Normal,
            activated_at: None,
            activated_by_thread: None,
        }
    }
}

impl EmergencyState {
    /// Activate emergency mode. Idempotent: the original activator and
    /// timestamp are preserved across duplicate activations (§4.5).
    pub fn activate(&mut self, thread_id: &str, now: DateTime<Utc>) {
        if self.status == EmergencyStatus::Emergency {
            return;
        }
        self.status = EmergencyStatus::Emergency;
        self.activated_at = Some(now);
        self.activated_by_thread = Some(thread_id.to_string());
    }

    /// Deactivate emergency mode. Idempotent.
    pub fn deactivate(&mut self) {
        self.status = EmergencyStatus::Normal;
        self.activated_at = None;
        self.activated_by_thread = None;
    }

    pub fn is_emergency(&self) -> bool {
        self.status == EmergencyStatus::Emergency
    }
}

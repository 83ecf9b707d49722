// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-thread, per-event-type notification preference (§3, §4.9).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationPreference {
    pub thread_id: String,
    pub event_type: String,
    pub enabled: bool,
}

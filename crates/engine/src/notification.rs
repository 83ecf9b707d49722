// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Notification categorizer and preference store (§4.9). The formatter
//! and the send-through-transport manager that complete the pipeline live
//! in the daemon crate, since they need the transport client; everything
//! here is pure or store-backed.

use broker_core::Event;

use crate::error::EngineError;
use crate::store::Store;

/// Total-ordered urgency category attached to a notification event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum UrgencyLevel {
    Urgent = 0,
    Important = 1,
    Informational = 2,
    Silent = 3,
}

/// `event_type -> UrgencyLevel`. Unknown types are Informational.
pub fn categorize(event_type: &str) -> UrgencyLevel {
    match event_type {
        "error" | "approval_needed" => UrgencyLevel::Urgent,
        "completion" | "reconnection" => UrgencyLevel::Important,
        "progress" => UrgencyLevel::Informational,
        _ => UrgencyLevel::Informational,
    }
}

/// Store-backed `(thread_id, event_type) -> enabled` preference table.
#[derive(Clone)]
pub struct NotificationPreferences {
    store: Store,
}

impl NotificationPreferences {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// URGENT always notifies, SILENT never does; otherwise the stored
    /// preference, defaulting to true for IMPORTANT and false for
    /// INFORMATIONAL (§4.9).
    pub fn should_notify(&self, thread_id: &str, event_type: &str, urgency: UrgencyLevel) -> bool {
        match urgency {
            UrgencyLevel::Urgent => return true,
            UrgencyLevel::Silent => return false,
            _ => {}
        }
        self.store
            .state()
            .notification_pref(thread_id, event_type)
            .unwrap_or(urgency == UrgencyLevel::Important)
    }

    /// Sets the stored preference. Rejects attempts to disable an URGENT
    /// event type or enable a SILENT one — those classes are locked.
    pub fn set(&self, thread_id: &str, event_type: &str, enabled: bool) -> Result<(), EngineError> {
        let urgency = categorize(event_type);
        if urgency == UrgencyLevel::Urgent && !enabled {
            return Err(EngineError::NotificationClassLocked("URGENT".to_string()));
        }
        if urgency == UrgencyLevel::Silent && enabled {
            return Err(EngineError::NotificationClassLocked("SILENT".to_string()));
        }
        self.store.apply(Event::NotificationPreferenceSet {
            thread_id: thread_id.to_string(),
            event_type: event_type.to_string(),
            enabled,
        })?;
        Ok(())
    }

    pub fn list(&self, thread_id: &str) -> Vec<(String, bool)> {
        self.store
            .state()
            .notification_prefs
            .get(thread_id)
            .map(|prefs| prefs.iter().map(|(k, v)| (k.clone(), *v)).collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
#[path = "notification_tests.rs"]
mod tests;

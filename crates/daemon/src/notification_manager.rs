// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Notification Pipeline manager (§4.9): ties the engine's categorizer
//! and preference store to a mobile-formatted message and a send through
//! the transport client.

use broker_adapters::TransportClient;
use broker_core::SessionId;
use broker_engine::{categorize, NotificationPreferences, UrgencyLevel};

const MAX_LEN: usize = 300;

fn urgency_emoji(urgency: UrgencyLevel) -> &'static str {
    match urgency {
        UrgencyLevel::Urgent => "\u{1F6A8}",        // 🚨
        UrgencyLevel::Important => "\u{2139}\u{FE0F}", // ℹ️
        UrgencyLevel::Informational => "\u{1F4AC}", // 💬
        UrgencyLevel::Silent => "",
    }
}

fn header_for(event_type: &str) -> String {
    let title = event_type.replace('_', " ");
    let mut chars = title.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => title,
    }
}

/// Formats `details` into a mobile notification message. Returns an empty
/// string for SILENT urgency (no send).
pub fn format_notification(event_type: &str, details: &str, urgency: UrgencyLevel) -> String {
    if urgency == UrgencyLevel::Silent {
        return String::new();
    }
    let body = format!(
        "{} {}: {}",
        urgency_emoji(urgency),
        header_for(event_type),
        details
    );
    truncate(&body, MAX_LEN)
}

fn truncate(text: &str, max_len: usize) -> String {
    if text.chars().count() <= max_len {
        return text.to_string();
    }
    let truncated: String = text.chars().take(max_len.saturating_sub(1)).collect();
    format!("{truncated}\u{2026}")
}

/// The Notification Pipeline's orchestration point: categorize, consult
/// preferences, format, deliver. Returns true iff a message was sent.
pub struct NotificationManager<T: TransportClient> {
    preferences: NotificationPreferences,
    transport: std::sync::Arc<T>,
}

impl<T: TransportClient> NotificationManager<T> {
    pub fn new(preferences: NotificationPreferences, transport: std::sync::Arc<T>) -> Self {
        Self { preferences, transport }
    }

    pub async fn notify(
        &self,
        event_type: &str,
        details: &str,
        thread_id: &str,
        _session_id: Option<&SessionId>,
    ) -> bool {
        let urgency = categorize(event_type);
        if !self.preferences.should_notify(thread_id, event_type, urgency) {
            return false;
        }
        let message = format_notification(event_type, details, urgency);
        if message.is_empty() {
            return false;
        }
        self.transport.send_message(thread_id, &message).await.is_ok()
    }
}

#[cfg(test)]
#[path = "notification_manager_tests.rs"]
mod tests;

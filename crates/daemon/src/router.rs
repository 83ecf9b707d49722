// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Command Router (§4.8): the per-inbound-message dispatcher. Tries each
//! handler category in priority order; the first to return a reply wins.
//! A `None` reply from the final fallback means the Stream Orchestrator
//! has taken over and will answer independently.

use broker_adapters::TransportClient;
use broker_core::SessionStatus;
use tracing::warn;

use crate::config::Config;
use crate::notification_manager::NotificationManager;
use crate::orchestrator;
use crate::state::AppState;
use crate::transport_client::ResilientTransport;

mod approval;
mod code;
mod custom_command;
mod emergency;
mod notify;
mod session;
mod thread;

/// Verifies the sender and dispatches `text` through the priority chain.
/// Drops silently (returns with no side effect) for unauthorized senders.
pub async fn dispatch<T: TransportClient>(
    state: &AppState,
    transport: &ResilientTransport<T>,
    notifications: &NotificationManager<T>,
    config: &Config,
    thread_id: &str,
    text: &str,
) {
    if thread_id != config.authorized_thread_id {
        warn!(target: "router", %thread_id, "dropped message from unauthorized sender");
        return;
    }

    let trimmed = text.trim();

    let reply = approval::handle(state, trimmed)
        .or_else(|| emergency::handle(state, thread_id, trimmed))
        .or_else(|| notify::handle(state, thread_id, trimmed))
        .or_else(|| custom_command::handle(state, trimmed))
        .or_else(|| thread::handle(state, thread_id, trimmed))
        .or_else(|| code::handle(state, thread_id, trimmed));

    if let Some(reply) = reply {
        let _ = transport.send_message(thread_id, &reply).await;
        return;
    }

    if let Some(reply) = session::handle(state, thread_id, trimmed, config).await {
        let _ = transport.send_message(thread_id, &reply).await;
        return;
    }

    // Fallback: forward to the orchestrator for the thread's ACTIVE
    // session. The orchestrator streams its own replies; this handler
    // itself never produces one.
    let active = state
        .sessions
        .list()
        .into_iter()
        .find(|s| s.thread_id == thread_id && s.status == SessionStatus::Active);

    match active {
        Some(active_session) => {
            orchestrator::run_command(state, transport, notifications, &active_session, trimmed, config).await;
        }
        None => {
            let _ = transport.send_message(thread_id, "no active session").await;
        }
    }
}

/// Shared helper: splits `"<cmd> <rest>"` on the first whitespace run.
fn split_first(text: &str) -> (&str, &str) {
    match text.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim_start()),
        None => (text, ""),
    }
}

#[cfg(test)]
#[path = "router_tests.rs"]
mod tests;

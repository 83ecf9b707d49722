// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Stream Orchestrator (§4.7): drives one command through a session's
//! child process, classifying and batching its output, gating destructive
//! tool calls through the approval workflow, and pushing the result back
//! through the transport under the thread's identity — never the session
//! id (two distinct namespaces, see `thread_id` usage throughout).

use std::time::Instant;

use broker_adapters::TransportClient;
use broker_core::Session;
use broker_engine::{
    classify_operation, classify_output, format_event, Classification, EmergencyMode, OutputEvent,
    ToolCall,
};
use tracing::{error, warn};

use crate::attachments::{self, ATTACHMENT_PLACEHOLDER};
use crate::config::Config;
use crate::notification_manager::NotificationManager;
use crate::state::AppState;
use crate::transport_client::ResilientTransport;

/// Runs `command` against `session`'s child process to completion,
/// streaming formatted output back to `session.thread_id`.
pub async fn run_command<T: TransportClient>(
    state: &AppState,
    transport: &ResilientTransport<T>,
    notifications: &NotificationManager<T>,
    session: &Session,
    command: &str,
    config: &Config,
) {
    let thread_id = session.thread_id.clone();
    let supervisor = state.supervisor_for(&session.id);

    let mut guard = supervisor.bridge().await;
    let Some(bridge) = guard.as_mut() else {
        let text = format_event(&OutputEvent::Error {
            message: "no active process for this session".to_string(),
        });
        send_chunked(transport, &thread_id, &text, config.chunk_max_chars).await;
        notifications
            .notify("error", "no active process", &thread_id, Some(&session.id))
            .await;
        return;
    };

    if let Err(err) = bridge.send_command(command).await {
        let text = format!("\u{274C} failed to send command: {err}");
        send_chunked(transport, &thread_id, &text, config.chunk_max_chars).await;
        notifications
            .notify("error", &err.to_string(), &thread_id, Some(&session.id))
            .await;
        return;
    }

    let mut batch: Vec<String> = Vec::new();
    let mut last_flush = Instant::now();

    loop {
        match bridge.read_response().await {
            Ok(Some(line)) => {
                let event = classify_output(&line);

                if let Some(tool_call) = ToolCall::from_output_event(&event) {
                    gate_tool_call(state, transport, notifications, &thread_id, &session.id, &tool_call, config)
                        .await;
                }

                let text = render_event(state, &session.id, &event, config).await;
                batch.push(text);

                if last_flush.elapsed() >= config.batch_interval {
                    flush(transport, &thread_id, &mut batch, config.chunk_max_chars).await;
                    last_flush = Instant::now();
                }
            }
            Ok(None) => {
                flush(transport, &thread_id, &mut batch, config.chunk_max_chars).await;
                notifications
                    .notify("completion", "command finished", &thread_id, Some(&session.id))
                    .await;
                break;
            }
            Err(err) => {
                flush(transport, &thread_id, &mut batch, config.chunk_max_chars).await;
                error!(target: "orchestrator", %err, session_id = %session.id, "bridge read failed");
                let text = format!("\u{274C} {err}");
                send_chunked(transport, &thread_id, &text, config.chunk_max_chars).await;
                notifications
                    .notify("error", &err.to_string(), &thread_id, Some(&session.id))
                    .await;
                break;
            }
        }
    }
}

/// Step 4b: consult the Operation Classifier and Emergency Mode; for a
/// destructive call not auto-approved, request approval, notify, and
/// cooperatively block on the decision. Rejection/timeout is advisory —
/// the child's own subsequent output is not cancelled (§9 open question).
async fn gate_tool_call<T: TransportClient>(
    state: &AppState,
    transport: &ResilientTransport<T>,
    notifications: &NotificationManager<T>,
    thread_id: &str,
    session_id: &broker_core::SessionId,
    tool_call: &ToolCall,
    config: &Config,
) {
    let (classification, reason) = classify_operation(tool_call);
    let auto_approved = state.emergency.auto_approves(classification);
    let requires_approval = classification == Classification::Destructive && !auto_approved;

    if !requires_approval {
        return;
    }

    let request = state.approvals.request(tool_call.clone(), reason);
    let needed = format!(
        "\u{26A0}\u{FE0F} Approval needed: {} on `{}` ({}) — reply `approve {}` or `reject {}`",
        tool_call.tool,
        tool_call.detail,
        request.id.short(8),
        request.id.short(8),
        request.id.short(8)
    );
    send_chunked(transport, thread_id, &needed, config.chunk_max_chars).await;
    notifications
        .notify(
            "approval_needed",
            &format!("{} on {}", tool_call.tool, tool_call.detail),
            thread_id,
            Some(session_id),
        )
        .await;

    let decision = state.approvals.wait_for_decision(&request.id).await;
    let outcome_text = match decision {
        Ok(broker_engine::ApprovalState::Approved) => {
            format!("\u{2705} Approved: {} on `{}`", tool_call.tool, tool_call.detail)
        }
        _ => format!(
            "\u{23ED}\u{FE0F} Not approved (skipped, best-effort): {} on `{}`",
            tool_call.tool, tool_call.detail
        ),
    };
    send_chunked(transport, thread_id, &outcome_text, config.chunk_max_chars).await;
}

/// Step 4c: format with the Mobile Formatter, wrapping to mobile width or
/// routing to an attachment depending on size.
async fn render_event(state: &AppState, session_id: &broker_core::SessionId, event: &OutputEvent, config: &Config) -> String {
    let text = format_event(event);
    if !broker_engine::needs_attachment(&text) {
        return broker_engine::wrap_for_mobile(&text);
    }

    let preview: String = text.lines().take(5).collect::<Vec<_>>().join("\n");
    let placeholder = format!("{preview}\n{ATTACHMENT_PLACEHOLDER}");
    let dir = state.store.state().sessions.get(session_id).map_or_else(
        || std::path::PathBuf::from("/tmp/broker-attachments"),
        |s| std::path::Path::new(&s.project_path).join(".broker-attachments"),
    );

    match attachments::materialize(&dir, session_id.as_str(), &text, attachments::next_monotonic_ms()).await {
        Ok((path, warn)) => attachments::confirmation_text(&placeholder, &path, warn),
        Err(err) => {
            warn!(target: "orchestrator", %err, "attachment materialization failed");
            broker_engine::wrap_for_mobile(&text)
        }
    }
}

async fn flush<T: TransportClient>(
    transport: &ResilientTransport<T>,
    thread_id: &str,
    batch: &mut Vec<String>,
    chunk_max: usize,
) {
    if batch.is_empty() {
        return;
    }
    let text = batch.join("\n");
    batch.clear();
    send_chunked(transport, thread_id, &text, chunk_max).await;
}

async fn send_chunked<T: TransportClient>(
    transport: &ResilientTransport<T>,
    thread_id: &str,
    text: &str,
    chunk_max: usize,
) {
    for chunk in broker_engine::chunk_text(text, chunk_max) {
        if let Err(err) = transport.send_message(thread_id, &chunk).await {
            warn!(target: "orchestrator", %err, "send failed");
        }
    }
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;

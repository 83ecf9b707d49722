// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session commands: `/session start [<path>] | list | resume <id> | stop <id>`.
//!
//! The only handler category that needs to drive process I/O (starting
//! or stopping the child), so unlike its siblings this one is async.

use broker_core::{SessionId, SessionStatus};

use crate::config::Config;
use crate::router::split_first;
use crate::state::AppState;

const HELP: &str = "/session start [<path>] | list | resume <id> | stop <id>";

pub async fn handle(state: &AppState, thread_id: &str, text: &str, config: &Config) -> Option<String> {
    let rest = text.strip_prefix("/session")?;
    let (sub, arg) = split_first(rest.trim_start());

    Some(match sub {
        "start" => start(state, thread_id, arg, config).await,
        "list" => list(state, thread_id),
        "resume" if !arg.is_empty() => resume(state, thread_id, arg, config).await,
        "stop" if !arg.is_empty() => stop(state, arg, config).await,
        "help" | "" => HELP.to_string(),
        _ => format!("usage: {HELP}"),
    })
}

async fn start(state: &AppState, thread_id: &str, arg: &str, config: &Config) -> String {
    let project_path = if arg.is_empty() {
        match std::env::current_dir() {
            Ok(p) => p.display().to_string(),
            Err(err) => return format!("\u{274C} {err}"),
        }
    } else {
        arg.to_string()
    };

    let session = match state.sessions.create(&project_path, thread_id) {
        Ok(s) => s,
        Err(err) => return format!("\u{274C} {err}"),
    };

    if let Err(err) = state
        .sessions
        .transition(&session.id, SessionStatus::Created, SessionStatus::Active)
    {
        return format!("\u{274C} {err}");
    }

    let supervisor = state.supervisor_for(&session.id);
    let spawn_config = broker_adapters::SpawnConfig {
        program: config.assistant_program.clone(),
        args: config.assistant_args.clone(),
        cwd: std::path::PathBuf::from(&project_path),
    };
    if let Err(err) = supervisor.start(&spawn_config).await {
        state.drop_supervisor(&session.id);
        return format!("\u{274C} failed to start session: {err}");
    }

    format!(
        "Started session {} in `{project_path}`.",
        session.id.short(8)
    )
}

fn list(state: &AppState, thread_id: &str) -> String {
    let sessions: Vec<_> = state
        .sessions
        .list()
        .into_iter()
        .filter(|s| s.thread_id == thread_id)
        .collect();
    if sessions.is_empty() {
        return "No sessions for this thread.".to_string();
    }
    sessions
        .into_iter()
        .map(|s| format!("{} [{}] {}", s.id.short(8), s.status, s.project_path))
        .collect::<Vec<_>>()
        .join("\n")
}

async fn resume(state: &AppState, thread_id: &str, arg: &str, config: &Config) -> String {
    let id = SessionId::new(arg.to_string());
    let session = match state.sessions.get(&id) {
        Ok(s) => s,
        Err(err) => return format!("\u{274C} {err}"),
    };
    if session.thread_id != thread_id {
        return "\u{274C} no such session for this thread".to_string();
    }

    let updated = match state
        .sessions
        .transition(&session.id, SessionStatus::Paused, SessionStatus::Active)
    {
        Ok(s) => s,
        Err(err) => return format!("\u{274C} {err}"),
    };

    let supervisor = state.supervisor_for(&updated.id);
    if !supervisor.is_running().await {
        let spawn_config = broker_adapters::SpawnConfig {
            program: config.assistant_program.clone(),
            args: config.assistant_args.clone(),
            cwd: std::path::PathBuf::from(&updated.project_path),
        };
        if let Err(err) = supervisor.start(&spawn_config).await {
            return format!("\u{274C} failed to resume session: {err}");
        }
    }

    let summary = state
        .sessions
        .generate_catchup_summary(&updated.id)
        .unwrap_or_else(|_| String::new());
    format!("Resumed session {}.\n{summary}", updated.id.short(8))
}

async fn stop(state: &AppState, arg: &str, config: &Config) -> String {
    let id = SessionId::new(arg.to_string());
    let current = match state.sessions.get(&id) {
        Ok(s) => s,
        Err(err) => return format!("\u{274C} {err}"),
    };

    let supervisor = state.supervisor_for(&id);
    if let Err(err) = supervisor.stop(config.graceful_stop_timeout).await {
        return format!("\u{274C} {err}");
    }
    state.drop_supervisor(&id);

    if let Err(err) = state.sessions.transition(&id, current.status, SessionStatus::Terminated) {
        return format!("\u{274C} {err}");
    }

    format!("Stopped session {}.", id.short(8))
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;

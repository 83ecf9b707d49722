// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Notification commands: `/notify list | enable <type> | disable <type> | help`.

use crate::router::split_first;
use crate::state::AppState;

const HELP: &str = "/notify list | enable <type> | disable <type> | help";

pub fn handle(state: &AppState, thread_id: &str, text: &str) -> Option<String> {
    let rest = text.strip_prefix("/notify")?;
    let (sub, arg) = split_first(rest.trim_start());

    Some(match sub {
        "list" => {
            let prefs = state.notifications.list(thread_id);
            if prefs.is_empty() {
                "No custom notification preferences set (using defaults).".to_string()
            } else {
                let lines: Vec<String> = prefs
                    .into_iter()
                    .map(|(event_type, enabled)| {
                        format!("{event_type}: {}", if enabled { "enabled" } else { "disabled" })
                    })
                    .collect();
                lines.join("\n")
            }
        }
        "enable" if !arg.is_empty() => match state.notifications.set(thread_id, arg, true) {
            Ok(()) => format!("Enabled notifications for `{arg}`."),
            Err(err) => format!("\u{274C} {err}"),
        },
        "disable" if !arg.is_empty() => match state.notifications.set(thread_id, arg, false) {
            Ok(()) => format!("Disabled notifications for `{arg}`."),
            Err(err) => format!("\u{274C} {err}"),
        },
        "help" | "" => HELP.to_string(),
        _ => format!("usage: {HELP}"),
    })
}

#[cfg(test)]
#[path = "notify_tests.rs"]
mod tests;

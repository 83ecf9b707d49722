// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Emergency commands: `/emergency activate | deactivate | status | help`.

use broker_core::EmergencyStatus;

use crate::router::split_first;
use crate::state::AppState;

const HELP: &str = "/emergency activate | deactivate | status | help";

pub fn handle(state: &AppState, thread_id: &str, text: &str) -> Option<String> {
    let rest = text.strip_prefix("/emergency")?;
    let (sub, _) = split_first(rest.trim_start());

    Some(match sub {
        "activate" => match state.emergency.activate(thread_id) {
            Ok(_) => "\u{1F6A8} Emergency mode ACTIVE: Safe tools auto-approve.".to_string(),
            Err(err) => format!("\u{274C} {err}"),
        },
        "deactivate" => match state.emergency.deactivate() {
            Ok(_) => "Emergency mode deactivated.".to_string(),
            Err(err) => format!("\u{274C} {err}"),
        },
        "status" => {
            let status = state.emergency.state();
            match status.status {
                EmergencyStatus::Emergency => format!(
                    "EMERGENCY, activated by {} at {}",
                    status.activated_by_thread.as_deref().unwrap_or("unknown"),
                    status
                        .activated_at
                        .map(|t| t.to_rfc3339())
                        .unwrap_or_default()
                ),
                EmergencyStatus::Normal => "NORMAL".to_string(),
            }
        }
        "help" | "" => HELP.to_string(),
        other => format!("unknown /emergency subcommand `{other}`. {HELP}"),
    })
}

#[cfg(test)]
#[path = "emergency_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Custom-command controls: `/custom list | show <name> | invoke <name> [args] | help`.
//!
//! `invoke` only names the catalog entry back to the user; actually
//! running it is the Stream Orchestrator's job once the thread has an
//! ACTIVE session (§4.8 step 8 handles that forwarding).

use crate::router::split_first;
use crate::state::AppState;

const HELP: &str = "/custom list | show <name> | invoke <name> [args] | help";

pub fn handle(state: &AppState, text: &str) -> Option<String> {
    let rest = text.strip_prefix("/custom")?;
    let (sub, arg) = split_first(rest.trim_start());

    Some(match sub {
        "list" => {
            let commands = state.commands.list();
            if commands.is_empty() {
                "No custom commands registered.".to_string()
            } else {
                commands
                    .into_iter()
                    .map(|c| format!("/{}", c.name))
                    .collect::<Vec<_>>()
                    .join("\n")
            }
        }
        "show" if !arg.is_empty() => match state.commands.get(arg) {
            Ok(command) => format!(
                "{} -> {} (updated {})",
                command.name,
                command.file_path.display(),
                command.updated_at.to_rfc3339()
            ),
            Err(err) => format!("\u{274C} {err}"),
        },
        "invoke" if !arg.is_empty() => {
            let (name, _args) = split_first(arg);
            match state.commands.get(name) {
                Ok(command) => format!("queued `{}` from {}", command.name, command.file_path.display()),
                Err(err) => format!("\u{274C} {err}"),
            }
        }
        "help" | "" => HELP.to_string(),
        _ => format!("usage: {HELP}"),
    })
}

#[cfg(test)]
#[path = "custom_command_tests.rs"]
mod tests;

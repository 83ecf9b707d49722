// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Thread-mapping commands: `/thread map <path> | list | unmap | help`.

use crate::router::split_first;
use crate::state::AppState;

const HELP: &str = "/thread map <path> | list | unmap | help";

pub fn handle(state: &AppState, thread_id: &str, text: &str) -> Option<String> {
    let rest = text.strip_prefix("/thread")?;
    let (sub, arg) = split_first(rest.trim_start());

    Some(match sub {
        "map" if !arg.is_empty() => match state.threads.map(thread_id, arg) {
            Ok(mapping) => format!("Mapped this thread to `{}`.", mapping.project_path),
            Err(err) => format!("\u{274C} {err}"),
        },
        "list" => {
            let mappings = state.threads.list();
            if mappings.is_empty() {
                "No thread mappings.".to_string()
            } else {
                mappings
                    .into_iter()
                    .map(|m| format!("{} -> {}", m.thread_id, m.project_path))
                    .collect::<Vec<_>>()
                    .join("\n")
            }
        }
        "unmap" => match state.threads.unmap(thread_id) {
            Ok(()) => "Unmapped this thread.".to_string(),
            Err(err) => format!("\u{274C} {err}"),
        },
        "help" | "" => HELP.to_string(),
        _ => format!("usage: {HELP}"),
    })
}

#[cfg(test)]
#[path = "thread_tests.rs"]
mod tests;

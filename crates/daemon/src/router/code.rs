// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Code-display controls: `/code full | help`.
//!
//! `/code full` re-sends the thread's ACTIVE session's last captured code
//! output in full, bypassing whatever mobile-wrapping or attachment
//! routing the formatter applied when it first streamed.

use broker_core::session::CONTEXT_LAST_CODE_OUTPUT;
use broker_core::SessionStatus;

use crate::router::split_first;
use crate::state::AppState;

const HELP: &str = "/code full | help";

pub fn handle(state: &AppState, thread_id: &str, text: &str) -> Option<String> {
    let rest = text.strip_prefix("/code")?;
    let (sub, _) = split_first(rest.trim_start());

    Some(match sub {
        "full" => {
            let active = state
                .sessions
                .list()
                .into_iter()
                .find(|s| s.thread_id == thread_id && s.status == SessionStatus::Active);
            match active {
                None => "no active session".to_string(),
                Some(session) => session
                    .context
                    .get(CONTEXT_LAST_CODE_OUTPUT)
                    .and_then(|v| v.as_str())
                    .map(str::to_string)
                    .unwrap_or_else(|| "No code output captured yet for this session.".to_string()),
            }
        }
        "help" | "" => HELP.to_string(),
        _ => format!("usage: {HELP}"),
    })
}

#[cfg(test)]
#[path = "code_tests.rs"]
mod tests;

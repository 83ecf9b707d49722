// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Approval commands: `approve <id>`, `reject <id>`, `approve all`.

use broker_core::ApprovalId;

use crate::router::split_first;
use crate::state::AppState;

pub fn handle(state: &AppState, text: &str) -> Option<String> {
    let (head, rest) = split_first(text);

    if head.eq_ignore_ascii_case("approve") && rest.eq_ignore_ascii_case("all") {
        let count = state.approvals.approve_all();
        return Some(format!("Approved {count} pending request(s)."));
    }

    if head.eq_ignore_ascii_case("approve") && !rest.is_empty() {
        let id = ApprovalId::new(rest.to_string());
        return Some(match state.approvals.approve(&id) {
            Ok(request) => format!(
                "\u{2705} Approved: {} on `{}`",
                request.tool_call.tool,
                request.tool_call.detail
            ),
            Err(err) => format!("\u{274C} {err}"),
        });
    }

    if head.eq_ignore_ascii_case("reject") && !rest.is_empty() {
        let id = ApprovalId::new(rest.to_string());
        return Some(match state.approvals.reject(&id) {
            Ok(request) => format!(
                "\u{1F6AB} Rejected: {} on `{}`",
                request.tool_call.tool,
                request.tool_call.detail
            ),
            Err(err) => format!("\u{274C} {err}"),
        });
    }

    None
}

#[cfg(test)]
#[path = "approval_tests.rs"]
mod tests;

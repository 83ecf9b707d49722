// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Output Classifier (§4.3): a pure `line -> event` function with no
//! state of its own.

use regex::Regex;
use std::sync::LazyLock;

/// A classified line of coding-assistant output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputEvent {
    ToolCall { tool: String, target: String },
    Progress { message: String },
    Error { message: String },
    Response { text: String },
}

const TOOL_NAMES: [&str; 5] = ["Read", "Edit", "Write", "Grep", "Glob"];

#[allow(clippy::expect_used)]
static PROGRESS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(Analyzing|Writing|Reading)\s+.+").expect("constant regex pattern is valid")
});

/// Classifies a single line of output. First matching rule wins.
pub fn classify(line: &str) -> OutputEvent {
    if let Some(rest) = line.strip_prefix("Using ") {
        for tool in TOOL_NAMES {
            let prefix = format!("{tool} tool on ");
            if let Some(target) = rest.strip_prefix(&prefix) {
                return OutputEvent::ToolCall {
                    tool: tool.to_string(),
                    target: target.to_string(),
                };
            }
        }
    }

    if let Some(rest) = line.strip_prefix("Running: ") {
        return OutputEvent::ToolCall {
            tool: "Bash".to_string(),
            target: rest.to_string(),
        };
    }

    if let Some(rest) = line.strip_prefix("Error: ") {
        return OutputEvent::Error {
            message: rest.to_string(),
        };
    }

    if PROGRESS_RE.is_match(line) {
        return OutputEvent::Progress {
            message: line.to_string(),
        };
    }

    OutputEvent::Response { text: line.to_string() }
}

#[cfg(test)]
#[path = "output_classifier_tests.rs"]
mod tests;

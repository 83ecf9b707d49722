// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Diff Processing (§4.11): a git-style diff parser and a plain-English
//! summary generator, both pure functions with no I/O.

use std::sync::LazyLock;

use regex::Regex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hunk {
    pub old_start: u32,
    pub old_count: u32,
    pub new_start: u32,
    pub new_count: u32,
    /// Lines with their `+`/`-`/` ` prefix preserved.
    pub lines: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDiff {
    pub old_path: String,
    pub new_path: String,
    pub binary: bool,
    pub hunks: Vec<Hunk>,
}

#[allow(clippy::expect_used)]
static DIFF_HEADER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^diff --git a/(\S+) b/(\S+)").expect("constant regex pattern is valid"));
#[allow(clippy::expect_used)]
static HUNK_HEADER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^@@ -(\d+)(?:,(\d+))? \+(\d+)(?:,(\d+))? @@").expect("constant regex pattern is valid")
});

/// True when `text` looks like a unified/git-style diff (used by the
/// formatter's code/diff detection, §4.10).
pub fn looks_like_diff(text: &str) -> bool {
    text.lines().any(|line| DIFF_HEADER_RE.is_match(line))
        || text.lines().any(|line| line.starts_with("--- ") || line.starts_with("+++ "))
}

/// Parses a git-style diff into per-file records.
pub fn parse_diff(diff: &str) -> Vec<FileDiff> {
    let mut files = Vec::new();
    let mut lines = diff.lines().peekable();

    while let Some(line) = lines.next() {
        let Some(caps) = DIFF_HEADER_RE.captures(line) else {
            continue;
        };
        let old_path = caps[1].to_string();
        let new_path = caps[2].to_string();
        let mut binary = false;
        let mut hunks = Vec::new();

        while let Some(&next) = lines.peek() {
            if DIFF_HEADER_RE.is_match(next) {
                break;
            }
            let Some(next) = lines.next() else { break };

            if next.starts_with("Binary files") {
                binary = true;
                continue;
            }
            if let Some(hunk_caps) = HUNK_HEADER_RE.captures(next) {
                let old_start: u32 = hunk_caps[1].parse().unwrap_or(0);
                let old_count: u32 = hunk_caps.get(2).map_or(1, |m| m.as_str().parse().unwrap_or(1));
                let new_start: u32 = hunk_caps[3].parse().unwrap_or(0);
                let new_count: u32 = hunk_caps.get(4).map_or(1, |m| m.as_str().parse().unwrap_or(1));
                let mut hunk_lines = Vec::new();

                while let Some(&body_line) = lines.peek() {
                    if DIFF_HEADER_RE.is_match(body_line) || HUNK_HEADER_RE.is_match(body_line) {
                        break;
                    }
                    let Some(body_line) = lines.next() else { break };
                    hunk_lines.push(body_line.to_string());
                }

                hunks.push(Hunk {
                    old_start,
                    old_count,
                    new_start,
                    new_count,
                    lines: hunk_lines,
                });
            }
        }

        files.push(FileDiff {
            old_path,
            new_path,
            binary,
            hunks,
        });
    }

    files
}

#[allow(clippy::expect_used)]
static FUNCTION_DEF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+\s*def\s+(\w+)").expect("constant regex pattern is valid"));
#[allow(clippy::expect_used)]
static CLASS_DEF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+\s*class\s+(\w+)").expect("constant regex pattern is valid"));
#[allow(clippy::expect_used)]
static JS_FUNCTION_DEF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+\s*function\s+(\w+)").expect("constant regex pattern is valid"));

/// Plain-English summary of a parsed diff: file count and, per file, any
/// function/class-level changes detected by surface pattern matching.
pub fn summarize(files: &[FileDiff]) -> String {
    if files.is_empty() {
        return "No changes.".to_string();
    }

    let mut lines = vec![format!(
        "Modified {} file{}:",
        files.len(),
        if files.len() == 1 { "" } else { "s" }
    )];

    for file in files {
        if file.binary {
            lines.push(format!("- {} (binary file changed)", file.new_path));
            continue;
        }

        let mut symbols = Vec::new();
        for hunk in &file.hunks {
            for line in &hunk.lines {
                if let Some(caps) = FUNCTION_DEF_RE.captures(line) {
                    symbols.push(format!("function {}", &caps[1]));
                } else if let Some(caps) = CLASS_DEF_RE.captures(line) {
                    symbols.push(format!("class {}", &caps[1]));
                } else if let Some(caps) = JS_FUNCTION_DEF_RE.captures(line) {
                    symbols.push(format!("function {}", &caps[1]));
                }
            }
        }

        if symbols.is_empty() {
            lines.push(format!("- {}", file.new_path));
        } else {
            lines.push(format!("- {}: added/changed {}", file.new_path, symbols.join(", ")));
        }
    }

    lines.join("\n")
}

#[cfg(test)]
#[path = "diff_tests.rs"]
mod tests;

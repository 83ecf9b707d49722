// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Mobile Formatter (§4.10): pure, stateless event-to-text rendering,
//! mobile-width line wrapping, attachment-size routing, and chunking of
//! oversized text. The orchestrator (daemon crate) is the only caller;
//! none of this module touches I/O.

use crate::diff::{looks_like_diff, parse_diff, summarize as summarize_diff};
use crate::output_classifier::OutputEvent;

/// Mobile line width beyond which [`wrap_for_mobile`] inserts a break.
pub const WRAP_WIDTH: usize = 50;
/// Marker appended to a wrapped continuation line.
pub const WRAP_CONTINUATION: &str = "\u{21b3}";
/// Marker appended to every non-final chunk produced by [`chunk_text`].
pub const CHUNK_CONTINUATION: &str = "\u{2026} (continued)";
/// Default transport-safe maximum before [`chunk_text`] splits.
pub const DEFAULT_CHUNK_MAX: usize = 1600;
/// Line count above which the orchestrator should materialize an
/// attachment instead of sending inline (§4.7, §4.10).
pub const ATTACHMENT_LINE_THRESHOLD: usize = 100;

fn tool_emoji(tool: &str) -> &'static str {
    match tool.to_lowercase().as_str() {
        "read" => "\u{1F4D6}",  // 📖
        "edit" => "\u{270F}\u{FE0F}", // ✏️
        "write" => "\u{1F4DD}", // 📝
        "grep" => "\u{1F50D}", // 🔍
        "glob" => "\u{1F5C2}\u{FE0F}", // 🗂️
        "bash" => "\u{1F4BB}", // 💻
        _ => "\u{1F527}", // 🔧
    }
}

/// Renders a classified output event into mobile-facing text. Tool calls
/// get a per-tool emoji prefix; progress/error events get their own
/// prefix; responses pass through verbatim unless they look like a code
/// block or diff, in which case they're formatted accordingly.
pub fn format_event(event: &OutputEvent) -> String {
    match event {
        OutputEvent::ToolCall { tool, target } if tool.eq_ignore_ascii_case("bash") => {
            format!("{} Running: `{}`", tool_emoji(tool), target)
        }
        OutputEvent::ToolCall { tool, target } => {
            format!("{} Using {} on `{}`", tool_emoji(tool), tool, target)
        }
        OutputEvent::Progress { message } => format!("\u{23F3} {message}"),
        OutputEvent::Error { message } => format!("\u{274C} {message}"),
        OutputEvent::Response { text } => format_response(text),
    }
}

fn format_response(text: &str) -> String {
    if looks_like_diff(text) {
        let files = parse_diff(text);
        return format!("\u{1F4CB} {}", summarize_diff(&files));
    }
    if text.contains("```") {
        return format!("\u{1F4C4} {}", text);
    }
    text.to_string()
}

/// Whether an event's formatted output should be materialized as an
/// attachment rather than sent inline, based on line count (§4.7, §4.10).
pub fn needs_attachment(formatted: &str) -> bool {
    formatted.lines().count() > ATTACHMENT_LINE_THRESHOLD
}

/// Wraps a single line to [`WRAP_WIDTH`] columns, breaking on the last
/// preceding whitespace when possible and marking every continuation.
pub fn wrap_for_mobile(text: &str) -> String {
    let mut out = Vec::new();
    for line in text.lines() {
        out.push(wrap_line(line));
    }
    out.join("\n")
}

fn wrap_line(line: &str) -> String {
    if line.chars().count() <= WRAP_WIDTH {
        return line.to_string();
    }
    let mut pieces = Vec::new();
    let mut remaining = line;
    while remaining.chars().count() > WRAP_WIDTH {
        let break_at = remaining
            .char_indices()
            .take_while(|(i, _)| *i <= WRAP_WIDTH)
            .filter(|(_, c)| c.is_whitespace())
            .last()
            .map(|(i, _)| i)
            .unwrap_or_else(|| {
                remaining
                    .char_indices()
                    .nth(WRAP_WIDTH)
                    .map(|(i, _)| i)
                    .unwrap_or(remaining.len())
            });
        let (head, tail) = remaining.split_at(break_at);
        pieces.push(head.trim_end().to_string());
        remaining = tail.trim_start();
    }
    pieces.push(remaining.to_string());

    let last = pieces.len() - 1;
    pieces
        .into_iter()
        .enumerate()
        .map(|(i, p)| if i < last { format!("{p} {WRAP_CONTINUATION}") } else { p })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Splits `text` into chunks no larger than `max_len`, preferring a
/// sentence boundary (`. `, `! `, `? `, or `\n`) in the final 30% of the
/// window and keeping short fenced code blocks intact. Every non-final
/// chunk is suffixed with [`CHUNK_CONTINUATION`].
pub fn chunk_text(text: &str, max_len: usize) -> Vec<String> {
    if text.len() <= max_len {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut remaining = text;

    while remaining.len() > max_len {
        let split_at = find_split_point(remaining, max_len);
        let (head, tail) = remaining.split_at(split_at);
        chunks.push(format!("{} {CHUNK_CONTINUATION}", head.trim_end()));
        remaining = tail.trim_start();
    }
    if !remaining.is_empty() {
        chunks.push(remaining.to_string());
    }
    chunks
}

/// Snaps `idx` down to the nearest char boundary at or before it, so a
/// byte-index slice taken at the result never lands mid-codepoint.
fn floor_char_boundary(text: &str, idx: usize) -> usize {
    let mut idx = idx.min(text.len());
    while idx > 0 && !text.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

fn find_split_point(text: &str, max_len: usize) -> usize {
    let boundary = floor_char_boundary(text, max_len);
    let search_start = floor_char_boundary(text, (max_len as f64 * 0.7) as usize);
    let window = &text[..boundary];

    // Don't split inside a fenced code block: if an odd number of ``` markers
    // precede a candidate boundary, push the boundary past the block.
    let fence_count = |upto: usize| window[..upto].matches("```").count();

    let mut best = None;
    for (idx, _) in window.match_indices(['.', '!', '?', '\n']) {
        if idx < search_start || idx >= boundary {
            continue;
        }
        if fence_count(idx) % 2 != 0 {
            continue;
        }
        best = Some(floor_char_boundary(text, idx + 1));
    }

    best.unwrap_or(boundary)
}

#[cfg(test)]
#[path = "formatter_tests.rs"]
mod tests;

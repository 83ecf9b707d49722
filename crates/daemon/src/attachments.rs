// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Attachment materialization (§4.7): when the formatter decides an
//! event's output is too large to inline, the orchestrator writes it to
//! a named file and replaces the placeholder in the outbound text with a
//! confirmation line.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use thiserror::Error;
use tokio::io::AsyncWriteExt;

static SEQ: AtomicU64 = AtomicU64::new(0);

/// A timestamp for attachment file names that only ever increases, even
/// for two sends landing in the same wall-clock millisecond.
pub fn next_monotonic_ms() -> u64 {
    let epoch_ms = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0);
    let seq = SEQ.fetch_add(1, Ordering::Relaxed);
    epoch_ms + seq
}

/// Placeholder the orchestrator looks for in formatted text before
/// substituting the confirmation line.
pub const ATTACHMENT_PLACEHOLDER: &str = "[[ATTACHMENT]]";

#[derive(Debug, Error)]
pub enum AttachmentError {
    #[error("attachment of {0} bytes exceeds the 100 MB transport limit")]
    TooLarge(u64),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub const REJECT_BYTES: u64 = 100 * 1024 * 1024;
pub const WARN_BYTES: u64 = 10 * 1024 * 1024;

/// Writes `payload` under `dir` with a monotonic-timestamp-bearing name
/// and returns the path plus whether a size warning should be surfaced.
pub async fn materialize(
    dir: &Path,
    session_id: &str,
    payload: &str,
    monotonic_ms: u64,
) -> Result<(PathBuf, bool), AttachmentError> {
    let bytes = payload.len() as u64;
    if bytes > REJECT_BYTES {
        return Err(AttachmentError::TooLarge(bytes));
    }
    let warn = bytes > WARN_BYTES;

    tokio::fs::create_dir_all(dir).await?;
    let path = dir.join(format!("{session_id}-{monotonic_ms}.txt"));
    let mut file = tokio::fs::File::create(&path).await?;
    file.write_all(payload.as_bytes()).await?;
    file.flush().await?;
    Ok((path, warn))
}

/// Substitutes the placeholder in `formatted` with a confirmation line
/// naming the materialized file, appending a size warning if requested.
pub fn confirmation_text(formatted: &str, path: &Path, warn: bool) -> String {
    let mut line = format!("Saved full output to {}", path.display());
    if warn {
        line.push_str(" (large attachment, >10 MB)");
    }
    formatted.replacen(ATTACHMENT_PLACEHOLDER, &line, 1)
}

#[cfg(test)]
#[path = "attachments_tests.rs"]
mod tests;

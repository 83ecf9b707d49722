// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon control-surface wire protocol (added — §6 "Daemon control
//! surface"): a 4-byte big-endian length prefix followed by a JSON
//! payload, the same framing shape the originating daemon uses for its
//! own CLI. This socket is local-only and entirely separate from the
//! messaging transport; the remote user never reaches it.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

/// Maximum control-message size. Generous since payloads here are small
/// (session listings, not file contents).
pub const MAX_MESSAGE_SIZE: usize = 8 * 1024 * 1024;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum Request {
    /// Health check.
    Ping,
    /// Snapshot of daemon state: session counts, emergency mode, uptime.
    Status,
    /// Requests graceful (or immediate, if `kill`) shutdown.
    Shutdown { kill: bool },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum Response {
    Pong,
    Status {
        active_sessions: usize,
        paused_sessions: usize,
        terminated_sessions: usize,
        emergency: bool,
        pending_approvals: usize,
        uptime_secs: u64,
    },
    ShuttingDown,
    Error {
        message: String,
    },
}

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("message too large: {size} bytes (max {max})")]
    MessageTooLarge { size: usize, max: usize },
    #[error("connection closed")]
    ConnectionClosed,
}

pub async fn read_message<R: AsyncReadExt + Unpin>(reader: &mut R) -> Result<Vec<u8>, ProtocolError> {
    let mut len_buf = [0u8; 4];
    match reader.read_exact(&mut len_buf).await {
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
            return Err(ProtocolError::ConnectionClosed)
        }
        Err(e) => return Err(ProtocolError::Io(e)),
    }
    let len = u32::from_be_bytes(len_buf) as usize;
    if len > MAX_MESSAGE_SIZE {
        return Err(ProtocolError::MessageTooLarge { size: len, max: MAX_MESSAGE_SIZE });
    }
    let mut buf = vec![0u8; len];
    reader.read_exact(&mut buf).await?;
    Ok(buf)
}

pub async fn write_message<W: AsyncWriteExt + Unpin>(writer: &mut W, data: &[u8]) -> Result<(), ProtocolError> {
    if data.len() > MAX_MESSAGE_SIZE {
        return Err(ProtocolError::MessageTooLarge { size: data.len(), max: MAX_MESSAGE_SIZE });
    }
    writer.write_all(&(data.len() as u32).to_be_bytes()).await?;
    writer.write_all(data).await?;
    writer.flush().await?;
    Ok(())
}

pub async fn read_request<R: AsyncReadExt + Unpin>(reader: &mut R) -> Result<Request, ProtocolError> {
    let bytes = read_message(reader).await?;
    Ok(serde_json::from_slice(&bytes)?)
}

pub async fn write_request<W: AsyncWriteExt + Unpin>(writer: &mut W, req: &Request) -> Result<(), ProtocolError> {
    write_message(writer, &serde_json::to_vec(req)?).await
}

pub async fn read_response<R: AsyncReadExt + Unpin>(reader: &mut R) -> Result<Response, ProtocolError> {
    let bytes = read_message(reader).await?;
    Ok(serde_json::from_slice(&bytes)?)
}

pub async fn write_response<W: AsyncWriteExt + Unpin>(writer: &mut W, resp: &Response) -> Result<(), ProtocolError> {
    write_message(writer, &serde_json::to_vec(resp)?).await
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the broker engine.

use broker_storage::WalError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("session not found: {0}")]
    SessionNotFound(String),
    #[error("invalid transition {from} -> {to}")]
    InvalidTransition { from: String, to: String },
    #[error("session {id} is in state {actual}, expected {expected}")]
    StateMismatch {
        id: String,
        expected: String,
        actual: String,
    },
    #[error("approval request not found: {0}")]
    ApprovalNotFound(String),
    #[error("thread {thread_id} is already mapped to {project_path}")]
    ThreadAlreadyMapped { thread_id: String, project_path: String },
    #[error("project {project_path} is already mapped by thread {thread_id}")]
    ProjectAlreadyMapped { project_path: String, thread_id: String },
    #[error("no active session for thread: {0}")]
    NoActiveSession(String),
    #[error("no mapping for thread: {0}")]
    ThreadMappingNotFound(String),
    #[error("custom command not found: {0}")]
    CommandNotFound(String),
    #[error("unknown event type: {0}")]
    UnknownEventType(String),
    #[error("cannot change notification preference for urgency class {0}")]
    NotificationClassLocked(String),
    #[error("wal error: {0}")]
    Wal(#[from] WalError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Approval Workflow (§4.4): an in-memory ledger of tool-call approval
//! requests, a timeout sweep, and the cooperative wait primitive the
//! Stream Orchestrator blocks on.
//!
//! Deliberately not persisted: a process restart implicitly times out
//! every pending request, which is the desired fail-safe behavior for a
//! gate on destructive operations.

use std::collections::BTreeMap;
use std::time::Duration;

use broker_core::ApprovalId;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use crate::error::EngineError;
use crate::operation_classifier::ToolCall;

const TIMEOUT_MINUTES: i64 = 10;
/// Default overall timeout for the cooperative wait (§4.4).
pub const WAIT_TIMEOUT: Duration = Duration::from_secs(600);
/// Poll interval for the cooperative wait.
pub const WAIT_POLL_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApprovalState {
    Pending,
    Approved,
    Rejected,
    Timeout,
}

#[derive(Debug, Clone)]
pub struct ApprovalRequest {
    pub id: ApprovalId,
    pub tool_call: ToolCall,
    pub reason: String,
    pub state: ApprovalState,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub struct ApprovalLedger {
    requests: Mutex<BTreeMap<ApprovalId, ApprovalRequest>>,
}

impl ApprovalLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&self, tool_call: ToolCall, reason: String) -> ApprovalRequest {
        let request = ApprovalRequest {
            id: ApprovalId::generate(),
            tool_call,
            reason,
            state: ApprovalState::Pending,
            timestamp: Utc::now(),
        };
        self.requests.lock().insert(request.id.clone(), request.clone());
        request
    }

    pub fn get(&self, id: &ApprovalId) -> Result<ApprovalRequest, EngineError> {
        self.requests
            .lock()
            .get(id)
            .cloned()
            .ok_or_else(|| EngineError::ApprovalNotFound(id.to_string()))
    }

    /// PENDING -> APPROVED. Idempotent on already-terminal requests.
    pub fn approve(&self, id: &ApprovalId) -> Result<ApprovalRequest, EngineError> {
        let mut requests = self.requests.lock();
        let request = requests
            .get_mut(id)
            .ok_or_else(|| EngineError::ApprovalNotFound(id.to_string()))?;
        if request.state == ApprovalState::Pending {
            request.state = ApprovalState::Approved;
        }
        Ok(request.clone())
    }

    /// PENDING -> REJECTED. Must not override a non-PENDING terminal state.
    pub fn reject(&self, id: &ApprovalId) -> Result<ApprovalRequest, EngineError> {
        let mut requests = self.requests.lock();
        let request = requests
            .get_mut(id)
            .ok_or_else(|| EngineError::ApprovalNotFound(id.to_string()))?;
        if request.state == ApprovalState::Pending {
            request.state = ApprovalState::Rejected;
        }
        Ok(request.clone())
    }

    /// Approves every PENDING request, returning the count approved.
    pub fn approve_all(&self) -> usize {
        let mut requests = self.requests.lock();
        let mut count = 0;
        for request in requests.values_mut() {
            if request.state == ApprovalState::Pending {
                request.state = ApprovalState::Approved;
                count += 1;
            }
        }
        count
    }

    pub fn list_pending(&self) -> Vec<ApprovalRequest> {
        self.requests
            .lock()
            .values()
            .filter(|r| r.state == ApprovalState::Pending)
            .cloned()
            .collect()
    }

    /// Transitions every PENDING request older than 10 minutes to TIMEOUT.
    /// Run independently from the 1-second cooperative-wait poll, on its
    /// own 1-minute tick.
    pub fn check_timeouts(&self) -> usize {
        let now = Utc::now();
        let mut requests = self.requests.lock();
        let mut count = 0;
        for request in requests.values_mut() {
            if request.state == ApprovalState::Pending
                && now.signed_duration_since(request.timestamp)
                    >= chrono::Duration::minutes(TIMEOUT_MINUTES)
            {
                request.state = ApprovalState::Timeout;
                count += 1;
            }
        }
        count
    }

    /// Cooperative wait: polls `get(id)` every [`WAIT_POLL_INTERVAL`] until
    /// the state is non-PENDING or [`WAIT_TIMEOUT`] elapses, at which point
    /// the caller treats the request as rejected.
    pub async fn wait_for_decision(&self, id: &ApprovalId) -> Result<ApprovalState, EngineError> {
        let deadline = tokio::time::Instant::now() + WAIT_TIMEOUT;
        loop {
            let request = self.get(id)?;
            if request.state != ApprovalState::Pending {
                return Ok(request.state);
            }
            if tokio::time::Instant::now() >= deadline {
                return Ok(ApprovalState::Timeout);
            }
            tokio::time::sleep(WAIT_POLL_INTERVAL).await;
        }
    }
}

#[cfg(test)]
#[path = "approval_tests.rs"]
mod tests;

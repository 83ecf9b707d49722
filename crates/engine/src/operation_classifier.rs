// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Operation Classifier & Emergency Override (§4.5).

use broker_core::{EmergencyState, Event};
use chrono::Utc;

use crate::error::EngineError;
use crate::output_classifier::OutputEvent;
use crate::store::Store;

/// A snapshot of an intercepted tool invocation, as recorded on an
/// approval request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCall {
    pub tool: String,
    pub detail: String,
}

impl ToolCall {
    /// Lifts a classified `ToolCall` output event into an operation-layer
    /// `ToolCall`. Returns `None` for non-tool-call events.
    pub fn from_output_event(event: &OutputEvent) -> Option<Self> {
        match event {
            OutputEvent::ToolCall { tool, target } => Some(Self {
                tool: tool.clone(),
                detail: target.clone(),
            }),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Safe,
    Destructive,
}

const SAFE_TOOLS: [&str; 3] = ["read", "grep", "glob"];
const DESTRUCTIVE_TOOLS: [&str; 3] = ["edit", "write", "bash"];

/// `ToolCall -> (Safe|Destructive, reason)`. Unknown/missing tool names
/// default to Destructive (fail-safe). Matching is case-insensitive.
pub fn classify(tool_call: &ToolCall) -> (Classification, String) {
    let lower = tool_call.tool.to_lowercase();
    if SAFE_TOOLS.contains(&lower.as_str()) {
        return (
            Classification::Safe,
            format!("{} is a read-only tool", tool_call.tool),
        );
    }
    if DESTRUCTIVE_TOOLS.contains(&lower.as_str()) {
        return (
            Classification::Destructive,
            format!("{} can modify state", tool_call.tool),
        );
    }
    (
        Classification::Destructive,
        format!("unrecognized tool '{}' defaults to destructive", tool_call.tool),
    )
}

/// Manages the persisted emergency-mode singleton and the classifier
/// override it applies to Safe tool calls.
#[derive(Clone)]
pub struct EmergencyMode {
    store: Store,
}

impl EmergencyMode {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    pub fn state(&self) -> EmergencyState {
        self.store.state().emergency.clone()
    }

    pub fn is_active(&self) -> bool {
        self.state().is_emergency()
    }

    pub fn activate(&self, thread_id: &str) -> Result<EmergencyState, EngineError> {
        self.store.apply(Event::EmergencyActivated {
            thread_id: thread_id.to_string(),
            at: Utc::now(),
        })?;
        Ok(self.state())
    }

    pub fn deactivate(&self) -> Result<EmergencyState, EngineError> {
        self.store.apply(Event::EmergencyDeactivated)?;
        Ok(self.state())
    }

    /// True when emergency mode is active and the operation classified as
    /// Safe should auto-approve without creating an approval request.
    /// Destructive tools always require approval regardless of mode.
    pub fn auto_approves(&self, classification: Classification) -> bool {
        classification == Classification::Safe && self.is_active()
    }
}

#[cfg(test)]
#[path = "operation_classifier_tests.rs"]
mod tests;

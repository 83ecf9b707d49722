// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
// Enable coverage(off) attribute for excluding test infrastructure
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Adapters for external I/O: the coding-assistant child process and the
//! messaging transport.

pub mod process;
pub mod subprocess;
pub mod transport;

pub use process::{Bridge, ProcessSupervisor, SpawnConfig, SupervisorError};
pub use subprocess::{run_with_timeout, SUPERVISOR_STOP_TIMEOUT};
pub use transport::{
    ConnectionState, InboundMessage, InvalidTransition, OutboundBuffer, RateLimitDecision,
    RateLimiter, ReconnectionManager, StdioTransport, TransportClient, TransportError,
};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use process::FakeSupervisor;
#[cfg(any(test, feature = "test-support"))]
pub use transport::FakeTransport;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! The broker engine: the five synchronous subsystems that sit on top of
//! the single-writer [`store::Store`] and have no transport or process
//! I/O of their own (§4.1, §4.3, §4.4, §4.5, §4.11).

pub mod approval;
pub mod custom_command;
pub mod diff;
mod error;
pub mod formatter;
pub mod notification;
pub mod operation_classifier;
pub mod output_classifier;
pub mod session;
pub mod store;
pub mod thread_mapping;

pub use approval::{ApprovalLedger, ApprovalRequest, ApprovalState};
pub use custom_command::{parse_front_matter, CustomCommandCatalog, FrontMatterError, ParsedFrontMatter};
pub use error::EngineError;
pub use formatter::{chunk_text, format_event, needs_attachment, wrap_for_mobile};
pub use notification::{categorize, NotificationPreferences, UrgencyLevel};
pub use operation_classifier::{classify as classify_operation, Classification, EmergencyMode, ToolCall};
pub use output_classifier::{classify as classify_output, OutputEvent};
pub use session::SessionLifecycle;
pub use store::Store;
pub use thread_mapping::ThreadMappingService;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Newtype identifiers shared across the broker.

crate::define_id! {
    /// Opaque identity of a durable session.
    pub struct SessionId;
}

crate::define_id! {
    /// Opaque identity of an in-memory approval request.
    pub struct ApprovalId;
}

impl SessionId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl ApprovalId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Thread <-> project path bijection.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One side of the `thread_id <-> project_path` bijection (§3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreadMapping {
    pub thread_id: String,
    pub project_path: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

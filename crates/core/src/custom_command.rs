// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Catalog entry for a user-defined command, mirrored from a markdown file
//! with YAML front-matter in the watched directory (§6).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomCommand {
    pub name: String,
    pub file_path: PathBuf,
    #[serde(default)]
    pub metadata: BTreeMap<String, Value>,
    pub updated_at: DateTime<Utc>,
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Custom command catalog (§3, §4.8 `/custom`): a CRUD table mirrored
//! from a directory of markdown files with YAML front-matter.
//!
//! The directory watch itself is plumbing (§9 "File-watcher for custom
//! commands") and lives in the daemon crate; this module owns parsing the
//! front-matter and the catalog's CRUD surface over the shared store.

use std::collections::BTreeMap;
use std::path::PathBuf;

use broker_core::{CustomCommand, Event};
use chrono::Utc;
use serde_json::Value;
use thiserror::Error;

use crate::error::EngineError;
use crate::store::Store;

#[derive(Debug, Error)]
pub enum FrontMatterError {
    #[error("file has no YAML front-matter block")]
    MissingBlock,
    #[error("front-matter is not valid YAML: {0}")]
    InvalidYaml(#[from] serde_yaml::Error),
    #[error("front-matter is missing required key `name`")]
    MissingName,
}

/// The front-matter fields of a custom command file, before it's been
/// assigned a `file_path` or `updated_at`.
pub struct ParsedFrontMatter {
    pub name: String,
    pub metadata: BTreeMap<String, Value>,
}

/// Parses the leading `---`-delimited YAML front-matter block out of a
/// markdown file's contents. The required `name` key is pulled out of the
/// map; every other key is kept as opaque metadata.
pub fn parse_front_matter(content: &str) -> Result<ParsedFrontMatter, FrontMatterError> {
    let trimmed = content.trim_start();
    let rest = trimmed
        .strip_prefix("---")
        .ok_or(FrontMatterError::MissingBlock)?;
    let end = rest
        .find("\n---")
        .ok_or(FrontMatterError::MissingBlock)?;
    let yaml = &rest[..end];

    let mut fields: BTreeMap<String, serde_yaml::Value> = serde_yaml::from_str(yaml)?;
    let name_value = fields.remove("name").ok_or(FrontMatterError::MissingName)?;
    let name = name_value
        .as_str()
        .map(str::to_string)
        .ok_or(FrontMatterError::MissingName)?;
    if name.is_empty() {
        return Err(FrontMatterError::MissingName);
    }

    let metadata = fields
        .into_iter()
        .filter_map(|(k, v)| {
            serde_json::to_value(v)
                .ok()
                .map(|json| (k, json))
        })
        .collect();

    Ok(ParsedFrontMatter { name, metadata })
}

/// CRUD surface over the `commands` store (§6).
#[derive(Clone)]
pub struct CustomCommandCatalog {
    store: Store,
}

impl CustomCommandCatalog {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Upserts a command entry, as triggered by the directory mirror's
    /// `created`/`modified` events.
    pub fn sync(
        &self,
        name: &str,
        file_path: PathBuf,
        metadata: BTreeMap<String, Value>,
    ) -> Result<CustomCommand, EngineError> {
        let command = CustomCommand {
            name: name.to_string(),
            file_path,
            metadata,
            updated_at: Utc::now(),
        };
        self.store.apply(Event::CustomCommandSynced { command: command.clone() })?;
        Ok(command)
    }

    /// Removes an entry, as triggered by the mirror's `deleted` event.
    pub fn remove(&self, name: &str) -> Result<(), EngineError> {
        self.store.apply(Event::CustomCommandRemoved { name: name.to_string() })?;
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<CustomCommand, EngineError> {
        self.store
            .state()
            .commands
            .get(name)
            .cloned()
            .ok_or_else(|| EngineError::CommandNotFound(name.to_string()))
    }

    pub fn list(&self) -> Vec<CustomCommand> {
        self.store.state().commands.values().cloned().collect()
    }
}

#[cfg(test)]
#[path = "custom_command_tests.rs"]
mod tests;

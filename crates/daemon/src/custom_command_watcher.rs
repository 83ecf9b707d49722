// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Custom command directory mirror (§9 "File-watcher for custom
//! commands"): the watch itself is plumbing, so this module's only job
//! is translating filesystem events on `.md` files into the catalog's
//! CRUD calls. An initial full scan seeds the catalog before the watcher
//! takes over for subsequent changes.

use std::path::{Path, PathBuf};

use broker_engine::{parse_front_matter, CustomCommandCatalog};
use notify::{Event as NotifyEvent, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Scans `dir` once, syncing every `.md` file with valid front-matter
/// into the catalog. Called at startup before the watcher is armed.
pub fn initial_scan(dir: &Path, catalog: &CustomCommandCatalog) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        debug!(target: "custom_command_watcher", dir = %dir.display(), "custom commands dir not found, skipping scan");
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.extension().is_some_and(|ext| ext == "md") {
            sync_path(&path, catalog);
        }
    }
}

/// Spawns the background watcher task, returning the live
/// [`RecommendedWatcher`] guard (dropping it stops the watch) and a
/// shutdown handle for the processing task.
pub fn spawn(dir: PathBuf, catalog: CustomCommandCatalog) -> Option<RecommendedWatcher> {
    let (tx, mut rx) = mpsc::channel(64);

    let mut watcher = match notify::recommended_watcher(move |res: Result<NotifyEvent, notify::Error>| {
        if let Ok(event) = res {
            let _ = tx.blocking_send(event);
        }
    }) {
        Ok(w) => w,
        Err(err) => {
            warn!(target: "custom_command_watcher", %err, "failed to create file watcher, custom commands will not live-reload");
            return None;
        }
    };

    if let Err(err) = watcher.watch(&dir, RecursiveMode::NonRecursive) {
        warn!(target: "custom_command_watcher", %err, dir = %dir.display(), "failed to watch custom commands dir");
        return None;
    }

    tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            handle_event(&event, &catalog);
        }
    });

    Some(watcher)
}

fn handle_event(event: &NotifyEvent, catalog: &CustomCommandCatalog) {
    for path in &event.paths {
        if !path.extension().is_some_and(|ext| ext == "md") {
            continue;
        }
        match event.kind {
            EventKind::Create(_) | EventKind::Modify(_) => sync_path(path, catalog),
            EventKind::Remove(_) => remove_path(path, catalog),
            _ => {}
        }
    }
}

fn sync_path(path: &Path, catalog: &CustomCommandCatalog) {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(err) => {
            warn!(target: "custom_command_watcher", %err, path = %path.display(), "failed to read custom command file");
            return;
        }
    };
    match parse_front_matter(&content) {
        Ok(parsed) => {
            if let Err(err) = catalog.sync(&parsed.name, path.to_path_buf(), parsed.metadata) {
                warn!(target: "custom_command_watcher", %err, path = %path.display(), "failed to sync custom command");
            }
        }
        Err(err) => {
            debug!(target: "custom_command_watcher", %err, path = %path.display(), "skipping file with invalid front-matter");
        }
    }
}

fn remove_path(path: &Path, catalog: &CustomCommandCatalog) {
    let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
        return;
    };
    if catalog.get(stem).is_ok() {
        let _ = catalog.remove(stem);
    }
}

#[cfg(test)]
#[path = "custom_command_watcher_tests.rs"]
mod tests;

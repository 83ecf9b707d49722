// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use broker_engine::Store;
use std::time::Duration;
use tempfile::tempdir;

fn catalog(dir: &std::path::Path) -> CustomCommandCatalog {
    let store = Store::open(&dir.join("events.wal")).unwrap();
    CustomCommandCatalog::new(store)
}

#[test]
fn initial_scan_syncs_valid_markdown_files() {
    let dir = tempdir().unwrap();
    let commands_dir = dir.path().join("commands");
    std::fs::create_dir_all(&commands_dir).unwrap();
    std::fs::write(
        commands_dir.join("standup.md"),
        "---\nname: standup\ndescription: daily check-in\n---\nBody text.",
    )
    .unwrap();
    std::fs::write(commands_dir.join("notes.txt"), "not markdown").unwrap();

    let cat = catalog(dir.path());
    initial_scan(&commands_dir, &cat);

    let commands = cat.list();
    assert_eq!(commands.len(), 1);
    assert_eq!(commands[0].name, "standup");
}

#[test]
fn initial_scan_skips_files_without_front_matter() {
    let dir = tempdir().unwrap();
    let commands_dir = dir.path().join("commands");
    std::fs::create_dir_all(&commands_dir).unwrap();
    std::fs::write(commands_dir.join("broken.md"), "no front matter here").unwrap();

    let cat = catalog(dir.path());
    initial_scan(&commands_dir, &cat);

    assert!(cat.list().is_empty());
}

#[tokio::test]
async fn spawn_picks_up_a_file_created_after_start() {
    let dir = tempdir().unwrap();
    let commands_dir = dir.path().join("commands");
    std::fs::create_dir_all(&commands_dir).unwrap();

    let cat = catalog(dir.path());
    let _watcher = spawn(commands_dir.clone(), cat.clone());

    std::fs::write(
        commands_dir.join("deploy.md"),
        "---\nname: deploy\n---\nrun the deploy playbook",
    )
    .unwrap();

    let mut found = false;
    for _ in 0..50 {
        tokio::time::sleep(Duration::from_millis(50)).await;
        if cat.get("deploy").is_ok() {
            found = true;
            break;
        }
    }
    assert!(found, "watcher did not pick up the new command file in time");
}

//! Test helpers for the black-box broker specs.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, dead_code)]

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

pub const SPEC_POLL_INTERVAL_MS: u64 = 10;
pub const SPEC_WAIT_MAX_MS: u64 = 2000;

/// Poll a condition until it returns true or the timeout elapses.
pub fn wait_for<F>(timeout_ms: u64, mut condition: F) -> bool
where
    F: FnMut() -> bool,
{
    let start = std::time::Instant::now();
    let timeout = std::time::Duration::from_millis(timeout_ms);
    let poll_interval = std::time::Duration::from_millis(SPEC_POLL_INTERVAL_MS);
    while start.elapsed() < timeout {
        if condition() {
            return true;
        }
        std::thread::sleep(poll_interval);
    }
    false
}

/// Resolves a workspace binary's path under `target/debug`, falling back
/// to a path relative to the test binary itself when `CARGO_MANIFEST_DIR`
/// points somewhere the binary wasn't actually built.
fn binary_path(name: &str) -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));

    let standard = manifest_dir.join("target/debug").join(name);
    if standard.exists() {
        return standard;
    }

    if let Ok(exe) = std::env::current_exe() {
        if let Some(debug_dir) = exe.parent().and_then(|d| d.parent()) {
            let fallback = debug_dir.join(name);
            if fallback.exists() {
                return fallback;
            }
        }
    }

    standard
}

pub fn brokerd_binary() -> PathBuf {
    binary_path("oddjob-brokerd")
}

pub fn brokerctl_binary() -> PathBuf {
    binary_path("oddjob-brokerctl")
}

pub fn brokerd_cmd() -> Command {
    Command::new(brokerd_binary())
}

pub fn brokerctl_cmd() -> Command {
    Command::new(brokerctl_binary())
}

/// A running `oddjob-brokerd` process bound to its own isolated state
/// directory, cleaned up (killed, if still alive) on drop.
pub struct Daemon {
    child: std::process::Child,
    state_dir: tempfile::TempDir,
}

impl Daemon {
    /// Spawns the daemon and blocks until its control socket appears (or
    /// panics after `SPEC_WAIT_MAX_MS`).
    pub fn start() -> Self {
        let state_dir = tempfile::tempdir().expect("tempdir");
        let child = brokerd_cmd()
            .env("OJB_STATE_DIR", state_dir.path())
            .env("BROKER_AUTHORIZED_THREAD", "owner")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .expect("brokerd should spawn");

        let socket_path = state_dir.path().join("daemon.sock");
        let daemon = Self { child, state_dir };
        assert!(
            wait_for(SPEC_WAIT_MAX_MS, || socket_path.exists()),
            "daemon did not bind its control socket in time"
        );
        daemon
    }

    pub fn state_dir(&self) -> &Path {
        self.state_dir.path()
    }

    /// A `Command` for `oddjob-brokerctl` scoped to this daemon's socket.
    pub fn ctl(&self) -> Command {
        let mut cmd = brokerctl_cmd();
        cmd.env("OJB_STATE_DIR", self.state_dir.path());
        cmd
    }

    /// Requests shutdown over the control socket and waits for the
    /// process to exit, returning whether it exited on its own within
    /// the timeout (as opposed to needing a hard kill).
    pub fn shutdown(mut self) -> bool {
        let _ = self.ctl().arg("shutdown").output();
        let exited = wait_for(SPEC_WAIT_MAX_MS, || {
            matches!(self.child.try_wait(), Ok(Some(_)))
        });
        if !exited {
            let _ = self.child.kill();
            let _ = self.child.wait();
        }
        exited
    }
}

impl Drop for Daemon {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process supervision for the coding-assistant child process.
//!
//! One [`ProcessSupervisor`] instance is owned per session. It spawns the
//! assistant binary with piped stdio, exposes a line-oriented bridge for
//! sending commands and reading responses, and tears the child down
//! gracefully (SIGTERM, then SIGKILL after a timeout) on stop.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::sync::Mutex;
use tracing::warn;

#[derive(Debug, Error)]
pub enum SupervisorError {
    #[error("process already running")]
    AlreadyRunning,
    #[error("process not running")]
    NotRunning,
    #[error("failed to spawn child: {0}")]
    Spawn(#[source] std::io::Error),
    #[error("io error: {0}")]
    Io(#[source] std::io::Error),
    #[error("child did not inherit a piped {0} handle")]
    MissingStdio(&'static str),
}

/// Configuration for spawning the coding-assistant child process.
#[derive(Debug, Clone)]
pub struct SpawnConfig {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: PathBuf,
}

/// A line-oriented bridge onto a running child's stdin/stdout.
pub struct Bridge {
    stdin: ChildStdin,
    lines: Lines<BufReader<ChildStdout>>,
}

impl Bridge {
    /// Writes `text` followed by a newline and flushes.
    pub async fn send_command(&mut self, text: &str) -> Result<(), SupervisorError> {
        self.stdin
            .write_all(text.as_bytes())
            .await
            .map_err(SupervisorError::Io)?;
        self.stdin.write_all(b"\n").await.map_err(SupervisorError::Io)?;
        self.stdin.flush().await.map_err(SupervisorError::Io)
    }

    /// Reads the next line of output, with the trailing newline stripped.
    /// Returns `Ok(None)` on EOF.
    pub async fn read_response(&mut self) -> Result<Option<String>, SupervisorError> {
        self.lines.next_line().await.map_err(SupervisorError::Io)
    }
}

/// Supervises a single coding-assistant child process.
pub struct ProcessSupervisor {
    child: Mutex<Option<Child>>,
    bridge: Mutex<Option<Bridge>>,
}

impl Default for ProcessSupervisor {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessSupervisor {
    pub fn new() -> Self {
        Self {
            child: Mutex::new(None),
            bridge: Mutex::new(None),
        }
    }

    /// Spawns the child with piped stdio. Fails if already running.
    pub async fn start(&self, config: &SpawnConfig) -> Result<(), SupervisorError> {
        let mut guard = self.child.lock().await;
        if guard.is_some() {
            return Err(SupervisorError::AlreadyRunning);
        }

        let mut cmd = Command::new(&config.program);
        cmd.args(&config.args)
            .current_dir(&config.cwd)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            cmd.process_group(0);
        }

        let mut child = cmd.spawn().map_err(SupervisorError::Spawn)?;

        let stdin = child.stdin.take().ok_or(SupervisorError::MissingStdio("stdin"))?;
        let stdout = child.stdout.take().ok_or(SupervisorError::MissingStdio("stdout"))?;
        let stderr = child.stderr.take().ok_or(SupervisorError::MissingStdio("stderr"))?;

        tokio::spawn(async move {
            let mut stderr_lines = BufReader::new(stderr).lines();
            while let Ok(Some(line)) = stderr_lines.next_line().await {
                warn!(target: "process_supervisor", %line, "child stderr");
            }
        });

        *self.bridge.lock().await = Some(Bridge {
            stdin,
            lines: BufReader::new(stdout).lines(),
        });
        *guard = Some(child);
        Ok(())
    }

    /// True when a child has been started and has not yet exited.
    pub async fn is_running(&self) -> bool {
        let mut guard = self.child.lock().await;
        match guard.as_mut() {
            None => false,
            Some(child) => matches!(child.try_wait(), Ok(None)),
        }
    }

    /// Exposes the send/read bridge. Returns `None` if not running.
    pub async fn bridge(&self) -> tokio::sync::MutexGuard<'_, Option<Bridge>> {
        self.bridge.lock().await
    }

    /// Sends graceful termination, waits up to `timeout`, then kills.
    /// Idempotent when the process is already stopped.
    pub async fn stop(&self, timeout: Duration) -> Result<(), SupervisorError> {
        let mut guard = self.child.lock().await;
        let Some(child) = guard.as_mut() else {
            return Ok(());
        };

        #[cfg(unix)]
        {
            if let Some(pid) = child.id() {
                // Signals the whole process group (negative pid), since the
                // child was spawned with process_group(0) above.
                let _ = std::process::Command::new("kill")
                    .args(["-TERM", &format!("-{pid}")])
                    .stdin(Stdio::null())
                    .stdout(Stdio::null())
                    .stderr(Stdio::null())
                    .status();
            }
        }
        #[cfg(not(unix))]
        {
            let _ = child.start_kill();
        }

        let reaped = tokio::time::timeout(timeout, child.wait()).await;
        if reaped.is_err() {
            child.start_kill().map_err(SupervisorError::Io)?;
            child.wait().await.map_err(SupervisorError::Io)?;
        }

        *guard = None;
        *self.bridge.lock().await = None;
        Ok(())
    }
}

#[cfg(any(test, feature = "test-support"))]
pub mod fake {
    //! A scripted, in-memory stand-in for [`ProcessSupervisor`] used by
    //! engine-crate tests that need to drive a session's output stream
    //! without spawning a real child.
    use super::SpawnConfig;
    use parking_lot::Mutex;
    use std::collections::VecDeque;
    use std::sync::Arc;

    #[derive(Debug, Clone, Default)]
    pub struct FakeSupervisor {
        inner: Arc<Mutex<FakeInner>>,
    }

    #[derive(Debug, Default)]
    struct FakeInner {
        running: bool,
        sent: Vec<String>,
        output: VecDeque<String>,
    }

    impl FakeSupervisor {
        pub fn new() -> Self {
            Self::default()
        }

        /// Queues a line for `read_response` to yield.
        pub fn push_output(&self, line: impl Into<String>) {
            self.inner.lock().output.push_back(line.into());
        }

        pub fn sent_commands(&self) -> Vec<String> {
            self.inner.lock().sent.clone()
        }

        pub fn start(&self, _config: &SpawnConfig) {
            self.inner.lock().running = true;
        }

        pub fn is_running(&self) -> bool {
            self.inner.lock().running
        }

        pub fn send_command(&self, text: &str) {
            self.inner.lock().sent.push(text.to_string());
        }

        pub fn read_response(&self) -> Option<String> {
            self.inner.lock().output.pop_front()
        }

        pub fn stop(&self) {
            self.inner.lock().running = false;
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeSupervisor;

#[cfg(test)]
#[path = "process_tests.rs"]
mod tests;

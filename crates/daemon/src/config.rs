// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon configuration: state directory layout, subprocess spawn
//! arguments, and the handful of tunables named throughout the spec
//! (batch interval, outbound buffer capacity, rate limits). Loading a
//! config file is plumbing, out of scope (§1); this struct just holds
//! the resolved values with sensible defaults.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not determine a home directory for the broker's state dir")]
    NoHomeDir,
}

/// The single authorized remote identity and the runtime's file layout
/// and tunables.
#[derive(Debug, Clone)]
pub struct Config {
    /// The one messaging-transport identity the daemon will act on
    /// (§4.8 step 1, §9 "single-user security model").
    pub authorized_thread_id: String,
    pub state_dir: PathBuf,
    pub wal_path: PathBuf,
    pub snapshot_path: PathBuf,
    /// Unix-domain socket for the `oddjob-brokerctl` control surface
    /// (added — §6 "Daemon control surface"). Never reachable from the
    /// remote messaging user.
    pub socket_path: PathBuf,
    /// Advisory single-instance lock, holding the running PID.
    pub lock_path: PathBuf,
    pub log_path: PathBuf,
    pub custom_commands_dir: PathBuf,
    /// argv for the coding-assistant child, sans the `cwd` (set per
    /// session to the session's `project_path`, §4.2).
    pub assistant_program: String,
    pub assistant_args: Vec<String>,
    pub graceful_stop_timeout: Duration,
    pub batch_interval: Duration,
    pub outbound_buffer_capacity: usize,
    pub rate_limit_burst: u32,
    pub rate_limit_per_min: u32,
    pub attachment_warn_bytes: u64,
    pub attachment_reject_bytes: u64,
    pub chunk_max_chars: usize,
}

impl Config {
    /// Resolves the state directory and every tunable, honoring the
    /// `OJB_*` environment overrides named in §1's ambient-stack section.
    /// A config *file* is explicitly out of scope (§1 Non-goals).
    pub fn load() -> Result<Self, ConfigError> {
        let state_dir = std::env::var_os("OJB_STATE_DIR")
            .map(PathBuf::from)
            .map_or_else(default_state_dir, Ok)?;
        let custom_commands_dir = dirs_home()?.join(".claude").join("agents");
        Ok(Self {
            authorized_thread_id: std::env::var("BROKER_AUTHORIZED_THREAD")
                .unwrap_or_else(|_| "owner".to_string()),
            wal_path: state_dir.join("wal").join("events.wal"),
            snapshot_path: state_dir.join("snapshot.zst"),
            socket_path: state_dir.join("daemon.sock"),
            lock_path: state_dir.join("daemon.pid"),
            log_path: state_dir.join("daemon.log"),
            custom_commands_dir,
            assistant_program: "claude".to_string(),
            assistant_args: vec!["--print".to_string()],
            graceful_stop_timeout: env_duration_secs("OJB_STOP_TIMEOUT_SECS", 5),
            batch_interval: env_duration_ms("OJB_BATCH_INTERVAL_MS", 500),
            outbound_buffer_capacity: env_usize("OJB_OUTBOUND_BUFFER_CAP", 100),
            rate_limit_burst: env_u32("OJB_RATE_LIMIT_BURST", 5),
            rate_limit_per_min: env_u32("OJB_RATE_LIMIT_PER_MIN", 30),
            attachment_warn_bytes: env_u64("OJB_ATTACHMENT_WARN_BYTES", 10 * 1024 * 1024),
            attachment_reject_bytes: env_u64("OJB_ATTACHMENT_REJECT_BYTES", 100 * 1024 * 1024),
            chunk_max_chars: env_usize("OJB_CHUNK_MAX_CHARS", 1600),
            state_dir,
        })
    }
}

fn env_parsed<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_usize(key: &str, default: usize) -> usize {
    env_parsed(key, default)
}

fn env_u32(key: &str, default: u32) -> u32 {
    env_parsed(key, default)
}

fn env_u64(key: &str, default: u64) -> u64 {
    env_parsed(key, default)
}

fn env_duration_secs(key: &str, default_secs: u64) -> Duration {
    Duration::from_secs(env_parsed(key, default_secs))
}

fn env_duration_ms(key: &str, default_ms: u64) -> Duration {
    Duration::from_millis(env_parsed(key, default_ms))
}

fn dirs_home() -> Result<PathBuf, ConfigError> {
    dirs::home_dir().ok_or(ConfigError::NoHomeDir)
}

fn default_state_dir() -> Result<PathBuf, ConfigError> {
    if let Some(xdg) = std::env::var_os("XDG_STATE_HOME") {
        return Ok(PathBuf::from(xdg).join("broker"));
    }
    Ok(dirs_home()?.join(".local").join("state").join("broker"))
}

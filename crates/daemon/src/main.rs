// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! oddjob-brokerd: the broker daemon binary. Acquires the single-instance
//! lock, sets up structured logging, opens persisted state (replaying the
//! WAL on top of the latest snapshot, recovering any sessions left ACTIVE
//! by a crash), and runs every long-lived task until a shutdown signal.

use std::io::Write;

use broker_adapters::StdioTransport;
use broker_daemon::Config;
use fs2::FileExt;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    if let Some(arg) = std::env::args().nth(1) {
        match arg.as_str() {
            "--version" | "-V" => {
                println!("oddjob-brokerd {}", env!("CARGO_PKG_VERSION"));
                return;
            }
            "--help" | "-h" => {
                print_help();
                return;
            }
            _ => {
                eprintln!("error: unexpected argument '{arg}'");
                eprintln!("usage: oddjob-brokerd [--help | --version]");
                std::process::exit(1);
            }
        }
    }

    let config = match Config::load() {
        Ok(c) => c,
        Err(err) => {
            eprintln!("fatal: {err}");
            std::process::exit(1);
        }
    };

    if let Some(parent) = config.lock_path.parent() {
        if let Err(err) = std::fs::create_dir_all(parent) {
            eprintln!("fatal: could not create state dir: {err}");
            std::process::exit(1);
        }
    }

    let _lock_file = match acquire_lock(&config.lock_path) {
        Ok(file) => file,
        Err(LockError::AlreadyRunning) => {
            let pid = std::fs::read_to_string(&config.lock_path).unwrap_or_default();
            eprintln!("oddjob-brokerd is already running");
            if !pid.trim().is_empty() {
                eprintln!("  pid: {}", pid.trim());
            }
            std::process::exit(1);
        }
        Err(LockError::Io(err)) => {
            eprintln!("fatal: could not acquire lock file: {err}");
            std::process::exit(1);
        }
    };

    let _log_guard = match setup_logging(&config) {
        Ok(guard) => guard,
        Err(err) => {
            eprintln!("fatal: failed to set up logging: {err}");
            std::process::exit(1);
        }
    };

    info!(target: "daemon", state_dir = %config.state_dir.display(), "starting oddjob-brokerd");

    println!("READY");

    if let Err(err) = broker_daemon::run(config, StdioTransport::new()).await {
        error!(target: "daemon", %err, "daemon exited with error");
        std::process::exit(1);
    }

    info!(target: "daemon", "clean shutdown");
}

fn print_help() {
    println!("oddjob-brokerd {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Bridges a messaging thread to per-project coding-assistant sessions.");
    println!("Not typically invoked directly; control it with oddjob-brokerctl.");
    println!();
    println!("OPTIONS:");
    println!("    -h, --help       Print help information");
    println!("    -V, --version    Print version information");
}

enum LockError {
    AlreadyRunning,
    Io(std::io::Error),
}

impl From<std::io::Error> for LockError {
    fn from(err: std::io::Error) -> Self {
        LockError::Io(err)
    }
}

/// Acquires the advisory single-instance lock (§1 ambient stack,
/// "single-instance guard") and stamps it with this process's PID. Held
/// for the lifetime of the returned `File`.
fn acquire_lock(lock_path: &std::path::Path) -> Result<std::fs::File, LockError> {
    let mut file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(lock_path)?;

    file.try_lock_exclusive().map_err(|_| LockError::AlreadyRunning)?;

    file.set_len(0)?;
    writeln!(file, "{}", std::process::id())?;
    Ok(file)
}

fn setup_logging(
    config: &Config,
) -> Result<tracing_appender::non_blocking::WorkerGuard, std::io::Error> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let dir = config
        .log_path
        .parent()
        .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::Other, "log path has no parent"))?;
    std::fs::create_dir_all(dir)?;

    let file_name = config
        .log_path
        .file_name()
        .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::Other, "log path has no file name"))?;
    let file_appender = tracing_appender::rolling::never(dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(non_blocking))
        .init();

    Ok(guard)
}

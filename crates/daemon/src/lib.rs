// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! broker-daemon: the task wiring that turns the engine subsystems into a
//! running process (§5 "task inventory") — the inbound receiver pump, the
//! router/queue processor, the connection-state monitor, the approval
//! timeout sweep, the WAL flush/checkpoint tasks, the custom-command
//! watcher, and the local control socket.

pub mod attachments;
pub mod config;
pub mod control;
pub mod custom_command_watcher;
pub mod notification_manager;
pub mod orchestrator;
pub mod protocol;
pub mod router;
pub mod state;
pub mod transport_client;

use std::sync::Arc;
use std::time::{Duration, Instant};

use broker_adapters::TransportClient;
use tracing::{error, info, warn};

pub use config::{Config, ConfigError};
pub use state::{AppState, StartupError};

use notification_manager::NotificationManager;
use transport_client::ResilientTransport;

/// Interval at which the approval ledger sweeps timed-out requests (§5
/// task inventory).
const APPROVAL_SWEEP_INTERVAL: Duration = Duration::from_secs(60);
/// Group-commit flush window for the WAL (§5 task inventory: "~10ms").
const WAL_FLUSH_INTERVAL: Duration = Duration::from_millis(10);
/// How often the materialized state is checkpointed to a fresh snapshot.
const CHECKPOINT_INTERVAL: Duration = Duration::from_secs(300);

/// Runs the daemon to completion: recovers crashed sessions, arms every
/// long-lived task, and blocks until a shutdown signal fires. `transport`
/// is the concrete messaging adapter (production wiring is a pluggable
/// choice, §4.6 — the daemon binary currently wires up [`broker_adapters::StdioTransport`]).
pub async fn run<T: TransportClient + 'static>(
    config: Config,
    transport: T,
) -> Result<(), StartupError> {
    let state = AppState::open(&config)?;
    let start_time = Instant::now();

    let recovered = state.sessions.recover().unwrap_or_default();
    if !recovered.is_empty() {
        info!(target: "daemon", count = recovered.len(), "recovered sessions paused after restart");
    }

    custom_command_watcher::initial_scan(&config.custom_commands_dir, &state.commands);
    let _watcher_guard =
        custom_command_watcher::spawn(config.custom_commands_dir.clone(), state.commands.clone());

    let resilient = ResilientTransport::new(
        Arc::new(transport),
        config.outbound_buffer_capacity,
        config.rate_limit_burst,
        config.rate_limit_per_min,
    );
    let notifications = NotificationManager::new(state.notifications.clone(), resilient.raw());

    let shutdown_notify = Arc::new(tokio::sync::Notify::new());
    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);

    let control_listener = match control::bind(&config.socket_path) {
        Ok(listener) => Some(listener),
        Err(err) => {
            warn!(target: "daemon", %err, "failed to bind control socket, continuing without it");
            None
        }
    };

    let mut tasks = Vec::new();

    if let Some(listener) = control_listener {
        tasks.push(tokio::spawn(control::run(
            listener,
            state.clone(),
            start_time,
            Arc::clone(&shutdown_notify),
            shutdown_rx.clone(),
        )));
    }

    tasks.push(tokio::spawn(run_reconnect_monitor_task(
        resilient.clone(),
        state.sessions.clone(),
        shutdown_rx.clone(),
    )));

    tasks.push(tokio::spawn(run_approval_sweep(state.clone(), shutdown_rx.clone())));
    tasks.push(tokio::spawn(run_wal_flush(state.clone(), shutdown_rx.clone())));
    tasks.push(tokio::spawn(run_checkpoint(state.clone(), shutdown_rx.clone())));

    tasks.push(tokio::spawn(run_inbound_pump(
        resilient.clone(),
        notifications,
        state.clone(),
        config.clone(),
        shutdown_rx.clone(),
    )));

    wait_for_shutdown(shutdown_notify, shutdown_tx).await;

    for task in tasks {
        let _ = task.await;
    }

    shutdown_sessions(&state, &config).await;
    final_checkpoint(&state);

    Ok(())
}

async fn run_inbound_pump<T: TransportClient>(
    transport: ResilientTransport<T>,
    notifications: NotificationManager<T>,
    state: AppState,
    config: Config,
    mut shutdown_rx: tokio::sync::watch::Receiver<bool>,
) {
    // Connect proactively; if it fails the reconnect monitor task takes over.
    let _ = transport.raw().connect().await;
    let mut inbound = transport.raw().receive_messages().await;

    loop {
        tokio::select! {
            message = inbound.recv() => {
                match message {
                    Some(msg) => {
                        router::dispatch(&state, &transport, &notifications, &config, &msg.thread_id, &msg.text).await;
                    }
                    None => {
                        info!(target: "daemon", "inbound stream closed");
                        return;
                    }
                }
            }
            _ = shutdown_rx.changed() => {
                if *shutdown_rx.borrow() {
                    return;
                }
            }
        }
    }
}

async fn run_reconnect_monitor_task<T: TransportClient>(
    transport: ResilientTransport<T>,
    sessions: broker_engine::SessionLifecycle,
    shutdown_rx: tokio::sync::watch::Receiver<bool>,
) {
    transport_client::run_reconnect_monitor(transport, sessions, shutdown_rx).await;
}

async fn run_approval_sweep(state: AppState, mut shutdown_rx: tokio::sync::watch::Receiver<bool>) {
    let mut ticker = tokio::time::interval(APPROVAL_SWEEP_INTERVAL);
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let timed_out = state.approvals.check_timeouts();
                if timed_out > 0 {
                    info!(target: "daemon", timed_out, "approval requests timed out");
                }
            }
            _ = shutdown_rx.changed() => {
                if *shutdown_rx.borrow() {
                    return;
                }
            }
        }
    }
}

async fn run_wal_flush(state: AppState, mut shutdown_rx: tokio::sync::watch::Receiver<bool>) {
    let mut ticker = tokio::time::interval(WAL_FLUSH_INTERVAL);
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if state.store.needs_flush() {
                    if let Err(err) = state.store.flush() {
                        error!(target: "daemon", %err, "wal flush failed");
                    }
                }
            }
            _ = shutdown_rx.changed() => {
                if *shutdown_rx.borrow() {
                    // Flush once more before the task exits (§5 shutdown behavior).
                    let _ = state.store.flush();
                    return;
                }
            }
        }
    }
}

async fn run_checkpoint(state: AppState, mut shutdown_rx: tokio::sync::watch::Receiver<bool>) {
    let mut ticker = tokio::time::interval(CHECKPOINT_INTERVAL);
    loop {
        tokio::select! {
            _ = ticker.tick() => checkpoint_once(&state),
            _ = shutdown_rx.changed() => {
                if *shutdown_rx.borrow() {
                    return;
                }
            }
        }
    }
}

fn checkpoint_once(state: &AppState) {
    let seq = state.store.processed_seq();
    let snapshot = state.store.snapshot_state();
    let handle = state.checkpointer.start(seq, &snapshot);
    match handle.wait() {
        Ok(result) => {
            info!(target: "daemon", seq = result.seq, bytes = result.size_bytes, "checkpoint complete");
            if let Err(err) = state.store.wal().lock().truncate_before(seq) {
                warn!(target: "daemon", %err, "wal truncation after checkpoint failed");
            }
        }
        Err(err) => warn!(target: "daemon", %err, "checkpoint failed"),
    }
}

fn final_checkpoint(state: &AppState) {
    checkpoint_once(state);
}

async fn shutdown_sessions(state: &AppState, config: &Config) {
    for session in state.sessions.list() {
        if session.status != broker_core::SessionStatus::Active {
            continue;
        }
        let supervisor = state.supervisor_for(&session.id);
        if let Err(err) = supervisor.stop(config.graceful_stop_timeout).await {
            warn!(target: "daemon", %err, session_id = %session.id, "failed to stop session process during shutdown");
        }
    }
}

/// Waits for either a SIGTERM/SIGINT or an explicit control-socket
/// shutdown request, then broadcasts the shutdown signal every task
/// observes.
async fn wait_for_shutdown(notify: Arc<tokio::sync::Notify>, tx: tokio::sync::watch::Sender<bool>) {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = match signal(SignalKind::terminate()) {
            Ok(s) => s,
            Err(err) => {
                error!(target: "daemon", %err, "failed to install SIGTERM handler");
                notify.notified().await;
                let _ = tx.send(true);
                return;
            }
        };
        let mut sigint = match signal(SignalKind::interrupt()) {
            Ok(s) => s,
            Err(err) => {
                error!(target: "daemon", %err, "failed to install SIGINT handler");
                notify.notified().await;
                let _ = tx.send(true);
                return;
            }
        };
        tokio::select! {
            _ = sigterm.recv() => info!(target: "daemon", "received SIGTERM"),
            _ = sigint.recv() => info!(target: "daemon", "received SIGINT"),
            _ = notify.notified() => info!(target: "daemon", "shutdown requested via control socket"),
        }
    }
    #[cfg(not(unix))]
    {
        notify.notified().await;
    }
    let _ = tx.send(true);
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon control-surface listener (added — §6): accepts connections on
//! the local Unix socket and answers `Ping`/`Status`/`Shutdown` requests
//! for `oddjob-brokerctl`. Entirely separate from the messaging
//! transport the remote user talks over.

use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use broker_core::SessionStatus;
use tokio::net::{UnixListener, UnixStream};
use tracing::{error, info, warn};

use crate::protocol::{read_request, write_response, Request, Response};
use crate::state::AppState;

/// Binds the control socket, removing a stale one left behind by an
/// unclean shutdown (the advisory lock file is what actually prevents
/// two daemons running; this just keeps `bind` from failing on a leftover
/// socket inode).
pub fn bind(socket_path: &Path) -> std::io::Result<UnixListener> {
    if socket_path.exists() {
        std::fs::remove_file(socket_path)?;
    }
    let listener = UnixListener::bind(socket_path)?;
    // Local-only: tighten to owner read/write.
    let _ = std::fs::set_permissions(socket_path, std::fs::Permissions::from_mode(0o600));
    Ok(listener)
}

/// Runs the accept loop until `shutdown` fires.
pub async fn run(
    listener: UnixListener,
    state: AppState,
    start_time: Instant,
    shutdown: Arc<tokio::sync::Notify>,
    mut shutdown_rx: tokio::sync::watch::Receiver<bool>,
) {
    loop {
        tokio::select! {
            accepted = listener.accept() => {
                match accepted {
                    Ok((stream, _addr)) => {
                        let state = state.clone();
                        let shutdown = Arc::clone(&shutdown);
                        tokio::spawn(async move {
                            if let Err(err) = handle_connection(stream, &state, start_time, &shutdown).await {
                                warn!(target: "control", %err, "control connection error");
                            }
                        });
                    }
                    Err(err) => error!(target: "control", %err, "control socket accept failed"),
                }
            }
            _ = shutdown_rx.changed() => {
                if *shutdown_rx.borrow() {
                    info!(target: "control", "control listener shutting down");
                    return;
                }
            }
        }
    }
}

async fn handle_connection(
    mut stream: UnixStream,
    state: &AppState,
    start_time: Instant,
    shutdown: &Arc<tokio::sync::Notify>,
) -> Result<(), crate::protocol::ProtocolError> {
    let request = read_request(&mut stream).await?;
    let response = match request {
        Request::Ping => Response::Pong,
        Request::Status => status_response(state, start_time),
        Request::Shutdown { kill } => {
            info!(target: "control", kill, "shutdown requested via control socket");
            shutdown.notify_waiters();
            Response::ShuttingDown
        }
    };
    write_response(&mut stream, &response).await
}

fn status_response(state: &AppState, start_time: Instant) -> Response {
    let sessions = state.sessions.list();
    let active_sessions = sessions.iter().filter(|s| s.status == SessionStatus::Active).count();
    let paused_sessions = sessions.iter().filter(|s| s.status == SessionStatus::Paused).count();
    let terminated_sessions = sessions.iter().filter(|s| s.status == SessionStatus::Terminated).count();
    Response::Status {
        active_sessions,
        paused_sessions,
        terminated_sessions,
        emergency: state.emergency.is_active(),
        pending_approvals: state.approvals.list_pending().len(),
        uptime_secs: start_time.elapsed().as_secs(),
    }
}

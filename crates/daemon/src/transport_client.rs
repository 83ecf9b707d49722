// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Transport resilience layer (§4.6): wraps a raw [`TransportClient`]
//! with the reconnection state machine, the bounded outbound buffer, and
//! the token-bucket rate limiter every send passes through. The
//! connection-state monitor task (§5) owns the one instance that drives
//! reconnection; send/receive call sites only read its state.

use std::sync::Arc;

use broker_adapters::{
    ConnectionState, OutboundBuffer, RateLimiter, ReconnectionManager, TransportClient,
    TransportError,
};
use broker_engine::SessionLifecycle;
use tracing::{info, warn};

/// A resilient send/receive facade over a raw transport, suitable for
/// cloning into every task that needs to talk to the user.
#[derive(Clone)]
pub struct ResilientTransport<T: TransportClient> {
    inner: Arc<T>,
    reconnect: Arc<ReconnectionManager>,
    buffer: Arc<OutboundBuffer>,
    limiter: Arc<RateLimiter>,
}

impl<T: TransportClient> ResilientTransport<T> {
    pub fn new(inner: Arc<T>, buffer_capacity: usize, rate_burst: u32, rate_per_min: u32) -> Self {
        Self {
            inner,
            reconnect: Arc::new(ReconnectionManager::new(ConnectionState::Disconnected)),
            buffer: Arc::new(OutboundBuffer::new(buffer_capacity)),
            limiter: Arc::new(RateLimiter::new(rate_burst, rate_per_min)),
        }
    }

    /// The raw inner transport, for call sites that need unthrottled,
    /// unbuffered access (the notification manager's direct "format →
    /// deliver" path, §4.9) rather than the resilient facade.
    pub fn raw(&self) -> Arc<T> {
        Arc::clone(&self.inner)
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.reconnect.state()
    }

    pub fn is_connected(&self) -> bool {
        self.connection_state() == ConnectionState::Connected
    }

    pub fn reconnection_manager(&self) -> Arc<ReconnectionManager> {
        Arc::clone(&self.reconnect)
    }

    /// Sends if connected (after consulting the rate limiter); otherwise
    /// buffers for the reconnect-time drain. Never returns an error for a
    /// disconnected transport — buffering *is* the success path (§4.6).
    pub async fn send_message(&self, recipient: &str, text: &str) -> Result<(), TransportError> {
        if !self.is_connected() {
            self.buffer.push(recipient, text);
            return Ok(());
        }

        let decision = self.limiter.poll();
        if !decision.wait.is_zero() {
            tokio::time::sleep(decision.wait).await;
        }
        self.inner.send_message(recipient, text).await
    }

    /// Drains the outbound buffer in FIFO order, continuing past
    /// individual send failures without re-enqueuing them.
    async fn drain_buffer(&self) {
        for (recipient, text) in self.buffer.drain() {
            if let Err(err) = self.inner.send_message(&recipient, &text).await {
                warn!(target: "transport", %recipient, %err, "dropped buffered message on drain failure");
            }
        }
    }

    /// One reconnect attempt cycle: `DISCONNECTED -> RECONNECTING`, sleep
    /// for the backoff, attempt `connect()`. On success, transitions
    /// through `SYNCING` (generating catch-up summaries for every ACTIVE
    /// session) before draining the buffer and settling on `CONNECTED`.
    pub async fn reconnect_once(&self, sessions: &SessionLifecycle) -> Result<(), TransportError> {
        self.reconnect
            .transition(ConnectionState::Reconnecting)
            .map_err(|e| TransportError::SendFailed(e.to_string()))?;

        let backoff = self.reconnect.current_backoff();
        if !backoff.is_zero() {
            tokio::time::sleep(backoff).await;
        }

        match self.inner.connect().await {
            Ok(()) => {
                self.reconnect
                    .transition(ConnectionState::Connected)
                    .map_err(|e| TransportError::SendFailed(e.to_string()))?;
                self.sync_and_drain(sessions).await;
                Ok(())
            }
            Err(err) => {
                let _ = self.reconnect.transition(ConnectionState::Disconnected);
                Err(err)
            }
        }
    }

    async fn sync_and_drain(&self, sessions: &SessionLifecycle) {
        if self.reconnect.transition(ConnectionState::Syncing).is_ok() {
            for session in sessions.list() {
                if session.status != broker_core::SessionStatus::Active {
                    continue;
                }
                match sessions.generate_catchup_summary(&session.id) {
                    Ok(summary) => {
                        let _ = self.inner.send_message(&session.thread_id, &summary).await;
                    }
                    Err(err) => warn!(target: "transport", %err, "catch-up summary failed"),
                }
            }
            let _ = self.reconnect.transition(ConnectionState::Connected);
        }
        self.drain_buffer().await;
        info!(target: "transport", "reconnect drain complete");
    }

    /// Marks the connection dropped, moving `CONNECTED -> DISCONNECTED`.
    pub fn mark_disconnected(&self) {
        let _ = self.reconnect.transition(ConnectionState::Disconnected);
    }
}

/// Runs the connection-state monitor task: while not connected, repeatedly
/// attempts reconnection until `shutdown` fires.
pub async fn run_reconnect_monitor<T: TransportClient>(
    transport: ResilientTransport<T>,
    sessions: SessionLifecycle,
    mut shutdown: tokio::sync::watch::Receiver<bool>,
) {
    loop {
        if *shutdown.borrow() {
            return;
        }
        if transport.is_connected() {
            tokio::select! {
                _ = tokio::time::sleep(std::time::Duration::from_millis(250)) => {}
                _ = shutdown.changed() => {}
            }
            continue;
        }
        let _ = transport.reconnect_once(&sessions).await;
    }
}


#[cfg(test)]
#[path = "transport_client_tests.rs"]
mod tests;

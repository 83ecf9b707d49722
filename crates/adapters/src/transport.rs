// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Messaging transport abstraction: connection lifecycle, reconnection
//! backoff, the bounded outbound buffer used while disconnected, and the
//! token-bucket rate limiter every outbound send passes through.
//!
//! The wire protocol of a real messaging provider is out of scope; this
//! module ships the [`TransportClient`] trait plus a test-support
//! [`FakeTransport`], following the trait/fake/production-adapter split
//! used elsewhere in this crate.

use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use broker_core::{Clock, SystemClock};
use parking_lot::Mutex;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::warn;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("transport is not connected")]
    NotConnected,
    #[error("send failed: {0}")]
    SendFailed(String),
}

/// An inbound event surfaced by `receive_messages`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub thread_id: String,
    pub text: String,
}

/// Abstracts the messaging provider the daemon talks to.
#[async_trait]
pub trait TransportClient: Send + Sync {
    async fn connect(&self) -> Result<(), TransportError>;
    async fn disconnect(&self) -> Result<(), TransportError>;
    async fn send_message(&self, recipient: &str, text: &str) -> Result<(), TransportError>;
    fn is_connected(&self) -> bool;

    /// Hands over the channel of inbound events. Called once at startup;
    /// implementations arm whatever background listening they need the
    /// first time this is called and return a receiver fed until shutdown.
    async fn receive_messages(&self) -> mpsc::Receiver<InboundMessage>;
}

/// Reconnection lifecycle states (§4.6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connected,
    Disconnected,
    Reconnecting,
    Syncing,
}

impl ConnectionState {
    fn can_transition_to(self, to: ConnectionState) -> bool {
        use ConnectionState::*;
        matches!(
            (self, to),
            (Connected, Disconnected)
                | (Connected, Syncing)
                | (Disconnected, Reconnecting)
                | (Reconnecting, Connected)
                | (Reconnecting, Disconnected)
                | (Syncing, Connected)
        )
    }
}

/// Tracks the reconnection state machine and backoff attempt counter.
/// A single task owns transitions; send/receive loops only read state.
#[derive(Debug, Default)]
pub struct ReconnectionManager {
    inner: Mutex<ReconnectInner>,
}

#[derive(Debug)]
struct ReconnectInner {
    state: ConnectionState,
    attempt: u32,
}

impl Default for ReconnectInner {
    fn default() -> Self {
        Self {
            state: ConnectionState::Disconnected,
            attempt: 0,
        }
    }
}

#[derive(Debug, Error)]
#[error("invalid transition {from:?} -> {to:?}")]
pub struct InvalidTransition {
    pub from: ConnectionState,
    pub to: ConnectionState,
}

impl ReconnectionManager {
    pub fn new(initial: ConnectionState) -> Self {
        Self {
            inner: Mutex::new(ReconnectInner {
                state: initial,
                attempt: 0,
            }),
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.inner.lock().state
    }

    pub fn attempt(&self) -> u32 {
        self.inner.lock().attempt
    }

    /// Attempts `from -> to`. Rejects (does not coerce) invalid transitions.
    pub fn transition(&self, to: ConnectionState) -> Result<(), InvalidTransition> {
        let mut inner = self.inner.lock();
        if !inner.state.can_transition_to(to) {
            return Err(InvalidTransition { from: inner.state, to });
        }
        match to {
            ConnectionState::Reconnecting => inner.attempt += 1,
            ConnectionState::Connected => inner.attempt = 0,
            _ => {}
        }
        inner.state = to;
        Ok(())
    }

    /// Backoff for attempt `n >= 1`: `min(2^(n-1), 60)` seconds.
    pub fn backoff_for_attempt(n: u32) -> Duration {
        if n == 0 {
            return Duration::ZERO;
        }
        let secs = 1u64.checked_shl(n - 1).unwrap_or(u64::MAX).min(60);
        Duration::from_secs(secs)
    }

    pub fn current_backoff(&self) -> Duration {
        Self::backoff_for_attempt(self.attempt())
    }
}

/// Bounded FIFO of `(recipient, text)` pairs buffered while disconnected.
/// Default capacity 100; drop-oldest-with-warning on overflow.
#[derive(Debug)]
pub struct OutboundBuffer {
    capacity: usize,
    queue: Mutex<VecDeque<(String, String)>>,
}

impl OutboundBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            queue: Mutex::new(VecDeque::new()),
        }
    }

    pub fn push(&self, recipient: impl Into<String>, text: impl Into<String>) {
        let mut queue = self.queue.lock();
        if queue.len() >= self.capacity {
            queue.pop_front();
            warn!(target: "transport", capacity = self.capacity, "outbound buffer full, dropping oldest message");
        }
        queue.push_back((recipient.into(), text.into()));
    }

    pub fn len(&self) -> usize {
        self.queue.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.lock().is_empty()
    }

    /// Drains the buffer in FIFO order.
    pub fn drain(&self) -> Vec<(String, String)> {
        self.queue.lock().drain(..).collect()
    }
}

impl Default for OutboundBuffer {
    fn default() -> Self {
        Self::new(100)
    }
}

/// Token-bucket rate limiter plus an exponential backoff escalator that
/// engages when the bucket is repeatedly exhausted (§4.6).
pub struct RateLimiter<C: Clock = SystemClock> {
    burst_size: f64,
    refill_per_sec: f64,
    max_backoff: Duration,
    cooldown: Duration,
    state: Mutex<RateLimiterState>,
    clock: C,
}

struct RateLimiterState {
    tokens: f64,
    last_refill: std::time::Instant,
    escalation_level: u8,
    last_exhausted: Option<std::time::Instant>,
}

const MAX_ESCALATION_LEVEL: u8 = 5;

impl RateLimiter<SystemClock> {
    pub fn new(burst_size: u32, rate_limit_per_min: u32) -> Self {
        Self::with_clock(burst_size, rate_limit_per_min, SystemClock)
    }

    pub fn default_limits() -> Self {
        Self::new(5, 30)
    }
}

impl<C: Clock> RateLimiter<C> {
    pub fn with_clock(burst_size: u32, rate_limit_per_min: u32, clock: C) -> Self {
        let now = clock.now();
        Self {
            burst_size: burst_size as f64,
            refill_per_sec: rate_limit_per_min as f64 / 60.0,
            max_backoff: Duration::from_secs(60),
            cooldown: Duration::from_secs(60),
            state: Mutex::new(RateLimiterState {
                tokens: burst_size as f64,
                last_refill: now,
                escalation_level: 0,
                last_exhausted: None,
            }),
            clock,
        }
    }

    fn refill(&self, state: &mut RateLimiterState) {
        let now = self.clock.now();
        let elapsed = now.duration_since(state.last_refill).as_secs_f64();
        state.tokens = (state.tokens + elapsed * self.refill_per_sec).min(self.burst_size);
        state.last_refill = now;

        if let Some(last_exhausted) = state.last_exhausted {
            if now.duration_since(last_exhausted) >= self.cooldown {
                state.escalation_level = 0;
                state.last_exhausted = None;
            }
        }
    }

    /// Time to wait before a token is available, plus any escalator backoff,
    /// without blocking. Consumes a token when one is available.
    pub fn poll(&self) -> RateLimitDecision {
        let mut state = self.state.lock();
        self.refill(&mut state);

        if state.tokens >= 1.0 {
            state.tokens -= 1.0;
            return RateLimitDecision { wait: Duration::ZERO };
        }

        let now = self.clock.now();
        state.last_exhausted = Some(now);
        let level = state.escalation_level;
        if state.escalation_level < MAX_ESCALATION_LEVEL {
            state.escalation_level += 1;
        }
        let escalator = if level == 0 {
            Duration::ZERO
        } else {
            let secs = (2f64.powi(level as i32 - 1)).min(self.max_backoff.as_secs_f64());
            Duration::from_secs_f64(secs)
        };

        let refill_wait = Duration::from_secs_f64(((1.0 - state.tokens) / self.refill_per_sec).max(0.0));
        state.tokens = 0.0;

        RateLimitDecision {
            wait: refill_wait + escalator,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub wait: Duration,
}

/// Line-oriented production adapter: outbound messages are written to
/// stdout as `recipient\ttext`, inbound messages are read from stdin in
/// the same shape. Stands in for a real provider's send/receive channel
/// (the wire protocol itself is out of scope; see module docs).
pub struct StdioTransport {
    connected: std::sync::atomic::AtomicBool,
}

impl Default for StdioTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl StdioTransport {
    pub fn new() -> Self {
        Self {
            connected: std::sync::atomic::AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl TransportClient for StdioTransport {
    async fn connect(&self) -> Result<(), TransportError> {
        self.connected.store(true, std::sync::atomic::Ordering::SeqCst);
        Ok(())
    }

    async fn disconnect(&self) -> Result<(), TransportError> {
        self.connected.store(false, std::sync::atomic::Ordering::SeqCst);
        Ok(())
    }

    async fn send_message(&self, recipient: &str, text: &str) -> Result<(), TransportError> {
        if !self.is_connected() {
            return Err(TransportError::NotConnected);
        }
        for line in text.split('\n') {
            println!("{recipient}\t{line}");
        }
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected.load(std::sync::atomic::Ordering::SeqCst)
    }

    async fn receive_messages(&self) -> mpsc::Receiver<InboundMessage> {
        let (tx, rx) = mpsc::channel(64);
        tokio::spawn(async move {
            use tokio::io::AsyncBufReadExt;
            let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => {
                        let Some((thread_id, text)) = line.split_once('\t') else {
                            warn!(target: "transport", %line, "skipping malformed stdin line");
                            continue;
                        };
                        let message = InboundMessage {
                            thread_id: thread_id.to_string(),
                            text: text.to_string(),
                        };
                        if tx.send(message).await.is_err() {
                            break;
                        }
                    }
                    Ok(None) => break,
                    Err(err) => {
                        warn!(target: "transport", %err, "stdin read failed");
                        break;
                    }
                }
            }
        });
        rx
    }
}

/// A scripted, in-memory stand-in for [`TransportClient`].
#[cfg(any(test, feature = "test-support"))]
pub mod fake {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    #[derive(Clone)]
    pub struct FakeTransport {
        connected: Arc<AtomicBool>,
        sent: Arc<Mutex<Vec<(String, String)>>>,
        fail_sends: Arc<AtomicBool>,
        inbound_tx: mpsc::Sender<InboundMessage>,
        inbound_rx: Arc<Mutex<Option<mpsc::Receiver<InboundMessage>>>>,
    }

    impl Default for FakeTransport {
        fn default() -> Self {
            Self::new()
        }
    }

    impl FakeTransport {
        pub fn new() -> Self {
            let (inbound_tx, inbound_rx) = mpsc::channel(64);
            Self {
                connected: Arc::new(AtomicBool::new(false)),
                sent: Arc::new(Mutex::new(Vec::new())),
                fail_sends: Arc::new(AtomicBool::new(false)),
                inbound_tx,
                inbound_rx: Arc::new(Mutex::new(Some(inbound_rx))),
            }
        }

        pub fn sent_messages(&self) -> Vec<(String, String)> {
            self.sent.lock().clone()
        }

        pub fn set_fail_sends(&self, fail: bool) {
            self.fail_sends.store(fail, Ordering::SeqCst);
        }

        /// Queues an inbound message for the next `receive_messages` consumer.
        pub fn push_inbound(&self, thread_id: impl Into<String>, text: impl Into<String>) {
            let _ = self.inbound_tx.try_send(InboundMessage {
                thread_id: thread_id.into(),
                text: text.into(),
            });
        }
    }

    #[async_trait]
    impl TransportClient for FakeTransport {
        async fn connect(&self) -> Result<(), TransportError> {
            self.connected.store(true, Ordering::SeqCst);
            Ok(())
        }

        async fn disconnect(&self) -> Result<(), TransportError> {
            self.connected.store(false, Ordering::SeqCst);
            Ok(())
        }

        async fn send_message(&self, recipient: &str, text: &str) -> Result<(), TransportError> {
            if self.fail_sends.load(Ordering::SeqCst) {
                return Err(TransportError::SendFailed("injected failure".into()));
            }
            if !self.connected.load(Ordering::SeqCst) {
                return Err(TransportError::NotConnected);
            }
            self.sent.lock().push((recipient.to_string(), text.to_string()));
            Ok(())
        }

        fn is_connected(&self) -> bool {
            self.connected.load(Ordering::SeqCst)
        }

        async fn receive_messages(&self) -> mpsc::Receiver<InboundMessage> {
            match self.inbound_rx.lock().take() {
                Some(rx) => rx,
                None => {
                    let (_tx, rx) = mpsc::channel(1);
                    rx
                }
            }
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeTransport;

#[cfg(test)]
#[path = "transport_tests.rs"]
mod tests;

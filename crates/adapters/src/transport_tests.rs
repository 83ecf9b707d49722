// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use broker_core::FakeClock;
use std::time::Duration;

#[test]
fn connection_state_rejects_invalid_transitions() {
    let manager = ReconnectionManager::new(ConnectionState::Connected);
    let err = manager.transition(ConnectionState::Reconnecting).unwrap_err();
    assert_eq!(err.from, ConnectionState::Connected);
    assert_eq!(err.to, ConnectionState::Reconnecting);
    assert_eq!(manager.state(), ConnectionState::Connected);
}

#[test]
fn full_reconnect_cycle_resets_attempt_counter() {
    let manager = ReconnectionManager::new(ConnectionState::Connected);
    manager.transition(ConnectionState::Disconnected).unwrap();
    manager.transition(ConnectionState::Reconnecting).unwrap();
    assert_eq!(manager.attempt(), 1);
    manager.transition(ConnectionState::Disconnected).unwrap();
    manager.transition(ConnectionState::Reconnecting).unwrap();
    assert_eq!(manager.attempt(), 2);

    manager.transition(ConnectionState::Connected).unwrap();
    assert_eq!(manager.attempt(), 0);

    manager.transition(ConnectionState::Syncing).unwrap();
    manager.transition(ConnectionState::Connected).unwrap();
    assert_eq!(manager.state(), ConnectionState::Connected);
}

#[test]
fn backoff_caps_at_sixty_seconds() {
    assert_eq!(ReconnectionManager::backoff_for_attempt(1), Duration::from_secs(1));
    assert_eq!(ReconnectionManager::backoff_for_attempt(2), Duration::from_secs(2));
    assert_eq!(ReconnectionManager::backoff_for_attempt(3), Duration::from_secs(4));
    assert_eq!(ReconnectionManager::backoff_for_attempt(7), Duration::from_secs(60));
    assert_eq!(ReconnectionManager::backoff_for_attempt(20), Duration::from_secs(60));
}

#[test]
fn outbound_buffer_drops_oldest_when_full() {
    let buffer = OutboundBuffer::new(3);
    buffer.push("t1", "a");
    buffer.push("t1", "b");
    buffer.push("t1", "c");
    buffer.push("t1", "d");

    assert_eq!(buffer.len(), 3);
    let drained = buffer.drain();
    assert_eq!(
        drained,
        vec![
            ("t1".to_string(), "b".to_string()),
            ("t1".to_string(), "c".to_string()),
            ("t1".to_string(), "d".to_string()),
        ]
    );
    assert!(buffer.is_empty());
}

#[test]
fn rate_limiter_allows_burst_then_requires_wait() {
    let clock = FakeClock::new();
    let limiter = RateLimiter::with_clock(5, 30, clock.clone());

    for _ in 0..5 {
        assert_eq!(limiter.poll().wait, Duration::ZERO);
    }
    let decision = limiter.poll();
    assert!(decision.wait > Duration::ZERO);
}

#[test]
fn rate_limiter_refills_over_time() {
    let clock = FakeClock::new();
    let limiter = RateLimiter::with_clock(1, 60, clock.clone());

    assert_eq!(limiter.poll().wait, Duration::ZERO);
    assert!(limiter.poll().wait > Duration::ZERO);

    clock.advance(Duration::from_secs(1));
    assert_eq!(limiter.poll().wait, Duration::ZERO);
}

#[test]
fn rate_limiter_escalates_on_repeated_exhaustion_and_resets_after_cooldown() {
    let clock = FakeClock::new();
    let limiter = RateLimiter::with_clock(1, 60, clock.clone());

    limiter.poll(); // consumes the only token
    let first = limiter.poll().wait;
    let second = limiter.poll().wait;
    assert!(second > first, "escalator should add more backoff on repeat exhaustion");

    clock.advance(Duration::from_secs(120));
    let after_cooldown = limiter.poll().wait;
    assert!(after_cooldown <= second);
}

#[tokio::test]
async fn fake_transport_requires_connect_before_sending() {
    let transport = FakeTransport::new();
    let err = transport.send_message("thread-1", "hi").await.unwrap_err();
    assert!(matches!(err, TransportError::NotConnected));

    transport.connect().await.unwrap();
    transport.send_message("thread-1", "hi").await.unwrap();
    assert_eq!(
        transport.sent_messages(),
        vec![("thread-1".to_string(), "hi".to_string())]
    );
}

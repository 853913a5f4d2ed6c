//! Broadcast channel for catch events.
//!
//! [`EventBus`] wraps a [`tokio::sync::broadcast`] channel. Session
//! transitions and log mutations publish a [`CatchEvent`]; every WebSocket
//! connection subscribes and filters by session.

use tokio::sync::broadcast;

use super::CatchEvent;

/// Broadcast bus for [`CatchEvent`]s.
///
/// When the ring buffer is full, the oldest events are dropped for
/// lagging receivers.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<CatchEvent>,
}

impl EventBus {
    /// Creates a new `EventBus` with the given channel capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publishes an event to all subscribers.
    ///
    /// Returns the number of receivers that got the event; with no
    /// receivers the event is dropped.
    pub fn publish(&self, event: CatchEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }

    /// Creates a receiver for all future events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<CatchEvent> {
        self.sender.subscribe()
    }

    /// Returns the current number of active receivers.
    #[must_use]
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::SessionId;
    use chrono::Utc;

    fn started(session_id: SessionId) -> CatchEvent {
        CatchEvent::IdentificationStarted {
            session_id,
            generation: 1,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn publish_without_receivers_returns_zero() {
        let bus = EventBus::new(16);
        assert_eq!(bus.publish(started(SessionId::new())), 0);
    }

    #[tokio::test]
    async fn subscriber_receives_event() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();

        let id = SessionId::new();
        bus.publish(started(id));

        let Ok(event) = rx.recv().await else {
            panic!("expected to receive event");
        };
        assert_eq!(event.session_id(), Some(id));
    }

    #[test]
    fn receiver_count_tracks_subscribers() {
        let bus = EventBus::new(16);
        let rx1 = bus.subscribe();
        let _rx2 = bus.subscribe();
        assert_eq!(bus.receiver_count(), 2);
        drop(rx1);
        assert_eq!(bus.receiver_count(), 1);
    }
}

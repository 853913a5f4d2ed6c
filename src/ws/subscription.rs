//! Per-connection subscription manager.
//!
//! Tracks which sessions a WebSocket client is subscribed to and
//! provides server-side event filtering.

use std::collections::HashSet;

use crate::domain::SessionId;

/// Manages the set of session subscriptions for a single WebSocket connection.
#[derive(Debug, Default)]
pub struct SubscriptionManager {
    /// Subscribed session IDs. If `subscribe_all` is true, this set is ignored.
    session_ids: HashSet<SessionId>,
    /// Whether the client subscribes to all sessions (wildcard `"*"`).
    subscribe_all: bool,
}

impl SubscriptionManager {
    /// Creates a new empty subscription manager.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds session IDs to the subscription set. `wildcard` enables `"*"`.
    pub fn subscribe(&mut self, ids: &[SessionId], wildcard: bool) {
        if wildcard {
            self.subscribe_all = true;
        }
        self.session_ids.extend(ids.iter().copied());
    }

    /// Removes session IDs from the subscription set. `wildcard` clears `"*"`.
    pub fn unsubscribe(&mut self, ids: &[SessionId], wildcard: bool) {
        if wildcard {
            self.subscribe_all = false;
        }
        for id in ids {
            self.session_ids.remove(id);
        }
    }

    /// Returns `true` if an event for `session_id` passes the filter.
    ///
    /// Log-wide events (no session) reach every client with at least one
    /// active subscription.
    #[must_use]
    pub fn matches(&self, session_id: Option<SessionId>) -> bool {
        match session_id {
            Some(id) => self.subscribe_all || self.session_ids.contains(&id),
            None => self.subscribe_all || !self.session_ids.is_empty(),
        }
    }

    /// Returns the number of explicitly subscribed session IDs.
    #[must_use]
    pub fn count(&self) -> usize {
        self.session_ids.len()
    }

    /// Returns `true` if the wildcard subscription is active.
    #[must_use]
    pub fn is_subscribed_all(&self) -> bool {
        self.subscribe_all
    }
}

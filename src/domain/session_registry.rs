//! Concurrent session storage with per-session locking.
//!
//! [`SessionRegistry`] keeps every live [`Session`] in a `HashMap` where
//! each entry sits behind its own [`tokio::sync::RwLock`]. Transitions on
//! one session are serialized; different sessions never contend.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::{Session, SessionId};
use crate::error::GatewayError;

/// Shared handle to one session.
pub type SessionHandle = Arc<RwLock<Session>>;

/// Central store for all client sessions.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<SessionId, SessionHandle>>,
}

impl SessionRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new session and returns its handle.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Internal`] if the id is already taken
    /// (cannot happen with UUID v4).
    pub async fn insert(&self, session: Session) -> Result<SessionHandle, GatewayError> {
        let session_id = session.session_id();
        let mut map = self.sessions.write().await;
        if map.contains_key(&session_id) {
            return Err(GatewayError::Internal(format!(
                "session {session_id} already exists"
            )));
        }
        let handle = Arc::new(RwLock::new(session));
        map.insert(session_id, Arc::clone(&handle));
        Ok(handle)
    }

    /// Returns the handle for `session_id`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::SessionNotFound`] if no such session exists.
    pub async fn get(&self, session_id: SessionId) -> Result<SessionHandle, GatewayError> {
        let map = self.sessions.read().await;
        map.get(&session_id)
            .map(Arc::clone)
            .ok_or(GatewayError::SessionNotFound(*session_id.as_uuid()))
    }

    /// Removes a session.
    ///
    /// Identification tasks still holding the handle finish against the
    /// detached session and their results are never observed.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::SessionNotFound`] if no such session exists.
    pub async fn remove(&self, session_id: SessionId) -> Result<(), GatewayError> {
        let mut map = self.sessions.write().await;
        map.remove(&session_id)
            .map(|_| ())
            .ok_or(GatewayError::SessionNotFound(*session_id.as_uuid()))
    }

    /// Drops every session left unchanged since `cutoff` and returns their
    /// ids.
    ///
    /// Sessions with an identification in flight are kept, as are sessions
    /// whose lock is currently held.
    pub async fn evict_idle(&self, cutoff: DateTime<Utc>) -> Vec<SessionId> {
        let mut map = self.sessions.write().await;
        let mut evicted = Vec::new();
        map.retain(|session_id, handle| {
            let idle = handle
                .try_read()
                .is_ok_and(|session| !session.is_loading() && session.last_modified_at() <= cutoff);
            if idle {
                evicted.push(*session_id);
            }
            !idle
        });
        evicted
    }

    /// Returns the number of live sessions.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Returns `true` if there are no live sessions.
    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::domain::ImageUpload;

    #[tokio::test]
    async fn insert_and_get() {
        let registry = SessionRegistry::new();
        let id = SessionId::new();
        let Ok(_) = registry.insert(Session::new(id)).await else {
            panic!("insert failed");
        };

        let Ok(handle) = registry.get(id).await else {
            panic!("session not found");
        };
        assert_eq!(handle.read().await.session_id(), id);
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn duplicate_insert_fails() {
        let registry = SessionRegistry::new();
        let id = SessionId::new();
        assert!(registry.insert(Session::new(id)).await.is_ok());
        assert!(registry.insert(Session::new(id)).await.is_err());
    }

    #[tokio::test]
    async fn missing_session_is_not_found() {
        let registry = SessionRegistry::new();
        let result = registry.get(SessionId::new()).await;
        assert!(matches!(result, Err(GatewayError::SessionNotFound(_))));
    }

    #[tokio::test]
    async fn remove_detaches_session() {
        let registry = SessionRegistry::new();
        let id = SessionId::new();
        assert!(registry.insert(Session::new(id)).await.is_ok());
        assert!(registry.remove(id).await.is_ok());
        assert!(registry.is_empty().await);
        assert!(matches!(
            registry.remove(id).await,
            Err(GatewayError::SessionNotFound(_))
        ));
    }

    #[tokio::test]
    async fn evict_idle_drops_only_untouched_sessions() {
        let registry = SessionRegistry::new();
        let idle = SessionId::new();
        assert!(registry.insert(Session::new(idle)).await.is_ok());
        tokio::time::sleep(Duration::from_millis(10)).await;
        let cutoff = Utc::now();
        tokio::time::sleep(Duration::from_millis(10)).await;
        let fresh = SessionId::new();
        assert!(registry.insert(Session::new(fresh)).await.is_ok());

        assert_eq!(registry.evict_idle(cutoff).await, vec![idle]);
        assert!(registry.get(idle).await.is_err());
        assert!(registry.get(fresh).await.is_ok());
    }

    #[tokio::test]
    async fn evict_idle_keeps_loading_sessions() {
        let registry = SessionRegistry::new();
        let id = SessionId::new();
        let Ok(handle) = registry.insert(Session::new(id)).await else {
            panic!("insert failed");
        };
        let Ok(image) = ImageUpload::new("cGlrZQ==", "image/jpeg") else {
            panic!("valid image");
        };
        let _generation = handle.write().await.submit_image(image);
        tokio::time::sleep(Duration::from_millis(10)).await;

        assert!(registry.evict_idle(Utc::now()).await.is_empty());
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn evict_idle_skips_locked_sessions() {
        let registry = SessionRegistry::new();
        let id = SessionId::new();
        let Ok(handle) = registry.insert(Session::new(id)).await else {
            panic!("insert failed");
        };
        tokio::time::sleep(Duration::from_millis(10)).await;

        let guard = handle.write().await;
        assert!(registry.evict_idle(Utc::now()).await.is_empty());
        drop(guard);
        assert_eq!(registry.evict_idle(Utc::now()).await, vec![id]);
    }
}

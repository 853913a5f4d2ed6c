//! Domain events emitted after session transitions and log mutations.
//!
//! Events are broadcast through the [`super::EventBus`] to WebSocket
//! subscribers so clients learn about identification results without
//! polling.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{CatchId, SessionId};

/// Event emitted after an identification outcome or a log mutation.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum CatchEvent {
    /// A photo was submitted and identification began.
    IdentificationStarted {
        /// Session that submitted the photo.
        session_id: SessionId,
        /// Request generation.
        generation: u64,
        /// Submission timestamp.
        timestamp: DateTime<Utc>,
    },

    /// The active identification succeeded.
    IdentificationSucceeded {
        /// Session the result belongs to.
        session_id: SessionId,
        /// Request generation.
        generation: u64,
        /// Identified species.
        species: String,
        /// Resolution timestamp.
        timestamp: DateTime<Utc>,
    },

    /// The active identification failed.
    IdentificationFailed {
        /// Session the failure belongs to.
        session_id: SessionId,
        /// Request generation.
        generation: u64,
        /// User-facing failure message.
        message: String,
        /// Resolution timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A catch was saved to the log.
    CatchLogged {
        /// Session that saved it.
        session_id: SessionId,
        /// New entry id.
        catch_id: CatchId,
        /// Species of the saved catch.
        species: String,
        /// Save timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A catch was deleted from the log.
    CatchRemoved {
        /// Deleted entry id.
        catch_id: CatchId,
        /// Deletion timestamp.
        timestamp: DateTime<Utc>,
    },
}

impl CatchEvent {
    /// Returns the session this event belongs to, if any.
    ///
    /// Log-wide events such as [`CatchEvent::CatchRemoved`] have none.
    #[must_use]
    pub const fn session_id(&self) -> Option<SessionId> {
        match self {
            Self::IdentificationStarted { session_id, .. }
            | Self::IdentificationSucceeded { session_id, .. }
            | Self::IdentificationFailed { session_id, .. }
            | Self::CatchLogged { session_id, .. } => Some(*session_id),
            Self::CatchRemoved { .. } => None,
        }
    }

    /// Returns the event type as a static string slice.
    #[must_use]
    pub const fn event_type_str(&self) -> &'static str {
        match self {
            Self::IdentificationStarted { .. } => "identification_started",
            Self::IdentificationSucceeded { .. } => "identification_succeeded",
            Self::IdentificationFailed { .. } => "identification_failed",
            Self::CatchLogged { .. } => "catch_logged",
            Self::CatchRemoved { .. } => "catch_removed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_event_type_tag() {
        let event = CatchEvent::IdentificationFailed {
            session_id: SessionId::new(),
            generation: 3,
            message: "No fish detected in image.".to_string(),
            timestamp: Utc::now(),
        };
        let json = serde_json::to_value(&event).unwrap_or_default();
        assert_eq!(
            json.get("event_type"),
            Some(&serde_json::json!("identification_failed"))
        );
        assert_eq!(json.get("generation"), Some(&serde_json::json!(3)));
        assert_eq!(event.event_type_str(), "identification_failed");
    }

    #[test]
    fn removal_has_no_session() {
        let event = CatchEvent::CatchRemoved {
            catch_id: CatchId::generate(),
            timestamp: Utc::now(),
        };
        assert!(event.session_id().is_none());
    }
}

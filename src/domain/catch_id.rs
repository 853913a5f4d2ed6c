//! Identifier for saved catch log entries.
//!
//! Catch ids are UUID v7: the leading bits carry the creation time in
//! milliseconds, so ids sort roughly by save time while remaining unique
//! within the log.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Unique, time-ordered identifier of a [`super::CatchLogEntry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct CatchId(uuid::Uuid);

impl CatchId {
    /// Generates a fresh id stamped with the current time.
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::now_v7())
    }

    /// Creates a `CatchId` from an existing [`uuid::Uuid`].
    #[must_use]
    pub const fn from_uuid(uuid: uuid::Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner [`uuid::Uuid`].
    #[must_use]
    pub const fn as_uuid(&self) -> &uuid::Uuid {
        &self.0
    }
}

impl fmt::Display for CatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<uuid::Uuid> for CatchId {
    fn from(uuid: uuid::Uuid) -> Self {
        Self(uuid)
    }
}

//! Service layer: business logic orchestration.
//!
//! [`CatchService`] coordinates session transitions, runs identifications
//! in the background, maintains the catch log, and emits events through
//! the [`super::domain::EventBus`].

pub mod catch_service;

pub use catch_service::{
    CatchService, DEFAULT_IDENTIFY_TIMEOUT, DEFAULT_SESSION_IDLE, PendingIdentification,
    spawn_session_sweeper,
};

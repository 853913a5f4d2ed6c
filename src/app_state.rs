//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::domain::EventBus;
use crate::service::CatchService;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Catch service for all business logic.
    pub catch_service: Arc<CatchService>,
    /// Event bus for WebSocket subscriptions.
    pub event_bus: EventBus,
}

impl AppState {
    /// Wraps `catch_service`, sharing its event bus with the WebSocket layer.
    #[must_use]
    pub fn new(catch_service: CatchService) -> Self {
        let event_bus = catch_service.event_bus().clone();
        Self {
            catch_service: Arc::new(catch_service),
            event_bus,
        }
    }
}

//! WebSocket layer: connection handling, message routing, subscriptions.
//!
//! The WebSocket endpoint at `/ws` pushes identification outcomes and
//! catch-log changes to subscribed clients, and answers session state
//! queries.

pub mod connection;
pub mod handler;
pub mod messages;
pub mod subscription;

//! # catchlog-gateway
//!
//! REST API and WebSocket gateway for identifying fish from photos and
//! keeping a personal catch log.
//!
//! A client opens a session, submits a photo, and the gateway asks a
//! multimodal model (Gemini) for the species, a description, habitat,
//! edibility, and size and weight estimates. A successful identification
//! can be turned into a catch log entry together with the angler's own
//! details. The log is persisted as one JSON document and can be exported.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP, WebSocket)
//!     │
//!     ├── REST Handlers (api/)
//!     ├── WS Handler (ws/)
//!     │
//!     ├── CatchService (service/)
//!     ├── EventBus (domain/)
//!     │
//!     ├── SessionRegistry + Session state machine (domain/)
//!     ├── FishIdentifier / GeminiClient (identify/)
//!     │
//!     └── CatchLogStore over a KeyValueStore (persistence/)
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod identify;
pub mod persistence;
pub mod service;
pub mod ws;

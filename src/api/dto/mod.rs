//! Data Transfer Objects for REST request/response serialization.
//!
//! Field names are camelCase on the wire, matching the persisted catch
//! log format.

pub mod catch_dto;
pub mod common_dto;
pub mod session_dto;

pub use catch_dto::*;
pub use common_dto::*;
pub use session_dto::*;

//! Catch log DTOs.

use serde::Serialize;
use utoipa::ToSchema;

use super::common_dto::PaginationMeta;
use crate::domain::CatchLogEntry;

/// Paginated list of log entries, newest first.
#[derive(Debug, Serialize, ToSchema)]
pub struct CatchListResponse {
    /// Entries on this page.
    pub data: Vec<CatchLogEntry>,
    /// Pagination metadata.
    pub pagination: PaginationMeta,
}

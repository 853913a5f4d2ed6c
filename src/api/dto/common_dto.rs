//! Shared DTO types used across multiple endpoints.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Pagination query parameters for list endpoints.
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct PaginationParams {
    /// Page number (1-indexed). Defaults to 1.
    #[serde(default = "default_page")]
    pub page: u32,
    /// Items per page (max 100). Defaults to 20.
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

/// Pagination metadata included in list responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMeta {
    /// Current page number.
    pub page: u32,
    /// Items per page.
    pub per_page: u32,
    /// Total number of items.
    pub total: u32,
    /// Total number of pages.
    pub total_pages: u32,
}

fn default_page() -> u32 {
    1
}

fn default_per_page() -> u32 {
    20
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            page: default_page(),
            per_page: default_per_page(),
        }
    }
}

impl PaginationParams {
    /// Clamps `page` to at least 1 and `per_page` to `1..=100`.
    #[must_use]
    pub fn clamped(&self) -> Self {
        Self {
            page: self.page.max(1),
            per_page: self.per_page.clamp(1, 100),
        }
    }

    /// Number of items to skip for this page.
    #[must_use]
    pub fn offset(&self) -> usize {
        let skipped = u64::from(self.page.saturating_sub(1)) * u64::from(self.per_page);
        usize::try_from(skipped).unwrap_or(usize::MAX)
    }

    /// Builds the response metadata for `total` items.
    #[must_use]
    pub fn meta(&self, total: usize) -> PaginationMeta {
        let total = u32::try_from(total).unwrap_or(u32::MAX);
        PaginationMeta {
            page: self.page,
            per_page: self.per_page,
            total,
            total_pages: if total == 0 {
                0
            } else {
                total.div_ceil(self.per_page.max(1))
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_out_of_range_values() {
        let params = PaginationParams {
            page: 0,
            per_page: 500,
        }
        .clamped();
        assert_eq!(params.page, 1);
        assert_eq!(params.per_page, 100);
    }

    #[test]
    fn offset_and_meta() {
        let params = PaginationParams {
            page: 3,
            per_page: 10,
        };
        assert_eq!(params.offset(), 20);
        assert_eq!(
            params.meta(21),
            PaginationMeta {
                page: 3,
                per_page: 10,
                total: 21,
                total_pages: 3,
            }
        );
        assert_eq!(params.meta(0).total_pages, 0);
    }
}

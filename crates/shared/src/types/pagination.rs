//! Pagination types for list endpoints.

use serde::{Deserialize, Serialize};

/// Offset/limit window for paginated queries.
///
/// Built from raw query-string values so that absent, malformed or
/// non-positive inputs fall back to the default window instead of
/// returning the whole table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// Number of rows to skip.
    pub offset: u64,
    /// Maximum number of rows to return.
    pub limit: u64,
}

impl PageRequest {
    /// Creates a page request, clamping `limit` into `1..=max_limit`.
    #[must_use]
    pub fn new(offset: u64, limit: u64, max_limit: u64) -> Self {
        Self {
            offset,
            limit: limit.clamp(1, max_limit.max(1)),
        }
    }

    /// Parses raw `offset` and `limit` strings.
    ///
    /// An unparsable or negative offset becomes 0. An unparsable or
    /// non-positive limit becomes `default_limit`.
    #[must_use]
    pub fn from_raw(
        offset: Option<&str>,
        limit: Option<&str>,
        default_limit: u64,
        max_limit: u64,
    ) -> Self {
        let offset = offset
            .and_then(|v| v.trim().parse::<i64>().ok())
            .and_then(|v| u64::try_from(v).ok())
            .unwrap_or(0);
        let limit = limit
            .and_then(|v| v.trim().parse::<i64>().ok())
            .and_then(|v| u64::try_from(v).ok())
            .filter(|v| *v > 0)
            .unwrap_or(default_limit);
        Self::new(offset, limit, max_limit)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 10,
        }
    }
}

/// A page of results together with the unpaginated total.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResponse<T> {
    /// Total number of rows matching the filters.
    pub total: u64,
    /// The rows in the requested window.
    pub items: Vec<T>,
}

impl<T> PageResponse<T> {
    /// Creates a new page.
    #[must_use]
    pub const fn new(total: u64, items: Vec<T>) -> Self {
        Self { total, items }
    }
}

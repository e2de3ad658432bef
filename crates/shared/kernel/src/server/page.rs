//! Skip/limit pagination with the `{items, total, per_page}` envelope.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Page size applied when the client sends none (or `limit=0`).
pub const DEFAULT_PAGE_SIZE: u64 = 5;
/// Upper clamp for client-requested page sizes.
pub const MAX_PAGE_SIZE: u64 = 100;

/// Query parameters accepted by every list endpoint.
#[derive(Debug, Clone, Copy, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
#[serde(default)]
pub struct PageParams {
    /// Number of records to skip.
    pub skip: u64,
    /// Page size; `0` falls back to the default, values above the cap are
    /// clamped.
    pub limit: u64,
}

impl Default for PageParams {
    fn default() -> Self {
        Self { skip: 0, limit: DEFAULT_PAGE_SIZE }
    }
}

impl PageParams {
    /// Returns parameters with the limit normalized into `1..=MAX_PAGE_SIZE`.
    #[must_use]
    pub const fn normalize(self) -> Self {
        let limit = if self.limit == 0 {
            DEFAULT_PAGE_SIZE
        } else if self.limit > MAX_PAGE_SIZE {
            MAX_PAGE_SIZE
        } else {
            self.limit
        };
        Self { skip: self.skip, limit }
    }

    /// Limit as the signed integer bound into `LIMIT` clauses.
    #[must_use]
    pub fn limit_i64(self) -> i64 {
        i64::try_from(self.limit).unwrap_or(i64::MAX)
    }

    /// Skip as the signed integer bound into `START` clauses; values past
    /// `i64::MAX` saturate and the page comes back empty.
    #[must_use]
    pub fn skip_i64(self) -> i64 {
        i64::try_from(self.skip).unwrap_or(i64::MAX)
    }
}

/// Paginated response envelope.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Total matching records across all pages.
    pub total: u64,
    /// The normalized page size this response was built with.
    pub per_page: u64,
}

impl<T> Page<T> {
    #[must_use]
    pub const fn new(items: Vec<T>, total: u64, per_page: u64) -> Self {
        Self { items, total, per_page }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_page_is_five() {
        let params = PageParams::default();
        assert_eq!(params.skip, 0);
        assert_eq!(params.limit, 5);
    }

    #[test]
    fn zero_limit_falls_back_to_default() {
        let params = PageParams { skip: 10, limit: 0 }.normalize();
        assert_eq!(params.skip, 10);
        assert_eq!(params.limit, DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn oversized_limit_is_clamped() {
        let params = PageParams { skip: 0, limit: 10_000 }.normalize();
        assert_eq!(params.limit, MAX_PAGE_SIZE);
    }

    #[test]
    fn missing_query_fields_use_defaults() {
        let params: PageParams = serde_json::from_str("{}").unwrap();
        assert_eq!(params.skip, 0);
        assert_eq!(params.limit, DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn signed_bind_values_saturate() {
        let params = PageParams { skip: u64::MAX, limit: 3 };
        assert_eq!(params.skip_i64(), i64::MAX);
        assert_eq!(params.limit_i64(), 3);
    }
}

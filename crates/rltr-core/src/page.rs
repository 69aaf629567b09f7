//! Limit/offset paging over filtered results
//!
//! Paging happens after filtering, so `total` always reports the full match count.

use serde::Serialize;

/// Limits applied when a caller asks for a page of results
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLimits {
    pub default_limit: usize,
    pub max_limit: usize,
}

impl Default for PageLimits {
    fn default() -> Self {
        Self { default_limit: 25, max_limit: 100 }
    }
}

/// A limit/offset window over an already filtered result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Page {
    pub limit: usize,
    pub offset: usize,
}

impl Page {
    /// Resolve requested paging against the limits. Limits above the maximum are clamped.
    pub fn new(limit: Option<usize>, offset: Option<usize>, limits: PageLimits) -> Self {
        let limit = limit.unwrap_or(limits.default_limit).min(limits.max_limit);
        Self { limit, offset: offset.unwrap_or(0) }
    }

    pub fn apply<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let start = self.offset.min(items.len());
        let end = start.saturating_add(self.limit).min(items.len());
        &items[start..end]
    }
}

/// One page of results plus the size of the unpaginated result
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PagedResult<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub limit: usize,
    pub offset: usize,
}

//! Pagination: (page, limit) → offset window.
//!
//! Every listing endpoint speaks 1-based pages. Missing or non-positive
//! inputs fall back to the defaults (page 1, limit 10); the clamp keeps
//! `skip`/`take` arithmetic total without validating at the transport layer.

use serde::{Deserialize, Serialize};

/// Default page when unspecified.
pub const DEFAULT_PAGE: u32 = 1;

/// Default page size when unspecified.
pub const DEFAULT_LIMIT: u32 = 10;

/// A caller-supplied page request, both fields optional.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageRequest {
    /// 1-based page number.
    pub page: Option<u32>,

    /// Items per page.
    pub limit: Option<u32>,
}

impl PageRequest {
    /// Resolve to effective `(page, limit)`, substituting defaults for
    /// missing or zero values.
    #[must_use]
    pub fn resolve(&self) -> (u32, u32) {
        let page = match self.page {
            Some(p) if p >= 1 => p,
            _ => DEFAULT_PAGE,
        };
        let limit = match self.limit {
            Some(l) if l >= 1 => l,
            _ => DEFAULT_LIMIT,
        };
        (page, limit)
    }
}

/// An offset window over a counted result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    /// Rows to skip: `(page - 1) * limit`.
    pub skip: usize,

    /// Rows to take: `limit`.
    pub take: usize,

    /// Total number of pages: `ceil(total / limit)`.
    pub total_pages: u64,
}

/// Convert `(page, limit)` plus a total row count into an offset window.
///
/// `page` and `limit` must already be resolved (≥ 1); use
/// [`PageRequest::resolve`] for caller input.
#[must_use]
pub fn paginate(page: u32, limit: u32, total: u64) -> Window {
    Window {
        skip: (page as usize - 1) * limit as usize,
        take: limit as usize,
        total_pages: total.div_ceil(u64::from(limit)),
    }
}

/// One page of results plus the count metadata every listing returns.
#[derive(Debug, Clone, Serialize)]
pub struct Paginated<T> {
    /// The page that was served.
    pub page: u32,

    /// The page size that was served.
    pub limit: u32,

    /// Total rows across all pages, counted in the same atomic read as the
    /// slice.
    pub total: u64,

    /// Total number of pages.
    pub total_pages: u64,

    /// The rows of this page.
    pub data: Vec<T>,
}

impl<T> Paginated<T> {
    /// Assemble a page from a resolved request, an atomic `(total, rows)`
    /// read, and the window it was served with.
    #[must_use]
    pub fn new(page: u32, limit: u32, total: u64, data: Vec<T>) -> Self {
        let window = paginate(page, limit, total);
        Self {
            page,
            limit,
            total,
            total_pages: window.total_pages,
            data,
        }
    }
}

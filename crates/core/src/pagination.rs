//! Page arithmetic shared by every listing endpoint.
//!
//! Raw `page`/`limit` query text is coerced into a [`PageRequest`]; the store answers with a
//! [`Page`] (one slice plus the exact count of matching rows) and the two combine into the
//! [`Pagination`] block returned to clients.

use serde::Serialize;

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 1000;

/// Limits applied when coercing client supplied paging parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PagingPolicy {
    pub default_page_size: u32,
    pub max_page_size: u32,
}

impl Default for PagingPolicy {
    fn default() -> Self {
        Self { default_page_size: DEFAULT_PAGE_SIZE, max_page_size: MAX_PAGE_SIZE }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    limit: u32,
}

impl PageRequest {
    /// Builds a request from already validated values. Zero is bumped to one.
    pub fn new(page: u32, limit: u32) -> Self {
        Self { page: page.max(1), limit: limit.max(1) }
    }

    /// Coerces raw query text. Absent, non-numeric and zero values fall back to the defaults;
    /// a limit above the policy cap is clamped to the cap.
    pub fn from_raw(page: Option<&str>, limit: Option<&str>, policy: PagingPolicy) -> Self {
        let page = parse_positive(page).unwrap_or(DEFAULT_PAGE);
        let limit = parse_positive(limit)
            .unwrap_or(policy.default_page_size)
            .min(policy.max_page_size.max(1));
        Self::new(page, limit)
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Zero-based index of the first row in this page.
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1).saturating_mul(u64::from(self.limit))
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE, DEFAULT_PAGE_SIZE)
    }
}

fn parse_positive(raw: Option<&str>) -> Option<u32> {
    raw.and_then(|value| value.trim().parse::<u32>().ok()).filter(|value| *value > 0)
}

/// One range-bounded slice of an ordered result set plus the exact count of rows matching the
/// same filter, independent of the range.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: u64) -> Self {
        Self { items, total }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: u32,
    pub total_pages: u64,
    pub total_items: u64,
    pub items_per_page: u32,
}

impl Pagination {
    pub fn new(request: &PageRequest, total_items: u64) -> Self {
        Self {
            current_page: request.page(),
            total_pages: total_items.div_ceil(u64::from(request.limit())),
            total_items,
            items_per_page: request.limit(),
        }
    }
}

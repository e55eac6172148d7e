//! Translation between 1-based UI pages and the store's 0-based page index.

use serde::Serialize;

/// Page sizes a caller may request; anything else falls back to [`DEFAULT_PAGE_SIZE`].
pub const ALLOWED_PAGE_SIZES: [u32; 4] = [10, 20, 50, 100];
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// A page request in the store's convention: 0-based index plus row count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StorePage {
    pub index: u32,
    pub size: u32,
}

impl StorePage {
    /// Row offset for `LIMIT .. OFFSET ..` queries.
    #[must_use]
    pub fn offset(self) -> i64 {
        i64::from(self.index) * i64::from(self.size)
    }

    #[must_use]
    pub fn limit(self) -> i64 {
        i64::from(self.size)
    }

    /// The 1-based page number this request was derived from.
    #[must_use]
    pub fn ui_page(self) -> u32 {
        self.index.saturating_add(1)
    }
}

/// Converts a 1-based UI page and requested size into a [`StorePage`].
///
/// Pages below 1 are clamped to 1. Sizes outside [`ALLOWED_PAGE_SIZES`] fall
/// back to [`DEFAULT_PAGE_SIZE`] without error.
#[must_use]
pub fn to_store_page(ui_page: i64, requested_size: i64) -> StorePage {
    let page = u32::try_from(ui_page.max(1)).unwrap_or(u32::MAX);
    StorePage {
        index: page - 1,
        size: restrict_page_size(requested_size),
    }
}

/// Returns `requested` if it is an allowed page size, otherwise the default.
#[must_use]
pub fn restrict_page_size(requested: i64) -> u32 {
    u32::try_from(requested)
        .ok()
        .filter(|size| ALLOWED_PAGE_SIZES.contains(size))
        .unwrap_or(DEFAULT_PAGE_SIZE)
}

/// Pagination state over the raw record result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageWindow {
    /// 1-based, after clamping.
    pub page_number: u32,
    pub page_size: u32,
    pub total_elements: i64,
    pub total_pages: u32,
}

impl PageWindow {
    /// Builds the window for `page` given the full filtered row count.
    #[must_use]
    pub fn from_total(page: StorePage, total_elements: i64) -> Self {
        let total_elements = total_elements.max(0);
        let rows = u64::try_from(total_elements).unwrap_or_default();
        let total_pages = rows.div_ceil(u64::from(page.size.max(1)));
        Self {
            page_number: page.ui_page(),
            page_size: page.size,
            total_elements,
            total_pages: u32::try_from(total_pages).unwrap_or(u32::MAX),
        }
    }

    #[must_use]
    pub fn is_first(&self) -> bool {
        self.page_number <= 1
    }

    /// True on the final page, and on any page past the end.
    #[must_use]
    pub fn is_last(&self) -> bool {
        self.page_number >= self.total_pages
    }

    #[must_use]
    pub fn has_next(&self) -> bool {
        self.page_number < self.total_pages
    }

    #[must_use]
    pub fn has_previous(&self) -> bool {
        self.page_number > 1
    }
}

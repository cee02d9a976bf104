//! Pagination bookkeeping

use crate::models::Pagination;

/// Requested page (1-based) and page size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSpec {
    pub page: u32,
    pub limit: u32,
}

impl Default for PageSpec {
    fn default() -> Self {
        Self { page: 1, limit: 10 }
    }
}

impl PageSpec {
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: page.max(1),
            limit: limit.max(1),
        }
    }

    pub fn next(self) -> Self {
        Self::new(self.page + 1, self.limit)
    }

    pub fn prev(self) -> Self {
        Self::new(self.page.saturating_sub(1), self.limit)
    }
}

/// Page info for `total` rows split by `spec`; the page is clamped into range
pub fn page_info(total: usize, spec: PageSpec) -> Pagination {
    let limit = spec.limit.max(1) as usize;
    let total_pages = total.div_ceil(limit) as u32;
    let current_page = spec.page.clamp(1, total_pages.max(1));

    Pagination {
        current_page,
        total_pages,
        total_loans: total as u64,
        has_next: current_page < total_pages,
        has_prev: current_page > 1,
    }
}

/// Slice one page out of an already filtered and sorted collection
pub fn paginate<T: Clone>(items: &[T], spec: PageSpec) -> (Vec<T>, Pagination) {
    let info = page_info(items.len(), spec);
    let limit = spec.limit.max(1) as usize;
    let start = (info.current_page as usize - 1) * limit;
    let rows = items.iter().skip(start).take(limit).cloned().collect();
    (rows, info)
}

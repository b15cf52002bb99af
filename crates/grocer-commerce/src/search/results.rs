//! Paged list results.

use serde::{Deserialize, Serialize};

/// Pagination info.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Pagination {
    /// Current page (1-indexed).
    pub page: i64,
    pub per_page: i64,
    /// Total number of rows across pages.
    pub total: i64,
    pub total_pages: i64,
}

impl Pagination {
    pub fn new(page: i64, per_page: i64, total: i64) -> Self {
        let per_page = per_page.max(1);
        let total_pages = if total <= 0 {
            1
        } else {
            (total + per_page - 1) / per_page
        };
        Self {
            page: page.max(1),
            per_page,
            total: total.max(0),
            total_pages,
        }
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    /// First row number on this page (1-indexed), 0 when empty.
    pub fn start_item(&self) -> i64 {
        if self.total == 0 {
            0
        } else {
            (self.page - 1) * self.per_page + 1
        }
    }

    pub fn end_item(&self) -> i64 {
        (self.page * self.per_page).min(self.total)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(1, crate::search::DEFAULT_PER_PAGE, 0)
    }
}

/// One page of a list endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: Pagination,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, pagination: Pagination) -> Self {
        Self { items, pagination }
    }

    /// A single page holding everything.
    pub fn single(items: Vec<T>) -> Self {
        let total = items.len() as i64;
        let per_page = total.max(1);
        Self {
            items,
            pagination: Pagination::new(1, per_page, total),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            pagination: self.pagination,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_math() {
        let p = Pagination::new(2, 10, 25);
        assert_eq!(p.total_pages, 3);
        assert!(p.has_next());
        assert!(p.has_prev());
        assert_eq!((p.start_item(), p.end_item()), (11, 20));

        let last = Pagination::new(3, 10, 25);
        assert!(!last.has_next());
        assert_eq!(last.end_item(), 25);
    }

    #[test]
    fn test_empty_pagination() {
        let p = Pagination::new(1, 24, 0);
        assert_eq!(p.total_pages, 1);
        assert_eq!(p.start_item(), 0);
    }

    #[test]
    fn test_single_page() {
        let page = Page::single(vec![1, 2, 3]).map(|n| n * 10);
        assert_eq!(page.items, vec![10, 20, 30]);
        assert_eq!(page.pagination.total, 3);
        assert!(!page.pagination.has_next());
    }
}

//! Windowed pagination over a derived list.
//!
//! # Invariants
//! - `page >= 1` and `page_size >= 1`.
//! - `has_more` is `false` only once the window covers the whole result.

/// Incremental "load more" pager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pager {
    page_size: usize,
    page: usize,
    has_more: bool,
}

impl Pager {
    /// Creates a pager on the first page. A zero page size is raised to 1.
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
            page: 1,
            has_more: true,
        }
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    /// Number of entries revealed out of `total`.
    pub fn visible_len(&self, total: usize) -> usize {
        self.page_size.saturating_mul(self.page).min(total)
    }

    /// Handles the end-of-window signal. Returns whether the page advanced.
    pub fn load_more(&mut self, total: usize) -> bool {
        if !self.has_more {
            return false;
        }
        if self.visible_len(total) >= total {
            self.has_more = false;
            return false;
        }
        self.page += 1;
        if self.visible_len(total) >= total {
            self.has_more = false;
        }
        true
    }

    /// Back to the first page with more data assumed.
    pub fn reset(&mut self) {
        self.page = 1;
        self.has_more = true;
    }

    /// Re-arms `has_more` after the underlying result changed.
    pub fn rearm(&mut self) {
        self.has_more = true;
    }
}

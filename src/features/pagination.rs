//! Page arithmetic for server-driven lists. The server owns the rows and the
//! total count; everything here is derived from those two numbers.

/// Number of page links shown at once.
pub const PAGE_WINDOW: u32 = 5;

/// Built through [`Pagination::new`], which keeps page and size at least 1.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pagination {
    current_page: u32,
    page_size: u32,
    total_items: u64,
}

impl Pagination {
    #[must_use]
    pub fn new(current_page: u32, page_size: u32, total_items: u64) -> Self {
        Self {
            current_page: current_page.max(1),
            page_size: page_size.max(1),
            total_items,
        }
    }

    #[must_use]
    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    #[must_use]
    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    #[must_use]
    pub fn total_items(&self) -> u64 {
        self.total_items
    }

    /// `ceil(total_items / page_size)`; zero for an empty list.
    #[must_use]
    pub fn total_pages(&self) -> u32 {
        let pages = self.total_items.div_ceil(u64::from(self.page_size));
        u32::try_from(pages).unwrap_or(u32::MAX)
    }

    #[must_use]
    pub fn has_previous(&self) -> bool {
        self.current_page > 1
    }

    #[must_use]
    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages()
    }

    /// 1-based positions of the first and last row on this page, `None` when empty.
    #[must_use]
    pub fn range(&self) -> Option<(u64, u64)> {
        let size = u64::from(self.page_size);
        let first = u64::from(self.current_page.saturating_sub(1)) * size + 1;
        if self.total_items == 0 || first > self.total_items {
            return None;
        }
        let last = (u64::from(self.current_page) * size).min(self.total_items);
        Some((first, last))
    }

    /// "Showing X to Y of Z <noun>"
    #[must_use]
    pub fn summary(&self, noun: &str) -> String {
        match self.range() {
            Some((first, last)) => {
                format!("Showing {first} to {last} of {} {noun}", self.total_items)
            }
            None => format!("Showing 0 of {} {noun}", self.total_items),
        }
    }

    /// Up to five page numbers around the current page, clamped to the ends.
    #[must_use]
    pub fn window(&self) -> Vec<u32> {
        let total = self.total_pages();
        if total <= PAGE_WINDOW {
            return (1..=total).collect();
        }
        let start = if self.current_page <= 3 {
            1
        } else if self.current_page >= total - 2 {
            total - PAGE_WINDOW + 1
        } else {
            self.current_page - 2
        };
        (start..start + PAGE_WINDOW).collect()
    }
}

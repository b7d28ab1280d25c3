use std::ops::Range;

/// Page sizes offered by the size selector, smallest first.
pub const PAGE_SIZES: [usize; 5] = [5, 10, 20, 50, 100];

/// Client-side pagination over the sorted row order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationState {
    /// Current page number (0-based)
    pub current_page: usize,
    /// Items per page, always one of [`PAGE_SIZES`]
    pub page_size: usize,
    /// Total number of items
    pub total_items: usize,
}

impl Default for PaginationState {
    fn default() -> Self {
        Self {
            current_page: 0,
            page_size: PAGE_SIZES[0],
            total_items: 0,
        }
    }
}

impl PaginationState {
    pub fn total_pages(&self) -> usize {
        self.total_items.div_ceil(self.page_size)
    }

    /// Update the item count, keeping the current page when it still exists.
    pub fn set_total_items(&mut self, total_items: usize) {
        self.total_items = total_items;
        self.current_page = self.current_page.min(self.total_pages().saturating_sub(1));
    }

    pub fn next_page(&mut self) {
        if self.current_page + 1 < self.total_pages() {
            self.current_page += 1;
        }
    }

    pub fn prev_page(&mut self) {
        self.current_page = self.current_page.saturating_sub(1);
    }

    /// Switch to the next larger page size, keeping the first visible item on screen.
    pub fn grow_page_size(&mut self) {
        if let Some(size) = PAGE_SIZES.iter().copied().find(|size| *size > self.page_size) {
            self.set_page_size(size);
        }
    }

    pub fn shrink_page_size(&mut self) {
        if let Some(size) = PAGE_SIZES.iter().rev().copied().find(|size| *size < self.page_size) {
            self.set_page_size(size);
        }
    }

    fn set_page_size(&mut self, page_size: usize) {
        let first_item = self.current_page * self.page_size;
        self.page_size = page_size;
        self.current_page = first_item / page_size;
    }

    /// Positions (in display order) shown on the current page.
    pub fn visible_range(&self) -> Range<usize> {
        let start = (self.current_page * self.page_size).min(self.total_items);
        let end = (start + self.page_size).min(self.total_items);
        start..end
    }

    /// Footer text such as `6-10 of 23 items`.
    pub fn range_label(&self) -> String {
        let range = self.visible_range();
        if range.is_empty() {
            return format!("0 of {} items", self.total_items);
        }
        format!("{}-{} of {} items", range.start + 1, range.end, self.total_items)
    }

    pub fn page_info(&self) -> String {
        format!("Page {} of {}", self.current_page + 1, self.total_pages().max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_five_per_page() {
        let mut pagination = PaginationState::default();
        pagination.set_total_items(12);
        assert_eq!(pagination.total_pages(), 3);
        assert_eq!(pagination.visible_range(), 0..5);
        assert_eq!(pagination.range_label(), "1-5 of 12 items");
    }

    #[test]
    fn paging_stops_at_the_ends() {
        let mut pagination = PaginationState::default();
        pagination.set_total_items(12);
        pagination.prev_page();
        assert_eq!(pagination.current_page, 0);

        pagination.next_page();
        pagination.next_page();
        pagination.next_page();
        assert_eq!(pagination.current_page, 2);
        assert_eq!(pagination.range_label(), "11-12 of 12 items");
        assert_eq!(pagination.page_info(), "Page 3 of 3");
    }

    #[test]
    fn shrinking_the_data_clamps_the_page() {
        let mut pagination = PaginationState::default();
        pagination.set_total_items(30);
        pagination.current_page = 5;
        pagination.set_total_items(7);
        assert_eq!(pagination.current_page, 1);

        pagination.set_total_items(0);
        assert_eq!(pagination.current_page, 0);
        assert_eq!(pagination.range_label(), "0 of 0 items");
    }

    #[test]
    fn page_size_changes_keep_the_first_item_visible() {
        let mut pagination = PaginationState::default();
        pagination.set_total_items(100);
        pagination.current_page = 4;

        pagination.grow_page_size();
        assert_eq!(pagination.page_size, 10);
        assert_eq!(pagination.visible_range(), 20..30);

        pagination.shrink_page_size();
        pagination.shrink_page_size();
        assert_eq!(pagination.page_size, 5);
        assert_eq!(pagination.visible_range(), 20..25);

        for _ in 0..10 {
            pagination.grow_page_size();
        }
        assert_eq!(pagination.page_size, 100);
    }
}

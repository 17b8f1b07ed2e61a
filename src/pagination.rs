use std::ops::Range;

pub fn page_count(row_count: usize, page_size: usize) -> usize {
    row_count.div_ceil(page_size.max(1))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageState {
    current_page: usize,
    page_size: usize,
}

impl PageState {
    pub fn new(page_size: usize) -> Self {
        Self {
            current_page: 1,
            page_size: page_size.max(1),
        }
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn next(&mut self, row_count: usize) -> bool {
        if self.current_page < page_count(row_count, self.page_size) {
            self.current_page += 1;
            true
        } else {
            false
        }
    }

    pub fn prev(&mut self) -> bool {
        if self.current_page > 1 {
            self.current_page -= 1;
            true
        } else {
            false
        }
    }

    pub fn clamp(&mut self, row_count: usize) {
        let total = page_count(row_count, self.page_size);
        self.current_page = self.current_page.min(total).max(1);
    }

    pub fn view(&self, row_count: usize) -> PageView {
        let total_pages = page_count(row_count, self.page_size);
        let start = ((self.current_page - 1) * self.page_size).min(row_count);
        let end = (self.current_page * self.page_size).min(row_count);
        PageView {
            page: self.current_page,
            total_pages,
            visible: start..end,
            prev_enabled: self.current_page > 1,
            next_enabled: self.current_page < total_pages,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageView {
    pub page: usize,
    pub total_pages: usize,
    pub visible: Range<usize>,
    pub prev_enabled: bool,
    pub next_enabled: bool,
}

impl PageView {
    pub fn label(&self) -> String {
        format!("Page {} of {}", self.page, self.total_pages)
    }

    pub fn is_visible(&self, index: usize) -> bool {
        self.visible.contains(&index)
    }

    pub fn visible_count(&self) -> usize {
        self.visible.len()
    }
}

#[cfg(test)]
mod tests {
    use super::{PageState, page_count};

    #[test]
    fn page_count_rounds_up_and_is_zero_only_without_rows() {
        assert_eq!(page_count(0, 10), 0);
        assert_eq!(page_count(1, 10), 1);
        assert_eq!(page_count(10, 10), 1);
        assert_eq!(page_count(11, 10), 2);
        assert_eq!(page_count(95, 10), 10);
    }

    #[test]
    fn every_page_shows_the_expected_number_of_rows() {
        for rows in [0usize, 1, 9, 10, 11, 20, 37] {
            let mut state = PageState::new(10);
            let total = page_count(rows, 10);
            for page in 1..=total {
                let view = state.view(rows);
                assert_eq!(view.page, page);
                assert_eq!(view.visible_count(), 10.min(rows - (page - 1) * 10));
                let shown = (0..rows).filter(|index| view.is_visible(*index)).count();
                assert_eq!(shown, view.visible_count());
                state.next(rows);
            }
        }
    }

    #[test]
    fn empty_table_disables_both_controls() {
        let view = PageState::new(10).view(0);
        assert_eq!(view.total_pages, 0);
        assert_eq!(view.visible_count(), 0);
        assert!(!view.prev_enabled);
        assert!(!view.next_enabled);
        assert_eq!(view.label(), "Page 1 of 0");
    }

    #[test]
    fn navigation_stops_at_the_edges() {
        let mut state = PageState::new(10);
        assert!(!state.prev());
        assert!(state.next(25));
        assert!(state.next(25));
        assert!(!state.next(25));
        assert_eq!(state.current_page(), 3);

        let last = state.view(25);
        assert!(last.prev_enabled);
        assert!(!last.next_enabled);
        assert_eq!(last.visible, 20..25);
        assert_eq!(last.label(), "Page 3 of 3");

        assert!(state.prev());
        assert_eq!(state.current_page(), 2);
    }

    #[test]
    fn clamp_follows_deleted_rows_back() {
        let mut state = PageState::new(10);
        state.next(11);
        assert_eq!(state.current_page(), 2);

        state.clamp(10);
        assert_eq!(state.current_page(), 1);
        assert_eq!(state.view(10).visible, 0..10);

        state.clamp(0);
        assert_eq!(state.current_page(), 1);
    }

    #[test]
    fn zero_page_size_is_treated_as_one() {
        let state = PageState::new(0);
        assert_eq!(state.page_size(), 1);
        assert_eq!(state.view(3).total_pages, 3);
    }
}

//! Page windows over a match list

pub use helpdesk_core::config::MAX_PER_PAGE;

use crate::error::{SearchError, SearchResult};

/// Highest offset a page may start at, exclusive.
pub const RESULT_WINDOW: u64 = 1000;

/// A 1-indexed page of a given size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub page: u32,
    pub per_page: u32,
}

impl PageWindow {
    #[must_use]
    pub const fn new(page: u32, per_page: u32) -> Self {
        Self { page, per_page }
    }

    /// Index of the first record on this page.
    #[must_use]
    pub fn offset(self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.per_page)
    }

    /// Reject pages that would start past the result window.
    ///
    /// Runs before any matching, independent of how many records exist.
    pub fn check_result_window(self) -> SearchResult<()> {
        if self.offset() >= RESULT_WINDOW {
            return Err(SearchError::result_window());
        }
        Ok(())
    }

    /// The slice of `items` this page covers.
    #[must_use]
    pub fn slice<T>(self, items: &[T]) -> &[T] {
        let start = usize::try_from(self.offset()).map_or(items.len(), |o| o.min(items.len()));
        let end = start
            .saturating_add(self.per_page as usize)
            .min(items.len());
        &items[start..end]
    }

    /// Following page number, when more matches remain after this page.
    #[must_use]
    pub fn next_page(self, count: usize) -> Option<u32> {
        let shown = u64::from(self.page) * u64::from(self.per_page);
        (shown < count as u64).then(|| self.page.saturating_add(1))
    }

    /// Preceding page number, when this is not the first page.
    #[must_use]
    pub const fn previous_page(self) -> Option<u32> {
        if self.page > 1 {
            Some(self.page - 1)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets() {
        assert_eq!(PageWindow::new(1, 100).offset(), 0);
        assert_eq!(PageWindow::new(3, 2).offset(), 4);
        assert_eq!(PageWindow::new(u32::MAX, 100).offset(), u64::from(u32::MAX - 1) * 100);
    }

    #[test]
    fn result_window_boundary() {
        assert!(PageWindow::new(10, 100).check_result_window().is_ok());
        assert!(PageWindow::new(11, 100).check_result_window().is_err());
        assert!(PageWindow::new(1000, 1).check_result_window().is_ok());
        assert!(PageWindow::new(1001, 1).check_result_window().is_err());
        let err = PageWindow::new(u32::MAX, 100)
            .check_result_window()
            .unwrap_err();
        assert!(err.to_string().contains("limited to 1000 records"));
    }

    #[test]
    fn slicing_six_by_two() {
        let items: Vec<u32> = (1..=6).collect();
        assert_eq!(PageWindow::new(1, 2).slice(&items), &[1, 2]);
        assert_eq!(PageWindow::new(3, 2).slice(&items), &[5, 6]);
        assert!(PageWindow::new(4, 2).slice(&items).is_empty());
    }

    #[test]
    fn neighbour_markers() {
        assert_eq!(PageWindow::new(1, 2).next_page(6), Some(2));
        assert_eq!(PageWindow::new(2, 2).next_page(6), Some(3));
        assert_eq!(PageWindow::new(3, 2).next_page(6), None);
        assert_eq!(PageWindow::new(1, 2).previous_page(), None);
        assert_eq!(PageWindow::new(3, 2).previous_page(), Some(2));
        assert_eq!(PageWindow::new(1, 100).next_page(0), None);
    }
}

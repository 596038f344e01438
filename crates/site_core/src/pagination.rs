//! crates/site_core/src/pagination.rs
//!
//! A navigable page window over an in-memory collection.

use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum PaginationError {
    #[error("items per page must be greater than zero")]
    ZeroPageSize,
}

/// Page-count metadata returned next to a page of items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct PageMeta {
    pub current_page: usize,
    pub items_per_page: usize,
    pub total_items: usize,
    pub total_pages: usize,
}

/// Holds a collection and the currently selected page.
///
/// `current_page` is 1-based and always stays within `1..=max(1, total_pages)`,
/// including after the data or the page size change.
#[derive(Debug, Clone)]
pub struct Paginator<T> {
    data: Vec<T>,
    items_per_page: usize,
    current_page: usize,
}

impl<T> Paginator<T> {
    pub fn new(data: Vec<T>, items_per_page: usize) -> Result<Self, PaginationError> {
        if items_per_page == 0 {
            return Err(PaginationError::ZeroPageSize);
        }
        Ok(Self {
            data,
            items_per_page,
            current_page: 1,
        })
    }

    pub fn total_items(&self) -> usize {
        self.data.len()
    }

    /// Zero for an empty collection.
    pub fn total_pages(&self) -> usize {
        self.data.len().div_ceil(self.items_per_page)
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn items_per_page(&self) -> usize {
        self.items_per_page
    }

    fn last_page(&self) -> usize {
        self.total_pages().max(1)
    }

    /// Moves to page `page`, clamped into the valid range.
    pub fn go_to_page(&mut self, page: usize) -> usize {
        self.current_page = page.clamp(1, self.last_page());
        self.current_page
    }

    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages()
    }

    pub fn has_previous(&self) -> bool {
        self.current_page > 1
    }

    pub fn next_page(&mut self) -> usize {
        self.go_to_page(self.current_page + 1)
    }

    pub fn previous_page(&mut self) -> usize {
        self.go_to_page(self.current_page.saturating_sub(1))
    }

    /// The items on the current page, in source order.
    pub fn page_items(&self) -> &[T] {
        let start = ((self.current_page - 1) * self.items_per_page).min(self.data.len());
        let end = (self.current_page * self.items_per_page).min(self.data.len());
        &self.data[start..end]
    }

    pub fn set_data(&mut self, data: Vec<T>) {
        self.data = data;
        self.go_to_page(self.current_page);
    }

    pub fn set_items_per_page(&mut self, items_per_page: usize) -> Result<(), PaginationError> {
        if items_per_page == 0 {
            return Err(PaginationError::ZeroPageSize);
        }
        self.items_per_page = items_per_page;
        self.go_to_page(self.current_page);
        Ok(())
    }

    pub fn meta(&self) -> PageMeta {
        PageMeta {
            current_page: self.current_page,
            items_per_page: self.items_per_page,
            total_items: self.total_items(),
            total_pages: self.total_pages(),
        }
    }

    /// Consumes the paginator, keeping only the current page.
    pub fn into_page(self) -> (Vec<T>, PageMeta) {
        let meta = self.meta();
        let start = (self.current_page - 1) * self.items_per_page;
        let items = self
            .data
            .into_iter()
            .skip(start)
            .take(meta.items_per_page)
            .collect();
        (items, meta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ten_items_three_per_page() {
        let mut pages = Paginator::new((1..=10).collect::<Vec<_>>(), 3).unwrap();
        assert_eq!(pages.total_pages(), 4);
        assert_eq!(pages.page_items(), &[1, 2, 3]);

        assert_eq!(pages.go_to_page(10), 4);
        assert_eq!(pages.page_items(), &[10]);
        assert!(!pages.has_next());
        assert!(pages.has_previous());
    }

    #[test]
    fn out_of_range_pages_clamp() {
        let mut pages = Paginator::new((1..=10).collect::<Vec<_>>(), 3).unwrap();
        assert_eq!(pages.go_to_page(0), 1);
        assert_eq!(pages.previous_page(), 1);
        pages.go_to_page(4);
        assert_eq!(pages.next_page(), 4);
    }

    #[test]
    fn empty_source_keeps_page_one() {
        let mut pages = Paginator::new(Vec::<u8>::new(), 5).unwrap();
        assert_eq!(pages.total_pages(), 0);
        assert_eq!(pages.current_page(), 1);
        assert!(pages.page_items().is_empty());
        assert_eq!(pages.go_to_page(3), 1);
        assert!(!pages.has_next());
        let (items, meta) = pages.into_page();
        assert!(items.is_empty());
        assert_eq!(meta.current_page, 1);
    }

    #[test]
    fn shrinking_data_reclamps_current_page() {
        let mut pages = Paginator::new((1..=10).collect::<Vec<_>>(), 3).unwrap();
        pages.go_to_page(4);
        pages.set_data(vec![1, 2, 3, 4]);
        assert_eq!(pages.current_page(), 2);
        assert_eq!(pages.page_items(), &[4]);

        pages.set_items_per_page(10).unwrap();
        assert_eq!(pages.current_page(), 1);
        assert_eq!(pages.page_items(), &[1, 2, 3, 4]);
    }

    #[test]
    fn zero_page_size_is_rejected() {
        assert_eq!(
            Paginator::new(vec![1], 0).unwrap_err(),
            PaginationError::ZeroPageSize
        );
        let mut pages = Paginator::new(vec![1], 1).unwrap();
        assert!(pages.set_items_per_page(0).is_err());
        assert_eq!(pages.items_per_page(), 1);
    }

    #[test]
    fn into_page_matches_page_items() {
        let mut pages = Paginator::new((1..=7).collect::<Vec<_>>(), 2).unwrap();
        pages.go_to_page(3);
        let expected = pages.page_items().to_vec();
        let (items, meta) = pages.into_page();
        assert_eq!(items, expected);
        assert_eq!(meta.total_pages, 4);
        assert_eq!(meta.total_items, 7);
    }
}

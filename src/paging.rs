use crate::core::{AppError, Result};
use serde::{Deserialize, Serialize};

/// Offset pagination parameters. `index` is zero-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub index: usize,
    pub size: usize,
}

impl PageRequest {
    pub fn new(index: usize, size: usize) -> Self {
        Self { index, size }
    }

    /// Fails fast, before any I/O.
    pub fn validate(&self) -> Result<()> {
        if self.size == 0 {
            return Err(AppError::Validation("page size must be positive".into()));
        }
        Ok(())
    }
}

/// One page of results plus the counts needed to render pagers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paged<T> {
    pub items: Vec<T>,
    pub index: usize,
    pub size: usize,
    pub total_items: usize,
    pub total_pages: usize,
}

impl<T> Paged<T> {
    pub fn from_items(all: Vec<T>, page: PageRequest) -> Self {
        let total_items = all.len();
        let total_pages = total_items.div_ceil(page.size.max(1));
        let items = all
            .into_iter()
            .skip(page.index.saturating_mul(page.size))
            .take(page.size)
            .collect();
        Self {
            items,
            index: page.index,
            size: page.size,
            total_items,
            total_pages,
        }
    }

    pub fn has_previous(&self) -> bool {
        self.index > 0
    }

    pub fn has_next(&self) -> bool {
        self.index + 1 < self.total_pages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_size_fails_validation() {
        assert!(PageRequest::new(0, 0).validate().is_err());
        assert!(PageRequest::new(0, 10).validate().is_ok());
    }

    #[test]
    fn paging_slices_and_counts() {
        let paged = Paged::from_items((0..25).collect(), PageRequest::new(1, 10));
        assert_eq!(paged.items, (10..20).collect::<Vec<_>>());
        assert_eq!(paged.total_items, 25);
        assert_eq!(paged.total_pages, 3);
        assert!(paged.has_previous());
        assert!(paged.has_next());
    }

    #[test]
    fn last_page_is_short_and_final() {
        let paged = Paged::from_items((0..25).collect::<Vec<i32>>(), PageRequest::new(2, 10));
        assert_eq!(paged.items.len(), 5);
        assert!(!paged.has_next());
    }

    #[test]
    fn page_past_the_end_is_empty() {
        let paged = Paged::from_items(vec![1, 2, 3], PageRequest::new(5, 10));
        assert!(paged.items.is_empty());
        assert_eq!(paged.total_pages, 1);
    }
}

//! Per-direction cursor state
//!
//! Each direction owns the page it is reading and the index of the next page
//! it will fetch. Neither cursor knows about the other; the iterator's global
//! consumed count keeps them apart.

use std::collections::VecDeque;

/// Cursor reading pages from the first towards the last
#[derive(Debug, Clone)]
pub struct ForwardCursor<T> {
    page_index: usize,
    offset: usize,
    page: Option<VecDeque<T>>,
}

impl<T> ForwardCursor<T> {
    /// Cursor positioned before page 0
    pub fn new() -> Self {
        Self {
            page_index: 0,
            offset: 0,
            page: None,
        }
    }

    /// Index of the next page this cursor will fetch
    pub fn page_index(&self) -> usize {
        self.page_index
    }

    /// Offset of the next record within the loaded page
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Whether a page with unread records is loaded
    pub fn has_page(&self) -> bool {
        self.page.as_ref().is_some_and(|page| !page.is_empty())
    }

    /// Whether a fetch is needed before the next read
    pub fn needs_page(&self) -> bool {
        !self.has_page()
    }

    /// Install a freshly fetched page and move past its index
    pub(crate) fn install(&mut self, records: Vec<T>) {
        self.page = Some(records.into());
        self.offset = 0;
        self.page_index += 1;
    }

    /// Take the record at the current offset
    pub(crate) fn take(&mut self) -> Option<T> {
        let page = self.page.as_mut()?;
        let record = page.pop_front()?;
        self.offset += 1;
        if page.is_empty() {
            self.page = None;
        }
        Some(record)
    }
}

impl<T> Default for ForwardCursor<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Cursor reading pages from the last towards the first
#[derive(Debug, Clone)]
pub struct BackwardCursor<T> {
    page_index: Option<usize>,
    offset: Option<usize>,
    page: Option<VecDeque<T>>,
}

impl<T> BackwardCursor<T> {
    /// Cursor positioned after the last of `total_pages` pages
    pub fn new(total_pages: usize) -> Self {
        Self {
            page_index: total_pages.checked_sub(1),
            offset: None,
            page: None,
        }
    }

    /// Index of the next page this cursor will fetch, `None` once page 0 was loaded
    pub fn page_index(&self) -> Option<usize> {
        self.page_index
    }

    /// Offset of the next record within the loaded page, `None` when exhausted
    pub fn offset(&self) -> Option<usize> {
        self.offset
    }

    /// Whether a page with unread records is loaded
    pub fn has_page(&self) -> bool {
        self.offset.is_some()
    }

    /// Whether a fetch is needed before the next read
    pub fn needs_page(&self) -> bool {
        !self.has_page()
    }

    /// Install a freshly fetched page and step back past its index
    pub(crate) fn install(&mut self, records: Vec<T>) {
        self.offset = records.len().checked_sub(1);
        self.page = self.offset.map(|_| records.into());
        self.page_index = self.page_index.and_then(|index| index.checked_sub(1));
    }

    /// Take the record at the current offset
    pub(crate) fn take(&mut self) -> Option<T> {
        let offset = self.offset?;
        let record = self.page.as_mut()?.pop_back()?;
        self.offset = offset.checked_sub(1);
        if self.offset.is_none() {
            self.page = None;
        }
        Some(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_cursor_walks_page() {
        let mut cursor = ForwardCursor::new();
        assert!(cursor.needs_page());
        assert_eq!(cursor.page_index(), 0);

        cursor.install(vec![1, 2]);
        assert_eq!(cursor.page_index(), 1);
        assert_eq!(cursor.offset(), 0);

        assert_eq!(cursor.take(), Some(1));
        assert_eq!(cursor.offset(), 1);
        assert_eq!(cursor.take(), Some(2));
        assert!(cursor.needs_page());
        assert_eq!(cursor.take(), None);
    }

    #[test]
    fn test_forward_cursor_empty_page_needs_another() {
        let mut cursor: ForwardCursor<u8> = ForwardCursor::new();
        cursor.install(vec![]);
        assert!(cursor.needs_page());
        assert_eq!(cursor.page_index(), 1);
    }

    #[test]
    fn test_backward_cursor_walks_page() {
        let mut cursor = BackwardCursor::new(2);
        assert_eq!(cursor.page_index(), Some(1));
        assert!(cursor.needs_page());

        cursor.install(vec![4, 5]);
        assert_eq!(cursor.page_index(), Some(0));
        assert_eq!(cursor.offset(), Some(1));

        assert_eq!(cursor.take(), Some(5));
        assert_eq!(cursor.offset(), Some(0));
        assert_eq!(cursor.take(), Some(4));
        assert_eq!(cursor.offset(), None);
        assert!(cursor.needs_page());

        cursor.install(vec![1]);
        assert_eq!(cursor.page_index(), None);
        assert_eq!(cursor.take(), Some(1));
    }

    #[test]
    fn test_backward_cursor_no_pages() {
        let cursor: BackwardCursor<u8> = BackwardCursor::new(0);
        assert_eq!(cursor.page_index(), None);
        assert!(cursor.needs_page());
    }
}

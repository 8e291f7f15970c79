//! In-memory paged source
//!
//! Holds its pages in a `Vec` and can be scripted to time out or fail on
//! specific pages, which makes it the fixture of choice for exercising retry
//! and cursor behavior without a network.

use super::types::PagedSource;
use crate::error::{Error, Result};
use crate::types::FetchTarget;
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Paged source backed by in-memory pages
#[derive(Debug, Clone)]
pub struct MemorySource<T> {
    pages: Vec<Vec<T>>,
    declared_records: Option<usize>,
    pending_timeouts: RefCell<HashMap<usize, usize>>,
    fatal_pages: HashSet<usize>,
    totals_timeouts: Cell<usize>,
    fetches: RefCell<HashMap<usize, usize>>,
}

impl<T: Clone> MemorySource<T> {
    /// Create a source from explicit pages
    pub fn new(pages: Vec<Vec<T>>) -> Self {
        Self {
            pages,
            declared_records: None,
            pending_timeouts: RefCell::new(HashMap::new()),
            fatal_pages: HashSet::new(),
            totals_timeouts: Cell::new(0),
            fetches: RefCell::new(HashMap::new()),
        }
    }

    /// Split `records` into pages of `page_size` (the last page may be shorter)
    ///
    /// A `page_size` of zero is treated as one.
    pub fn chunked(records: Vec<T>, page_size: usize) -> Self {
        let pages = records
            .chunks(page_size.max(1))
            .map(<[T]>::to_vec)
            .collect();
        Self::new(pages)
    }

    /// Make the next `times` fetches of `page` time out
    #[must_use]
    pub fn fail_with_timeouts(self, page: usize, times: usize) -> Self {
        *self.pending_timeouts.borrow_mut().entry(page).or_insert(0) += times;
        self
    }

    /// Make every fetch of `page` fail with a non-retryable error
    #[must_use]
    pub fn fail_fatally(mut self, page: usize) -> Self {
        self.fatal_pages.insert(page);
        self
    }

    /// Make the next `times` count queries time out
    #[must_use]
    pub fn timeout_totals(self, times: usize) -> Self {
        self.totals_timeouts.set(self.totals_timeouts.get() + times);
        self
    }

    /// Report `count` as the total record count instead of the real one
    #[must_use]
    pub fn declare_total_records(mut self, count: usize) -> Self {
        self.declared_records = Some(count);
        self
    }

    /// Schedule `times` more timeouts for `page` on an existing source
    pub fn inject_timeouts(&self, page: usize, times: usize) {
        *self.pending_timeouts.borrow_mut().entry(page).or_insert(0) += times;
    }

    /// Number of fetch attempts made for `page`, including failed ones
    pub fn fetches(&self, page: usize) -> usize {
        self.fetches.borrow().get(&page).copied().unwrap_or(0)
    }

    /// Number of fetch attempts made across all pages
    pub fn total_fetches(&self) -> usize {
        self.fetches.borrow().values().sum()
    }

    fn take_totals_timeout(&self) -> Result<()> {
        let remaining = self.totals_timeouts.get();
        if remaining > 0 {
            self.totals_timeouts.set(remaining - 1);
            return Err(Error::timed_out(FetchTarget::Totals));
        }
        Ok(())
    }
}

impl<T: Clone> PagedSource for MemorySource<T> {
    type Record = T;

    fn total_records(&self) -> Result<usize> {
        self.take_totals_timeout()?;
        Ok(self
            .declared_records
            .unwrap_or_else(|| self.pages.iter().map(Vec::len).sum()))
    }

    fn total_pages(&self) -> Result<usize> {
        self.take_totals_timeout()?;
        Ok(self.pages.len())
    }

    fn page(&self, index: usize) -> Result<Vec<T>> {
        *self.fetches.borrow_mut().entry(index).or_insert(0) += 1;

        if let Some(remaining) = self.pending_timeouts.borrow_mut().get_mut(&index) {
            if *remaining > 0 {
                *remaining -= 1;
                debug!("Injected timeout for page {}", index);
                return Err(Error::timed_out(FetchTarget::Page(index)));
            }
        }

        if self.fatal_pages.contains(&index) {
            return Err(Error::fatal(format!("page {index} is unavailable")));
        }

        self.pages
            .get(index)
            .cloned()
            .ok_or_else(|| Error::fatal(format!("page {index} does not exist")))
    }
}

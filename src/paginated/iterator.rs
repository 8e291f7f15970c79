//! Double-ended iterator over a paged source

use super::cursor::{BackwardCursor, ForwardCursor};
use crate::error::{Error, Result};
use crate::retry::RetryPolicy;
use crate::sequence::{DoubleEndedSequence, Sequence};
use crate::source::{PagedSource, Totals};
use crate::types::{Direction, FetchTarget};
use tracing::debug;

/// Lazily walks the records of a [`PagedSource`] from either end.
///
/// Construction queries the record and page counts but fetches no page.
/// `next` and `reverse_next` may be mixed freely; every record is produced
/// exactly once.
///
/// ```
/// use pagewalk::{DoubleEndedSequence, MemorySource, PaginatedIterator, Sequence};
///
/// let source = MemorySource::new(vec![vec![1, 2, 3], vec![4, 5]]);
/// let mut walk = PaginatedIterator::new(&source)?;
///
/// assert_eq!(walk.next()?, 1);
/// assert_eq!(walk.reverse_next()?, 5);
/// assert_eq!(walk.remaining(), 3);
/// # Ok::<(), pagewalk::Error>(())
/// ```
pub struct PaginatedIterator<'a, S: PagedSource> {
    source: &'a S,
    policy: RetryPolicy,
    total_records: usize,
    total_pages: usize,
    forward: ForwardCursor<S::Record>,
    backward: BackwardCursor<S::Record>,
    consumed: usize,
}

impl<'a, S: PagedSource> PaginatedIterator<'a, S> {
    /// Create an iterator with the default retry budget of 3
    pub fn new(source: &'a S) -> Result<Self> {
        Self::with_policy(source, RetryPolicy::default())
    }

    /// Create an iterator with `retries` retries per page fetch
    pub fn with_retries(source: &'a S, retries: u32) -> Result<Self> {
        Self::with_policy(source, RetryPolicy::with_retries(retries))
    }

    /// Create an iterator with a full retry policy
    pub fn with_policy(source: &'a S, policy: RetryPolicy) -> Result<Self> {
        let Totals {
            records: total_records,
            pages: total_pages,
        } = policy.run(FetchTarget::Totals, || source.totals())?;
        debug!(
            "Walking {} records across {} pages (retries: {})",
            total_records, total_pages, policy.retries
        );

        Ok(Self {
            source,
            policy,
            total_records,
            total_pages,
            forward: ForwardCursor::new(),
            backward: BackwardCursor::new(total_pages),
            consumed: 0,
        })
    }

    /// Total records reported by the source
    pub fn total_records(&self) -> usize {
        self.total_records
    }

    /// Total pages reported by the source
    pub fn total_pages(&self) -> usize {
        self.total_pages
    }

    /// Records produced so far from either end
    pub fn consumed(&self) -> usize {
        self.consumed
    }

    /// Records not yet produced
    pub fn remaining(&self) -> usize {
        self.total_records - self.consumed
    }

    /// The retry policy used for page fetches
    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Forward cursor state
    pub fn forward_cursor(&self) -> &ForwardCursor<S::Record> {
        &self.forward
    }

    /// Backward cursor state
    pub fn backward_cursor(&self) -> &BackwardCursor<S::Record> {
        &self.backward
    }

    fn fetch(&self, index: usize, direction: Direction) -> Result<Vec<S::Record>> {
        let source = self.source;
        let records = self
            .policy
            .run(FetchTarget::Page(index), || source.page(index))?;
        debug!(
            "Loaded page {} ({} records) for {:?} reads",
            index,
            records.len(),
            direction
        );
        Ok(records)
    }

    /// Whether backward reads have already drained page `index`
    ///
    /// The lowest page the backward cursor fetched may still be shared while
    /// it holds unread records.
    fn backward_passed(&self, index: usize) -> bool {
        let floor = self.backward.page_index().map_or(0, |next| next + 1);
        index > floor || (index == floor && !self.backward.has_page())
    }

    /// Whether forward reads have already drained page `index`
    fn forward_passed(&self, index: usize) -> bool {
        match self.forward.page_index().checked_sub(1) {
            Some(ceiling) => index < ceiling || (index == ceiling && !self.forward.has_page()),
            None => false,
        }
    }

    fn load_forward(&mut self) -> Result<()> {
        while self.forward.needs_page() {
            let index = self.forward.page_index();
            if index >= self.total_pages {
                return Err(Error::inconsistent(format!(
                    "ran past the last of {} pages with {} records still expected",
                    self.total_pages,
                    self.remaining()
                )));
            }
            if self.backward_passed(index) {
                return Err(Error::inconsistent(format!(
                    "forward reads reached page {} after backward reads drained it, with {} records still expected",
                    index,
                    self.remaining()
                )));
            }
            let records = self.fetch(index, Direction::Forward)?;
            self.forward.install(records);
        }
        Ok(())
    }

    fn load_backward(&mut self) -> Result<()> {
        while self.backward.needs_page() {
            let Some(index) = self.backward.page_index() else {
                return Err(Error::inconsistent(format!(
                    "ran past the first page with {} records still expected",
                    self.remaining()
                )));
            };
            if self.forward_passed(index) {
                return Err(Error::inconsistent(format!(
                    "backward reads reached page {} after forward reads drained it, with {} records still expected",
                    index,
                    self.remaining()
                )));
            }
            let records = self.fetch(index, Direction::Backward)?;
            self.backward.install(records);
        }
        Ok(())
    }
}

impl<S: PagedSource> Sequence for PaginatedIterator<'_, S> {
    type Item = S::Record;

    fn has_next(&self) -> bool {
        self.consumed < self.total_records
    }

    fn next(&mut self) -> Result<S::Record> {
        if !self.has_next() {
            return Err(Error::EndOfSequence);
        }

        self.load_forward()?;
        let record = self
            .forward
            .take()
            .ok_or_else(|| Error::inconsistent("forward page drained while loaded"))?;
        self.consumed += 1;
        Ok(record)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.remaining();
        (remaining, Some(remaining))
    }
}

impl<S: PagedSource> DoubleEndedSequence for PaginatedIterator<'_, S> {
    fn reverse_next(&mut self) -> Result<S::Record> {
        if !self.has_next() {
            return Err(Error::EndOfSequence);
        }

        self.load_backward()?;
        let record = self
            .backward
            .take()
            .ok_or_else(|| Error::inconsistent("backward page drained while loaded"))?;
        self.consumed += 1;
        Ok(record)
    }
}

impl<S: PagedSource> std::fmt::Debug for PaginatedIterator<'_, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaginatedIterator")
            .field("total_records", &self.total_records)
            .field("total_pages", &self.total_pages)
            .field("consumed", &self.consumed)
            .field("forward_page_index", &self.forward.page_index())
            .field("forward_offset", &self.forward.offset())
            .field("backward_page_index", &self.backward.page_index())
            .field("backward_offset", &self.backward.offset())
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

//! Paginated iteration module
//!
//! Exposes the records of a [`PagedSource`](crate::source::PagedSource) as one
//! double-ended sequence.
//!
//! # Overview
//!
//! Pages are fetched lazily, one per direction at a time, through the
//! [`RetryPolicy`](crate::retry::RetryPolicy). The forward and backward
//! cursors are tracked separately; a single global count of consumed records
//! decides when the walk is over, which keeps the two ends from ever handing
//! out the same record.

mod cursor;
mod iterator;

pub use cursor::{BackwardCursor, ForwardCursor};
pub use iterator::PaginatedIterator;

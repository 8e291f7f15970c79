//! Paged source module
//!
//! A paged source is the remote collection a [`PaginatedIterator`] walks. It
//! reports how many records and pages it holds and hands out one page at a
//! time.
//!
//! # Implementations
//!
//! - [`HttpPageSource`] - JSON API reached with a blocking HTTP client
//! - [`MemorySource`] - in-memory pages with scriptable timeouts and failures
//!
//! [`PaginatedIterator`]: crate::paginated::PaginatedIterator

mod http;
mod memory;
mod types;

pub use http::{HttpPageSource, HttpSourceConfig, HttpSourceConfigBuilder};
pub use memory::MemorySource;
pub use types::{extract_path, extract_path_mut, PagedSource, Totals};

//! # pagewalk
//!
//! Lazy, double-ended iteration over paginated record sources.
//!
//! ## Features
//!
//! - **Lazy Paging**: Pages are fetched only when a read needs them
//! - **Both Ends**: Read forward, backward, or interleave the two; every record is produced once
//! - **Retries**: Timed-out page fetches are retried within a fixed budget
//! - **Sources**: JSON over HTTP, or in-memory pages with scripted failures
//! - **Adapters**: Map, reverse, bound, zip and reduce, plus a bridge to std iterators
//!
//! ## Quick Start
//!
//! ```rust
//! use pagewalk::{DoubleEndedSequence, MemorySource, PaginatedIterator, Result, Sequence};
//!
//! fn main() -> Result<()> {
//!     let source = MemorySource::chunked((1..=10).collect::<Vec<u32>>(), 4);
//!     let mut walk = PaginatedIterator::with_retries(&source, 3)?;
//!
//!     assert_eq!(walk.next()?, 1);
//!     assert_eq!(walk.reverse_next()?, 10);
//!
//!     let rest: Vec<u32> = walk.records().collect::<Result<_>>()?;
//!     assert_eq!(rest, vec![2, 3, 4, 5, 6, 7, 8, 9]);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │              Sequence / DoubleEndedSequence                 │
//! │   has_next()    next()    reverse_next()    records()       │
//! └─────────────────────────────────────────────────────────────┘
//!                               │
//! ┌─────────────────────────────┴───────────────────────────────┐
//! │                     PaginatedIterator                       │
//! │  ForwardCursor  │  BackwardCursor  │  consumed / total      │
//! └─────────────────────────────────────────────────────────────┘
//!                               │ RetryPolicy
//! ┌─────────────────────────────┴───────────────────────────────┐
//! │                        PagedSource                          │
//! │        HttpPageSource          │        MemorySource        │
//! └─────────────────────────────────────────────────────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::should_implement_trait)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// Bounded retry of source queries
pub mod retry;

/// Paged source trait and implementations
pub mod source;

/// Fallible sequences and adapters
pub mod sequence;

/// Double-ended iterator over paged sources
pub mod paginated;

/// Walk definitions loaded from YAML
pub mod config;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use paginated::PaginatedIterator;
pub use retry::RetryPolicy;
pub use sequence::{DoubleEndedSequence, Sequence};
pub use source::{HttpPageSource, HttpSourceConfig, MemorySource, PagedSource};

pub use config::{load_config, load_config_from_str, validate_config, WalkConfig};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");

//! Paged source trait and helpers

use crate::error::Result;
use serde_json::Value;

/// Record and page counts reported by a source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Totals {
    /// Total number of records across all pages
    pub records: usize,
    /// Total number of pages
    pub pages: usize,
}

/// A remote collection that is read one page at a time.
///
/// Counts are expected to stay fixed while a walk is in progress. Pages may
/// differ in length, and the last page is often shorter.
pub trait PagedSource {
    /// The record type held by each page
    type Record;

    /// Total number of records across all pages
    fn total_records(&self) -> Result<usize>;

    /// Total number of pages
    fn total_pages(&self) -> Result<usize>;

    /// Fetch the page at `index` (0-based)
    ///
    /// Fails with [`Error::QueryTimedOut`](crate::Error::QueryTimedOut) on a
    /// transient timeout. Any other error is treated as fatal by callers.
    fn page(&self, index: usize) -> Result<Vec<Self::Record>>;

    /// Both counts at once
    ///
    /// The default queries each count separately. Sources that learn both
    /// from a single response override it.
    fn totals(&self) -> Result<Totals> {
        Ok(Totals {
            pages: self.total_pages()?,
            records: self.total_records()?,
        })
    }
}

impl<S: PagedSource + ?Sized> PagedSource for Box<S> {
    type Record = S::Record;

    fn total_records(&self) -> Result<usize> {
        (**self).total_records()
    }

    fn total_pages(&self) -> Result<usize> {
        (**self).total_pages()
    }

    fn page(&self, index: usize) -> Result<Vec<Self::Record>> {
        (**self).page(index)
    }

    fn totals(&self) -> Result<Totals> {
        (**self).totals()
    }
}

/// Follow a dot-separated path (optionally prefixed with `$.`) into a JSON value.
///
/// An empty path or `$` returns the value itself.
pub fn extract_path<'v>(value: &'v Value, path: &str) -> Option<&'v Value> {
    let path = path.strip_prefix("$.").unwrap_or(path);
    if path.is_empty() || path == "$" {
        return Some(value);
    }

    let mut current = value;
    for part in path.split('.') {
        match current {
            Value::Object(map) => {
                current = map.get(part)?;
            }
            _ => return None,
        }
    }

    Some(current)
}

/// Mutable counterpart of [`extract_path`]
pub fn extract_path_mut<'v>(value: &'v mut Value, path: &str) -> Option<&'v mut Value> {
    let path = path.strip_prefix("$.").unwrap_or(path);
    if path.is_empty() || path == "$" {
        return Some(value);
    }

    let mut current = value;
    for part in path.split('.') {
        match current {
            Value::Object(map) => {
                current = map.get_mut(part)?;
            }
            _ => return None,
        }
    }

    Some(current)
}

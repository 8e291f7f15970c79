//! Sequence adapters

use super::types::{DoubleEndedSequence, Sequence};
use crate::error::{Error, Result};

// ============================================================================
// Mapped
// ============================================================================

/// Applies a function to every element, from either end
#[derive(Clone)]
pub struct Mapped<S, F> {
    inner: S,
    f: F,
}

impl<S, F> Mapped<S, F> {
    pub(super) fn new(inner: S, f: F) -> Self {
        Self { inner, f }
    }

    /// Consume the adapter, returning the wrapped sequence
    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<B, S, F> Sequence for Mapped<S, F>
where
    S: Sequence,
    F: FnMut(S::Item) -> B,
{
    type Item = B;

    fn has_next(&self) -> bool {
        self.inner.has_next()
    }

    fn next(&mut self) -> Result<B> {
        self.inner.next().map(&mut self.f)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<B, S, F> DoubleEndedSequence for Mapped<S, F>
where
    S: DoubleEndedSequence,
    F: FnMut(S::Item) -> B,
{
    fn reverse_next(&mut self) -> Result<B> {
        self.inner.reverse_next().map(&mut self.f)
    }
}

impl<S: std::fmt::Debug, F> std::fmt::Debug for Mapped<S, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mapped")
            .field("inner", &self.inner)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Reversed
// ============================================================================

/// Walks a double-ended sequence from its far end
#[derive(Debug, Clone)]
pub struct Reversed<S> {
    inner: S,
}

impl<S> Reversed<S> {
    pub(super) fn new(inner: S) -> Self {
        Self { inner }
    }

    /// Consume the adapter, returning the wrapped sequence
    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: DoubleEndedSequence> Sequence for Reversed<S> {
    type Item = S::Item;

    fn has_next(&self) -> bool {
        self.inner.has_next()
    }

    fn next(&mut self) -> Result<S::Item> {
        self.inner.reverse_next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<S: DoubleEndedSequence> DoubleEndedSequence for Reversed<S> {
    fn reverse_next(&mut self) -> Result<S::Item> {
        self.inner.next()
    }
}

// ============================================================================
// Bounded
// ============================================================================

/// Produces at most a fixed number of elements
///
/// Only elements that were actually produced count towards the limit, so a
/// failed step can be retried without losing a slot.
#[derive(Debug, Clone)]
pub struct Bounded<S> {
    inner: S,
    limit: usize,
    taken: usize,
}

impl<S> Bounded<S> {
    pub(super) fn new(inner: S, limit: usize) -> Self {
        Self {
            inner,
            limit,
            taken: 0,
        }
    }

    /// Elements produced so far
    pub fn taken(&self) -> usize {
        self.taken
    }
}

impl<S: Sequence> Sequence for Bounded<S> {
    type Item = S::Item;

    fn has_next(&self) -> bool {
        self.taken < self.limit && self.inner.has_next()
    }

    fn next(&mut self) -> Result<S::Item> {
        if !self.has_next() {
            return Err(Error::EndOfSequence);
        }
        let item = self.inner.next()?;
        self.taken += 1;
        Ok(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.limit - self.taken;
        let (lower, upper) = self.inner.size_hint();
        (
            lower.min(left),
            Some(upper.map_or(left, |upper| upper.min(left))),
        )
    }
}

// ============================================================================
// Zipped
// ============================================================================

/// Pairs up two sequences element by element
///
/// When the left element was produced but the right side failed, the left
/// element is held back and paired on the next call.
pub struct Zipped<A: Sequence, B, F> {
    left: A,
    right: B,
    f: F,
    held: Option<A::Item>,
}

impl<A: Sequence, B, F> Zipped<A, B, F> {
    pub(super) fn new(left: A, right: B, f: F) -> Self {
        Self {
            left,
            right,
            f,
            held: None,
        }
    }
}

impl<A, B, F, R> Sequence for Zipped<A, B, F>
where
    A: Sequence,
    B: Sequence,
    F: FnMut(A::Item, B::Item) -> R,
{
    type Item = R;

    fn has_next(&self) -> bool {
        (self.held.is_some() || self.left.has_next()) && self.right.has_next()
    }

    fn next(&mut self) -> Result<R> {
        if !self.has_next() {
            return Err(Error::EndOfSequence);
        }

        let left = match self.held.take() {
            Some(item) => item,
            None => self.left.next()?,
        };
        match self.right.next() {
            Ok(right) => Ok((self.f)(left, right)),
            Err(e) => {
                self.held = Some(left);
                Err(e)
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let held = usize::from(self.held.is_some());
        let (left_lower, left_upper) = self.left.size_hint();
        let (right_lower, right_upper) = self.right.size_hint();
        let lower = (left_lower + held).min(right_lower);
        let upper = match (left_upper, right_upper) {
            (Some(l), Some(r)) => Some((l + held).min(r)),
            (Some(l), None) => Some(l + held),
            (None, Some(r)) => Some(r),
            (None, None) => None,
        };
        (lower, upper)
    }
}

impl<A, B, F> std::fmt::Debug for Zipped<A, B, F>
where
    A: Sequence + std::fmt::Debug,
    B: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Zipped")
            .field("left", &self.left)
            .field("right", &self.right)
            .field("held", &self.held.is_some())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Records (std bridge)
// ============================================================================

/// A sequence viewed as a std iterator of `Result` items
///
/// Ends (`None`) when the sequence reports no further elements. The first
/// error is yielded as `Some(Err(..))` and ends the iteration; the wrapped
/// sequence is left as it was, so [`Records::into_inner`] can resume it.
#[derive(Debug, Clone)]
pub struct Records<S> {
    inner: S,
    failed: bool,
}

impl<S> Records<S> {
    pub(super) fn new(inner: S) -> Self {
        Self {
            inner,
            failed: false,
        }
    }

    /// Get the wrapped sequence
    pub fn get_ref(&self) -> &S {
        &self.inner
    }

    /// Whether an error has ended the iteration
    pub fn failed(&self) -> bool {
        self.failed
    }

    /// Consume the bridge, returning the wrapped sequence
    pub fn into_inner(self) -> S {
        self.inner
    }

    fn observe<T>(&mut self, step: Result<T>) -> Result<T> {
        self.failed = step.is_err();
        step
    }
}

impl<S: Sequence> Iterator for Records<S> {
    type Item = Result<S::Item>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || !self.inner.has_next() {
            return None;
        }
        let step = Sequence::next(&mut self.inner);
        Some(self.observe(step))
    }

    // A failed step ends the iteration after one `Err`, so the count can
    // fall short of the inner lower bound but never exceed its upper bound.
    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.failed {
            return (0, Some(0));
        }
        let (lower, upper) = self.inner.size_hint();
        (lower.min(1), upper)
    }
}

impl<S: DoubleEndedSequence> DoubleEndedIterator for Records<S> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.failed || !self.inner.has_next() {
            return None;
        }
        let step = self.inner.reverse_next();
        Some(self.observe(step))
    }
}

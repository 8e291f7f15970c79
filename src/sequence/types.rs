//! Sequence traits

use super::adapters::{Bounded, Mapped, Records, Reversed, Zipped};
use crate::error::{Error, Result};

/// A pull-based sequence whose steps may fail.
///
/// `has_next` must not have side effects: adapters and callers may ask it
/// speculatively. `next` fails with [`Error::EndOfSequence`] once the sequence
/// is exhausted and never does so while `has_next` is true.
pub trait Sequence {
    /// The type of element produced
    type Item;

    /// Whether another element can be produced
    fn has_next(&self) -> bool;

    /// Produce the next element
    fn next(&mut self) -> Result<Self::Item>;

    /// Bounds on the remaining length, assuming every step succeeds
    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, None)
    }

    /// Transform each element with `f`
    fn map<B, F>(self, f: F) -> Mapped<Self, F>
    where
        Self: Sized,
        F: FnMut(Self::Item) -> B,
    {
        Mapped::new(self, f)
    }

    /// Produce at most `limit` elements
    fn bounded(self, limit: usize) -> Bounded<Self>
    where
        Self: Sized,
    {
        Bounded::new(self, limit)
    }

    /// Pair elements with those of `other`, combined by `f`
    ///
    /// Ends as soon as either side is exhausted.
    fn zip_with<U, F, R>(self, other: U, f: F) -> Zipped<Self, U, F>
    where
        Self: Sized,
        U: Sequence,
        F: FnMut(Self::Item, U::Item) -> R,
    {
        Zipped::new(self, other, f)
    }

    /// Fold every remaining element into a single value
    ///
    /// Fails with [`Error::EndOfSequence`] when nothing is left to fold.
    fn reduce<R, F>(&mut self, init: R, mut f: F) -> Result<R>
    where
        Self: Sized,
        F: FnMut(R, Self::Item) -> R,
    {
        if !self.has_next() {
            return Err(Error::EndOfSequence);
        }

        let mut acc = init;
        while self.has_next() {
            acc = f(acc, self.next()?);
        }
        Ok(acc)
    }

    /// Bridge into a std iterator of `Result` items
    fn records(self) -> Records<Self>
    where
        Self: Sized,
    {
        Records::new(self)
    }
}

/// A sequence that can also produce elements from its far end.
///
/// Elements taken with `next` and `reverse_next` never overlap: together
/// they produce each element exactly once.
pub trait DoubleEndedSequence: Sequence {
    /// Produce the next element from the far end
    fn reverse_next(&mut self) -> Result<Self::Item>;

    /// Swap the two ends
    fn reversed(self) -> Reversed<Self>
    where
        Self: Sized,
    {
        Reversed::new(self)
    }
}

impl<S: Sequence + ?Sized> Sequence for &mut S {
    type Item = S::Item;

    fn has_next(&self) -> bool {
        (**self).has_next()
    }

    fn next(&mut self) -> Result<Self::Item> {
        (**self).next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (**self).size_hint()
    }
}

impl<S: DoubleEndedSequence + ?Sized> DoubleEndedSequence for &mut S {
    fn reverse_next(&mut self) -> Result<Self::Item> {
        (**self).reverse_next()
    }
}

impl<S: Sequence + ?Sized> Sequence for Box<S> {
    type Item = S::Item;

    fn has_next(&self) -> bool {
        (**self).has_next()
    }

    fn next(&mut self) -> Result<Self::Item> {
        (**self).next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (**self).size_hint()
    }
}

impl<S: DoubleEndedSequence + ?Sized> DoubleEndedSequence for Box<S> {
    fn reverse_next(&mut self) -> Result<Self::Item> {
        (**self).reverse_next()
    }
}

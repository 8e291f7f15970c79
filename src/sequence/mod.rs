//! Sequence module
//!
//! Pull-based sequences whose steps can fail, with an optional back end.
//!
//! # Overview
//!
//! - [`Sequence`] - `has_next` / `next` over a fallible source of items
//! - [`DoubleEndedSequence`] - adds `reverse_next`, taking from the far end
//! - Adapters: [`Mapped`], [`Reversed`], [`Bounded`], [`Zipped`]
//! - [`Records`] - bridge into std `Iterator`/`DoubleEndedIterator` for the
//!   rest of the std combinators (`filter`, `collect`, ...)

mod adapters;
mod types;

pub use adapters::{Bounded, Mapped, Records, Reversed, Zipped};
pub use types::{DoubleEndedSequence, Sequence};

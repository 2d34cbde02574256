//! Type class traits shared by every collection in the crate.
//!
//! - [`TypeConstructor`]: Higher-kinded type emulation through GATs
//! - [`Functor`]: Mapping over every element
//! - [`Foldable`]: Folding a structure into a summary value
//!
//! The persistent collections implement `Foldable`, and all but the set
//! implement `Functor`, so code written against
//! these traits works the same over a `PersistentVector`, a `PersistentList`
//! or a plain `Vec`.
//!
//! # Examples
//!
//! ```rust
//! use strata::typeclass::{Foldable, Functor};
//!
//! fn total_length<F>(words: &F) -> usize
//! where
//!     F: Functor<Inner = String> + Clone,
//!     F::WithType<usize>: Foldable<Inner = usize>,
//! {
//!     words.fmap_ref(String::len).fold_left(0, |sum, length| sum + length)
//! }
//!
//! let words = vec!["alpha".to_string(), "beta".to_string()];
//! assert_eq!(total_length(&words), 9);
//! ```

mod foldable;
mod functor;
mod higher;

pub use foldable::Foldable;
pub use functor::Functor;
pub use higher::TypeConstructor;

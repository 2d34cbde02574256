//! Higher-Kinded Type emulation through Generic Associated Types.
//!
//! Rust has no native higher-kinded types, so a collection cannot be
//! abstracted over as "the `PersistentVector` constructor". [`TypeConstructor`]
//! works around that with a generic associated type: every collection names
//! its element type (`Inner`) and how to re-apply itself to another element
//! type (`WithType<B>`). [`Functor`](super::Functor) builds on it.
//!
//! # Example
//!
//! ```rust
//! use strata::typeclass::TypeConstructor;
//!
//! fn rebuild<T: TypeConstructor>(_value: &T) -> T::WithType<String>
//! where
//!     T::WithType<String>: Default,
//! {
//!     Default::default()
//! }
//!
//! let numbers = vec![1, 2, 3];
//! let strings: Vec<String> = rebuild(&numbers);
//! assert!(strings.is_empty());
//! ```

/// A type constructor applied to some element type.
///
/// # Laws
///
/// `<F as TypeConstructor>::WithType<F::Inner>` is `F` itself.
pub trait TypeConstructor {
    /// The element type this constructor is currently applied to.
    type Inner;

    /// The same constructor applied to `B`.
    type WithType<B>: TypeConstructor<Inner = B>;
}

impl<A> TypeConstructor for Option<A> {
    type Inner = A;
    type WithType<B> = Option<B>;
}

impl<T> TypeConstructor for Vec<T> {
    type Inner = T;
    type WithType<B> = Vec<B>;
}

//! Functor type class - mapping over every element of a collection.
//!
//! Persistent collections hold many elements, so the mapping function is
//! `FnMut` and receives a reference: the source collection stays intact and
//! the result is a freshly built collection of the same shape.
//!
//! # Laws
//!
//! ## Identity Law
//!
//! ```text
//! fa.fmap_ref(|x| x.clone()) == fa
//! ```
//!
//! ## Composition Law
//!
//! ```text
//! fa.fmap_ref(f).fmap_ref(g) == fa.fmap_ref(|x| g(&f(x)))
//! ```
//!
//! # Examples
//!
//! ```rust
//! use strata::typeclass::Functor;
//!
//! let numbers = vec![1, 2, 3];
//! let labels: Vec<String> = numbers.fmap_ref(|n| format!("#{n}"));
//! assert_eq!(labels, vec!["#1", "#2", "#3"]);
//! ```

use super::higher::TypeConstructor;

/// A collection whose elements can be transformed one by one.
pub trait Functor: TypeConstructor {
    /// Applies `function` to a reference of every element, in order,
    /// producing a collection of the results.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use strata::persistent::PersistentVector;
    /// use strata::typeclass::Functor;
    ///
    /// let vector: PersistentVector<i32> = (1..=3).collect();
    /// let doubled = vector.fmap_ref(|x| x * 2);
    /// assert_eq!(doubled.to_vec(), vec![2, 4, 6]);
    /// ```
    fn fmap_ref<B, F>(&self, function: F) -> Self::WithType<B>
    where
        F: FnMut(&Self::Inner) -> B;

    /// Replaces every element with a clone of `value`.
    fn replace<B: Clone>(&self, value: B) -> Self::WithType<B> {
        self.fmap_ref(|_| value.clone())
    }
}

impl<A> Functor for Option<A> {
    fn fmap_ref<B, F>(&self, function: F) -> Option<B>
    where
        F: FnMut(&A) -> B,
    {
        self.as_ref().map(function)
    }
}

impl<T> Functor for Vec<T> {
    fn fmap_ref<B, F>(&self, function: F) -> Vec<B>
    where
        F: FnMut(&T) -> B,
    {
        self.iter().map(function).collect()
    }
}

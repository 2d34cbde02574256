//! Foldable type class - folding over data structures.
//!
//! A `Foldable` can have its elements reduced into a single summary value.
//! Every persistent collection in this crate implements it, which is what
//! lets them compose uniformly with each other and with `Vec`.
//!
//! # Laws
//!
//! ## Consistency with `to_list`
//!
//! ```text
//! fa.fold_left(init, f) == fa.to_list().into_iter().fold(init, f)
//! ```
//!
//! ## Consistency between `fold_left` and `fold_right`
//!
//! For associative operations both folds produce the same result.
//!
//! # Examples
//!
//! ```rust
//! use strata::typeclass::Foldable;
//!
//! let numbers = vec![1, 2, 3, 4, 5];
//! let sum = numbers.fold_left(0, |accumulator, element| accumulator + element);
//! assert_eq!(sum, 15);
//! ```

use super::higher::TypeConstructor;

/// A data structure that can be folded to a summary value.
///
/// # Required Methods
///
/// - `fold_left`: Left-associative fold
/// - `fold_right`: Right-associative fold
///
/// All other methods have default implementations based on `fold_left`.
pub trait Foldable: TypeConstructor {
    /// Folds the structure from left to right with an accumulator.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use strata::typeclass::Foldable;
    ///
    /// let values = vec![1, 2, 3];
    /// let sum = values.fold_left(0, |accumulator, element| accumulator + element);
    /// assert_eq!(sum, 6);
    /// ```
    fn fold_left<B, F>(self, init: B, function: F) -> B
    where
        F: FnMut(B, Self::Inner) -> B;

    /// Folds the structure from right to left with an accumulator.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use strata::typeclass::Foldable;
    ///
    /// let values = vec![1, 2, 3];
    /// let result = values.fold_right(String::new(), |element, accumulator| {
    ///     format!("{element}{accumulator}")
    /// });
    /// assert_eq!(result, "123");
    /// ```
    fn fold_right<B, F>(self, init: B, function: F) -> B
    where
        F: FnMut(Self::Inner, B) -> B;

    /// Returns whether the structure contains no elements.
    fn is_empty(&self) -> bool
    where
        Self: Clone,
    {
        self.clone().fold_left(true, |_, _| false)
    }

    /// Returns the number of elements in the structure.
    fn length(&self) -> usize
    where
        Self: Clone,
    {
        self.clone().fold_left(0, |count, _| count + 1)
    }

    /// Converts the structure to a `Vec` in fold order.
    fn to_list(self) -> Vec<Self::Inner>
    where
        Self: Sized,
    {
        self.fold_left(Vec::new(), |mut accumulator, element| {
            accumulator.push(element);
            accumulator
        })
    }

    /// Calls `function` on every element in fold order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use strata::typeclass::Foldable;
    ///
    /// let mut seen = Vec::new();
    /// Foldable::for_each(&vec![1, 2, 3], |element| seen.push(element));
    /// assert_eq!(seen, vec![1, 2, 3]);
    /// ```
    fn for_each<F>(&self, mut function: F)
    where
        F: FnMut(Self::Inner),
        Self: Clone,
    {
        self.clone()
            .fold_left((), |(), element| function(element));
    }

    /// Finds the first element satisfying a predicate.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use strata::typeclass::Foldable;
    ///
    /// let values = vec![1, 2, 3, 4, 5];
    /// assert_eq!(values.clone().find(|element| *element > 3), Some(4));
    /// assert_eq!(values.find(|element| *element > 10), None);
    /// ```
    fn find<P>(self, mut predicate: P) -> Option<Self::Inner>
    where
        P: FnMut(&Self::Inner) -> bool,
        Self: Sized,
    {
        self.fold_left(None, |accumulator, element| {
            if accumulator.is_some() {
                accumulator
            } else if predicate(&element) {
                Some(element)
            } else {
                None
            }
        })
    }

    /// Checks if any element satisfies the predicate.
    fn exists<P>(&self, mut predicate: P) -> bool
    where
        P: FnMut(&Self::Inner) -> bool,
        Self: Clone,
    {
        self.clone().find(|element| predicate(element)).is_some()
    }

    /// Checks if all elements satisfy the predicate.
    ///
    /// An empty structure satisfies every predicate.
    fn for_all<P>(&self, mut predicate: P) -> bool
    where
        P: FnMut(&Self::Inner) -> bool,
        Self: Clone,
    {
        !self.exists(|element| !predicate(element))
    }
}

impl<A> Foldable for Option<A> {
    fn fold_left<B, F>(self, init: B, mut function: F) -> B
    where
        F: FnMut(B, A) -> B,
    {
        match self {
            Some(value) => function(init, value),
            None => init,
        }
    }

    fn fold_right<B, F>(self, init: B, mut function: F) -> B
    where
        F: FnMut(A, B) -> B,
    {
        match self {
            Some(value) => function(value, init),
            None => init,
        }
    }
}

impl<T> Foldable for Vec<T> {
    fn fold_left<B, F>(self, init: B, function: F) -> B
    where
        F: FnMut(B, T) -> B,
    {
        self.into_iter().fold(init, function)
    }

    fn fold_right<B, F>(self, init: B, mut function: F) -> B
    where
        F: FnMut(T, B) -> B,
    {
        self.into_iter()
            .rev()
            .fold(init, |accumulator, element| function(element, accumulator))
    }

    #[inline]
    fn is_empty(&self) -> bool {
        <[T]>::is_empty(self)
    }

    #[inline]
    fn length(&self) -> usize {
        self.len()
    }
}

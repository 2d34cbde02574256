//! Persistent set backed by a [`PersistentArrayMap`].
//!
//! # Examples
//!
//! ```rust
//! use strata::persistent::PersistentArraySet;
//!
//! let left = PersistentArraySet::of([1, 2, 3]);
//! let right = PersistentArraySet::of([3, 4]);
//!
//! assert_eq!(left.union(&right).to_vec(), vec![1, 2, 3, 4]);
//! assert_eq!(left.difference(&right).to_vec(), vec![1, 2]);
//! ```

use std::fmt;

use crate::typeclass::{Foldable, TypeConstructor};

use super::PersistentArrayMap;
use super::array_map::PersistentArrayMapIterator;

/// A persistent set of distinct elements in insertion order.
///
/// Membership is decided with `PartialEq` by a linear scan, so `contains`,
/// `insert` and `remove` are O(n) and the set operations are O(n * m).
pub struct PersistentArraySet<T> {
    inner: PersistentArrayMap<T, ()>,
}

impl<T> Clone for PersistentArraySet<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> PersistentArraySet<T> {
    /// Creates a new empty set.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: PersistentArrayMap::new(),
        }
    }

    /// Returns the number of elements.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns `true` if the set contains no elements.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Returns an iterator over the elements in insertion order.
    #[must_use]
    pub fn iter(&self) -> PersistentArraySetIterator<'_, T> {
        PersistentArraySetIterator {
            inner: self.inner.iter(),
        }
    }

    /// Calls `function` on every element in insertion order.
    pub fn for_each<F>(&self, mut function: F)
    where
        F: FnMut(&T),
    {
        self.inner.for_each(|element, ()| function(element));
    }
}

impl<T: PartialEq> PersistentArraySet<T> {
    /// Returns `true` if `element` is in the set.
    #[must_use]
    pub fn contains(&self, element: &T) -> bool {
        self.inner.contains_key(element)
    }

    /// Returns `true` if every element of `self` is in `other`.
    #[must_use]
    pub fn is_subset(&self, other: &Self) -> bool {
        self.iter().all(|element| other.contains(element))
    }
}

impl<T: Clone + PartialEq> PersistentArraySet<T> {
    /// Creates a set from `elements`, dropping repeats.
    #[must_use]
    pub fn of<I>(elements: I) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        elements
            .into_iter()
            .fold(Self::new(), |set, element| set.insert(element))
    }

    /// Returns a set that also contains `element`.
    ///
    /// Inserting an element already present returns an equal set.
    #[must_use]
    pub fn insert(&self, element: T) -> Self {
        Self {
            inner: self.inner.insert(element, ()),
        }
    }

    /// Returns a set without `element`.
    #[must_use]
    pub fn remove(&self, element: &T) -> Self {
        Self {
            inner: self.inner.remove(element),
        }
    }

    /// Returns the elements of `self` followed by the elements of `other`
    /// not already in `self`.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        other
            .iter()
            .fold(self.clone(), |set, element| set.insert(element.clone()))
    }

    /// Returns the elements of `self` that are also in `other`.
    #[must_use]
    pub fn intersection(&self, other: &Self) -> Self {
        self.filter(|element| other.contains(element))
    }

    /// Returns the elements of `self` that are not in `other`.
    #[must_use]
    pub fn difference(&self, other: &Self) -> Self {
        self.filter(|element| !other.contains(element))
    }

    /// Returns a set holding only the elements satisfying `predicate`.
    #[must_use]
    pub fn filter<P>(&self, mut predicate: P) -> Self
    where
        P: FnMut(&T) -> bool,
    {
        Self {
            inner: self.inner.filter(|element, ()| predicate(element)),
        }
    }

    /// Materializes the elements, in insertion order, into a `Vec`.
    #[must_use]
    pub fn to_vec(&self) -> Vec<T> {
        self.iter().cloned().collect()
    }
}

/// An iterator over the elements of a [`PersistentArraySet`].
pub struct PersistentArraySetIterator<'a, T> {
    inner: PersistentArrayMapIterator<'a, T, ()>,
}

impl<'a, T> Iterator for PersistentArraySetIterator<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(element, ())| element)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> ExactSizeIterator for PersistentArraySetIterator<'_, T> {}

impl<T> Default for PersistentArraySet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + PartialEq> FromIterator<T> for PersistentArraySet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::of(iter)
    }
}

impl<'a, T> IntoIterator for &'a PersistentArraySet<T> {
    type Item = &'a T;
    type IntoIter = PersistentArraySetIterator<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Two sets are equal when they hold the same elements, in any order.
impl<T: PartialEq> PartialEq for PersistentArraySet<T> {
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl<T: Eq> Eq for PersistentArraySet<T> {}

impl<T: fmt::Debug> fmt::Debug for PersistentArraySet<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_set().entries(self.iter()).finish()
    }
}

impl<T: fmt::Display> fmt::Display for PersistentArraySet<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{{")?;
        for (position, element) in self.iter().enumerate() {
            if position > 0 {
                write!(formatter, ", ")?;
            }
            write!(formatter, "{element}")?;
        }
        write!(formatter, "}}")
    }
}

impl<T> TypeConstructor for PersistentArraySet<T> {
    type Inner = T;
    type WithType<B> = PersistentArraySet<B>;
}

impl<T: Clone> Foldable for PersistentArraySet<T> {
    fn fold_left<B, F>(self, init: B, function: F) -> B
    where
        F: FnMut(B, T) -> B,
    {
        self.iter().cloned().fold(init, function)
    }

    fn fold_right<B, F>(self, init: B, mut function: F) -> B
    where
        F: FnMut(T, B) -> B,
    {
        let elements: Vec<T> = self.iter().cloned().collect();
        elements
            .into_iter()
            .rev()
            .fold(init, |accumulator, element| function(element, accumulator))
    }

    #[inline]
    fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    #[inline]
    fn length(&self) -> usize {
        self.inner.len()
    }
}

#[cfg(feature = "serde")]
impl<T: serde::Serialize> serde::Serialize for PersistentArraySet<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_seq(self.iter())
    }
}

#[cfg(feature = "serde")]
impl<'de, T> serde::Deserialize<'de> for PersistentArraySet<T>
where
    T: serde::Deserialize<'de> + Clone + PartialEq,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        <Vec<T> as serde::Deserialize>::deserialize(deserializer).map(Self::of)
    }
}

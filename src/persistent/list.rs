//! Persistent (immutable) singly-linked list.
//!
//! This module provides [`PersistentList`], an immutable linked list that
//! shares every suffix between versions.
//!
//! # Structural Sharing
//!
//! Prepending with `cons` allocates one node and points it at the existing
//! list, which is left untouched:
//!
//! ```text
//! list1: 1 -> 2 -> 3 -> nil
//! list2 = list1.cons(0): 0 -> [1 -> 2 -> 3 -> nil]  // shares [1, 2, 3] with list1
//! ```
//!
//! # Examples
//!
//! ```rust
//! use strata::persistent::PersistentList;
//!
//! let list = PersistentList::of([1, 2, 3]);
//! let doubled = list.map(|x| x * 2);
//!
//! assert_eq!(doubled.to_vec(), vec![2, 4, 6]);
//! assert_eq!(list.to_vec(), vec![1, 2, 3]);
//! ```

use std::fmt;
use std::hash::{Hash, Hasher};

use super::ReferenceCounter;
use crate::typeclass::{Foldable, Functor, TypeConstructor};

struct Node<T> {
    element: T,
    next: Option<ReferenceCounter<Self>>,
}

/// A persistent (immutable) singly-linked list.
///
/// # Time Complexity
///
/// | Operation | Complexity |
/// |-----------|------------|
/// | `new`     | O(1)       |
/// | `cons`    | O(1)       |
/// | `head`    | O(1)       |
/// | `tail`    | O(1)       |
/// | `len`     | O(1)       |
/// | `get`     | O(n)       |
/// | `concat`  | O(n)       |
/// | `reverse` | O(n)       |
pub struct PersistentList<T> {
    head: Option<ReferenceCounter<Node<T>>>,
    /// Cached length for O(1) access.
    length: usize,
}

impl<T> Clone for PersistentList<T> {
    fn clone(&self) -> Self {
        Self {
            head: self.head.clone(),
            length: self.length,
        }
    }
}

impl<T> PersistentList<T> {
    /// Creates a new empty list.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use strata::persistent::PersistentList;
    ///
    /// let list: PersistentList<i32> = PersistentList::new();
    /// assert!(list.is_empty());
    /// ```
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            head: None,
            length: 0,
        }
    }

    /// Creates a list containing a single element.
    #[inline]
    #[must_use]
    pub fn singleton(element: T) -> Self {
        Self::new().cons(element)
    }

    /// Creates a list holding `values` in iteration order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use strata::persistent::PersistentList;
    ///
    /// let list = PersistentList::of(vec!['a', 'b']);
    /// assert_eq!(list.head(), Some(&'a'));
    /// ```
    #[must_use]
    pub fn of<I>(values: I) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        Self::build_from_vec(values.into_iter().collect())
    }

    /// Builds a list by popping from the end of `elements`, so each
    /// element is moved exactly once.
    fn build_from_vec(mut elements: Vec<T>) -> Self {
        let length = elements.len();
        let mut head = None;
        while let Some(element) = elements.pop() {
            head = Some(ReferenceCounter::new(Node {
                element,
                next: head,
            }));
        }
        Self { head, length }
    }

    /// Prepends an element, sharing the whole of `self`.
    ///
    /// # Complexity
    ///
    /// O(1) time and space
    ///
    /// # Examples
    ///
    /// ```rust
    /// use strata::persistent::PersistentList;
    ///
    /// let list = PersistentList::new().cons(3).cons(2).cons(1);
    /// assert_eq!(list.head(), Some(&1));
    /// assert_eq!(list.len(), 3);
    /// ```
    #[inline]
    #[must_use]
    pub fn cons(&self, element: T) -> Self {
        Self {
            head: Some(ReferenceCounter::new(Node {
                element,
                next: self.head.clone(),
            })),
            length: self.length + 1,
        }
    }

    /// Returns a reference to the first element, or `None` if empty.
    #[inline]
    #[must_use]
    pub fn head(&self) -> Option<&T> {
        self.head.as_ref().map(|node| &node.element)
    }

    /// Returns the list without its first element.
    ///
    /// The tail of an empty list is the empty list.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use strata::persistent::PersistentList;
    ///
    /// let list = PersistentList::of([1, 2, 3]);
    /// assert_eq!(list.tail().head(), Some(&2));
    /// assert!(PersistentList::<i32>::new().tail().is_empty());
    /// ```
    #[inline]
    #[must_use]
    pub fn tail(&self) -> Self {
        self.head.as_ref().map_or_else(Self::new, |node| Self {
            head: node.next.clone(),
            length: self.length - 1,
        })
    }

    /// Splits the list into its head and tail, or `None` if empty.
    #[must_use]
    pub fn uncons(&self) -> Option<(&T, Self)> {
        self.head.as_ref().map(|node| {
            let tail = Self {
                head: node.next.clone(),
                length: self.length - 1,
            };
            (&node.element, tail)
        })
    }

    /// Returns the number of elements.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.length
    }

    /// Returns `true` if the list contains no elements.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    /// Returns a reference to the element at `index`, or `None` when out
    /// of bounds.
    ///
    /// # Complexity
    ///
    /// O(n) where n = index
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.iter().nth(index)
    }

    /// Returns an iterator over references to the elements.
    #[must_use]
    pub fn iter(&self) -> PersistentListIterator<'_, T> {
        PersistentListIterator {
            current: self.head.as_deref(),
            remaining: self.length,
        }
    }

    /// Calls `function` on every element, front to back.
    pub fn for_each<F>(&self, function: F)
    where
        F: FnMut(&T),
    {
        self.iter().for_each(function);
    }

    /// Returns a new list holding `function` applied to every element.
    #[must_use]
    pub fn map<B, F>(&self, function: F) -> PersistentList<B>
    where
        F: FnMut(&T) -> B,
    {
        PersistentList::build_from_vec(self.iter().map(function).collect())
    }
}

impl<T: Clone> PersistentList<T> {
    /// Returns a list holding the elements of `self` followed by those of
    /// `other`.
    ///
    /// `self` is copied; `other` is shared as the suffix of the result.
    ///
    /// # Complexity
    ///
    /// O(n) where n = `self.len()`
    ///
    /// # Examples
    ///
    /// ```rust
    /// use strata::persistent::PersistentList;
    ///
    /// let left = PersistentList::of([1, 2]);
    /// let right = PersistentList::of([3, 4]);
    /// assert_eq!(left.concat(&right).to_vec(), vec![1, 2, 3, 4]);
    /// ```
    #[must_use]
    pub fn concat(&self, other: &Self) -> Self {
        let mut elements: Vec<T> = self.iter().cloned().collect();
        let mut result = other.clone();
        while let Some(element) = elements.pop() {
            result = result.cons(element);
        }
        result
    }

    /// Returns the list in reverse order.
    #[must_use]
    pub fn reverse(&self) -> Self {
        self.iter()
            .fold(Self::new(), |reversed, element| reversed.cons(element.clone()))
    }

    /// Returns a new list holding only the elements satisfying `predicate`,
    /// in their original order.
    #[must_use]
    pub fn filter<P>(&self, mut predicate: P) -> Self
    where
        P: FnMut(&T) -> bool,
    {
        Self::build_from_vec(
            self.iter()
                .filter(|element| predicate(element))
                .cloned()
                .collect(),
        )
    }

    /// Materializes every element, in order, into a `Vec`.
    #[must_use]
    pub fn to_vec(&self) -> Vec<T> {
        self.iter().cloned().collect()
    }
}

impl<T> Drop for PersistentList<T> {
    /// Unlinks uniquely owned nodes one at a time so that dropping a long
    /// list does not recurse once per node.
    fn drop(&mut self) {
        let mut next = self.head.take();
        while let Some(node) = next {
            match ReferenceCounter::try_unwrap(node) {
                Ok(mut node) => next = node.next.take(),
                Err(_) => break,
            }
        }
    }
}

// =============================================================================
// Iterators
// =============================================================================

/// An iterator over references to elements of a [`PersistentList`].
pub struct PersistentListIterator<'a, T> {
    current: Option<&'a Node<T>>,
    remaining: usize,
}

impl<'a, T> Iterator for PersistentListIterator<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.current.map(|node| {
            self.current = node.next.as_deref();
            self.remaining -= 1;
            &node.element
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for PersistentListIterator<'_, T> {}

/// An owning iterator over elements of a [`PersistentList`].
pub struct PersistentListIntoIterator<T> {
    list: PersistentList<T>,
}

impl<T: Clone> Iterator for PersistentListIntoIterator<T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        let (head, tail) = self.list.uncons()?;
        let element = head.clone();
        self.list = tail;
        Some(element)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.list.length, Some(self.list.length))
    }
}

impl<T: Clone> ExactSizeIterator for PersistentListIntoIterator<T> {}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

impl<T> Default for PersistentList<T> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<T> FromIterator<T> for PersistentList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::of(iter)
    }
}

impl<T: Clone> IntoIterator for PersistentList<T> {
    type Item = T;
    type IntoIter = PersistentListIntoIterator<T>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        PersistentListIntoIterator { list: self }
    }
}

impl<'a, T> IntoIterator for &'a PersistentList<T> {
    type Item = &'a T;
    type IntoIter = PersistentListIterator<'a, T>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: PartialEq> PartialEq for PersistentList<T> {
    fn eq(&self, other: &Self) -> bool {
        self.length == other.length && self.iter().eq(other.iter())
    }
}

impl<T: Eq> Eq for PersistentList<T> {}

impl<T: Hash> Hash for PersistentList<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.length.hash(state);
        for element in self {
            element.hash(state);
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for PersistentList<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_list().entries(self.iter()).finish()
    }
}

impl<T: fmt::Display> fmt::Display for PersistentList<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "[")?;
        for (position, element) in self.iter().enumerate() {
            if position > 0 {
                write!(formatter, ", ")?;
            }
            write!(formatter, "{element}")?;
        }
        write!(formatter, "]")
    }
}

// =============================================================================
// Type Class Implementations
// =============================================================================

impl<T> TypeConstructor for PersistentList<T> {
    type Inner = T;
    type WithType<B> = PersistentList<B>;
}

impl<T> Functor for PersistentList<T> {
    fn fmap_ref<B, F>(&self, function: F) -> PersistentList<B>
    where
        F: FnMut(&T) -> B,
    {
        self.map(function)
    }
}

impl<T: Clone> Foldable for PersistentList<T> {
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
        self.to_vec()
            .into_iter()
            .rev()
            .fold(init, |accumulator, element| function(element, accumulator))
    }

    #[inline]
    fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    #[inline]
    fn length(&self) -> usize {
        self.length
    }
}

// =============================================================================
// Serde Support
// =============================================================================

#[cfg(feature = "serde")]
impl<T: serde::Serialize> serde::Serialize for PersistentList<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_seq(self.iter())
    }
}

#[cfg(feature = "serde")]
impl<'de, T> serde::Deserialize<'de> for PersistentList<T>
where
    T: serde::Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        <Vec<T> as serde::Deserialize>::deserialize(deserializer).map(Self::build_from_vec)
    }
}

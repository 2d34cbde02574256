//! Persistent (immutable) vector based on a bit-partitioned trie.
//!
//! This module provides [`PersistentVector`], an immutable indexed sequence
//! in which every update returns a new version and leaves all earlier
//! versions intact and valid.
//!
//! # Internal Structure
//!
//! A vector is four fields:
//!
//! - `root`: an optional 32-way trie. Branch nodes hold up to 32 children;
//!   the children of the lowest branch level are leaf blocks of up to 32
//!   elements. Every root-to-leaf path has the same length.
//! - `tail`: up to 32 of the newest elements, not yet committed to the trie.
//! - `length`: the total element count (trie plus tail).
//! - `shift`: `BITS_PER_LEVEL * (trie height - 1)`, the number of bits an
//!   index is shifted right to select the root's child.
//!
//! `push_back` only copies the tail until it fills; the full tail then
//! becomes the trie's new rightmost leaf block. When the trie is saturated
//! at its current height, a new root is created with the old root as child 0
//! and a fresh path to the promoted leaf as child 1. This is the only way
//! the height changes.
//!
//! `set` copies the single root-to-leaf path it touches. Everything else is
//! shared by reference between the old and new versions.
//!
//! # Examples
//!
//! ```rust
//! use strata::persistent::PersistentVector;
//!
//! let vector = PersistentVector::of([1, 2, 3, 4, 5]);
//! let updated = vector.set(2, 99).unwrap();
//!
//! assert_eq!(updated.to_vec(), vec![1, 2, 99, 4, 5]);
//! assert_eq!(vector.to_vec(), vec![1, 2, 3, 4, 5]); // Original unchanged
//! ```

use std::fmt;
use std::hash::{Hash, Hasher};
use std::slice;

use arrayvec::ArrayVec;
use tracing::{debug, trace};

use super::{IndexOutOfRange, ReferenceCounter};
use crate::typeclass::{Foldable, Functor, TypeConstructor};

// =============================================================================
// Constants
// =============================================================================

/// Branching factor (2^5 = 32)
const BRANCHING_FACTOR: usize = 32;

/// Bits per level in the trie
const BITS_PER_LEVEL: usize = 5;

/// Bit mask for extracting index within a node
const MASK: usize = BRANCHING_FACTOR - 1;

/// Maximum number of branch levels a `usize` index can address.
const MAX_DEPTH: usize = (usize::BITS as usize).div_ceil(BITS_PER_LEVEL);

static_assertions::const_assert_eq!(BRANCHING_FACTOR, 1 << BITS_PER_LEVEL);

// =============================================================================
// Node Definition
// =============================================================================

/// A trie node. Nodes are never mutated once reachable from a vector.
enum Node<T> {
    /// Internal node; children are packed from slot 0 with no gaps.
    ///
    /// The child array sits behind its own reference counter so that a
    /// `Node` stays two words plus a tag whatever its variant.
    Branch(ReferenceCounter<Children<T>>),
    /// Leaf block of up to `BRANCHING_FACTOR` elements.
    ///
    /// A promoted tail becomes a leaf without copying its elements.
    Leaf(ReferenceCounter<[T]>),
}

type Children<T> = ArrayVec<ReferenceCounter<Node<T>>, BRANCHING_FACTOR>;

impl<T> Node<T> {
    fn branch(children: Children<T>) -> Self {
        Self::Branch(ReferenceCounter::new(children))
    }

    fn branch_of(child: Self) -> Self {
        let mut children = ArrayVec::new();
        children.push(ReferenceCounter::new(child));
        Self::branch(children)
    }

    /// Wraps `leaf` in single-child branches until it sits `level` bits
    /// below the returned node.
    fn path_to(level: usize, leaf: Self) -> Self {
        if level == 0 {
            leaf
        } else {
            Self::branch_of(Self::path_to(level - BITS_PER_LEVEL, leaf))
        }
    }

    /// Returns a copy of `node` with `leaf` attached as the new rightmost
    /// leaf block. `tail_offset` is the index of the leaf's first element.
    fn push_leaf(node: &Self, level: usize, tail_offset: usize, leaf: Self) -> Self {
        match node {
            Self::Branch(children) => {
                let subindex = (tail_offset >> level) & MASK;
                let child = if level == BITS_PER_LEVEL {
                    leaf
                } else {
                    match children.get(subindex) {
                        Some(existing) => Self::push_leaf(
                            existing,
                            level - BITS_PER_LEVEL,
                            tail_offset,
                            leaf,
                        ),
                        None => Self::path_to(level - BITS_PER_LEVEL, leaf),
                    }
                };

                let mut new_children = Children::clone(children);
                let child = ReferenceCounter::new(child);
                if subindex < new_children.len() {
                    new_children[subindex] = child;
                } else {
                    new_children.push(child);
                }
                Self::branch(new_children)
            }
            Self::Leaf(_) => leaf,
        }
    }
}

impl<T: Clone> Node<T> {
    /// Returns a copy of `node` with the element at `index` replaced,
    /// cloning only the nodes on the path to it.
    ///
    /// # Panics
    ///
    /// Panics if `index` does not address an element under `node`.
    fn set(node: &Self, level: usize, index: usize, element: T) -> Self {
        match node {
            Self::Branch(children) => {
                let subindex = (index >> level) & MASK;
                let child = Self::set(
                    &children[subindex],
                    level.saturating_sub(BITS_PER_LEVEL),
                    index,
                    element,
                );
                let mut new_children = Children::clone(children);
                new_children[subindex] = ReferenceCounter::new(child);
                Self::branch(new_children)
            }
            Self::Leaf(elements) => {
                let mut new_elements = elements.to_vec();
                new_elements[index & MASK] = element;
                Self::Leaf(ReferenceCounter::from(new_elements))
            }
        }
    }
}

// =============================================================================
// PersistentVector Definition
// =============================================================================

/// A persistent (immutable) vector based on a 32-way bit-partitioned trie.
///
/// # Time Complexity
///
/// | Operation    | Complexity                      |
/// |--------------|---------------------------------|
/// | `new`        | O(1)                            |
/// | `get`        | O(log32 N)                      |
/// | `set`        | O(log32 N)                      |
/// | `push_back`  | O(log32 N), amortized O(1)      |
/// | `len`        | O(1)                            |
/// | `is_empty`   | O(1)                            |
/// | `iter`       | O(1) to create, O(N) to iterate |
/// | `map`        | O(N)                            |
/// | `filter`     | O(N)                            |
///
/// # Examples
///
/// ```rust
/// use strata::persistent::PersistentVector;
///
/// let vector: PersistentVector<i32> = (0..100).collect();
/// assert_eq!(vector.len(), 100);
/// assert_eq!(vector.get(50), Some(&50));
/// ```
pub struct PersistentVector<T> {
    /// Total number of elements
    length: usize,
    /// Shift amount for index calculation: (height - 1) * `BITS_PER_LEVEL`
    shift: usize,
    /// Root of the trie; `None` while every element fits in the tail
    root: Option<ReferenceCounter<Node<T>>>,
    /// Newest elements not yet committed to the trie (up to 32)
    tail: ReferenceCounter<[T]>,
}

impl<T> Clone for PersistentVector<T> {
    fn clone(&self) -> Self {
        Self {
            length: self.length,
            shift: self.shift,
            root: self.root.clone(),
            tail: self.tail.clone(),
        }
    }
}

impl<T> PersistentVector<T> {
    /// Creates a new empty vector.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use strata::persistent::PersistentVector;
    ///
    /// let vector: PersistentVector<i32> = PersistentVector::new();
    /// assert!(vector.is_empty());
    /// ```
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            length: 0,
            shift: BITS_PER_LEVEL,
            root: None,
            tail: ReferenceCounter::from(Vec::new()),
        }
    }

    /// Creates a vector containing a single element.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use strata::persistent::PersistentVector;
    ///
    /// let vector = PersistentVector::singleton(42);
    /// assert_eq!(vector.len(), 1);
    /// assert_eq!(vector.get(0), Some(&42));
    /// ```
    #[inline]
    #[must_use]
    pub fn singleton(element: T) -> Self {
        Self {
            length: 1,
            shift: BITS_PER_LEVEL,
            root: None,
            tail: ReferenceCounter::from(vec![element]),
        }
    }

    /// Creates a vector holding `values` in order.
    ///
    /// The result has exactly the shape that pushing every value onto an
    /// empty vector would produce, but is built bottom-up in O(N).
    ///
    /// # Examples
    ///
    /// ```rust
    /// use strata::persistent::PersistentVector;
    ///
    /// let vector = PersistentVector::of(vec!["a", "b", "c"]);
    /// assert_eq!(vector.get(1), Some(&"b"));
    /// ```
    #[must_use]
    pub fn of<I>(values: I) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        build_from_vec(values.into_iter().collect())
    }

    /// Returns the number of elements in the vector.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.length
    }

    /// Returns `true` if the vector contains no elements.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use strata::persistent::PersistentVector;
    ///
    /// let empty: PersistentVector<i32> = PersistentVector::new();
    /// assert!(empty.is_empty());
    /// assert!(!empty.push_back(1).is_empty());
    /// ```
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Index of the first element held in the tail.
    #[inline]
    fn tail_offset(&self) -> usize {
        self.length - self.tail.len()
    }

    /// Returns a reference to the element at `index`, or `None` when
    /// `index >= len()`.
    ///
    /// # Complexity
    ///
    /// O(log32 N), without allocating.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use strata::persistent::PersistentVector;
    ///
    /// let vector: PersistentVector<i32> = (1..=5).collect();
    /// assert_eq!(vector.get(0), Some(&1));
    /// assert_eq!(vector.get(4), Some(&5));
    /// assert_eq!(vector.get(10), None);
    /// ```
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        if index >= self.length {
            return None;
        }
        self.block_for(index)?.get(index & MASK)
    }

    /// Returns a reference to the element at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`IndexOutOfRange`] when `index >= len()`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use strata::persistent::{IndexOutOfRange, PersistentVector};
    ///
    /// let vector = PersistentVector::of([10, 20, 30]);
    /// assert_eq!(vector.try_get(1), Ok(&20));
    /// assert_eq!(vector.try_get(3), Err(IndexOutOfRange { index: 3, length: 3 }));
    /// ```
    pub fn try_get(&self, index: usize) -> Result<&T, IndexOutOfRange> {
        let index = IndexOutOfRange::check(index, self.length)?;
        self.get(index).ok_or(IndexOutOfRange {
            index,
            length: self.length,
        })
    }

    /// Returns the block holding `index`: the tail, or the leaf reached by
    /// walking down from the root.
    ///
    /// The tail offset is a multiple of 32, so `index & MASK` addresses the
    /// element inside either kind of block.
    fn block_for(&self, index: usize) -> Option<&ReferenceCounter<[T]>> {
        if index >= self.tail_offset() {
            return Some(&self.tail);
        }

        let mut node = self.root.as_deref()?;
        let mut level = self.shift;

        loop {
            match node {
                Node::Branch(children) => {
                    node = &**children.get((index >> level) & MASK)?;
                    level = level.saturating_sub(BITS_PER_LEVEL);
                }
                Node::Leaf(elements) => return Some(elements),
            }
        }
    }

    /// Returns a reference to the first element, or `None` if empty.
    #[inline]
    #[must_use]
    pub fn first(&self) -> Option<&T> {
        self.get(0)
    }

    /// Returns a reference to the last element, or `None` if empty.
    ///
    /// # Complexity
    ///
    /// O(1) - the last element is always in the tail
    #[inline]
    #[must_use]
    pub fn last(&self) -> Option<&T> {
        self.tail.last()
    }

    /// Returns an iterator over references to the elements, front to back.
    ///
    /// The iterator is lazy and finite; calling `iter` again starts a fresh
    /// pass over the same version.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use strata::persistent::PersistentVector;
    ///
    /// let vector: PersistentVector<i32> = (1..=5).collect();
    /// let collected: Vec<&i32> = vector.iter().collect();
    /// assert_eq!(collected, vec![&1, &2, &3, &4, &5]);
    /// ```
    #[must_use]
    pub fn iter(&self) -> PersistentVectorIterator<'_, T> {
        PersistentVectorIterator {
            blocks: LeafBlocks::new(self),
            current: [].iter(),
            remaining: self.length,
        }
    }

    /// Calls `function` on every element, front to back.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use strata::persistent::PersistentVector;
    ///
    /// let vector = PersistentVector::of([1, 2, 3]);
    /// let mut sum = 0;
    /// vector.for_each(|x| sum += x);
    /// assert_eq!(sum, 6);
    /// ```
    pub fn for_each<F>(&self, function: F)
    where
        F: FnMut(&T),
    {
        self.iter().for_each(function);
    }

    /// Returns a new vector holding `function` applied to every element.
    ///
    /// Length and order are preserved.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use strata::persistent::PersistentVector;
    ///
    /// let vector = PersistentVector::of([1, 2, 3]);
    /// let squared = vector.map(|x| x * x);
    /// assert_eq!(squared.to_vec(), vec![1, 4, 9]);
    /// ```
    #[must_use]
    pub fn map<B, F>(&self, function: F) -> PersistentVector<B>
    where
        F: FnMut(&T) -> B,
    {
        build_from_vec(self.iter().map(function).collect())
    }

    /// Finds the index of the first element satisfying `predicate`.
    #[must_use]
    pub fn find_index<P>(&self, predicate: P) -> Option<usize>
    where
        P: FnMut(&T) -> bool,
    {
        self.iter().position(predicate)
    }
}

impl<T: Clone> PersistentVector<T> {
    /// Appends an element to the back of the vector.
    ///
    /// # Complexity
    ///
    /// O(log32 N), amortized O(1): only the tail is copied until it fills.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use strata::persistent::PersistentVector;
    ///
    /// let vector = PersistentVector::new()
    ///     .push_back(1)
    ///     .push_back(2)
    ///     .push_back(3);
    ///
    /// assert_eq!(vector.len(), 3);
    /// assert_eq!(vector.get(2), Some(&3));
    /// ```
    #[must_use]
    pub fn push_back(&self, element: T) -> Self {
        if self.tail.len() < BRANCHING_FACTOR {
            let mut new_tail = Vec::with_capacity(self.tail.len() + 1);
            new_tail.extend_from_slice(&self.tail);
            new_tail.push(element);

            Self {
                length: self.length + 1,
                shift: self.shift,
                root: self.root.clone(),
                tail: ReferenceCounter::from(new_tail),
            }
        } else {
            self.promote_tail(element)
        }
    }

    /// Commits the full tail into the trie and starts a new tail with
    /// `element`, growing the trie by one level if it is saturated.
    fn promote_tail(&self, element: T) -> Self {
        let tail_offset = self.tail_offset();
        let leaf = Node::Leaf(self.tail.clone());
        trace!(length = self.length, tail_offset, "promoting full tail into trie");

        let (root, shift) = match &self.root {
            None => (Node::path_to(self.shift, leaf), self.shift),
            Some(root) if (tail_offset >> self.shift) >= BRANCHING_FACTOR => {
                let new_shift = self.shift + BITS_PER_LEVEL;
                debug!(
                    old_shift = self.shift,
                    new_shift,
                    length = self.length + 1,
                    "growing trie by one level"
                );
                let mut children = ArrayVec::new();
                children.push(ReferenceCounter::clone(root));
                children.push(ReferenceCounter::new(Node::path_to(self.shift, leaf)));
                (Node::branch(children), new_shift)
            }
            Some(root) => (
                Node::push_leaf(root, self.shift, tail_offset, leaf),
                self.shift,
            ),
        };

        Self {
            length: self.length + 1,
            shift,
            root: Some(ReferenceCounter::new(root)),
            tail: ReferenceCounter::from(vec![element]),
        }
    }

    /// Appends every element of `iter`, in order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use strata::persistent::PersistentVector;
    ///
    /// let vector: PersistentVector<i32> = (1..=3).collect();
    /// let extended = vector.extend_back(4..=6);
    /// assert_eq!(extended.to_vec(), vec![1, 2, 3, 4, 5, 6]);
    /// assert_eq!(vector.len(), 3);
    /// ```
    #[must_use]
    pub fn extend_back<I>(&self, iter: I) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        iter.into_iter()
            .fold(self.clone(), |vector, element| vector.push_back(element))
    }

    /// Returns a vector holding the elements of `self` followed by those of
    /// `other`. The trie of `self` is shared.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use strata::persistent::PersistentVector;
    ///
    /// let left = PersistentVector::of([1, 2]);
    /// let right = PersistentVector::of([3, 4]);
    /// assert_eq!(left.concat(&right).to_vec(), vec![1, 2, 3, 4]);
    /// ```
    #[must_use]
    pub fn concat(&self, other: &Self) -> Self {
        if self.is_empty() {
            return other.clone();
        }
        self.extend_back(other.iter().cloned())
    }

    /// Creates a vector from a slice, cloning the elements.
    #[must_use]
    pub fn from_slice(slice: &[T]) -> Self {
        build_from_vec(slice.to_vec())
    }

    /// Returns a new vector with the element at `index` replaced.
    ///
    /// Only the path from the root to the affected leaf is copied; when
    /// `index` falls in the tail, only the tail is copied and the trie is
    /// shared whole.
    ///
    /// # Errors
    ///
    /// Returns [`IndexOutOfRange`] when `index >= len()`. Nothing is
    /// allocated in that case.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use strata::persistent::PersistentVector;
    ///
    /// let vector: PersistentVector<i32> = (1..=5).collect();
    /// let updated = vector.set(2, 100).unwrap();
    ///
    /// assert_eq!(updated.get(2), Some(&100));
    /// assert_eq!(vector.get(2), Some(&3)); // Original unchanged
    /// assert!(vector.set(5, 0).is_err());
    /// ```
    pub fn set(&self, index: usize, element: T) -> Result<Self, IndexOutOfRange> {
        let index = IndexOutOfRange::check(index, self.length)?;
        Ok(self.replace(index, element))
    }

    /// Path-copying core of [`set`](Self::set) for an index already known
    /// to be in range.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len()`.
    pub(crate) fn replace(&self, index: usize, element: T) -> Self {
        debug_assert!(index < self.length, "replace past the end");
        let tail_offset = self.tail_offset();

        match self.root.as_deref() {
            Some(root) if index < tail_offset => Self {
                length: self.length,
                shift: self.shift,
                root: Some(ReferenceCounter::new(Node::set(
                    root, self.shift, index, element,
                ))),
                tail: self.tail.clone(),
            },
            _ => {
                let mut new_tail = self.tail.to_vec();
                new_tail[index - tail_offset] = element;
                Self {
                    length: self.length,
                    shift: self.shift,
                    root: self.root.clone(),
                    tail: ReferenceCounter::from(new_tail),
                }
            }
        }
    }

    /// Like [`set`](Self::set), but reports an out-of-range index as `None`.
    #[must_use]
    pub fn update(&self, index: usize, element: T) -> Option<Self> {
        self.set(index, element).ok()
    }

    /// Returns a new vector holding only the elements satisfying
    /// `predicate`, in their original order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use strata::persistent::PersistentVector;
    ///
    /// let vector: PersistentVector<i32> = (1..=10).collect();
    /// let even = vector.filter(|x| x % 2 == 0);
    /// assert_eq!(even.to_vec(), vec![2, 4, 6, 8, 10]);
    /// ```
    #[must_use]
    pub fn filter<P>(&self, mut predicate: P) -> Self
    where
        P: FnMut(&T) -> bool,
    {
        build_from_vec(
            self.iter()
                .filter(|element| predicate(element))
                .cloned()
                .collect(),
        )
    }

    /// Materializes every element, in order, into a `Vec`.
    #[must_use]
    pub fn to_vec(&self) -> Vec<T> {
        let mut elements = Vec::with_capacity(self.length);
        for block in LeafBlocks::new(self) {
            elements.extend_from_slice(block);
        }
        elements
    }
}

#[cfg(feature = "rayon")]
impl<T: Sync> PersistentVector<T> {
    /// Returns a rayon parallel iterator over references to the elements.
    ///
    /// Work is split by leaf block, so each task reads a contiguous run of
    /// up to 32 elements.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rayon::prelude::*;
    /// use strata::persistent::PersistentVector;
    ///
    /// let vector: PersistentVector<i64> = (1..=1000).collect();
    /// let sum: i64 = vector.par_iter().sum();
    /// assert_eq!(sum, 500_500);
    /// ```
    #[must_use]
    pub fn par_iter(&self) -> impl rayon::iter::ParallelIterator<Item = &T> + '_ {
        use rayon::prelude::*;

        let blocks: Vec<&[T]> = LeafBlocks::new(self).map(|block| &**block).collect();
        blocks.into_par_iter().flat_map_iter(|block| block.iter())
    }
}

// =============================================================================
// Bulk Construction
// =============================================================================

/// Builds a vector from `elements` bottom-up.
///
/// The tail receives the last `length % 32` elements (or a full 32), the
/// rest is chunked into leaf blocks and grouped into branches until one
/// root remains: the same shape repeated `push_back` produces.
fn build_from_vec<T>(mut elements: Vec<T>) -> PersistentVector<T> {
    let length = elements.len();

    if length <= BRANCHING_FACTOR {
        return PersistentVector {
            length,
            shift: BITS_PER_LEVEL,
            root: None,
            tail: ReferenceCounter::from(elements),
        };
    }

    let tail_length = match length % BRANCHING_FACTOR {
        0 => BRANCHING_FACTOR,
        remainder => remainder,
    };
    let tail = elements.split_off(length - tail_length);
    let (root, shift) = build_root(elements);

    PersistentVector {
        length,
        shift,
        root: Some(root),
        tail: ReferenceCounter::from(tail),
    }
}

/// Builds a trie over `elements`, whose length is a positive multiple of
/// the branching factor. Returns the root and its shift.
fn build_root<T>(elements: Vec<T>) -> (ReferenceCounter<Node<T>>, usize) {
    let mut level: Vec<ReferenceCounter<Node<T>>> =
        Vec::with_capacity(elements.len() / BRANCHING_FACTOR);
    let mut source = elements.into_iter();
    loop {
        let chunk: Vec<T> = source.by_ref().take(BRANCHING_FACTOR).collect();
        if chunk.is_empty() {
            break;
        }
        level.push(ReferenceCounter::new(Node::Leaf(ReferenceCounter::from(
            chunk,
        ))));
    }

    let mut shift = BITS_PER_LEVEL;
    while level.len() > BRANCHING_FACTOR {
        level = group_into_branches(level);
        shift += BITS_PER_LEVEL;
    }

    (
        ReferenceCounter::new(Node::branch(level.into_iter().collect())),
        shift,
    )
}

fn group_into_branches<T>(nodes: Vec<ReferenceCounter<Node<T>>>) -> Vec<ReferenceCounter<Node<T>>> {
    let mut parents = Vec::with_capacity(nodes.len().div_ceil(BRANCHING_FACTOR));
    let mut source = nodes.into_iter();
    loop {
        let children: Children<T> =
            source.by_ref().take(BRANCHING_FACTOR).collect();
        if children.is_empty() {
            break;
        }
        parents.push(ReferenceCounter::new(Node::branch(children)));
    }
    parents
}

// =============================================================================
// Iterators
// =============================================================================

/// Walks the leaf blocks of a vector left to right, then its tail.
///
/// Depth-first over the trie with an explicit stack of child iterators, so
/// each node is visited once and nothing is allocated.
struct LeafBlocks<'a, T> {
    stack: ArrayVec<slice::Iter<'a, ReferenceCounter<Node<T>>>, MAX_DEPTH>,
    tail: Option<&'a ReferenceCounter<[T]>>,
}

impl<'a, T> LeafBlocks<'a, T> {
    fn new(vector: &'a PersistentVector<T>) -> Self {
        let mut blocks = Self {
            stack: ArrayVec::new(),
            tail: Some(&vector.tail).filter(|tail| !tail.is_empty()),
        };
        if let Some(Node::Branch(children)) = vector.root.as_deref() {
            blocks.stack.push(children.iter());
        }
        blocks
    }
}

impl<'a, T> Iterator for LeafBlocks<'a, T> {
    type Item = &'a ReferenceCounter<[T]>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(children) = self.stack.last_mut() {
            match children.next().map(|child| &**child) {
                Some(Node::Branch(grandchildren)) => self.stack.push(grandchildren.iter()),
                Some(Node::Leaf(elements)) => return Some(elements),
                None => {
                    self.stack.pop();
                }
            }
        }
        self.tail.take()
    }
}

/// An iterator over references to elements of a [`PersistentVector`].
///
/// Iteration is O(N) overall: leaf blocks are read as contiguous slices
/// instead of re-walking the trie for every index.
pub struct PersistentVectorIterator<'a, T> {
    blocks: LeafBlocks<'a, T>,
    current: slice::Iter<'a, T>,
    remaining: usize,
}

impl<'a, T> Iterator for PersistentVectorIterator<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(element) = self.current.next() {
                self.remaining -= 1;
                return Some(element);
            }
            self.current = self.blocks.next()?.iter();
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for PersistentVectorIterator<'_, T> {}

impl<T> std::iter::FusedIterator for PersistentVectorIterator<'_, T> {}

/// An owning iterator over elements of a [`PersistentVector`].
///
/// Keeps the vector alive and clones each element out as it is returned.
pub struct PersistentVectorIntoIterator<T> {
    vector: PersistentVector<T>,
    position: usize,
}

impl<T: Clone> Iterator for PersistentVectorIntoIterator<T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        let element = self.vector.get(self.position)?.clone();
        self.position += 1;
        Some(element)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.vector.length - self.position;
        (remaining, Some(remaining))
    }
}

impl<T: Clone> ExactSizeIterator for PersistentVectorIntoIterator<T> {}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

impl<T> Default for PersistentVector<T> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<T> FromIterator<T> for PersistentVector<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::of(iter)
    }
}

impl<T> From<Vec<T>> for PersistentVector<T> {
    fn from(elements: Vec<T>) -> Self {
        build_from_vec(elements)
    }
}

impl<T: Clone> IntoIterator for PersistentVector<T> {
    type Item = T;
    type IntoIter = PersistentVectorIntoIterator<T>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        PersistentVectorIntoIterator {
            vector: self,
            position: 0,
        }
    }
}

impl<'a, T> IntoIterator for &'a PersistentVector<T> {
    type Item = &'a T;
    type IntoIter = PersistentVectorIterator<'a, T>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: PartialEq> PartialEq for PersistentVector<T> {
    fn eq(&self, other: &Self) -> bool {
        self.length == other.length && self.iter().eq(other.iter())
    }
}

impl<T: Eq> Eq for PersistentVector<T> {}

impl<T: Hash> Hash for PersistentVector<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.length.hash(state);
        for element in self {
            element.hash(state);
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for PersistentVector<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_list().entries(self.iter()).finish()
    }
}

impl<T: fmt::Display> fmt::Display for PersistentVector<T> {
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

impl<T> TypeConstructor for PersistentVector<T> {
    type Inner = T;
    type WithType<B> = PersistentVector<B>;
}

impl<T> Functor for PersistentVector<T> {
    fn fmap_ref<B, F>(&self, function: F) -> PersistentVector<B>
    where
        F: FnMut(&T) -> B,
    {
        self.map(function)
    }
}

impl<T: Clone> Foldable for PersistentVector<T> {
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
        self.length == 0
    }

    #[inline]
    fn length(&self) -> usize {
        self.length
    }
}

#[cfg(feature = "arc")]
static_assertions::assert_impl_all!(PersistentVector<i32>: Send, Sync);

#[cfg(not(feature = "arc"))]
static_assertions::assert_not_impl_any!(PersistentVector<i32>: Send, Sync);

// =============================================================================
// Serde Support
// =============================================================================

#[cfg(feature = "serde")]
impl<T: serde::Serialize> serde::Serialize for PersistentVector<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_seq(self.iter())
    }
}

#[cfg(feature = "serde")]
impl<'de, T> serde::Deserialize<'de> for PersistentVector<T>
where
    T: serde::Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        <Vec<T> as serde::Deserialize>::deserialize(deserializer).map(build_from_vec)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn pushed(count: usize) -> PersistentVector<usize> {
        (0..count).fold(PersistentVector::new(), |vector, index| {
            vector.push_back(index)
        })
    }

    fn root_children(vector: &PersistentVector<usize>) -> &[ReferenceCounter<Node<usize>>] {
        match vector.root.as_deref() {
            Some(Node::Branch(children)) => &children[..],
            _ => &[],
        }
    }

    // =========================================================================
    // Shape
    // =========================================================================

    #[rstest]
    fn test_empty_has_no_root_and_base_shift() {
        let vector: PersistentVector<usize> = PersistentVector::new();
        assert!(vector.root.is_none());
        assert_eq!(vector.shift, BITS_PER_LEVEL);
        assert!(vector.tail.is_empty());
    }

    #[rstest]
    #[case(0, false, BITS_PER_LEVEL, 0)]
    #[case(32, false, BITS_PER_LEVEL, 32)]
    #[case(33, true, BITS_PER_LEVEL, 1)]
    #[case(64, true, BITS_PER_LEVEL, 32)]
    #[case(1056, true, BITS_PER_LEVEL, 32)]
    #[case(1057, true, 2 * BITS_PER_LEVEL, 1)]
    #[case(32 * 32 * 32 + 32, true, 2 * BITS_PER_LEVEL, 32)]
    #[case(32 * 32 * 32 + 33, true, 3 * BITS_PER_LEVEL, 1)]
    fn test_shape_after_repeated_push(
        #[case] count: usize,
        #[case] has_root: bool,
        #[case] shift: usize,
        #[case] tail_length: usize,
    ) {
        let vector = pushed(count);
        assert_eq!(vector.root.is_some(), has_root);
        assert_eq!(vector.shift, shift);
        assert_eq!(vector.tail.len(), tail_length);
        assert_eq!(vector.len(), count);
    }

    #[rstest]
    #[case(0)]
    #[case(31)]
    #[case(32)]
    #[case(33)]
    #[case(1024)]
    #[case(1056)]
    #[case(1057)]
    #[case(2000)]
    #[case(32 * 32 * 32 + 32)]
    #[case(32 * 32 * 32 + 33)]
    fn test_bulk_build_matches_repeated_push(#[case] count: usize) {
        let pushed = pushed(count);
        let built: PersistentVector<usize> = (0..count).collect();
        assert_eq!(built.shift, pushed.shift);
        assert_eq!(built.tail.len(), pushed.tail.len());
        assert_eq!(root_children(&built).len(), root_children(&pushed).len());
        assert_eq!(built, pushed);
    }

    #[rstest]
    fn test_growth_keeps_old_root_as_first_child() {
        let full = pushed(1056);
        let grown = full.push_back(1056);
        let children = root_children(&grown);
        assert_eq!(children.len(), 2);
        let Some(old_root) = &full.root else {
            panic!("a full vector has a trie");
        };
        assert!(ReferenceCounter::ptr_eq(old_root, &children[0]));
    }

    // =========================================================================
    // Structural Sharing
    // =========================================================================

    #[rstest]
    fn test_push_into_tail_shares_root() {
        let vector = pushed(40);
        let extended = vector.push_back(40);
        let (Some(before), Some(after)) = (&vector.root, &extended.root) else {
            panic!("both versions have a trie");
        };
        assert!(ReferenceCounter::ptr_eq(before, after));
    }

    #[rstest]
    fn test_promoted_tail_is_reused_as_leaf() {
        let vector = pushed(64);
        let extended = vector.push_back(64);
        let children = root_children(&extended);
        match children.last().map(|child| &**child) {
            Some(Node::Leaf(leaf)) => assert!(ReferenceCounter::ptr_eq(leaf, &vector.tail)),
            _ => panic!("rightmost child should be a leaf"),
        }
    }

    #[rstest]
    fn test_node_is_two_words_and_a_tag() {
        assert!(std::mem::size_of::<Node<u64>>() <= 3 * std::mem::size_of::<usize>());
        assert!(std::mem::size_of::<Node<[u64; 8]>>() <= 3 * std::mem::size_of::<usize>());
    }

    #[rstest]
    fn test_set_in_tail_shares_whole_trie() {
        let vector = pushed(100);
        let updated = vector.set(99, 0).unwrap();
        let (Some(before), Some(after)) = (&vector.root, &updated.root) else {
            panic!("both versions have a trie");
        };
        assert!(ReferenceCounter::ptr_eq(before, after));
        assert!(!ReferenceCounter::ptr_eq(&vector.tail, &updated.tail));
    }

    #[rstest]
    fn test_set_in_trie_copies_only_one_path() {
        let vector = pushed(2000);
        let updated = vector.set(0, 7).unwrap();

        assert!(ReferenceCounter::ptr_eq(&vector.tail, &updated.tail));
        let before = root_children(&vector);
        let after = root_children(&updated);
        assert!(!ReferenceCounter::ptr_eq(&before[0], &after[0]));
        for (old, new) in before.iter().zip(after.iter()).skip(1) {
            assert!(ReferenceCounter::ptr_eq(old, new));
        }
    }

    // =========================================================================
    // Access
    // =========================================================================

    #[rstest]
    #[case(10)]
    #[case(33)]
    #[case(1050)]
    #[case(1057)]
    fn test_every_index_reads_back(#[case] count: usize) {
        let vector = pushed(count);
        for index in 0..count {
            assert_eq!(vector.get(index), Some(&index));
        }
        assert_eq!(vector.get(count), None);
    }

    #[rstest]
    fn test_try_get_reports_length() {
        let vector = pushed(5);
        assert_eq!(
            vector.try_get(usize::MAX),
            Err(IndexOutOfRange {
                index: usize::MAX,
                length: 5
            })
        );
    }

    #[rstest]
    fn test_set_out_of_range_leaves_receiver_alone() {
        let vector = pushed(5);
        assert_eq!(
            vector.set(5, 0).map(|updated| updated.len()),
            Err(IndexOutOfRange {
                index: 5,
                length: 5
            })
        );
        assert_eq!(vector.to_vec(), vec![0, 1, 2, 3, 4]);
    }

    #[rstest]
    #[case(31)]
    #[case(32)]
    #[case(1055)]
    #[case(1056)]
    #[case(1099)]
    fn test_replace_reaches_leaf_and_tail(#[case] index: usize) {
        let vector = pushed(1100);
        let replaced = vector.replace(index, usize::MAX);
        assert_eq!(replaced.get(index), Some(&usize::MAX));
        assert_eq!(vector.get(index), Some(&index));
        assert_eq!(replaced.len(), vector.len());
    }

    #[rstest]
    #[should_panic]
    fn test_replace_past_end_panics() {
        let vector = pushed(40);
        let _ = vector.replace(40, 0);
    }

    #[rstest]
    fn test_first_and_last() {
        let vector = pushed(70);
        assert_eq!(vector.first(), Some(&0));
        assert_eq!(vector.last(), Some(&69));
        let empty: PersistentVector<usize> = PersistentVector::new();
        assert_eq!(empty.first(), None);
        assert_eq!(empty.last(), None);
    }

    // =========================================================================
    // Iteration
    // =========================================================================

    #[rstest]
    #[case(0)]
    #[case(1)]
    #[case(32)]
    #[case(33)]
    #[case(1057)]
    fn test_iter_and_into_iter_agree(#[case] count: usize) {
        let vector = pushed(count);
        let borrowed: Vec<usize> = vector.iter().copied().collect();
        let owned: Vec<usize> = vector.clone().into_iter().collect();
        assert_eq!(borrowed, (0..count).collect::<Vec<_>>());
        assert_eq!(owned, borrowed);
    }

    #[rstest]
    fn test_iter_is_exact_size() {
        let vector = pushed(100);
        let mut iterator = vector.iter();
        assert_eq!(iterator.len(), 100);
        iterator.next();
        assert_eq!(iterator.len(), 99);
    }

    #[rstest]
    fn test_into_iter_is_exact_size() {
        let mut iterator = pushed(40).into_iter();
        assert_eq!(iterator.len(), 40);
        assert_eq!(iterator.nth(32), Some(32));
        assert_eq!(iterator.len(), 7);
        assert_eq!(iterator.last(), Some(39));
    }

    #[rstest]
    fn test_iter_is_restartable() {
        let vector = pushed(50);
        let first: usize = vector.iter().sum();
        let second: usize = vector.iter().sum();
        assert_eq!(first, second);
    }

    // =========================================================================
    // Display
    // =========================================================================

    #[rstest]
    fn test_display_empty_vector() {
        let vector: PersistentVector<i32> = PersistentVector::new();
        assert_eq!(format!("{vector}"), "[]");
    }

    #[rstest]
    fn test_display_multiple_elements_vector() {
        let vector: PersistentVector<i32> = (1..=3).collect();
        assert_eq!(format!("{vector}"), "[1, 2, 3]");
    }
}

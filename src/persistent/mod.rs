//! Persistent (immutable) data structures.
//!
//! This module provides immutable collections that use structural sharing
//! so that every "update" returns a new version in O(log N) or better while
//! earlier versions stay observable:
//!
//! - [`PersistentVector`]: Indexed sequence (32-way bit-partitioned trie with a tail buffer)
//! - [`PersistentList`]: Singly-linked list with O(1) `cons`
//! - [`PersistentArrayMap`]: Association list of key/value pairs (linear-time lookup)
//! - [`PersistentArraySet`]: Set backed by a [`PersistentArrayMap`]
//!
//! Indexed access that can fail reports [`IndexOutOfRange`].
//!
//! # Examples
//!
//! ## `PersistentVector`
//!
//! ```rust
//! use strata::persistent::PersistentVector;
//!
//! let vector: PersistentVector<i32> = (0..100).collect();
//! assert_eq!(vector.get(50), Some(&50));
//!
//! // Structural sharing: the original vector is preserved
//! let updated = vector.set(50, 999).unwrap();
//! assert_eq!(vector.get(50), Some(&50));
//! assert_eq!(updated.get(50), Some(&999));
//! ```
//!
//! ## `PersistentList`
//!
//! ```rust
//! use strata::persistent::PersistentList;
//!
//! let list = PersistentList::new().cons(3).cons(2).cons(1);
//! assert_eq!(list.head(), Some(&1));
//!
//! let extended = list.cons(0);
//! assert_eq!(list.len(), 3);
//! assert_eq!(extended.len(), 4);
//! ```
//!
//! ## `PersistentArrayMap` and `PersistentArraySet`
//!
//! ```rust
//! use strata::persistent::{PersistentArrayMap, PersistentArraySet};
//!
//! let map = PersistentArrayMap::new().insert("one", 1).insert("two", 2);
//! assert_eq!(map.get(&"one"), Some(&1));
//!
//! let set: PersistentArraySet<i32> = [1, 2, 3].into_iter().collect();
//! let other: PersistentArraySet<i32> = [2, 3, 4].into_iter().collect();
//! assert_eq!(set.intersection(&other).len(), 2);
//! ```

// =============================================================================
// Reference Counter Type Alias
// =============================================================================

/// Reference-counted smart pointer used for every shared node.
///
/// With the `arc` feature (on by default) this is `std::sync::Arc`, so any
/// number of threads may read the same or related versions without locks.
/// Without it, this is `std::rc::Rc`, which is cheaper but not thread-safe.
#[cfg(feature = "arc")]
pub(crate) type ReferenceCounter<T> = std::sync::Arc<T>;

#[cfg(not(feature = "arc"))]
pub(crate) type ReferenceCounter<T> = std::rc::Rc<T>;

mod array_map;
mod array_set;
mod error;
mod list;
mod vector;

pub use array_map::PersistentArrayMap;
pub use array_map::PersistentArrayMapIterator;
pub use array_set::PersistentArraySet;
pub use array_set::PersistentArraySetIterator;
pub use error::IndexOutOfRange;
pub use list::PersistentList;
pub use list::PersistentListIntoIterator;
pub use list::PersistentListIterator;
pub use vector::PersistentVector;
pub use vector::PersistentVectorIntoIterator;
pub use vector::PersistentVectorIterator;

// =============================================================================
// Tests
// =============================================================================

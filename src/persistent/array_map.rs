//! Persistent association list of key/value pairs.
//!
//! [`PersistentArrayMap`] stores its entries as `(K, V)` pairs inside a
//! [`PersistentVector`] and finds keys by scanning from the front. It only
//! needs `K: PartialEq`, keeps insertion order, and shares structure the way
//! the vector does, but every lookup is linear in the number of entries.
//!
//! # Examples
//!
//! ```rust
//! use strata::persistent::PersistentArrayMap;
//!
//! let map = PersistentArrayMap::new()
//!     .insert("a", 1)
//!     .insert("b", 2);
//! let updated = map.insert("a", 10);
//!
//! assert_eq!(map.get(&"a"), Some(&1));
//! assert_eq!(updated.get(&"a"), Some(&10));
//! assert_eq!(updated.to_string(), "{a: 10, b: 2}");
//! ```

use std::fmt;

use crate::typeclass::{Foldable, Functor, TypeConstructor};

use super::PersistentVector;
use super::vector::PersistentVectorIterator;

/// A persistent map backed by a vector of key/value pairs.
///
/// # Time Complexity
///
/// | Operation      | Complexity |
/// |----------------|------------|
/// | `get`          | O(n)       |
/// | `contains_key` | O(n)       |
/// | `insert`       | O(n)       |
/// | `remove`       | O(n)       |
/// | `len`          | O(1)       |
pub struct PersistentArrayMap<K, V> {
    pairs: PersistentVector<(K, V)>,
}

impl<K, V> Clone for PersistentArrayMap<K, V> {
    fn clone(&self) -> Self {
        Self {
            pairs: self.pairs.clone(),
        }
    }
}

impl<K, V> PersistentArrayMap<K, V> {
    /// Creates a new empty map.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            pairs: PersistentVector::new(),
        }
    }

    /// Returns the number of entries.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Returns `true` if the map contains no entries.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Returns an iterator over the entries in insertion order.
    #[must_use]
    pub fn iter(&self) -> PersistentArrayMapIterator<'_, K, V> {
        PersistentArrayMapIterator {
            inner: self.pairs.iter(),
        }
    }

    /// Returns an iterator over the keys in insertion order.
    #[must_use]
    pub fn keys(&self) -> impl ExactSizeIterator<Item = &K> + '_ {
        self.iter().map(|(key, _)| key)
    }

    /// Returns an iterator over the values in insertion order.
    #[must_use]
    pub fn values(&self) -> impl ExactSizeIterator<Item = &V> + '_ {
        self.iter().map(|(_, value)| value)
    }

    /// Calls `function` on every entry in insertion order.
    pub fn for_each<F>(&self, mut function: F)
    where
        F: FnMut(&K, &V),
    {
        self.pairs.for_each(|(key, value)| function(key, value));
    }
}

impl<K: PartialEq, V> PersistentArrayMap<K, V> {
    fn position(&self, key: &K) -> Option<usize> {
        self.pairs.find_index(|(candidate, _)| candidate == key)
    }

    /// Returns a reference to the value stored under `key`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use strata::persistent::PersistentArrayMap;
    ///
    /// let map = PersistentArrayMap::new().insert(1, "one");
    /// assert_eq!(map.get(&1), Some(&"one"));
    /// assert_eq!(map.get(&2), None);
    /// ```
    #[must_use]
    pub fn get(&self, key: &K) -> Option<&V> {
        self.iter()
            .find(|(candidate, _)| *candidate == key)
            .map(|(_, value)| value)
    }

    /// Returns `true` if the map holds an entry for `key`.
    #[must_use]
    pub fn contains_key(&self, key: &K) -> bool {
        self.position(key).is_some()
    }
}

impl<K: Clone, V> PersistentArrayMap<K, V> {
    /// Returns a map with `function` applied to every value.
    ///
    /// Keys and their order are unchanged.
    #[must_use]
    pub fn map_values<W, F>(&self, mut function: F) -> PersistentArrayMap<K, W>
    where
        F: FnMut(&V) -> W,
    {
        PersistentArrayMap {
            pairs: self
                .pairs
                .map(|(key, value)| (key.clone(), function(value))),
        }
    }
}

impl<K: Clone + PartialEq, V: Clone> PersistentArrayMap<K, V> {
    /// Creates a map from `pairs`, inserting them in order.
    ///
    /// A repeated key keeps its first position and its last value.
    #[must_use]
    pub fn of<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
    {
        pairs
            .into_iter()
            .fold(Self::new(), |map, (key, value)| map.insert(key, value))
    }

    /// Returns a map with `key` bound to `value`.
    ///
    /// An existing key is updated in place, keeping its position; a new key
    /// is appended after every existing entry.
    #[must_use]
    pub fn insert(&self, key: K, value: V) -> Self {
        let pairs = match self.position(&key) {
            Some(index) => self.pairs.replace(index, (key, value)),
            None => self.pairs.push_back((key, value)),
        };
        Self { pairs }
    }

    /// Returns a map without an entry for `key`.
    ///
    /// Removing an absent key returns a map equal to `self` that shares all
    /// of its structure.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use strata::persistent::PersistentArrayMap;
    ///
    /// let map = PersistentArrayMap::of([("a", 1), ("b", 2)]);
    /// assert_eq!(map.remove(&"a").to_vec(), vec![("b", 2)]);
    /// assert_eq!(map.remove(&"z"), map);
    /// ```
    #[must_use]
    pub fn remove(&self, key: &K) -> Self {
        let Some(position) = self.position(key) else {
            return self.clone();
        };
        Self {
            pairs: self
                .pairs
                .iter()
                .enumerate()
                .filter(|(index, _)| *index != position)
                .map(|(_, pair)| pair.clone())
                .collect(),
        }
    }

    /// Returns a map holding only the entries satisfying `predicate`.
    #[must_use]
    pub fn filter<P>(&self, mut predicate: P) -> Self
    where
        P: FnMut(&K, &V) -> bool,
    {
        Self {
            pairs: self.pairs.filter(|(key, value)| predicate(key, value)),
        }
    }

    /// Materializes the entries, in insertion order, into a `Vec`.
    #[must_use]
    pub fn to_vec(&self) -> Vec<(K, V)> {
        self.pairs.to_vec()
    }
}

// =============================================================================
// Iterators
// =============================================================================

/// An iterator over the entries of a [`PersistentArrayMap`].
pub struct PersistentArrayMapIterator<'a, K, V> {
    inner: PersistentVectorIterator<'a, (K, V)>,
}

impl<'a, K, V> Iterator for PersistentArrayMapIterator<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(key, value)| (key, value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for PersistentArrayMapIterator<'_, K, V> {}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

impl<K, V> Default for PersistentArrayMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Clone + PartialEq, V: Clone> FromIterator<(K, V)> for PersistentArrayMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::of(iter)
    }
}

impl<'a, K, V> IntoIterator for &'a PersistentArrayMap<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = PersistentArrayMapIterator<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Two maps are equal when they hold the same entries, in any order.
impl<K: PartialEq, V: PartialEq> PartialEq for PersistentArrayMap<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(key, value)| other.get(key) == Some(value))
    }
}

impl<K: Eq, V: Eq> Eq for PersistentArrayMap<K, V> {}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for PersistentArrayMap<K, V> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_map().entries(self.iter()).finish()
    }
}

impl<K: fmt::Display, V: fmt::Display> fmt::Display for PersistentArrayMap<K, V> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{{")?;
        for (position, (key, value)) in self.iter().enumerate() {
            if position > 0 {
                write!(formatter, ", ")?;
            }
            write!(formatter, "{key}: {value}")?;
        }
        write!(formatter, "}}")
    }
}

// =============================================================================
// Type Class Implementations
// =============================================================================

/// The map is treated as a container of `V` values with `K` fixed.
impl<K, V> TypeConstructor for PersistentArrayMap<K, V> {
    type Inner = V;
    type WithType<B> = PersistentArrayMap<K, B>;
}

impl<K: Clone, V> Functor for PersistentArrayMap<K, V> {
    fn fmap_ref<B, F>(&self, function: F) -> PersistentArrayMap<K, B>
    where
        F: FnMut(&V) -> B,
    {
        self.map_values(function)
    }
}

impl<K: Clone, V: Clone> Foldable for PersistentArrayMap<K, V> {
    fn fold_left<B, F>(self, init: B, mut function: F) -> B
    where
        F: FnMut(B, V) -> B,
    {
        self.pairs
            .into_iter()
            .fold(init, |accumulator, (_, value)| function(accumulator, value))
    }

    fn fold_right<B, F>(self, init: B, mut function: F) -> B
    where
        F: FnMut(V, B) -> B,
    {
        self.pairs
            .to_vec()
            .into_iter()
            .rev()
            .fold(init, |accumulator, (_, value)| function(value, accumulator))
    }

    #[inline]
    fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    #[inline]
    fn length(&self) -> usize {
        self.pairs.len()
    }
}

// =============================================================================
// Serde Support
// =============================================================================

#[cfg(feature = "serde")]
impl<K: serde::Serialize, V: serde::Serialize> serde::Serialize for PersistentArrayMap<K, V> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (key, value) in self {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

#[cfg(feature = "serde")]
struct PersistentArrayMapVisitor<K, V> {
    marker: std::marker::PhantomData<(K, V)>,
}

#[cfg(feature = "serde")]
impl<'de, K, V> serde::de::Visitor<'de> for PersistentArrayMapVisitor<K, V>
where
    K: serde::Deserialize<'de> + Clone + PartialEq,
    V: serde::Deserialize<'de> + Clone,
{
    type Value = PersistentArrayMap<K, V>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a map")
    }

    fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
    where
        A: serde::de::MapAccess<'de>,
    {
        let mut map = PersistentArrayMap::new();
        while let Some((key, value)) = access.next_entry()? {
            map = map.insert(key, value);
        }
        Ok(map)
    }
}

#[cfg(feature = "serde")]
impl<'de, K, V> serde::Deserialize<'de> for PersistentArrayMap<K, V>
where
    K: serde::Deserialize<'de> + Clone + PartialEq,
    V: serde::Deserialize<'de> + Clone,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_map(PersistentArrayMapVisitor {
            marker: std::marker::PhantomData,
        })
    }
}


#[cfg(all(test, feature = "serde"))]
mod serde_tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn test_serializes_as_json_object() {
        let map = PersistentArrayMap::of([("a".to_string(), 1), ("b".to_string(), 2)]);
        let json = serde_json::to_string(&map).expect("serialize");
        assert_eq!(json, r#"{"a":1,"b":2}"#);
        let back: PersistentArrayMap<String, i32> = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, map);
    }
}

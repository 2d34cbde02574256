#![cfg(feature = "persistent")]
//! Property-based tests for PersistentVector laws.
//!
//! This module verifies persistence, append, round-trip and map/filter laws
//! using proptest. Sizes are chosen to cross the tail boundary (32) and the
//! first height boundary (1056).

use proptest::prelude::*;
use strata::persistent::{IndexOutOfRange, PersistentVector};
use strata::typeclass::Foldable;

fn build_by_push(elements: &[i32]) -> PersistentVector<i32> {
    elements
        .iter()
        .fold(PersistentVector::new(), |vector, element| {
            vector.push_back(*element)
        })
}

// =============================================================================
// Persistence
// =============================================================================

proptest! {
    /// Get-Set Law: a value written with `set` is read back by `get`.
    #[test]
    fn prop_get_set_law(
        elements in prop::collection::vec(any::<i32>(), 1..1200),
        seed in any::<usize>(),
        value in any::<i32>()
    ) {
        let vector: PersistentVector<i32> = elements.iter().copied().collect();
        let index = seed % vector.len();
        let updated = vector.set(index, value).unwrap();
        prop_assert_eq!(updated.get(index), Some(&value));
    }

    /// Set-Other Law: `set` changes no other index, in either version.
    #[test]
    fn prop_set_leaves_other_indices(
        elements in prop::collection::vec(any::<i32>(), 1..1200),
        seed in any::<usize>(),
        value in any::<i32>()
    ) {
        let vector: PersistentVector<i32> = elements.iter().copied().collect();
        let index = seed % vector.len();
        let updated = vector.set(index, value).unwrap();

        for (other, expected) in elements.iter().enumerate() {
            prop_assert_eq!(vector.get(other), Some(expected));
            if other != index {
                prop_assert_eq!(updated.get(other), Some(expected));
            }
        }
    }

    /// Append Law: length grows by one and the new element is last.
    #[test]
    fn prop_append_law(
        elements in prop::collection::vec(any::<i32>(), 0..1200),
        value in any::<i32>()
    ) {
        let vector = build_by_push(&elements);
        let appended = vector.push_back(value);
        prop_assert_eq!(appended.len(), vector.len() + 1);
        prop_assert_eq!(appended.get(vector.len()), Some(&value));
        prop_assert_eq!(vector.len(), elements.len());
    }

    /// Round-trip Law: `to_vec(of(s)) == s`.
    #[test]
    fn prop_round_trip(elements in prop::collection::vec(any::<i32>(), 0..2500)) {
        prop_assert_eq!(PersistentVector::of(elements.clone()).to_vec(), elements.clone());
        prop_assert_eq!(build_by_push(&elements).to_vec(), elements);
    }

    /// Bulk construction and repeated push build equal vectors.
    #[test]
    fn prop_of_equals_push(elements in prop::collection::vec(any::<i32>(), 0..2500)) {
        prop_assert_eq!(PersistentVector::of(elements.clone()), build_by_push(&elements));
    }

    /// Iteration yields exactly the indexed elements.
    #[test]
    fn prop_iter_matches_get(elements in prop::collection::vec(any::<i32>(), 0..1200)) {
        let vector = build_by_push(&elements);
        for (index, element) in vector.iter().enumerate() {
            prop_assert_eq!(vector.get(index), Some(element));
        }
        prop_assert_eq!(vector.iter().len(), elements.len());
    }
}

// =============================================================================
// Map / Filter
// =============================================================================

proptest! {
    /// Map preserves length and applies the function pointwise.
    #[test]
    fn prop_map_law(elements in prop::collection::vec(any::<i32>(), 0..1200)) {
        let vector: PersistentVector<i32> = elements.iter().copied().collect();
        let mapped = vector.map(|x| i64::from(*x) - 1);
        prop_assert_eq!(mapped.len(), vector.len());
        let expected: Vec<i64> = elements.iter().map(|x| i64::from(*x) - 1).collect();
        prop_assert_eq!(mapped.to_vec(), expected);
    }

    /// Map Identity Law: `map(id) == self`.
    #[test]
    fn prop_map_identity(elements in prop::collection::vec(any::<i32>(), 0..200)) {
        let vector: PersistentVector<i32> = elements.into_iter().collect();
        prop_assert_eq!(vector.map(|x| *x), vector);
    }

    /// Filter keeps exactly the matching subsequence, in order.
    #[test]
    fn prop_filter_law(
        elements in prop::collection::vec(any::<i32>(), 0..1200),
        modulus in 1i32..10
    ) {
        let vector: PersistentVector<i32> = elements.iter().copied().collect();
        let filtered = vector.filter(|x| x % modulus == 0);
        let expected: Vec<i32> = elements.iter().copied().filter(|x| x % modulus == 0).collect();
        prop_assert_eq!(filtered.to_vec(), expected);
    }

    /// `fold_left` agrees with folding the materialized sequence.
    #[test]
    fn prop_fold_left_consistent(elements in prop::collection::vec(any::<i16>(), 0..500)) {
        let vector: PersistentVector<i16> = elements.iter().copied().collect();
        let expected: i64 = elements.iter().map(|x| i64::from(*x)).sum();
        prop_assert_eq!(vector.fold_left(0i64, |sum, x| sum + i64::from(x)), expected);
    }
}

// =============================================================================
// Bounds
// =============================================================================

proptest! {
    /// Every index at or past the length is rejected by reads and writes.
    #[test]
    fn prop_out_of_range_rejected(
        elements in prop::collection::vec(any::<i32>(), 0..100),
        excess in 0usize..1000
    ) {
        let vector: PersistentVector<i32> = elements.iter().copied().collect();
        let index = vector.len() + excess;
        let expected = IndexOutOfRange { index, length: vector.len() };
        prop_assert_eq!(vector.try_get(index), Err(expected));
        prop_assert_eq!(vector.set(index, 0).err(), Some(expected));
    }
}

// =============================================================================
// Scale
// =============================================================================

#[test]
fn sharing_across_height_boundaries() {
    for count in [10, 33, 1050] {
        let elements: Vec<i32> = (0..count).collect();
        let vector = build_by_push(&elements);
        for (index, expected) in elements.iter().enumerate() {
            assert_eq!(vector.get(index), Some(expected), "count {count}, index {index}");
        }
    }
}

#[test]
fn every_intermediate_version_stays_readable() {
    let mut versions = vec![PersistentVector::new()];
    for element in 0..1100 {
        let next = versions[versions.len() - 1].push_back(element);
        versions.push(next);
    }
    for (length, version) in versions.iter().enumerate() {
        assert_eq!(version.len(), length);
        assert_eq!(version.to_vec(), (0..length as i32).collect::<Vec<_>>());
    }
}

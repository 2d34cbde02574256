#![cfg(feature = "persistent")]
//! Unit tests for PersistentList.

use rstest::rstest;
use strata::persistent::PersistentList;
use strata::typeclass::{Foldable, Functor};

#[rstest]
fn test_empty_list() {
    let list: PersistentList<i32> = PersistentList::new();
    assert!(list.is_empty());
    assert_eq!(list.head(), None);
    assert!(list.uncons().is_none());
    assert_eq!(list.get(0), None);
}

#[rstest]
fn test_cons_head_tail() {
    let list = PersistentList::singleton(3).cons(2).cons(1);
    assert_eq!(list.head(), Some(&1));
    assert_eq!(list.tail().to_vec(), vec![2, 3]);
    assert_eq!(list.len(), 3);
}

#[rstest]
fn test_uncons() {
    let list = PersistentList::of(["a", "b"]);
    let (head, tail) = list.uncons().unwrap();
    assert_eq!(*head, "a");
    assert_eq!(tail.to_vec(), vec!["b"]);
}

#[rstest]
#[case(0, Some(10))]
#[case(2, Some(30))]
#[case(3, None)]
fn test_get(#[case] index: usize, #[case] expected: Option<i32>) {
    let list = PersistentList::of([10, 20, 30]);
    assert_eq!(list.get(index).copied(), expected);
}

#[rstest]
fn test_concat_and_reverse() {
    let left = PersistentList::of([1, 2]);
    let right = PersistentList::of([3]);
    let combined = left.concat(&right);
    assert_eq!(combined.to_vec(), vec![1, 2, 3]);
    assert_eq!(combined.reverse().to_vec(), vec![3, 2, 1]);
    assert_eq!(left.to_vec(), vec![1, 2]);
}

#[rstest]
fn test_map_and_filter() {
    let list: PersistentList<i32> = (1..=6).collect();
    assert_eq!(list.map(|x| x * x).to_vec(), vec![1, 4, 9, 16, 25, 36]);
    assert_eq!(list.filter(|x| x % 2 == 1).to_vec(), vec![1, 3, 5]);
}

#[rstest]
fn test_for_each_order() {
    let list = PersistentList::of(['x', 'y', 'z']);
    let mut collected = String::new();
    list.for_each(|c| collected.push(*c));
    assert_eq!(collected, "xyz");
}

#[rstest]
fn test_folds() {
    let list = PersistentList::of(["a", "b", "c"]);
    let left = list
        .clone()
        .fold_left(String::new(), |text, letter| text + letter);
    let right = list.fold_right(String::new(), |letter, text| text + letter);
    assert_eq!(left, "abc");
    assert_eq!(right, "cba");
}

#[rstest]
fn test_functor() {
    let list = PersistentList::of([1, 2]);
    assert_eq!(list.fmap_ref(|x| x + 1), PersistentList::of([2, 3]));
}

#[rstest]
fn test_owned_iteration() {
    let list = PersistentList::of(vec![String::from("a"), String::from("b")]);
    let owned: Vec<String> = list.into_iter().collect();
    assert_eq!(owned, vec!["a", "b"]);
}

#[rstest]
fn test_equality_and_display() {
    let built = PersistentList::of([1, 2, 3]);
    let consed = PersistentList::new().cons(3).cons(2).cons(1);
    assert_eq!(built, consed);
    assert_eq!(built.to_string(), "[1, 2, 3]");
    assert_ne!(built, consed.tail());
}

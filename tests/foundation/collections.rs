//! Integration tests for persistent collections
//!
//! Tests structural sharing and ordering of LtVec and LtMap.

use marginalia_foundation::{LtMap, LtVec};
use proptest::prelude::*;

// =============================================================================
// LtVec
// =============================================================================

#[test]
fn ltvec_push_is_persistent() {
    let a: LtVec<i32> = LtVec::new();
    let b = a.push_back(1);
    let c = b.push_back(2);

    assert!(a.is_empty());
    assert_eq!(b.len(), 1);
    assert_eq!(c.len(), 2);
    assert_eq!(c.get(1), Some(&2));
}

#[test]
fn ltvec_unit() {
    let v = LtVec::unit("only");
    assert_eq!(v.len(), 1);
    assert_eq!(v.first(), v.last());
}

#[test]
fn ltvec_iterates_in_order() {
    let v: LtVec<i32> = (1..=4).collect();
    let items: Vec<i32> = v.iter().copied().collect();
    assert_eq!(items, vec![1, 2, 3, 4]);
}

// =============================================================================
// LtMap
// =============================================================================

#[test]
fn ltmap_insert_is_persistent() {
    let a: LtMap<&str, i32> = LtMap::new();
    let b = a.insert("x", 1);

    assert!(a.is_empty());
    assert_eq!(b.get("x"), Some(&1));
    assert!(b.contains_key("x"));
}

#[test]
fn ltmap_insert_replaces_existing_key() {
    let m: LtMap<&str, i32> = [("x", 1), ("y", 2)].into_iter().collect();
    let updated = m.insert("x", 9);
    assert_eq!(m.get("x"), Some(&1));
    assert_eq!(updated.get("x"), Some(&9));
    assert_eq!(updated.len(), 2);
}

#[test]
fn ltmap_keys_are_sorted() {
    let m: LtMap<&str, i32> = [("b", 2), ("a", 1), ("c", 3)].into_iter().collect();
    let keys: Vec<&str> = m.keys().copied().collect();
    assert_eq!(keys, vec!["a", "b", "c"]);
}

// =============================================================================
// Property Tests
// =============================================================================

proptest! {
    #[test]
    fn ltvec_preserves_push_order(items in prop::collection::vec(any::<i64>(), 0..64)) {
        let v = items.iter().fold(LtVec::new(), |acc, item| acc.push_back(*item));
        let collected: Vec<i64> = v.iter().copied().collect();
        prop_assert_eq!(collected, items);
    }
}

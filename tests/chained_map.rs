// ChainedOrderedMap public API test suite.
//
// Each test documents the behavior being verified. The core properties
// exercised:
// - Uniqueness: the first insert of a key wins; later inserts are no-ops.
// - Order: iteration follows first-insertion order, not bucket order.
// - Lookup: `find`/`get`/`at` agree; only `at` reports `KeyNotFound`.
// - Access: `get_or_insert_default` creates missing entries.
// - Growth: `len <= 2 * table_size` after each insert; never shrinks.
// - Copy: `assign`/`clone` are deep and preserve order.
use chained_ordered_map::{ChainedOrderedMap, InsertOutcome, KeyNotFound};
use std::cell::RefCell;
use std::hash::{BuildHasher, Hasher};
use std::rc::Rc;

// Test: duplicate insertion scenario.
// Verifies: len 2, iteration [(1,"a"),(2,"b")], at(1) == "a", at(3) fails.
#[test]
fn duplicate_key_is_ignored() {
    let mut m = ChainedOrderedMap::new();
    m.insert(1, "a");
    m.insert(2, "b");
    m.insert(1, "c");

    assert_eq!(m.len(), 2);
    let pairs: Vec<_> = m.iter().map(|(k, v)| (*k, *v)).collect();
    assert_eq!(pairs, [(1, "a"), (2, "b")]);
    assert_eq!(m.at(&1), Ok(&"a"));
    assert_eq!(m.at(&3), Err(KeyNotFound));
}

// Test: insert reports whether it stored the pair.
// Verifies: Occupied carries the handle of the existing entry.
#[test]
fn insert_outcome_reports_existing_handle() {
    let mut m = ChainedOrderedMap::new();
    let first = m.insert("k".to_string(), 1);
    let second = m.insert("k".to_string(), 2);
    assert!(matches!(first, InsertOutcome::Inserted(_)));
    assert!(matches!(second, InsertOutcome::Occupied(_)));
    assert_eq!(first.handle(), second.handle());
    assert_eq!(second.handle().value(&m), Some(&1));
}

// Test: access on an empty map.
// Verifies: returns the default, inserts it, and find then succeeds.
#[test]
fn access_creates_default_entry() {
    let mut m: ChainedOrderedMap<i32, i32> = ChainedOrderedMap::new();
    assert_eq!(*m.get_or_insert_default(5), 0);
    assert_eq!(m.len(), 1);
    let h = m.find(&5).expect("access inserted the key");
    assert_eq!(h.value(&m), Some(&0));
}

// Test: access used as a counter.
// Verifies: repeated access mutates the same entry in place.
#[test]
fn access_counts_words_in_first_seen_order() {
    let mut counts: ChainedOrderedMap<&str, usize> = ChainedOrderedMap::new();
    for w in "b a b c a b".split(' ') {
        *counts.get_or_insert_default(w) += 1;
    }
    let got: Vec<_> = counts.iter().map(|(k, v)| (*k, *v)).collect();
    assert_eq!(got, [("b", 3), ("a", 2), ("c", 1)]);
}

// Test: sequential inserts 1..=100, then erase everything.
// Verifies: table size is a power of two >= 50, the growth bound holds
// after every insert, and erasing does not shrink the table.
#[test]
fn growth_and_no_shrink() {
    let mut m = ChainedOrderedMap::new();
    for i in 1..=100u32 {
        m.insert(i, i);
        assert!(m.len() <= 2 * m.table_size());
    }
    assert!(m.table_size().is_power_of_two());
    assert!(m.table_size() >= 50);

    let size = m.table_size();
    for i in 1..=100u32 {
        assert_eq!(m.erase(&i), Some(i));
    }
    assert_eq!(m.len(), 0);
    assert!(m.is_empty());
    assert_eq!(m.table_size(), size);
}

// Test: lookups for present, erased, and never-inserted keys.
#[test]
fn lookups_agree_after_erase() {
    let mut m: ChainedOrderedMap<String, u8> =
        (0..50u8).map(|i| (format!("k{i}"), i)).collect();
    for i in (0..50u8).step_by(3) {
        m.erase(format!("k{i}").as_str());
    }
    for i in 0..60u8 {
        let k = format!("k{i}");
        let expected = (i < 50 && i % 3 != 0).then_some(i);
        assert_eq!(m.get(k.as_str()).copied(), expected);
        assert_eq!(m.find(k.as_str()).is_some(), expected.is_some());
        assert_eq!(m.at(k.as_str()).ok().copied(), expected);
        assert_eq!(m.contains_key(k.as_str()), expected.is_some());
    }
}

// Test: order after erase and re-insert.
// Verifies: the re-inserted key moves to the end.
#[test]
fn reinsert_after_erase_goes_last() {
    let mut m: ChainedOrderedMap<char, u32> = ChainedOrderedMap::from([('x', 1), ('y', 2), ('z', 3)]);
    assert_eq!(m.erase(&'x'), Some(1));
    m.insert('x', 10);
    let keys: String = m.keys().collect();
    assert_eq!(keys, "yzx");
}

// Test: construction from a range with duplicates and an explicit hasher.
// Verifies: first pair wins and the supplied hasher is used.
#[test]
fn construct_from_range_with_hasher() {
    #[derive(Clone, Default)]
    struct CountingBuildHasher(Rc<RefCell<usize>>);
    struct Inner(std::collections::hash_map::DefaultHasher);
    impl BuildHasher for CountingBuildHasher {
        type Hasher = Inner;
        fn build_hasher(&self) -> Inner {
            *self.0.borrow_mut() += 1;
            Inner(Default::default())
        }
    }
    impl Hasher for Inner {
        fn write(&mut self, bytes: &[u8]) {
            self.0.write(bytes);
        }
        fn finish(&self) -> u64 {
            self.0.finish()
        }
    }

    let calls = Rc::new(RefCell::new(0));
    let pairs = vec![("a", 1), ("b", 2), ("a", 3)];
    let m = ChainedOrderedMap::from_iter_with_hasher(pairs, CountingBuildHasher(calls.clone()));
    assert_eq!(*calls.borrow(), 3);
    assert_eq!(m.len(), 2);
    assert_eq!(m.get("a"), Some(&1));
    assert_eq!(*m.hasher().0.borrow(), 4);
}

// Test: copy independence.
// Verifies: the copy keeps the source order; mutating either side leaves
// the other unchanged.
#[test]
fn copy_is_independent() {
    let mut a: ChainedOrderedMap<u32, String> = (0..10).map(|i| (i, i.to_string())).collect();
    let mut b = ChainedOrderedMap::new();
    b.insert(99, "stale".to_string());
    b.assign(&a);

    assert_eq!(b.table_size(), 20);
    assert!(a.iter().eq(b.iter()));

    b.get_mut(&0).unwrap().push('!');
    b.erase(&1);
    a.insert(100, "new".to_string());

    assert_eq!(a.get(&0).map(String::as_str), Some("0"));
    assert!(a.contains_key(&1));
    assert!(!b.contains_key(&100));
    assert!(!b.contains_key(&99));
    assert_eq!(b.get(&0).map(String::as_str), Some("0!"));
}

// Test: clone_from routes through assign.
#[test]
fn clone_from_replaces_contents() {
    let a: ChainedOrderedMap<u8, u8> = [(1, 1), (2, 2)].into();
    let mut b: ChainedOrderedMap<u8, u8> = [(7, 7)].into();
    b.clone_from(&a);
    assert_eq!(a, b);
    assert_eq!(b.keys().copied().collect::<Vec<_>>(), [1, 2]);
}

// Test: clear resets everything.
#[test]
fn clear_resets_table() {
    let mut m: ChainedOrderedMap<u32, u32> = (0..100).map(|i| (i, i)).collect();
    assert!(m.table_size() > 1);
    m.clear();
    assert_eq!(m.len(), 0);
    assert_eq!(m.table_size(), 1);
    assert_eq!(m.iter().count(), 0);
    m.insert(1, 1);
    assert_eq!(m[&1], 1);
}

// Test: iterator plumbing.
#[test]
fn iterators_follow_insertion_order() {
    let mut m: ChainedOrderedMap<&str, i32> = [("one", 1), ("two", 2), ("three", 3)].into();
    for (_, v) in &mut m {
        *v *= 2;
    }
    let borrowed: Vec<_> = (&m).into_iter().map(|(k, v)| (*k, *v)).collect();
    assert_eq!(borrowed, [("one", 2), ("two", 4), ("three", 6)]);
    assert_eq!(m.iter().len(), 3);
    let owned: Vec<_> = m.into_iter().collect();
    assert_eq!(owned, [("one", 2), ("two", 4), ("three", 6)]);
}

// Test: values are dropped exactly once, on erase or on map drop.
#[test]
fn values_dropped_once() {
    struct Tracked(Rc<RefCell<Vec<u32>>>, u32);
    impl Drop for Tracked {
        fn drop(&mut self) {
            self.0.borrow_mut().push(self.1);
        }
    }

    let log = Rc::new(RefCell::new(Vec::new()));
    {
        let mut m = ChainedOrderedMap::new();
        for i in 0..5 {
            m.insert(i, Tracked(log.clone(), i));
        }
        // Rejected duplicate is dropped immediately.
        m.insert(0, Tracked(log.clone(), 100));
        assert_eq!(*log.borrow(), [100]);
        m.erase(&2);
        assert_eq!(*log.borrow(), [100, 2]);
    }
    let mut dropped = log.borrow().clone();
    dropped.sort_unstable();
    assert_eq!(dropped, [0, 1, 2, 3, 4, 100]);
}

use chained_ordered_map::{ChainedOrderedMap, KeyNotFound};
use proptest::prelude::*;
use std::collections::HashSet;

proptest! {
    // Without erasure, iteration yields each distinct key once, in first
    // insertion order, carrying the value of its first insert.
    #[test]
    fn prop_first_insert_wins_in_order(pairs in proptest::collection::vec((0u16..64, any::<i32>()), 0..200)) {
        let m: ChainedOrderedMap<u16, i32> = pairs.iter().copied().collect();

        let mut seen = HashSet::new();
        let expected: Vec<(u16, i32)> = pairs
            .iter()
            .copied()
            .filter(|(k, _)| seen.insert(*k))
            .collect();
        let got: Vec<(u16, i32)> = m.iter().map(|(k, v)| (*k, *v)).collect();
        prop_assert_eq!(got, expected.clone());
        prop_assert_eq!(m.len(), expected.len());
        prop_assert!(m.len() <= 2 * m.table_size());
        prop_assert!(m.table_size().is_power_of_two());
    }

    // Size equals distinct keys inserted minus keys successfully erased;
    // erased keys are gone from every lookup path.
    #[test]
    fn prop_size_tracks_inserts_and_erases(
        inserts in proptest::collection::vec(0u8..40, 0..120),
        erases in proptest::collection::vec(0u8..40, 0..60),
    ) {
        let mut m = ChainedOrderedMap::new();
        let mut present = HashSet::new();
        for k in inserts {
            m.insert(k, u32::from(k));
            present.insert(k);
            prop_assert!(m.len() <= 2 * m.table_size());
        }
        let table = m.table_size();
        for k in erases {
            let was = present.remove(&k);
            prop_assert_eq!(m.erase(&k).is_some(), was);
            prop_assert!(m.find(&k).is_none());
            prop_assert_eq!(m.at(&k), Err(KeyNotFound));
        }
        prop_assert_eq!(m.len(), present.len());
        prop_assert_eq!(m.table_size(), table);
        for k in &present {
            let expected = u32::from(*k);
            prop_assert_eq!(m.at(k), Ok(&expected));
        }
    }

    // Mutating a copy never changes the original.
    #[test]
    fn prop_copy_independence(
        keys in proptest::collection::vec(any::<u8>(), 0..80),
        extra in proptest::collection::vec(any::<u8>(), 0..20),
    ) {
        let a: ChainedOrderedMap<u8, u8> = keys.iter().map(|&k| (k, k)).collect();
        let before: Vec<(u8, u8)> = a.iter().map(|(k, v)| (*k, *v)).collect();

        let mut b = a.clone();
        prop_assert!(a.iter().eq(b.iter()));
        for k in &extra {
            if b.erase(k).is_none() {
                b.insert(*k, k.wrapping_add(1));
            }
        }
        for v in b.values_mut() {
            *v = v.wrapping_mul(3);
        }

        let after: Vec<(u8, u8)> = a.iter().map(|(k, v)| (*k, *v)).collect();
        prop_assert_eq!(before, after);
    }
}

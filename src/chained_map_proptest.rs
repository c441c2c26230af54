#![cfg(test)]

// Property tests for ChainedOrderedMap kept inside the crate so they can
// check the bucket-index/entry-store invariants after every step.

use crate::chained_map::{ChainedOrderedMap, Handle};
use crate::error::KeyNotFound;
use proptest::prelude::*;
use std::collections::HashMap;
use std::fmt;
use std::hash::{BuildHasher, Hash, Hasher};

// Key newtype with Borrow<str> to exercise borrowed lookup.
#[derive(Clone, Eq, PartialEq, Hash)]
struct Key(String);
impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
impl std::borrow::Borrow<str> for Key {
    fn borrow(&self) -> &str {
        &self.0
    }
}

// Pool-indexed operations so shrinking moves toward earlier keys.
#[derive(Clone, Debug)]
enum OpI {
    Insert(usize, i32),
    Access(usize),
    Erase(usize),
    Find(usize),
    At(usize),
    Contains(String),
    Mutate(usize, i32),
    Clear,
    Reassign,
}

fn key_from(pool: &[String], i: usize) -> Key {
    Key(pool[i].clone())
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<OpI>)> {
    proptest::collection::vec("[a-z]{0,5}", 1..=24).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let contains_pool = proptest::sample::select(pool.clone());
        let op = prop_oneof![
            6 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::Insert(i, v)),
            2 => idx.clone().prop_map(OpI::Access),
            3 => idx.clone().prop_map(OpI::Erase),
            2 => idx.clone().prop_map(OpI::Find),
            2 => idx.clone().prop_map(OpI::At),
            1 => prop_oneof![contains_pool, "[a-z]{0,5}"].prop_map(OpI::Contains),
            2 => (idx.clone(), any::<i32>()).prop_map(|(i, d)| OpI::Mutate(i, d)),
            1 => Just(OpI::Clear),
            1 => Just(OpI::Reassign),
        ];
        proptest::collection::vec(op, 1..120).prop_map(move |ops| (pool.clone(), ops))
    })
}

/// Insertion-ordered reference model.
#[derive(Default)]
struct Model {
    pairs: Vec<(Key, i32)>,
}

impl Model {
    fn position(&self, k: &Key) -> Option<usize> {
        self.pairs.iter().position(|(mk, _)| mk == k)
    }
    fn get(&self, k: &Key) -> Option<i32> {
        self.position(k).map(|i| self.pairs[i].1)
    }
}

// Runs one scenario against the map and the model. Invariants exercised:
// - first insert wins; `Occupied` is reported exactly for present keys
// - access inserts `0` for absent keys and leaves present ones untouched
// - erase of an absent key is a no-op; erased handles never resolve again
// - `at` fails with `KeyNotFound` exactly when the model lacks the key
// - iteration order equals the model's insertion order
// - structural invariants and `len <= 2 * table_size` after every step
fn run<S>(
    mut sut: ChainedOrderedMap<Key, i32, S>,
    pool: &[String],
    ops: Vec<OpI>,
) -> Result<(), TestCaseError>
where
    S: BuildHasher + Clone,
{
    let mut model = Model::default();
    let mut live: HashMap<Key, Handle> = HashMap::new();
    let mut stale: Vec<Handle> = Vec::new();

    for op in ops {
        match op {
            OpI::Insert(i, v) => {
                let k = key_from(pool, i);
                let before = model.get(&k);
                let out = sut.insert(k.clone(), v);
                prop_assert_eq!(out.is_inserted(), before.is_none());
                if out.is_inserted() {
                    model.pairs.push((k.clone(), v));
                    live.insert(k, out.handle());
                } else {
                    prop_assert_eq!(Some(&out.handle()), live.get(&k));
                }
                prop_assert!(sut.len() <= 2 * sut.table_size());
            }
            OpI::Access(i) => {
                let k = key_from(pool, i);
                let expected = model.get(&k).unwrap_or(0);
                prop_assert_eq!(*sut.get_or_insert_default(k.clone()), expected);
                if model.position(&k).is_none() {
                    model.pairs.push((k.clone(), 0));
                    let h = sut.find(&k).expect("access must insert");
                    live.insert(k, h);
                }
                prop_assert!(sut.len() <= 2 * sut.table_size());
            }
            OpI::Erase(i) => {
                let k = key_from(pool, i);
                let got = sut.erase(&k);
                match model.position(&k) {
                    Some(pos) => {
                        let (_, mv) = model.pairs.remove(pos);
                        prop_assert_eq!(got, Some(mv));
                        if let Some(h) = live.remove(&k) {
                            stale.push(h);
                        }
                    }
                    None => prop_assert_eq!(got, None),
                }
            }
            OpI::Find(i) => {
                let k = key_from(pool, i);
                let h = sut.find(&k);
                prop_assert_eq!(h.is_some(), model.position(&k).is_some());
                if let Some(h) = h {
                    prop_assert_eq!(Some(&h), live.get(&k));
                    prop_assert_eq!(h.value(&sut).copied(), model.get(&k));
                }
            }
            OpI::At(i) => {
                let k = key_from(pool, i);
                match model.get(&k) {
                    Some(v) => prop_assert_eq!(sut.at(&k), Ok(&v)),
                    None => prop_assert_eq!(sut.at(&k), Err(KeyNotFound)),
                }
            }
            OpI::Contains(s) => {
                let has_model = model.pairs.iter().any(|(k, _)| k.0 == s);
                prop_assert_eq!(sut.contains_key(s.as_str()), has_model);
            }
            OpI::Mutate(i, d) => {
                let k = key_from(pool, i);
                if let Some(pos) = model.position(&k) {
                    let v = sut.get_mut(&k).expect("present");
                    *v = v.wrapping_add(d);
                    model.pairs[pos].1 = model.pairs[pos].1.wrapping_add(d);
                }
            }
            OpI::Clear => {
                sut.clear();
                prop_assert_eq!(sut.table_size(), 1);
                model.pairs.clear();
                stale.extend(live.drain().map(|(_, h)| h));
            }
            OpI::Reassign => {
                let copy = sut.clone();
                let expected_table = (2 * sut.len()).max(1);
                prop_assert_eq!(copy.table_size(), expected_table);
                sut.assign(&copy);
                prop_assert_eq!(sut.table_size(), expected_table);
                // Reassignment invalidates prior handles; re-learn them.
                stale.extend(live.drain().map(|(_, h)| h));
                for (k, _) in &model.pairs {
                    let h = sut.find(k).expect("copied key present");
                    live.insert(k.clone(), h);
                }
            }
        }

        sut.assert_invariants();
        let got: Vec<(Key, i32)> = sut.iter().map(|(k, v)| (k.clone(), *v)).collect();
        prop_assert_eq!(&got, &model.pairs);
        prop_assert_eq!(sut.len(), model.pairs.len());
        prop_assert_eq!(sut.is_empty(), model.pairs.is_empty());
        for h in &stale {
            if !live.values().any(|l| l == h) {
                prop_assert!(h.value(&sut).is_none(), "stale handle resolved");
            }
        }
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario()) {
        let sut: ChainedOrderedMap<Key, i32> = ChainedOrderedMap::new();
        run(sut, &pool, ops)?;
    }
}

// Every key hashes to 0, so the whole map is one collision chain. This
// stresses chain walking, predecessor patching on erase, and rebuilds.
#[derive(Clone, Default)]
struct ConstBuildHasher;
struct ConstHasher;
impl BuildHasher for ConstBuildHasher {
    type Hasher = ConstHasher;
    fn build_hasher(&self) -> Self::Hasher {
        ConstHasher
    }
}
impl Hasher for ConstHasher {
    fn write(&mut self, _bytes: &[u8]) {}
    fn finish(&self) -> u64 {
        0
    }
}

// Only the first byte matters: few distinct hashes, many partial collisions.
#[derive(Clone, Default)]
struct FirstByteBuildHasher;
struct FirstByteHasher(Option<u8>);
impl BuildHasher for FirstByteBuildHasher {
    type Hasher = FirstByteHasher;
    fn build_hasher(&self) -> Self::Hasher {
        FirstByteHasher(None)
    }
}
impl Hasher for FirstByteHasher {
    fn write(&mut self, bytes: &[u8]) {
        if self.0.is_none() {
            self.0 = bytes.first().copied();
        }
    }
    fn finish(&self) -> u64 {
        u64::from(self.0.unwrap_or(0))
    }
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_with_collisions((pool, ops) in arb_scenario()) {
        let sut = ChainedOrderedMap::with_hasher(ConstBuildHasher);
        run(sut, &pool, ops)?;
    }

    #[test]
    fn prop_state_machine_with_partial_collisions((pool, ops) in arb_scenario()) {
        let sut = ChainedOrderedMap::with_hasher(FirstByteBuildHasher);
        run(sut, &pool, ops)?;
    }
}

// Hash must agree between `Key` and its borrowed `str` form.
#[test]
fn key_and_str_hash_identically() {
    let s = std::collections::hash_map::RandomState::new();
    let k = Key("abc".into());
    let mut h1 = s.build_hasher();
    k.hash(&mut h1);
    assert_eq!(h1.finish(), s.hash_one("abc"));
}

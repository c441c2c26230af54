//! ChainedOrderedMap: separately chained hash map that iterates in
//! insertion order.

use crate::bucket_index::{BucketIndex, START_TABLE_SIZE};
use crate::entry_store::{self, EntryStore};
use crate::error::KeyNotFound;
use crate::reentrancy::DebugReentrancy;
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use core::iter::FusedIterator;
use core::ops::Index;
use slotmap::DefaultKey;
use std::collections::hash_map::RandomState;

/// Stable reference to a stored entry.
///
/// A handle survives insertions and table growth. It stops resolving once
/// its entry is erased, or the map is cleared or reassigned, even if the
/// underlying slot is later reused. Handles are only meaningful for the
/// map that issued them.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Handle(DefaultKey);

impl Handle {
    pub fn key<'a, K, V, S>(&self, map: &'a ChainedOrderedMap<K, V, S>) -> Option<&'a K> {
        map.handle_key(*self)
    }

    pub fn value<'a, K, V, S>(&self, map: &'a ChainedOrderedMap<K, V, S>) -> Option<&'a V> {
        map.handle_value(*self)
    }

    pub fn value_mut<'a, K, V, S>(
        &self,
        map: &'a mut ChainedOrderedMap<K, V, S>,
    ) -> Option<&'a mut V> {
        map.handle_value_mut(*self)
    }
}

/// What [`ChainedOrderedMap::insert`] did with the pair it was given.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum InsertOutcome {
    /// The key was new; the pair was stored.
    Inserted(Handle),
    /// An equal key was already stored. Its value is left untouched and the
    /// offered pair is dropped.
    Occupied(Handle),
}

impl InsertOutcome {
    pub fn handle(self) -> Handle {
        match self {
            InsertOutcome::Inserted(h) | InsertOutcome::Occupied(h) => h,
        }
    }

    pub fn is_inserted(self) -> bool {
        matches!(self, InsertOutcome::Inserted(_))
    }
}

/// Hash map with separate chaining whose iteration order is the order in
/// which keys were first inserted.
///
/// Entries are owned by an insertion-ordered arena; the bucket index only
/// stores chain heads into it. The table starts with one bucket and
/// doubles whenever an insertion leaves more than two entries per bucket
/// on average. It never shrinks.
pub struct ChainedOrderedMap<K, V, S = RandomState> {
    hasher: S,
    buckets: BucketIndex,
    entries: EntryStore<K, V>,
    reentrancy: DebugReentrancy,
}

impl<K, V> ChainedOrderedMap<K, V, RandomState> {
    pub fn new() -> Self {
        Self::with_hasher(RandomState::new())
    }
}

impl<K, V, S: Default> Default for ChainedOrderedMap<K, V, S> {
    fn default() -> Self {
        Self::with_hasher(S::default())
    }
}

impl<K, V, S> ChainedOrderedMap<K, V, S> {
    pub fn with_hasher(hasher: S) -> Self {
        Self {
            hasher,
            buckets: BucketIndex::new(),
            entries: EntryStore::new(),
            reentrancy: DebugReentrancy::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Current number of buckets.
    pub fn table_size(&self) -> usize {
        self.buckets.table_size()
    }

    pub fn hasher(&self) -> &S {
        &self.hasher
    }

    /// Removes every entry and shrinks the table back to a single bucket.
    /// All outstanding handles are invalidated.
    pub fn clear(&mut self) {
        tracing::trace!(len = self.len(), table_size = self.table_size(), "clearing map");
        self.buckets.reset(START_TABLE_SIZE);
        self.entries.clear();
    }

    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            it: self.entries.iter(),
        }
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut {
            it: self.entries.iter_mut(),
        }
    }

    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { it: self.iter() }
    }

    pub fn values(&self) -> Values<'_, K, V> {
        Values { it: self.iter() }
    }

    pub fn values_mut(&mut self) -> ValuesMut<'_, K, V> {
        ValuesMut {
            it: self.iter_mut(),
        }
    }

    pub(crate) fn handle_key(&self, h: Handle) -> Option<&K> {
        self.entries.get(h.0).map(|e| &e.key)
    }

    pub(crate) fn handle_value(&self, h: Handle) -> Option<&V> {
        self.entries.get(h.0).map(|e| &e.value)
    }

    pub(crate) fn handle_value_mut(&mut self, h: Handle) -> Option<&mut V> {
        self.entries.get_mut(h.0).map(|e| &mut e.value)
    }

    /// Snapshot of how entries are spread over the buckets.
    #[cfg(feature = "stats")]
    pub fn chain_stats(&self) -> crate::stats::ChainStats {
        crate::stats::ChainStats::collect(
            self.buckets.chain_lengths(&self.entries),
            self.len(),
            self.table_size(),
        )
    }
}

impl<K, V, S> ChainedOrderedMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    /// Builds a map from `(key, value)` pairs using `hasher`. On duplicate
    /// keys the first pair wins.
    pub fn from_iter_with_hasher<I>(iter: I, hasher: S) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
    {
        let mut map = Self::with_hasher(hasher);
        map.extend(iter);
        map
    }

    fn make_hash<Q>(&self, q: &Q) -> u64
    where
        Q: ?Sized + Hash,
    {
        self.hasher.hash_one(q)
    }

    fn locate_key<Q>(&self, q: &Q) -> Option<DefaultKey>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _g = self.reentrancy.enter();
        let hash = self.make_hash(q);
        let bucket = self.buckets.locate(hash);
        self.entries
            .find_in_chain(self.buckets.head(bucket), hash, q)
            .map(|(_, k)| k)
    }

    /// Returns the entry for `key`, creating it with `make()` if absent.
    /// The bool is true when the entry was created.
    fn locate_or_append<F>(&mut self, key: K, make: F) -> (DefaultKey, bool)
    where
        F: FnOnce() -> V,
    {
        let _g = self.reentrancy.enter();
        let hash = self.make_hash(&key);
        let bucket = self.buckets.locate(hash);
        let head = self.buckets.head(bucket);
        if let Some((_, k)) = self.entries.find_in_chain(head, hash, &key) {
            return (k, false);
        }
        let value = make();
        let k = self.entries.append(hash, key, value, head);
        self.buckets.set_head(bucket, Some(k));
        if self.buckets.needs_growth(self.entries.len()) {
            self.buckets.rebuild_doubling(&mut self.entries);
        }
        (k, true)
    }

    /// Finds the entry for `q`. `None` means the key is not stored.
    pub fn find<Q>(&self, q: &Q) -> Option<Handle>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.locate_key(q).map(Handle)
    }

    pub fn contains_key<Q>(&self, q: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.locate_key(q).is_some()
    }

    pub fn get<Q>(&self, q: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let k = self.locate_key(q)?;
        self.entries.get(k).map(|e| &e.value)
    }

    pub fn get_mut<Q>(&mut self, q: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let k = self.locate_key(q)?;
        self.entries.get_mut(k).map(|e| &mut e.value)
    }

    pub fn get_key_value<Q>(&self, q: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let k = self.locate_key(q)?;
        self.entries.get(k).map(|e| (&e.key, &e.value))
    }

    /// Read-only lookup that fails with [`KeyNotFound`] when `q` is absent.
    pub fn at<Q>(&self, q: &Q) -> Result<&V, KeyNotFound>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.get(q).ok_or(KeyNotFound)
    }

    /// Inserts `key -> value` unless an equal key is already stored, in
    /// which case the stored value is kept and `value` is dropped.
    pub fn insert(&mut self, key: K, value: V) -> InsertOutcome {
        match self.locate_or_append(key, || value) {
            (k, true) => InsertOutcome::Inserted(Handle(k)),
            (k, false) => InsertOutcome::Occupied(Handle(k)),
        }
    }

    /// Returns the value for `key`, first inserting `default()` if the key
    /// is absent. `default` only runs when an entry is created.
    pub fn get_or_insert_with<F>(&mut self, key: K, default: F) -> &mut V
    where
        F: FnOnce() -> V,
    {
        let (k, _) = self.locate_or_append(key, default);
        &mut self
            .entries
            .get_mut(k)
            .expect("entry must exist immediately after lookup or insert")
            .value
    }

    /// Indexing access: returns the value for `key`, inserting
    /// `V::default()` first when the key is absent. This mutates the map
    /// (and may grow the table) even when used only to read.
    pub fn get_or_insert_default(&mut self, key: K) -> &mut V
    where
        V: Default,
    {
        self.get_or_insert_with(key, V::default)
    }

    /// Removes the entry for `q`, returning the stored key and value.
    /// Absent keys are a no-op.
    pub fn erase_entry<Q>(&mut self, q: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _g = self.reentrancy.enter();
        let hash = self.make_hash(q);
        let bucket = self.buckets.locate(hash);
        let (prev, k) = self
            .entries
            .find_in_chain(self.buckets.head(bucket), hash, q)?;
        let next = self.entries.get(k)?.chain_next;
        match prev {
            Some(p) => {
                if let Some(e) = self.entries.get_mut(p) {
                    e.chain_next = next;
                }
            }
            None => self.buckets.set_head(bucket, next),
        }
        self.entries.remove(k)
    }

    /// Removes the entry for `q`, returning its value. Absent keys are a
    /// no-op.
    pub fn erase<Q>(&mut self, q: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.erase_entry(q).map(|(_, v)| v)
    }
}

impl<K, V, S> ChainedOrderedMap<K, V, S>
where
    K: Eq + Hash + Clone,
    V: Clone,
    S: BuildHasher + Clone,
{
    /// Replaces the contents of `self` with a deep copy of `other`.
    ///
    /// The table is sized to `2 * other.len()` buckets (at least one) and
    /// pairs are reinserted in `other`'s iteration order. `other`'s own
    /// table size is not carried over. Handles into `self` are invalidated.
    pub fn assign(&mut self, other: &Self) {
        self.clear();
        self.hasher = other.hasher.clone();
        self.buckets.reset(2 * other.len());
        self.entries.reserve(other.len());
        for (key, value) in other.iter() {
            self.insert(key.clone(), value.clone());
        }
        tracing::trace!(len = self.len(), table_size = self.table_size(), "assigned map");
    }
}

impl<K, V, S> Clone for ChainedOrderedMap<K, V, S>
where
    K: Eq + Hash + Clone,
    V: Clone,
    S: BuildHasher + Clone,
{
    fn clone(&self) -> Self {
        let mut map = Self::with_hasher(self.hasher.clone());
        map.assign(self);
        map
    }

    fn clone_from(&mut self, source: &Self) {
        self.assign(source);
    }
}

impl<K, V, S> fmt::Debug for ChainedOrderedMap<K, V, S>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// Two maps are equal when they hold the same keys mapped to equal
/// values. Insertion order does not participate.
impl<K, V, S> PartialEq for ChainedOrderedMap<K, V, S>
where
    K: Eq + Hash,
    V: PartialEq,
    S: BuildHasher,
{
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|(k, v)| other.get(k) == Some(v))
    }
}

impl<K, V, S> Eq for ChainedOrderedMap<K, V, S>
where
    K: Eq + Hash,
    V: Eq,
    S: BuildHasher,
{
}

impl<K, Q, V, S> Index<&Q> for ChainedOrderedMap<K, V, S>
where
    K: Eq + Hash + Borrow<Q>,
    Q: ?Sized + Eq + Hash,
    S: BuildHasher,
{
    type Output = V;

    /// Panics if the key is not stored; use [`ChainedOrderedMap::at`] for a
    /// fallible lookup.
    fn index(&self, key: &Q) -> &V {
        match self.at(key) {
            Ok(v) => v,
            Err(e) => panic!("{e}"),
        }
    }
}

impl<K, V, S> Extend<(K, V)> for ChainedOrderedMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<K, V, S> FromIterator<(K, V)> for ChainedOrderedMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher + Default,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::from_iter_with_hasher(iter, S::default())
    }
}

impl<K, V, const N: usize> From<[(K, V); N]> for ChainedOrderedMap<K, V, RandomState>
where
    K: Eq + Hash,
{
    fn from(arr: [(K, V); N]) -> Self {
        arr.into_iter().collect()
    }
}

/// Iterator over `(&K, &V)` in insertion order.
pub struct Iter<'a, K, V> {
    it: entry_store::Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.it.next().map(|(_, e)| (&e.key, &e.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.it.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}
impl<K, V> FusedIterator for Iter<'_, K, V> {}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            it: self.it.clone(),
        }
    }
}

/// Iterator over `(&K, &mut V)` in insertion order.
pub struct IterMut<'a, K, V> {
    it: entry_store::IterMut<'a, K, V>,
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.it.next().map(|(_, k, v)| (k, v))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.it.size_hint()
    }
}

impl<K, V> ExactSizeIterator for IterMut<'_, K, V> {}

pub struct Keys<'a, K, V> {
    it: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.it.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.it.size_hint()
    }
}

pub struct Values<'a, K, V> {
    it: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.it.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.it.size_hint()
    }
}

pub struct ValuesMut<'a, K, V> {
    it: IterMut<'a, K, V>,
}

impl<'a, K, V> Iterator for ValuesMut<'a, K, V> {
    type Item = &'a mut V;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.it.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.it.size_hint()
    }
}

/// Owning iterator over `(K, V)` in insertion order.
pub struct IntoIter<K, V> {
    entries: EntryStore<K, V>,
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.entries.pop_front()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.entries.len(), Some(self.entries.len()))
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {}

impl<K, V, S> IntoIterator for ChainedOrderedMap<K, V, S> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            entries: self.entries,
        }
    }
}

impl<'a, K, V, S> IntoIterator for &'a ChainedOrderedMap<K, V, S> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K, V, S> IntoIterator for &'a mut ChainedOrderedMap<K, V, S> {
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

#[cfg(test)]
impl<K: Eq, V, S> ChainedOrderedMap<K, V, S> {
    /// Panics unless the bucket index and entry store agree.
    pub(crate) fn assert_invariants(&self) {
        let table_size = self.buckets.table_size();
        assert!(table_size >= 1, "table size must be positive");

        let chained: usize = self.buckets.chain_lengths(&self.entries).sum();
        assert_eq!(chained, self.entries.len(), "every entry is chained exactly once");
        assert_eq!(self.entries.iter().count(), self.entries.len());

        for (k, e) in self.entries.iter() {
            let mut seen = 0;
            let mut cur = self.buckets.head(self.buckets.locate(e.hash));
            while let Some(c) = cur {
                if c == k {
                    seen += 1;
                }
                cur = self.entries.get(c).and_then(|x| x.chain_next);
            }
            assert_eq!(seen, 1, "entry must be reachable from its own bucket once");

            let twins = self.entries.iter().filter(|(_, o)| o.key == e.key).count();
            assert_eq!(twins, 1, "keys must be unique");
        }
    }
}

//! BucketIndex: one collision-chain head per bucket.

use crate::entry_store::EntryStore;
use slotmap::DefaultKey;

pub(crate) const START_TABLE_SIZE: usize = 1;

#[derive(Debug, Clone)]
pub(crate) struct BucketIndex {
    heads: Vec<Option<DefaultKey>>,
}

impl BucketIndex {
    pub(crate) fn new() -> Self {
        Self::with_table_size(START_TABLE_SIZE)
    }

    pub(crate) fn with_table_size(table_size: usize) -> Self {
        Self {
            heads: vec![None; table_size.max(START_TABLE_SIZE)],
        }
    }

    #[inline]
    pub(crate) fn table_size(&self) -> usize {
        self.heads.len()
    }

    #[inline]
    pub(crate) fn locate(&self, hash: u64) -> usize {
        (hash % self.heads.len() as u64) as usize
    }

    #[inline]
    pub(crate) fn head(&self, bucket: usize) -> Option<DefaultKey> {
        self.heads[bucket]
    }

    #[inline]
    pub(crate) fn set_head(&mut self, bucket: usize, head: Option<DefaultKey>) {
        self.heads[bucket] = head;
    }

    /// Drops every chain and resizes to `table_size` empty buckets.
    pub(crate) fn reset(&mut self, table_size: usize) {
        self.heads.clear();
        self.heads.resize(table_size.max(START_TABLE_SIZE), None);
    }

    /// Whether an entry count of `len` exceeds the load factor trigger.
    #[inline]
    pub(crate) fn needs_growth(&self, len: usize) -> bool {
        len > 2 * self.table_size()
    }

    /// Doubles the table and rethreads every entry onto the front of its
    /// new bucket, walking `entries` in insertion order.
    pub(crate) fn rebuild_doubling<K, V>(&mut self, entries: &mut EntryStore<K, V>) {
        let doubled = self.table_size() * 2;
        self.reset(doubled);
        let heads = &mut self.heads;
        let table_size = heads.len() as u64;
        entries.for_each_link(|k, hash| {
            let bucket = (hash % table_size) as usize;
            heads[bucket].replace(k)
        });
        tracing::trace!(table_size = doubled, len = entries.len(), "rebuilt bucket index");
    }

    /// Length of every non-empty chain, in bucket order.
    #[cfg(any(test, feature = "stats"))]
    pub(crate) fn chain_lengths<'a, K, V>(
        &'a self,
        entries: &'a EntryStore<K, V>,
    ) -> impl Iterator<Item = usize> + 'a {
        self.heads.iter().filter_map(move |&head| {
            head?;
            let mut n = 0;
            let mut cur = head;
            while let Some(k) = cur {
                n += 1;
                cur = entries.get(k).and_then(|e| e.chain_next);
            }
            Some(n)
        })
    }
}

impl Default for BucketIndex {
    fn default() -> Self {
        Self::new()
    }
}

//! EntryStore: owning arena of entries threaded in insertion order.
//!
//! Entries live in a `SlotMap` so their keys stay valid no matter how
//! many other entries come and go; erased slots are recycled with a
//! bumped generation. Insertion order is an intrusive doubly-linked list
//! through `prev`/`next`, and each entry also carries the `chain_next`
//! link owned by the bucket index.

use core::borrow::Borrow;
use slotmap::{DefaultKey, SecondaryMap, SlotMap};

#[derive(Debug)]
pub(crate) struct Entry<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    pub(crate) hash: u64,
    pub(crate) chain_next: Option<DefaultKey>,
    prev: Option<DefaultKey>,
    next: Option<DefaultKey>,
}

#[derive(Debug)]
pub(crate) struct EntryStore<K, V> {
    slots: SlotMap<DefaultKey, Entry<K, V>>,
    head: Option<DefaultKey>,
    tail: Option<DefaultKey>,
}

impl<K, V> EntryStore<K, V> {
    pub(crate) fn new() -> Self {
        Self {
            slots: SlotMap::with_key(),
            head: None,
            tail: None,
        }
    }

    pub(crate) fn reserve(&mut self, additional: usize) {
        self.slots.reserve(additional);
    }

    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Appends a new entry after the current tail and returns its key.
    pub(crate) fn append(
        &mut self,
        hash: u64,
        key: K,
        value: V,
        chain_next: Option<DefaultKey>,
    ) -> DefaultKey {
        let prev = self.tail;
        let k = self.slots.insert(Entry {
            key,
            value,
            hash,
            chain_next,
            prev,
            next: None,
        });
        match prev {
            Some(p) => self.slots[p].next = Some(k),
            None => self.head = Some(k),
        }
        self.tail = Some(k);
        k
    }

    /// Removes the entry and closes the gap in insertion order. The caller
    /// is responsible for having unlinked it from its bucket chain.
    pub(crate) fn remove(&mut self, k: DefaultKey) -> Option<(K, V)> {
        let entry = self.slots.remove(k)?;
        match entry.prev {
            Some(p) => self.slots[p].next = entry.next,
            None => self.head = entry.next,
        }
        match entry.next {
            Some(n) => self.slots[n].prev = entry.prev,
            None => self.tail = entry.prev,
        }
        Some((entry.key, entry.value))
    }

    /// Removes the oldest entry. Chain links are not patched, so this is
    /// only for draining a store whose bucket index is already gone.
    pub(crate) fn pop_front(&mut self) -> Option<(K, V)> {
        let k = self.head?;
        self.remove(k)
    }

    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.head = None;
        self.tail = None;
    }

    pub(crate) fn get(&self, k: DefaultKey) -> Option<&Entry<K, V>> {
        self.slots.get(k)
    }

    pub(crate) fn get_mut(&mut self, k: DefaultKey) -> Option<&mut Entry<K, V>> {
        self.slots.get_mut(k)
    }

    /// Walks the collision chain starting at `head` looking for `q`.
    ///
    /// Returns the matching entry's key together with its chain
    /// predecessor (`None` when the match is the chain head). The cached
    /// hash is compared before the key.
    pub(crate) fn find_in_chain<Q>(
        &self,
        head: Option<DefaultKey>,
        hash: u64,
        q: &Q,
    ) -> Option<(Option<DefaultKey>, DefaultKey)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
    {
        let mut prev = None;
        let mut cur = head;
        while let Some(k) = cur {
            let e = self.slots.get(k)?;
            if e.hash == hash && e.key.borrow() == q {
                return Some((prev, k));
            }
            prev = cur;
            cur = e.chain_next;
        }
        None
    }

    /// Visits every entry in insertion order with mutable access to its
    /// chain link. Used by the bucket index when rethreading.
    pub(crate) fn for_each_link(&mut self, mut f: impl FnMut(DefaultKey, u64) -> Option<DefaultKey>) {
        let mut cur = self.head;
        while let Some(k) = cur {
            let e = &mut self.slots[k];
            e.chain_next = f(k, e.hash);
            cur = e.next;
        }
    }

    pub(crate) fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            store: self,
            cursor: self.head,
            remaining: self.len(),
        }
    }

    pub(crate) fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        let mut order = Vec::with_capacity(self.len());
        let mut cur = self.head;
        while let Some(k) = cur {
            order.push(k);
            cur = self.slots[k].next;
        }
        let mut refs = SecondaryMap::with_capacity(self.slots.capacity());
        for (k, e) in self.slots.iter_mut() {
            refs.insert(k, (&e.key, &mut e.value));
        }
        IterMut {
            order: order.into_iter(),
            refs,
        }
    }
}

impl<K, V> Default for EntryStore<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

/// Insertion-ordered iterator over entries of an [`EntryStore`].
pub(crate) struct Iter<'a, K, V> {
    store: &'a EntryStore<K, V>,
    cursor: Option<DefaultKey>,
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (DefaultKey, &'a Entry<K, V>);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let k = self.cursor?;
        let e = self.store.slots.get(k)?;
        self.cursor = e.next;
        self.remaining -= 1;
        Some((k, e))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            store: self.store,
            cursor: self.cursor,
            remaining: self.remaining,
        }
    }
}

/// Insertion-ordered iterator with mutable access to values.
pub(crate) struct IterMut<'a, K, V> {
    order: std::vec::IntoIter<DefaultKey>,
    refs: SecondaryMap<DefaultKey, (&'a K, &'a mut V)>,
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (DefaultKey, &'a K, &'a mut V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let k = self.order.next()?;
        let (key, value) = self.refs.remove(k)?;
        Some((k, key, value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.order.size_hint()
    }
}

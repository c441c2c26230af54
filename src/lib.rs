//! chained-ordered-map: a single-threaded hash map with separate chaining
//! whose iteration order is insertion order.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: one container where both the collision chains and the
//!   insertion order are explicit, checkable link structures over the same
//!   set of entries.
//! - Layers:
//!   - EntryStore<K, V>: owns every entry in a generational arena and
//!     threads them in insertion order. Entries are created and destroyed
//!     only here.
//!   - BucketIndex: `table_size` chain heads into the store. Each entry
//!     carries the `chain_next` link of its bucket's singly-linked chain.
//!   - ChainedOrderedMap<K, V, S>: public API; keeps the two structures in
//!     step on insert, erase, lookup, growth, clear, and copy.
//!
//! Growth
//! - The table starts at one bucket. After an insertion leaves
//!   `len > 2 * table_size`, the table doubles and every entry is
//!   rethreaded from its cached hash. Entries never move during growth,
//!   so `Handle`s stay valid. The table never shrinks on erase; `clear`
//!   resets it to one bucket.
//! - Chain order after a rebuild is the reverse of insertion order within
//!   each bucket. Nothing depends on chain order.
//!
//! Semantics worth knowing
//! - `insert` never overwrites: the first value stored for a key wins.
//! - `get_or_insert_default` is indexing-style access. It inserts
//!   `V::default()` for an absent key, so it needs `&mut self`.
//! - `at` is the only fallible lookup (`KeyNotFound`); `find`, `get`,
//!   `erase` report absence with `None`.
//! - Copying is explicit and deep: `assign` (and `Clone`, which routes
//!   through it) reinserts every pair in order into a table sized to
//!   `2 * len` buckets.
//!
//! Hasher and rehashing invariants
//! - Each entry stores its `u64` hash; growth uses the stored hash and
//!   never calls `K: Hash`. Lookups compare the stored hash before `K: Eq`.
//!
//! Reentrancy
//! - Entry points that run user code (`Hash`, `Eq`, value constructors)
//!   hold a debug-only guard; re-entering the map from that code panics in
//!   debug builds.
//!
//! Notes and non-goals
//! - Single-threaded: `!Send`/`!Sync`.
//! - No per-bucket capacity limit. With the `stats` feature,
//!   `chain_stats` reports the longest chain for inspection only.

mod bucket_index;
mod chained_map;
mod chained_map_proptest;
mod entry_store;
mod error;
mod reentrancy;
#[cfg(feature = "stats")]
mod stats;

// Public surface
pub use chained_map::{
    ChainedOrderedMap, Handle, InsertOutcome, IntoIter, Iter, IterMut, Keys, Values, ValuesMut,
};
pub use error::KeyNotFound;
#[cfg(feature = "stats")]
pub use stats::ChainStats;

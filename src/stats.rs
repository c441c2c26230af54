//! Chain-length diagnostics, enabled with the `stats` feature.

/// How entries are spread over the bucket index at one point in time.
#[derive(Debug, Clone, PartialEq)]
pub struct ChainStats {
    /// Number of stored entries
    pub len: usize,
    /// Number of buckets
    pub table_size: usize,
    /// Buckets whose chain is non-empty
    pub occupied_buckets: usize,
    /// Entries in the longest chain
    pub longest_chain: usize,
    /// Entries per bucket (len / table_size)
    pub load_factor: f64,
}

impl ChainStats {
    pub(crate) fn collect(
        chain_lengths: impl Iterator<Item = usize>,
        len: usize,
        table_size: usize,
    ) -> Self {
        let (occupied_buckets, longest_chain) = chain_lengths
            .fold((0, 0), |(occupied, longest), n| (occupied + 1, longest.max(n)));
        Self {
            len,
            table_size,
            occupied_buckets,
            longest_chain,
            load_factor: len as f64 / table_size as f64,
        }
    }
}

//! Error types.

/// Returned by [`ChainedOrderedMap::at`](crate::ChainedOrderedMap::at) when
/// the requested key is not stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("key not found")]
pub struct KeyNotFound;

//! Hand-rolled index structures and the facade that owns them.

/// Queue-plus-index facade.
pub mod desk;
/// DJB2 hashing and bucket mapping.
pub mod hashing;
/// Open-addressing keyed index with tombstones.
pub mod index;
/// Rank-ordered binary min-heap.
pub mod queue;

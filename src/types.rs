//! Shared primitive types and capacity constants.

/// Urgency rank; lower values are more urgent.
pub type Rank = u8;
/// Monotonic arrival sequence assigned by the queue.
pub type Sequence = u64;

/// Most urgent rank accepted at admission.
pub const MIN_RANK: Rank = 1;
/// Least urgent rank accepted at admission.
pub const MAX_RANK: Rank = 5;

/// Default number of entries the ranked queue can hold.
pub const DEFAULT_QUEUE_CAPACITY: usize = 100;
/// Default slot count of the keyed index.
pub const DEFAULT_INDEX_CAPACITY: usize = 101;

/// Returns true when `rank` lies in `MIN_RANK..=MAX_RANK`.
pub fn rank_in_range(rank: i64) -> bool {
    (i64::from(MIN_RANK)..=i64::from(MAX_RANK)).contains(&rank)
}

//! Runtime event stream payloads.

use crate::types::{Rank, Sequence};

/// Events emitted from the single-owner desk loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeskEvent {
    /// A patient was queued for the first time or for a new visit.
    Admitted {
        /// Patient id.
        id: String,
        /// Assigned rank.
        rank: Rank,
        /// Arrival sequence.
        arrival: Sequence,
    },
    /// A waiting patient was admitted again and re-queued.
    Retriaged {
        /// Patient id.
        id: String,
        /// New rank.
        rank: Rank,
        /// New arrival sequence.
        arrival: Sequence,
    },
    /// The next patient was popped and treated.
    Treated {
        /// Patient id.
        id: String,
    },
    /// A record was removed from the index.
    Discharged {
        /// Patient id.
        id: String,
    },
}

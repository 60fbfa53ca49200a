use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    record::{self, CodecError, DELIMITER, PatientDraft, PatientRecord, VisitStatus},
    types::{
        DEFAULT_INDEX_CAPACITY, DEFAULT_QUEUE_CAPACITY, MAX_RANK, MIN_RANK, Rank, Sequence,
        rank_in_range,
    },
};

use super::{
    index::{IndexError, KeyedIndex},
    queue::{QueueEntry, QueueError, RankedQueue},
};

/// Errors returned by [`TriageDesk`]. A failed call leaves the desk unchanged.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeskError {
    /// The id is empty or contains the payload delimiter.
    #[error("patient id {0:?} is empty or contains '|'")]
    InvalidId(String),
    /// The rank is outside `MIN_RANK..=MAX_RANK`.
    #[error("rank {0} is outside {min}..={max}", min = MIN_RANK, max = MAX_RANK)]
    InvalidRank(Rank),
    /// No queue room, even after dropping stale entries.
    #[error(transparent)]
    QueueFull(#[from] QueueError),
    /// No free slot in the registry.
    #[error(transparent)]
    TableFull(#[from] IndexError),
    /// A stored payload failed to decode.
    #[error("stored payload is corrupt: {0}")]
    Codec(#[from] CodecError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Capacities and treatment policy of a [`TriageDesk`].
pub struct DeskConfig {
    /// Entries the ranked queue can hold, stale ones included.
    pub queue_capacity: usize,
    /// Slot count of the registry.
    pub index_capacity: usize,
    /// Remove the record from the index once the patient is treated.
    pub retire_on_treat: bool,
}

impl Default for DeskConfig {
    fn default() -> Self {
        Self {
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            index_capacity: DEFAULT_INDEX_CAPACITY,
            retire_on_treat: false,
        }
    }
}

/// Result of a successful admission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Admission {
    /// Patient id.
    pub id: String,
    /// Rank the patient was queued at.
    pub rank: Rank,
    /// Arrival sequence of the new queue entry.
    pub arrival: Sequence,
    /// Status of the record this admission replaced, if any.
    pub previous: Option<VisitStatus>,
}

/// Point-in-time counters of a desk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeskSnapshot {
    /// Live queue entries.
    pub waiting: usize,
    /// Queue entries including stale ones.
    pub queued_entries: usize,
    /// Queue bound.
    pub queue_capacity: usize,
    /// Live registry entries.
    pub registered: usize,
    /// Tombstoned registry slots.
    pub tombstones: usize,
    /// Registry slot count.
    pub index_capacity: usize,
    /// Record that would be treated next.
    pub next: Option<PatientRecord>,
}

/// Queue and index kept in step behind one owner.
///
/// The index is authoritative. A queue entry is live only while the index
/// holds the exact payload it was pushed with; re-triage, treatment and
/// discharge all turn older entries stale, and stale entries are dropped
/// when they surface at the root or when the queue needs room.
#[derive(Debug, Clone)]
pub struct TriageDesk {
    queue: RankedQueue<String>,
    registry: KeyedIndex<String>,
    config: DeskConfig,
}

impl Default for TriageDesk {
    fn default() -> Self {
        Self::new(DeskConfig::default())
    }
}

impl TriageDesk {
    /// Empty desk sized by `config`.
    pub fn new(config: DeskConfig) -> Self {
        Self {
            queue: RankedQueue::with_capacity(config.queue_capacity),
            registry: KeyedIndex::with_capacity(config.index_capacity),
            config,
        }
    }

    /// Configuration the desk was built with.
    pub fn config(&self) -> &DeskConfig {
        &self.config
    }

    /// Registers the record and queues it, or changes nothing.
    pub fn admit(&mut self, draft: PatientDraft) -> Result<Admission, DeskError> {
        if draft.id.is_empty() || draft.id.contains(DELIMITER) {
            return Err(DeskError::InvalidId(draft.id));
        }
        if !rank_in_range(i64::from(draft.rank)) {
            return Err(DeskError::InvalidRank(draft.rank));
        }
        if self.queue.is_full() {
            let dropped = self.compact();
            debug!(dropped, "compacted full queue");
            if self.queue.is_full() {
                return Err(QueueError::Full {
                    capacity: self.queue.capacity(),
                }
                .into());
            }
        }

        let rec = PatientRecord {
            id: draft.id,
            rank: draft.rank,
            arrival: self.queue.next_sequence(),
            status: VisitStatus::Waiting,
            info: draft.info,
        };
        let payload = record::encode(&rec);

        let previous = self
            .registry
            .get(&rec.id)
            .map(|old| record::decode(old))
            .transpose()?
            .map(|old| old.status);
        self.registry.set(&rec.id, payload.clone())?;
        let arrival = self.queue.push(payload, rec.rank)?;
        debug_assert_eq!(arrival, rec.arrival);

        debug!(id = %rec.id, rank = rec.rank, arrival, ?previous, "admitted");
        Ok(Admission {
            id: rec.id,
            rank: rec.rank,
            arrival,
            previous,
        })
    }

    /// Next live record without removing it.
    pub fn peek_next(&mut self) -> Result<Option<PatientRecord>, DeskError> {
        self.discard_stale_roots();
        match self.queue.peek() {
            Some(payload) => Ok(Some(record::decode(payload)?)),
            None => Ok(None),
        }
    }

    /// Pops the next live record and marks it treated in the index.
    pub fn treat_next(&mut self) -> Result<Option<PatientRecord>, DeskError> {
        self.discard_stale_roots();
        let Some(entry) = self.queue.pop_entry() else {
            return Ok(None);
        };

        let mut rec = record::decode(&entry.payload)?;
        rec.status = VisitStatus::Treated;
        if self.config.retire_on_treat {
            self.registry.remove(&rec.id);
        } else if let Some(stored) = self.registry.get_mut(&rec.id) {
            *stored = record::encode(&rec);
        }

        debug!(id = %rec.id, rank = rec.rank, arrival = rec.arrival, "treated");
        Ok(Some(rec))
    }

    /// Record registered under `id`, waiting or treated.
    pub fn lookup(&self, id: &str) -> Result<Option<PatientRecord>, DeskError> {
        Ok(self.registry.get(id).map(|p| record::decode(p)).transpose()?)
    }

    /// Tombstones the record; a waiting queue entry for it goes stale.
    pub fn discharge(&mut self, id: &str) -> Result<Option<PatientRecord>, DeskError> {
        let removed = self.registry.remove(id);
        if removed.is_some() {
            debug!(id, "discharged");
        }
        Ok(removed.map(|p| record::decode(&p)).transpose()?)
    }

    /// Live queue entries.
    pub fn waiting(&self) -> usize {
        self.queue.iter().filter(|e| self.is_live(e)).count()
    }

    /// Queue entries including stale ones.
    pub fn queued_entries(&self) -> usize {
        self.queue.len()
    }

    /// Live registry entries.
    pub fn registered(&self) -> usize {
        self.registry.len()
    }

    /// Counters and the next live record.
    pub fn snapshot(&self) -> DeskSnapshot {
        let next = self
            .queue
            .iter()
            .filter(|e| self.is_live(e))
            .min_by_key(|e| (e.rank, e.sequence))
            .and_then(|e| record::decode(&e.payload).ok());

        DeskSnapshot {
            waiting: self.waiting(),
            queued_entries: self.queue.len(),
            queue_capacity: self.queue.capacity(),
            registered: self.registry.len(),
            tombstones: self.registry.tombstones(),
            index_capacity: self.registry.capacity(),
            next,
        }
    }

    /// Drops every stale entry from the queue.
    pub fn compact(&mut self) -> usize {
        let registry = &self.registry;
        self.queue.retain(|e| entry_is_live(registry, e))
    }

    fn is_live(&self, entry: &QueueEntry<String>) -> bool {
        entry_is_live(&self.registry, entry)
    }

    fn discard_stale_roots(&mut self) {
        while let Some(root) = self.queue.peek_entry() {
            if self.is_live(root) {
                break;
            }
            if let Some(stale) = self.queue.pop_entry() {
                debug!(
                    id = record::id_of(&stale.payload),
                    sequence = stale.sequence,
                    "skipped stale entry"
                );
            }
        }
    }
}

fn entry_is_live(registry: &KeyedIndex<String>, entry: &QueueEntry<String>) -> bool {
    registry
        .get(record::id_of(&entry.payload))
        .is_some_and(|stored| *stored == entry.payload)
}

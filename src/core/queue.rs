use serde::{Deserialize, Serialize};

use crate::types::{DEFAULT_QUEUE_CAPACITY, Rank, Sequence};

/// Errors returned by [`RankedQueue`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueueError {
    /// A push was attempted while the queue held `capacity` entries.
    #[error("ranked queue is full (capacity {capacity})")]
    Full {
        /// Fixed capacity of the queue.
        capacity: usize,
    },
}

/// One resident entry of the heap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueEntry<T> {
    /// Opaque payload handed back on pop.
    pub payload: T,
    /// Urgency rank; lower pops first.
    pub rank: Rank,
    /// Arrival sequence; breaks rank ties first-in first-out.
    pub sequence: Sequence,
}

impl<T> QueueEntry<T> {
    /// True when `self` must pop before `other`.
    pub fn precedes(&self, other: &Self) -> bool {
        (self.rank, self.sequence) < (other.rank, other.sequence)
    }
}

/// Fixed-capacity binary min-heap ordered by `(rank, sequence)`.
///
/// The tree is implicit: the children of index `i` live at `2i + 1` and
/// `2i + 2`, its parent at `(i - 1) / 2`.
#[derive(Debug, Clone)]
pub struct RankedQueue<T> {
    heap: Vec<QueueEntry<T>>,
    capacity: usize,
    next_sequence: Sequence,
}

impl<T> Default for RankedQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> RankedQueue<T> {
    /// Empty queue holding up to [`DEFAULT_QUEUE_CAPACITY`] entries.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_QUEUE_CAPACITY)
    }

    /// Empty queue holding up to `capacity` entries.
    ///
    /// The bound is logical; storage grows with the entries actually pushed.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            heap: Vec::with_capacity(capacity.min(DEFAULT_QUEUE_CAPACITY)),
            capacity,
            next_sequence: 0,
        }
    }

    /// Inserts `payload` at `rank` and returns the sequence it was given.
    ///
    /// A rejected push leaves the queue and its counter untouched.
    pub fn push(&mut self, payload: T, rank: Rank) -> Result<Sequence, QueueError> {
        if self.is_full() {
            return Err(QueueError::Full {
                capacity: self.capacity,
            });
        }

        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.heap.push(QueueEntry {
            payload,
            rank,
            sequence,
        });
        self.sift_up(self.heap.len() - 1);
        Ok(sequence)
    }

    /// Payload of the most urgent entry.
    pub fn peek(&self) -> Option<&T> {
        self.peek_entry().map(|e| &e.payload)
    }

    /// Most urgent entry with its rank and sequence.
    pub fn peek_entry(&self) -> Option<&QueueEntry<T>> {
        self.heap.first()
    }

    /// Removes the most urgent entry and returns its payload.
    pub fn pop(&mut self) -> Option<T> {
        self.pop_entry().map(|e| e.payload)
    }

    /// Removes the root entry and restores the heap property.
    pub fn pop_entry(&mut self) -> Option<QueueEntry<T>> {
        if self.heap.is_empty() {
            return None;
        }
        let root = self.heap.swap_remove(0);
        self.sift_down(0);
        Some(root)
    }

    /// Resident entries.
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// True when no entry is resident.
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Fixed bound given at construction.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// True when the next push would be rejected.
    pub fn is_full(&self) -> bool {
        self.heap.len() >= self.capacity
    }

    /// Sequence the next successful push will receive.
    pub fn next_sequence(&self) -> Sequence {
        self.next_sequence
    }

    /// Drops every entry for which `keep` returns false, then rebuilds the
    /// heap bottom-up. Surviving entries keep their sequence numbers.
    pub fn retain(&mut self, mut keep: impl FnMut(&QueueEntry<T>) -> bool) -> usize {
        let before = self.heap.len();
        self.heap.retain(|e| keep(e));
        for i in (0..self.heap.len() / 2).rev() {
            self.sift_down(i);
        }
        before - self.heap.len()
    }

    /// Entries in storage order, which is not pop order.
    pub fn iter(&self) -> impl Iterator<Item = &QueueEntry<T>> {
        self.heap.iter()
    }

    fn sift_up(&mut self, mut i: usize) {
        while i > 0 {
            let parent = (i - 1) / 2;
            if !self.heap[i].precedes(&self.heap[parent]) {
                break;
            }
            self.heap.swap(i, parent);
            i = parent;
        }
    }

    fn sift_down(&mut self, mut i: usize) {
        let len = self.heap.len();
        loop {
            let left = 2 * i + 1;
            let right = left + 1;
            let mut best = i;
            if left < len && self.heap[left].precedes(&self.heap[best]) {
                best = left;
            }
            if right < len && self.heap[right].precedes(&self.heap[best]) {
                best = right;
            }
            if best == i {
                break;
            }
            self.heap.swap(i, best);
            i = best;
        }
    }
}

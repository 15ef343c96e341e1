//! Max-priority queue of faces awaiting refinement.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// A face and the upper bound it was queued with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QueueEntry {
    /// Upper bound at insertion time.
    pub bound: f64,
    /// Face row in the augmented mesh.
    pub face: usize,
}

impl Eq for QueueEntry {}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.bound
            .total_cmp(&other.bound)
            .then_with(|| other.face.cmp(&self.face))
    }
}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Faces ordered by descending upper bound.
///
/// Equal bounds pop the lower face index first. Entries are never updated
/// in place; the engine re-checks each popped bound against the current
/// lower bound.
#[derive(Debug, Clone, Default)]
pub struct RefinementQueue {
    heap: BinaryHeap<QueueEntry>,
}

impl RefinementQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `face` with `bound`.
    pub fn push(&mut self, bound: f64, face: usize) {
        self.heap.push(QueueEntry { bound, face });
    }

    /// Queue `face` only if `bound >= lower`; returns whether it was queued.
    pub fn push_if_at_least(&mut self, bound: f64, face: usize, lower: f64) -> bool {
        if bound >= lower {
            self.push(bound, face);
            true
        } else {
            false
        }
    }

    /// Entry with the largest bound.
    pub fn peek(&self) -> Option<&QueueEntry> {
        self.heap.peek()
    }

    /// Remove and return the entry with the largest bound.
    pub fn pop(&mut self) -> Option<QueueEntry> {
        self.heap.pop()
    }

    /// Number of queued entries.
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Whether the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

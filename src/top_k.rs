//! Bounded heap for tracking the top-K records.
//!
//! Keeps the K highest-scoring records with O(K) memory instead of the
//! O(N) required by sorting all the records.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::base::{Record, Score};

/// Upper bound on the number of slots reserved up front; larger collectors
/// grow as records come in
const PREALLOCATED_MAX: usize = 1 << 16;

/// A bounded min-heap that keeps track of the top-K records.
///
/// Ties between equal scores are resolved by the heap mechanics: which
/// records survive (and in which order they are drained) depends on the
/// ingestion order.
pub struct TopKCollector {
    /// Min-heap storing top records (using Reverse for min-heap behavior)
    heap: BinaryHeap<Reverse<Record>>,
    /// Maximum size of the heap
    capacity: usize,
}

impl TopKCollector {
    pub fn new(capacity: usize) -> Self {
        Self {
            heap: BinaryHeap::with_capacity(capacity.min(PREALLOCATED_MAX)),
            capacity,
        }
    }

    /// Adds a record, and returns true if it was kept.
    ///
    /// If the heap is at capacity, the record replaces the current minimum
    /// only if its score is strictly greater.
    #[inline]
    pub fn ingest(&mut self, record: Record) -> bool {
        if self.heap.len() < self.capacity {
            self.heap.push(Reverse(record));
            return true;
        }

        if let Some(mut min) = self.heap.peek_mut() {
            if record > min.0 {
                // The heap is restored when `min` is dropped
                *min = Reverse(record);
                return true;
            }
        }
        false
    }

    /// Lowest score a record must beat to enter a full collector
    /// (None while the collector is not full)
    pub fn threshold(&self) -> Option<Score> {
        if self.capacity > 0 && self.heap.len() >= self.capacity {
            self.heap.peek().map(|r| r.0.score)
        } else {
            None
        }
    }

    /// Returns the records sorted by descending score
    pub fn into_sorted_vec(self) -> Vec<Record> {
        // Ascending order on Reverse = descending order on records
        self.heap.into_sorted_vec().into_iter().map(|r| r.0).collect()
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Extend<Record> for TopKCollector {
    fn extend<T: IntoIterator<Item = Record>>(&mut self, iter: T) {
        for record in iter {
            self.ingest(record);
        }
    }
}

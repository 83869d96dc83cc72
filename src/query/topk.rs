//! Bounded top-k selection
//!
//! When a caller limits the number of results, matches are pushed through a
//! heap that never holds more than `k` items. The heap is ordered so that its
//! top is the worst item kept; a new item only enters when it ranks ahead of
//! that worst item, which then gets evicted. This keeps interactive lookups
//! at O(n log k) instead of sorting every candidate.

use std::collections::BinaryHeap;

/// Top-K heap over items whose `Ord` sorts better items first
/// (`a < b` means `a` ranks ahead of `b`).
pub struct TopKHeap<T: Ord> {
    /// Max-heap: the top is the worst retained item
    heap: BinaryHeap<T>,
    /// Maximum capacity (k)
    capacity: usize,
}

impl<T: Ord> TopKHeap<T> {
    /// Create a new top-k heap with the given capacity
    pub fn new(k: usize) -> Self {
        Self {
            heap: BinaryHeap::with_capacity(k.saturating_add(1).min(1024)),
            capacity: k,
        }
    }

    /// Check if an item could enter the top-k
    #[inline]
    pub fn would_enter(&self, item: &T) -> bool {
        if self.heap.len() < self.capacity {
            return true;
        }
        match self.heap.peek() {
            Some(worst) => item < worst,
            None => false,
        }
    }

    /// Try to insert an item into the top-k heap.
    /// Returns true if the item was inserted.
    pub fn try_insert(&mut self, item: T) -> bool {
        if self.capacity == 0 {
            false
        } else if self.heap.len() < self.capacity {
            // Not full yet, always insert
            self.heap.push(item);
            true
        } else if self.would_enter(&item) {
            // Better than current worst, replace it
            self.heap.pop();
            self.heap.push(item);
            true
        } else {
            false
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.heap.len() >= self.capacity
    }

    /// Consume the heap and return items best first
    pub fn into_sorted_vec(self) -> Vec<T> {
        self.heap.into_sorted_vec()
    }
}

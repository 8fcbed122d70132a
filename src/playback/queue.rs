//! Bounded look-ahead queue of clips that have been picked but not played.

use cliploop_common::ClipDescriptor;
use std::collections::VecDeque;

/// Capacity used when none is configured.
pub const DEFAULT_CAPACITY: usize = 5;

/// FIFO of prefetched clips that never grows beyond its capacity.
#[derive(Debug, Clone)]
pub struct PrefetchQueue {
    items: VecDeque<ClipDescriptor>,
    capacity: usize,
}

impl PrefetchQueue {
    /// Create an empty queue; a capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append at the tail. Returns `false` (and drops the clip) when full.
    pub fn push(&mut self, clip: ClipDescriptor) -> bool {
        if self.is_full() {
            return false;
        }
        self.items.push_back(clip);
        true
    }

    /// Pop the head.
    pub fn take_next(&mut self) -> Option<ClipDescriptor> {
        self.items.pop_front()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.items.len() >= self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Free slots left before the queue is full.
    pub fn room(&self) -> usize {
        self.capacity.saturating_sub(self.items.len())
    }

    pub fn iter(&self) -> impl Iterator<Item = &ClipDescriptor> {
        self.items.iter()
    }

    pub fn snapshot(&self) -> Vec<ClipDescriptor> {
        self.items.iter().cloned().collect()
    }
}

impl Default for PrefetchQueue {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

use std::collections::{HashSet, VecDeque};

use crate::types::TxId;

/// Default ceiling of remembered transaction IDs.
pub const DEFAULT_SEEN_CAPACITY: usize = 10_000;

/// Bounded set of processed transaction IDs.
///
/// Once an insert pushes the size over the ceiling, the set is cut down to
/// the most recent half. An ID evicted this way is accepted again if it ever
/// shows up.
#[derive(Clone, Debug)]
pub struct SeenSet {
    capacity: usize,
    order: VecDeque<TxId>,
    members: HashSet<TxId>,
}

impl SeenSet {
    /// # Panics
    ///
    /// If `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "seen set capacity must be positive");
        Self {
            capacity,
            order: VecDeque::with_capacity(capacity + 1),
            members: HashSet::with_capacity(capacity + 1),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, id: &TxId) -> bool {
        self.members.contains(id)
    }

    /// Remembers the ID, returns `false` if it was already present.
    pub fn insert(&mut self, id: TxId) -> bool {
        if !self.members.insert(id) {
            return false;
        }
        self.order.push_back(id);
        if self.order.len() > self.capacity {
            self.truncate();
        }
        true
    }

    fn truncate(&mut self) {
        let keep = (self.capacity / 2).max(1);
        let evict = self.order.len().saturating_sub(keep);
        for id in self.order.drain(..evict) {
            self.members.remove(&id);
        }
    }
}

impl Default for SeenSet {
    fn default() -> Self {
        Self::new(DEFAULT_SEEN_CAPACITY)
    }
}

//! Message deduplication.
//!
//! Chat platforms redeliver messages after reconnects, so every utterance
//! carries a platform message id and the router drops ids it has already
//! processed. The window is insertion-ordered and bounded: when it grows
//! past `capacity` ids, the oldest are discarded in one batch down to
//! `retain`.

use std::collections::{HashSet, VecDeque};
use tracing::debug;

/// Bounded, insertion-ordered set of recently seen message ids.
pub struct MessageDeduper {
    seen: HashSet<String>,
    order: VecDeque<String>,
    capacity: usize,
    retain: usize,
}

impl MessageDeduper {
    /// `retain` must be strictly less than `capacity`; the router config
    /// validates this before construction.
    pub fn new(capacity: usize, retain: usize) -> Self {
        Self {
            seen: HashSet::with_capacity(capacity + 1),
            order: VecDeque::with_capacity(capacity + 1),
            capacity,
            retain,
        }
    }

    pub fn seen(&self, id: &str) -> bool {
        self.seen.contains(id)
    }

    /// Records an id, trimming the window if it overflowed.
    pub fn remember(&mut self, id: &str) {
        if self.seen.contains(id) {
            return;
        }
        self.seen.insert(id.to_string());
        self.order.push_back(id.to_string());
        if self.order.len() > self.capacity {
            let evict = self.order.len() - self.retain;
            for _ in 0..evict {
                if let Some(old) = self.order.pop_front() {
                    self.seen.remove(&old);
                }
            }
            debug!(evicted = evict, retained = self.order.len(), "trimmed dedup window");
        }
    }

    /// Returns `true` when the id was already seen; remembers it otherwise.
    pub fn check_and_remember(&mut self, id: &str) -> bool {
        if self.seen(id) {
            return true;
        }
        self.remember(id);
        false
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

//! # Event History
//!
//! Bounded ring of recently emitted events, kept for diagnostics and tests.
//! When full, the oldest entry is evicted first.

use std::collections::VecDeque;

use crate::events::{Event, HistoryFilter};
use crate::DEFAULT_HISTORY_CAPACITY;

/// Bounded FIFO history of emitted events.
#[derive(Debug)]
pub struct EventHistory {
    entries: VecDeque<Event>,
    capacity: usize,
}

impl EventHistory {
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }

    /// A capacity of zero disables recording.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity.min(1024)),
            capacity,
        }
    }

    pub fn record(&mut self, event: Event) {
        if self.capacity == 0 {
            return;
        }
        while self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(event);
    }

    /// Matching events in emission order.
    #[must_use]
    pub fn query(&self, filter: &HistoryFilter) -> Vec<Event> {
        let mut matched: Vec<Event> = self
            .entries
            .iter()
            .filter(|event| filter.matches(event))
            .cloned()
            .collect();
        if let Some(limit) = filter.limit {
            let skip = matched.len().saturating_sub(limit);
            matched.drain(..skip);
        }
        matched
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for EventHistory {
    fn default() -> Self {
        Self::new()
    }
}

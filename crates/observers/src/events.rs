//! Bounded window of accepted events.

use crate::stats::RunningStats;

/// An accepted event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EventRecord {
    /// Time the event fired.
    pub time: f64,

    /// Value of the triggering quantity when the event fired.
    pub value: f64,

    /// Feature-variable amplitude over the cycle the event closes.
    pub amplitude: f64,

    /// Time since the previous accepted event.
    pub interval: f64,
}

/// Ring buffer holding the most recent accepted events.
///
/// Capacity is fixed at construction; once full, each push overwrites the
/// oldest record. The total number of pushes is tracked separately.
#[derive(Debug, Clone)]
pub struct EventRing {
    records: Vec<EventRecord>,
    capacity: usize,
    next: usize,
    total: usize,
}

impl EventRing {
    /// Creates an empty ring holding at most `capacity` records.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: Vec::with_capacity(capacity),
            capacity,
            next: 0,
            total: 0,
        }
    }

    pub fn push(&mut self, record: EventRecord) {
        if self.capacity == 0 {
            return;
        }
        if self.records.len() < self.capacity {
            self.records.push(record);
        } else {
            self.records[self.next] = record;
        }
        self.next = (self.next + 1) % self.capacity;
        self.total += 1;
    }

    /// Number of events accepted since the last clear.
    #[must_use]
    pub fn total(&self) -> usize {
        self.total
    }

    /// Number of events currently retained.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Retained records, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &EventRecord> {
        let (newer, older) = if self.records.len() < self.capacity {
            (&self.records[..], &self.records[..0])
        } else {
            self.records.split_at(self.next)
        };
        older.iter().chain(newer)
    }

    /// Records the window would retain after pushing `pending`, oldest first.
    pub fn iter_with<'a>(
        &'a self,
        pending: Option<&'a EventRecord>,
    ) -> impl Iterator<Item = &'a EventRecord> {
        let pending = pending.filter(|_| self.capacity > 0);
        let evicted = usize::from(pending.is_some() && self.records.len() == self.capacity);
        self.iter().skip(evicted).chain(pending)
    }

    /// Interval statistics over the retained window.
    #[must_use]
    pub fn intervals(&self) -> RunningStats {
        self.iter().map(|r| r.interval).collect()
    }

    /// Amplitude statistics over the retained window.
    #[must_use]
    pub fn amplitudes(&self) -> RunningStats {
        self.iter().map(|r| r.amplitude).collect()
    }

    /// Drops every record, keeping the allocation.
    pub fn clear(&mut self) {
        self.records.clear();
        self.next = 0;
        self.total = 0;
    }
}

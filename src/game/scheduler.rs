//! Virtual-time event queue.
//!
//! Every timer in a session (tick, power-up spawn and expiry, effect expiry)
//! is an entry in one min-heap keyed on session time. Entries with equal fire
//! times come out in the order they were scheduled, so a run is fully
//! determined by the sequence of `advance` calls.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledEvent<E> {
    pub fire_at: Duration,
    seq: u64,
    pub event: E,
}

impl<E: Eq> Ord for ScheduledEvent<E> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed so the max-heap yields the earliest entry first
        other
            .fire_at
            .cmp(&self.fire_at)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl<E: Eq> PartialOrd for ScheduledEvent<E> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Debug, Clone)]
pub struct Scheduler<E> {
    queue: BinaryHeap<ScheduledEvent<E>>,
    next_seq: u64,
}

impl<E: Eq> Scheduler<E> {
    pub fn new() -> Self {
        Self {
            queue: BinaryHeap::new(),
            next_seq: 0,
        }
    }

    pub fn schedule(&mut self, fire_at: Duration, event: E) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push(ScheduledEvent {
            fire_at,
            seq,
            event,
        });
    }

    /// Pop the earliest event if it is due at `now`
    pub fn pop_due(&mut self, now: Duration) -> Option<ScheduledEvent<E>> {
        if self.queue.peek()?.fire_at <= now {
            self.queue.pop()
        } else {
            None
        }
    }

    /// Fire time of the earliest pending event
    pub fn next_deadline(&self) -> Option<Duration> {
        self.queue.peek().map(|entry| entry.fire_at)
    }

    /// Drop pending events matching `predicate`
    pub fn cancel_where<F: Fn(&E) -> bool>(&mut self, predicate: F) {
        self.queue.retain(|entry| !predicate(&entry.event));
    }

    pub fn clear(&mut self) {
        self.queue.clear();
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ScheduledEvent<E>> {
        self.queue.iter()
    }
}

impl<E: Eq> Default for Scheduler<E> {
    fn default() -> Self {
        Self::new()
    }
}

//! Pending-callback queue ordered by scheduled time, FIFO among equal times.

use std::cell::Cell;
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::rc::Rc;

use super::event_loop::{Callback, TimerHandle};
use super::SchedulerError;

/// A callback waiting for its scheduled virtual time.
pub struct TimerEntry {
    /// Scheduled virtual time.
    pub when: f64,
    /// Insertion sequence used to break ties.
    pub seq: u64,
    /// Callback to invoke.
    pub callback: Callback,
    /// Handle shared with the caller for cancellation.
    pub handle: TimerHandle,
}

impl PartialEq for TimerEntry {
    fn eq(&self, other: &Self) -> bool {
        self.seq == other.seq
    }
}

impl Eq for TimerEntry {}

impl PartialOrd for TimerEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TimerEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed on both keys so the max-heap yields the earliest entry,
        // then the first inserted among equal times.
        other
            .when
            .total_cmp(&self.when)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Min-heap of pending callbacks keyed by `(when, seq)`.
///
/// Cancelled entries stay in the heap until they reach the head, where they are
/// discarded; `len` only counts live entries.
pub struct TimerQueue {
    max_depth: usize,
    next_seq: u64,
    live: Rc<Cell<usize>>,
    entries: BinaryHeap<TimerEntry>,
}

impl TimerQueue {
    /// Create a queue holding at most `max_depth` live entries.
    pub fn new(max_depth: usize) -> Self {
        Self {
            max_depth,
            next_seq: 0,
            live: Rc::new(Cell::new(0)),
            entries: BinaryHeap::with_capacity(max_depth.min(1024)),
        }
    }

    /// Insert a callback due at `when` and return its handle.
    pub fn push(&mut self, when: f64, callback: Callback) -> Result<TimerHandle, SchedulerError> {
        self.collect_cancelled();
        if self.len() >= self.max_depth {
            return Err(SchedulerError::QueueFull(format!(
                "max pending depth {} reached",
                self.max_depth
            )));
        }
        let handle = TimerHandle::tracked(when, Rc::clone(&self.live));
        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.push(TimerEntry {
            when,
            seq,
            callback,
            handle: handle.clone(),
        });
        self.live.set(self.live.get() + 1);
        Ok(handle)
    }

    /// Scheduled time of the earliest live entry.
    pub fn peek_when(&mut self) -> Option<f64> {
        self.drop_cancelled_head();
        self.entries.peek().map(|e| e.when)
    }

    /// Remove and return the earliest live entry if it is due at or before `limit`.
    pub fn pop_due(&mut self, limit: f64) -> Option<TimerEntry> {
        match self.peek_when() {
            Some(when) if when <= limit => {
                let entry = self.entries.pop()?;
                entry.handle.mark_fired();
                self.live.set(self.live.get().saturating_sub(1));
                Some(entry)
            }
            _ => None,
        }
    }

    /// Number of live (not cancelled) entries.
    pub fn len(&self) -> usize {
        self.live.get()
    }

    /// Whether no live entry remains.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of live entries.
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    fn drop_cancelled_head(&mut self) {
        while self
            .entries
            .peek()
            .is_some_and(|e| e.handle.cancelled())
        {
            if let Some(entry) = self.entries.pop() {
                tracing::debug!("discarding cancelled callback at {}", entry.when);
            }
        }
    }

    /// Rebuild the heap once cancelled entries dominate it.
    fn collect_cancelled(&mut self) {
        let cancelled = self.entries.len().saturating_sub(self.len());
        if cancelled > 0 && cancelled * 2 > self.entries.len() {
            let entries: Vec<_> = self.entries.drain().collect();
            self.entries = entries
                .into_iter()
                .filter(|e| !e.handle.cancelled())
                .collect();
        }
    }
}

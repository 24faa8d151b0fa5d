//! Virtual timer queue
//!
//! Time only moves when [`TimerQueue::advance`] is called, so every delay
//! in the choreography is driven by the same frame clock.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// A fired timer
#[derive(Debug, Clone, PartialEq)]
pub struct Due<T> {
    /// Scheduled due time (ms), not the clock time it was drained at
    pub due_ms: f64,
    pub payload: T,
}

struct Entry<T> {
    due_ms: f64,
    seq: u64,
    payload: T,
}

impl<T> PartialEq for Entry<T> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<T> Eq for Entry<T> {}

impl<T> PartialOrd for Entry<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Entry<T> {
    // reversed: BinaryHeap is a max-heap, we pop the earliest first
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .due_ms
            .total_cmp(&self.due_ms)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Min-heap of payloads keyed by (due time, scheduling order)
pub struct TimerQueue<T> {
    now_ms: f64,
    next_seq: u64,
    heap: BinaryHeap<Entry<T>>,
}

impl<T> TimerQueue<T> {
    pub fn new() -> Self {
        Self {
            now_ms: 0.0,
            next_seq: 0,
            heap: BinaryHeap::new(),
        }
    }

    /// Current virtual time
    pub fn now_ms(&self) -> f64 {
        self.now_ms
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Schedule at an absolute virtual time. Past times fire on the next advance.
    pub fn schedule_at(&mut self, due_ms: f64, payload: T) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Entry {
            due_ms,
            seq,
            payload,
        });
    }

    /// Schedule relative to the current virtual time
    pub fn schedule_after(&mut self, delay_ms: f64, payload: T) {
        self.schedule_at(self.now_ms + delay_ms.max(0.0), payload);
    }

    /// Due time of the earliest pending timer
    pub fn next_due(&self) -> Option<f64> {
        self.heap.peek().map(|e| e.due_ms)
    }

    /// Move the clock forward without draining
    pub fn step(&mut self, dt_ms: f64) {
        self.now_ms += dt_ms.max(0.0);
    }

    /// Move the clock forward and drain everything now due, earliest first
    pub fn advance(&mut self, dt_ms: f64) -> Vec<Due<T>> {
        self.step(dt_ms);
        let mut fired = Vec::new();
        while let Some(due) = self.pop_due() {
            fired.push(due);
        }
        fired
    }

    /// Pop a single due timer without moving the clock.
    ///
    /// Lets a caller react to each timer (and schedule follow-ups that may
    /// themselves already be due) before draining the next one.
    pub fn pop_due(&mut self) -> Option<Due<T>> {
        if self.heap.peek()?.due_ms > self.now_ms {
            return None;
        }
        self.heap.pop().map(|e| Due {
            due_ms: e.due_ms,
            payload: e.payload,
        })
    }

    /// Drop every pending timer. The clock keeps its value.
    pub fn clear(&mut self) {
        self.heap.clear();
    }
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_in_due_order() {
        let mut timers = TimerQueue::new();
        timers.schedule_at(30.0, "c");
        timers.schedule_at(10.0, "a");
        timers.schedule_at(20.0, "b");

        assert!(timers.advance(5.0).is_empty());
        let fired: Vec<_> = timers.advance(20.0).into_iter().map(|d| d.payload).collect();
        assert_eq!(fired, vec!["a", "b"]);
        assert_eq!(timers.len(), 1);
        assert_eq!(timers.next_due(), Some(30.0));
    }

    #[test]
    fn test_equal_times_keep_scheduling_order() {
        let mut timers = TimerQueue::new();
        for i in 0..10 {
            timers.schedule_at(0.0, i);
        }
        let fired: Vec<_> = timers.advance(0.0).into_iter().map(|d| d.payload).collect();
        assert_eq!(fired, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn test_schedule_after_is_relative() {
        let mut timers = TimerQueue::new();
        timers.advance(100.0);
        timers.schedule_after(50.0, ());
        assert!(timers.advance(49.0).is_empty());
        let fired = timers.advance(1.0);
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].due_ms, 150.0);
        assert_eq!(timers.now_ms(), 150.0);
    }

    #[test]
    fn test_followups_already_due_fire_in_same_step() {
        let mut timers = TimerQueue::new();
        timers.schedule_at(10.0, 1);
        assert_eq!(timers.advance(100.0).len(), 1);
        // already in the past
        timers.schedule_at(20.0, 2);
        assert_eq!(timers.pop_due().map(|d| d.payload), Some(2));
        assert!(timers.pop_due().is_none());
    }

    #[test]
    fn test_clear() {
        let mut timers = TimerQueue::new();
        timers.schedule_at(1.0, ());
        timers.clear();
        assert!(timers.is_empty());
        assert!(timers.advance(10.0).is_empty());
    }
}

//! Cancellable one-shot timers.
//!
//! A [`TimerQueue`] holds deferred actions keyed by deadline. Callers
//! poll it with the current time and get back every action whose
//! deadline has passed, in deadline order. Each scheduled action is
//! identified by a [`TaskId`] that can be used to cancel it before it
//! fires.
//!
//! The queue never spawns threads and never reads the clock itself;
//! the caller owns time. That keeps state machines built on top of it
//! deterministic under test.

use std::time::{Duration, Instant};

/// Handle to one scheduled action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(u64);

struct Entry<T> {
    id: TaskId,
    deadline: Instant,
    action: T,
}

/// Deadline-ordered queue of pending actions.
pub struct TimerQueue<T> {
    entries: Vec<Entry<T>>,
    next_id: u64,
}

impl<T> TimerQueue<T> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 0,
        }
    }

    /// Schedule `action` to fire `delay` after `now`.
    pub fn schedule(&mut self, now: Instant, delay: Duration, action: T) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        self.entries.push(Entry {
            id,
            deadline: now + delay,
            action,
        });
        id
    }

    /// Cancel a pending action. Returns false if it already fired or
    /// was cancelled before.
    pub fn cancel(&mut self, id: TaskId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        self.entries.len() != before
    }

    pub fn is_pending(&self, id: TaskId) -> bool {
        self.entries.iter().any(|e| e.id == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Time until the earliest deadline, or `None` when the queue is
    /// empty. Already-due entries report a zero duration.
    pub fn next_deadline_in(&self, now: Instant) -> Option<Duration> {
        self.entries
            .iter()
            .map(|e| e.deadline)
            .min()
            .map(|deadline| deadline.saturating_duration_since(now))
    }

    /// Remove and return every action due at `now`, earliest first.
    pub fn poll(&mut self, now: Instant) -> Vec<T> {
        let mut due: Vec<Entry<T>> = Vec::new();
        let mut i = 0;
        while i < self.entries.len() {
            if self.entries[i].deadline <= now {
                due.push(self.entries.swap_remove(i));
            } else {
                i += 1;
            }
        }
        due.sort_by_key(|e| e.deadline);
        due.into_iter().map(|e| e.action).collect()
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
    fn nothing_fires_before_its_deadline() {
        let mut q = TimerQueue::new();
        let t0 = Instant::now();
        q.schedule(t0, Duration::from_secs(5), "later");
        assert!(q.poll(t0).is_empty());
        assert!(q.poll(t0 + Duration::from_secs(4)).is_empty());
        assert_eq!(q.poll(t0 + Duration::from_secs(5)), vec!["later"]);
        assert!(q.is_empty());
    }

    #[test]
    fn due_actions_come_back_in_deadline_order() {
        let mut q = TimerQueue::new();
        let t0 = Instant::now();
        q.schedule(t0, Duration::from_secs(3), "third");
        q.schedule(t0, Duration::from_secs(1), "first");
        q.schedule(t0, Duration::from_secs(2), "second");
        q.schedule(t0, Duration::from_secs(9), "not yet");
        assert_eq!(
            q.poll(t0 + Duration::from_secs(3)),
            vec!["first", "second", "third"]
        );
        assert_eq!(q.len(), 1);
    }

    #[test]
    fn cancel_removes_a_pending_task_once() {
        let mut q = TimerQueue::new();
        let t0 = Instant::now();
        let id = q.schedule(t0, Duration::from_secs(1), ());
        assert!(q.is_pending(id));
        assert!(q.cancel(id));
        assert!(!q.is_pending(id));
        assert!(!q.cancel(id));
        assert!(q.poll(t0 + Duration::from_secs(2)).is_empty());
    }

    #[test]
    fn cancel_after_fire_reports_false() {
        let mut q = TimerQueue::new();
        let t0 = Instant::now();
        let id = q.schedule(t0, Duration::from_millis(10), ());
        assert_eq!(q.poll(t0 + Duration::from_millis(10)).len(), 1);
        assert!(!q.cancel(id));
    }

    #[test]
    fn next_deadline_tracks_the_earliest_entry() {
        let mut q: TimerQueue<u8> = TimerQueue::new();
        let t0 = Instant::now();
        assert_eq!(q.next_deadline_in(t0), None);
        q.schedule(t0, Duration::from_secs(7), 1);
        q.schedule(t0, Duration::from_secs(2), 2);
        assert_eq!(q.next_deadline_in(t0), Some(Duration::from_secs(2)));
        assert_eq!(
            q.next_deadline_in(t0 + Duration::from_secs(10)),
            Some(Duration::ZERO)
        );
    }
}

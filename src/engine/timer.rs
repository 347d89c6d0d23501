use std::time::{Duration, Instant};

struct Pending<T> {
    due: Instant,
    seq: u64,
    task: T,
}

/// Deferred continuations, fired by the caller's tick loop.
///
/// Tasks are plain data. Whoever drains them checks at fire time whether the
/// state they target still exists; the queue itself knows nothing about that.
pub struct TimerQueue<T> {
    pending: Vec<Pending<T>>,
    next_seq: u64,
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self {
            pending: Vec::new(),
            next_seq: 0,
        }
    }
}

impl<T> TimerQueue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, now: Instant, delay: Duration, task: T) {
        self.pending.push(Pending {
            due: now + delay,
            seq: self.next_seq,
            task,
        });
        self.next_seq += 1;
    }

    /// Remove and return every task due at `now`, earliest first. Tasks due at
    /// the same instant come out in scheduling order.
    pub fn take_due(&mut self, now: Instant) -> Vec<T> {
        let mut due = Vec::new();
        let mut i = 0;
        while i < self.pending.len() {
            if self.pending[i].due <= now {
                due.push(self.pending.swap_remove(i));
            } else {
                i += 1;
            }
        }
        due.sort_by_key(|p| (p.due, p.seq));
        due.into_iter().map(|p| p.task).collect()
    }

    pub fn next_due(&self) -> Option<Instant> {
        self.pending.iter().map(|p| p.due).min()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nothing_due_before_deadline() {
        let t0 = Instant::now();
        let mut timers = TimerQueue::new();
        timers.schedule(t0, Duration::from_millis(100), 'a');
        assert!(timers.take_due(t0 + Duration::from_millis(99)).is_empty());
        assert_eq!(timers.len(), 1);
        assert_eq!(timers.take_due(t0 + Duration::from_millis(100)), vec!['a']);
        assert!(timers.is_empty());
    }

    #[test]
    fn test_due_order_then_schedule_order() {
        let t0 = Instant::now();
        let mut timers = TimerQueue::new();
        timers.schedule(t0, Duration::from_millis(300), 'c');
        timers.schedule(t0, Duration::from_millis(100), 'a');
        timers.schedule(t0, Duration::from_millis(100), 'b');
        timers.schedule(t0, Duration::from_millis(200), 'x');
        assert_eq!(
            timers.take_due(t0 + Duration::from_secs(1)),
            vec!['a', 'b', 'x', 'c']
        );
    }

    #[test]
    fn test_next_due_and_clear() {
        let t0 = Instant::now();
        let mut timers = TimerQueue::new();
        assert_eq!(timers.next_due(), None);
        timers.schedule(t0, Duration::from_millis(50), 1);
        timers.schedule(t0, Duration::from_millis(10), 2);
        assert_eq!(timers.next_due(), Some(t0 + Duration::from_millis(10)));
        timers.clear();
        assert!(timers.take_due(t0 + Duration::from_secs(1)).is_empty());
    }
}

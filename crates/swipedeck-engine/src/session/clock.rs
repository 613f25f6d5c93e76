use chrono::{DateTime, Duration, Utc};

use swipedeck_core::traits::Scheduler;
use swipedeck_core::types::{TimerHandle, TimerTask};

#[derive(Debug, Clone)]
struct PendingTimer {
    handle: TimerHandle,
    due: DateTime<Utc>,
    task: TimerTask,
}

/// Virtual clock for tests and scripted replay. Time moves only when told.
///
/// Timers due at the same instant fire in scheduling order.
#[derive(Debug, Clone)]
pub struct ManualScheduler {
    now: DateTime<Utc>,
    next_handle: u64,
    pending: Vec<PendingTimer>,
}

impl Default for ManualScheduler {
    fn default() -> Self {
        Self::new(DateTime::<Utc>::default())
    }
}

impl ManualScheduler {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: start,
            next_handle: 0,
            pending: Vec::new(),
        }
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn next_due(&self) -> Option<DateTime<Utc>> {
        self.pending.first().map(|p| p.due)
    }

    /// Pop the earliest timer due at or before `limit`, moving the clock to
    /// its due time. Returns `None` once nothing is due by `limit`.
    pub fn pop_due_until(&mut self, limit: DateTime<Utc>) -> Option<TimerTask> {
        if self.pending.first()?.due > limit {
            return None;
        }
        let timer = self.pending.remove(0);
        if timer.due > self.now {
            self.now = timer.due;
        }
        Some(timer.task)
    }

    /// Move the clock forward. Earlier instants are ignored.
    pub fn set_now(&mut self, at: DateTime<Utc>) {
        if at > self.now {
            self.now = at;
        }
    }
}

impl Scheduler for ManualScheduler {
    fn now(&self) -> DateTime<Utc> {
        self.now
    }

    fn schedule(&mut self, after: Duration, task: TimerTask) -> TimerHandle {
        self.next_handle += 1;
        let handle = TimerHandle(self.next_handle);
        let due = saturating_add(self.now, after.max(Duration::zero()));
        let idx = self.pending.partition_point(|p| p.due <= due);
        self.pending.insert(idx, PendingTimer { handle, due, task });
        handle
    }

    fn cancel(&mut self, handle: TimerHandle) -> bool {
        let before = self.pending.len();
        self.pending.retain(|p| p.handle != handle);
        self.pending.len() != before
    }

    fn take_due(&mut self) -> Vec<TimerTask> {
        let split = self.pending.partition_point(|p| p.due <= self.now);
        self.pending.drain(..split).map(|p| p.task).collect()
    }
}

/// `at + by`, pinned to the last representable instant on overflow.
pub(crate) fn saturating_add(at: DateTime<Utc>, by: Duration) -> DateTime<Utc> {
    at.checked_add_signed(by).unwrap_or(DateTime::<Utc>::MAX_UTC)
}

#[cfg(test)]
mod tests {
    use super::*;
    use swipedeck_core::types::SlotId;

    fn expire(n: u64) -> TimerTask {
        TimerTask::ExpireUndo { slot: SlotId(n) }
    }

    #[test]
    fn fires_in_due_then_schedule_order() {
        let mut s = ManualScheduler::default();
        s.schedule(Duration::milliseconds(300), expire(1));
        s.schedule(Duration::milliseconds(100), expire(2));
        s.schedule(Duration::milliseconds(300), expire(3));

        let limit = s.now() + Duration::milliseconds(1000);
        let mut fired = Vec::new();
        while let Some(task) = s.pop_due_until(limit) {
            fired.push((task, s.now()));
        }
        let start = DateTime::<Utc>::default();
        assert_eq!(
            fired,
            [
                (expire(2), start + Duration::milliseconds(100)),
                (expire(1), start + Duration::milliseconds(300)),
                (expire(3), start + Duration::milliseconds(300)),
            ]
        );
    }

    #[test]
    fn cancelled_timer_never_fires() {
        let mut s = ManualScheduler::default();
        let h = s.schedule(Duration::milliseconds(10), expire(1));
        assert!(s.cancel(h));
        assert!(!s.cancel(h));
        s.set_now(s.now() + Duration::seconds(1));
        assert!(s.take_due().is_empty());
    }

    #[test]
    fn take_due_leaves_future_timers() {
        let mut s = ManualScheduler::default();
        s.schedule(Duration::milliseconds(10), expire(1));
        s.schedule(Duration::milliseconds(50), expire(2));
        s.set_now(s.now() + Duration::milliseconds(20));
        assert_eq!(s.take_due(), [expire(1)]);
        assert_eq!(s.pending(), 1);
    }

    #[test]
    fn clock_never_moves_backwards() {
        let mut s = ManualScheduler::default();
        let later = s.now() + Duration::seconds(5);
        s.set_now(later);
        s.set_now(DateTime::<Utc>::default());
        assert_eq!(s.now(), later);
    }

    #[test]
    fn huge_delay_saturates() {
        let mut s = ManualScheduler::default();
        s.schedule(Duration::MAX, expire(1));
        assert_eq!(s.next_due(), Some(DateTime::<Utc>::MAX_UTC));
    }
}

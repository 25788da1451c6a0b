//! FILENAME: core/selector/src/scheduler.rs
//! PURPOSE: Cancellable deferred tasks on a virtual clock, plus the input throttle.
//! CONTEXT: The selector is single-threaded and event-driven. Work that must
//! happen "a little later" (focus restore, caret placement, opening the
//! dialog, the trailing throttle flush) is queued here as a `DeferredAction`
//! and run by `SelectionSyncEngine::advance_time`. The host drives the clock,
//! which keeps every delay deterministic under test.

use std::time::Duration;

use crate::log_debug;

/// Handle of a scheduled task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeferredAction {
    /// Finish a focus request: claim the grid and focus the input.
    Focus,
    /// Give focus back to the input after a drag ended or the dialog closed.
    RestoreFocus,
    /// Collapse the caret to a character offset.
    PlaceCaret(usize),
    OpenDialog,
    /// Apply the text input held back by the throttle.
    FlushInput,
}

#[derive(Debug, Clone)]
struct ScheduledTask {
    id: TaskId,
    due: Duration,
    action: DeferredAction,
}

#[derive(Debug, Default)]
pub struct Scheduler {
    now: Duration,
    next_id: u64,
    pending: Vec<ScheduledTask>,
}

impl Scheduler {
    pub fn new() -> Self {
        Scheduler::default()
    }

    /// Current virtual time.
    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn schedule(&mut self, delay: Duration, action: DeferredAction) -> TaskId {
        self.next_id += 1;
        let id = TaskId(self.next_id);
        let due = self.now + delay;
        log_debug!("SCHED", "schedule #{} {:?} due={}ms", id.0, action, due.as_millis());
        self.pending.push(ScheduledTask { id, due, action });
        id
    }

    /// Returns true if the task was still pending.
    pub fn cancel(&mut self, id: TaskId) -> bool {
        let before = self.pending.len();
        self.pending.retain(|task| task.id != id);
        let removed = self.pending.len() != before;
        if removed {
            log_debug!("SCHED", "cancel #{}", id.0);
        }
        removed
    }

    /// Cancels every pending task matching `predicate`. Returns how many.
    pub fn cancel_where(&mut self, predicate: impl Fn(&DeferredAction) -> bool) -> usize {
        let before = self.pending.len();
        self.pending.retain(|task| !predicate(&task.action));
        let removed = before - self.pending.len();
        if removed > 0 {
            log_debug!("SCHED", "cancelled {} task(s)", removed);
        }
        removed
    }

    pub fn cancel_all(&mut self) -> usize {
        self.cancel_where(|_| true)
    }

    pub fn is_pending(&self, id: TaskId) -> bool {
        self.pending.iter().any(|task| task.id == id)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Pending actions in the order they will run.
    pub fn pending_actions(&self) -> Vec<DeferredAction> {
        let mut tasks: Vec<&ScheduledTask> = self.pending.iter().collect();
        tasks.sort_by_key(|task| (task.due, task.id));
        tasks.into_iter().map(|task| task.action.clone()).collect()
    }

    /// Removes the earliest task due at or before `until` and moves the clock
    /// to its due time. Ties run in scheduling order.
    pub fn pop_due(&mut self, until: Duration) -> Option<(TaskId, DeferredAction)> {
        let index = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, task)| task.due <= until)
            .min_by_key(|(_, task)| (task.due, task.id))
            .map(|(index, _)| index)?;
        let task = self.pending.remove(index);
        self.now = self.now.max(task.due);
        Some((task.id, task.action))
    }

    /// Moves the clock forward without running anything.
    pub fn set_now(&mut self, now: Duration) {
        self.now = self.now.max(now);
    }
}

// ============================================================================
// THROTTLE
// ============================================================================

/// Leading and trailing rate limiter.
///
/// The first value after a quiet period passes straight through. Values
/// arriving within `interval` of the last one that passed are held; only the
/// newest is kept, and a `FlushInput` task releases it when the interval ends.
#[derive(Debug)]
pub struct Throttle<T> {
    interval: Duration,
    last_emit: Option<Duration>,
    pending: Option<T>,
    flush_task: Option<TaskId>,
}

impl<T> Throttle<T> {
    pub fn new(interval: Duration) -> Self {
        Throttle {
            interval,
            last_emit: None,
            pending: None,
            flush_task: None,
        }
    }

    /// Offers a value. Returns it if it may be applied now.
    pub fn offer(&mut self, value: T, scheduler: &mut Scheduler) -> Option<T> {
        let now = scheduler.now();
        match self.last_emit {
            Some(last) if now < last + self.interval => {
                self.pending = Some(value);
                if self.flush_task.is_none() {
                    let wait = last + self.interval - now;
                    self.flush_task = Some(scheduler.schedule(wait, DeferredAction::FlushInput));
                }
                None
            }
            _ => {
                self.last_emit = Some(now);
                self.pending = None;
                if let Some(id) = self.flush_task.take() {
                    scheduler.cancel(id);
                }
                Some(value)
            }
        }
    }

    /// Releases the held value when its flush task runs.
    pub fn flush(&mut self, now: Duration) -> Option<T> {
        self.flush_task = None;
        let value = self.pending.take()?;
        self.last_emit = Some(now);
        Some(value)
    }

    /// Takes the held value right away, cancelling its flush task.
    pub fn drain(&mut self, scheduler: &mut Scheduler) -> Option<T> {
        if let Some(id) = self.flush_task.take() {
            scheduler.cancel(id);
        }
        let value = self.pending.take()?;
        self.last_emit = Some(scheduler.now());
        Some(value)
    }

    /// Drops the held value and its flush task.
    pub fn cancel(&mut self, scheduler: &mut Scheduler) {
        self.pending = None;
        if let Some(id) = self.flush_task.take() {
            scheduler.cancel(id);
        }
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_pop_due_in_time_then_schedule_order() {
        let mut s = Scheduler::new();
        s.schedule(ms(50), DeferredAction::PlaceCaret(3));
        s.schedule(ms(30), DeferredAction::RestoreFocus);
        s.schedule(ms(30), DeferredAction::OpenDialog);

        assert_eq!(s.pop_due(ms(20)), None);
        assert_eq!(s.pop_due(ms(100)).map(|t| t.1), Some(DeferredAction::RestoreFocus));
        assert_eq!(s.now(), ms(30));
        assert_eq!(s.pop_due(ms(100)).map(|t| t.1), Some(DeferredAction::OpenDialog));
        assert_eq!(s.pop_due(ms(100)).map(|t| t.1), Some(DeferredAction::PlaceCaret(3)));
        assert_eq!(s.now(), ms(50));
        assert_eq!(s.pop_due(ms(100)), None);
    }

    #[test]
    fn test_cancel() {
        let mut s = Scheduler::new();
        let a = s.schedule(ms(10), DeferredAction::Focus);
        let b = s.schedule(ms(10), DeferredAction::RestoreFocus);
        assert!(s.cancel(a));
        assert!(!s.cancel(a));
        assert!(!s.is_pending(a));
        assert!(s.is_pending(b));
        assert_eq!(s.pending_actions(), vec![DeferredAction::RestoreFocus]);
    }

    #[test]
    fn test_cancel_where_and_all() {
        let mut s = Scheduler::new();
        s.schedule(ms(10), DeferredAction::Focus);
        s.schedule(ms(10), DeferredAction::PlaceCaret(1));
        s.schedule(ms(10), DeferredAction::PlaceCaret(2));
        assert_eq!(s.cancel_where(|a| matches!(a, DeferredAction::PlaceCaret(_))), 2);
        assert_eq!(s.pending_count(), 1);
        assert_eq!(s.cancel_all(), 1);
        assert_eq!(s.pending_count(), 0);
    }

    #[test]
    fn test_clock_never_moves_back() {
        let mut s = Scheduler::new();
        s.set_now(ms(100));
        s.set_now(ms(40));
        assert_eq!(s.now(), ms(100));
    }

    #[test]
    fn test_throttle_leading_value_passes() {
        let mut s = Scheduler::new();
        let mut t = Throttle::new(ms(100));
        assert_eq!(t.offer("a", &mut s), Some("a"));
        assert_eq!(s.pending_count(), 0);
    }

    #[test]
    fn test_throttle_coalesces_to_latest() {
        let mut s = Scheduler::new();
        let mut t = Throttle::new(ms(100));
        assert_eq!(t.offer("a", &mut s), Some("a"));

        s.set_now(ms(20));
        assert_eq!(t.offer("ab", &mut s), None);
        s.set_now(ms(40));
        assert_eq!(t.offer("abc", &mut s), None);
        assert_eq!(s.pending_count(), 1);

        let (_, action) = s.pop_due(ms(1000)).unwrap();
        assert_eq!(action, DeferredAction::FlushInput);
        assert_eq!(s.now(), ms(100));
        assert_eq!(t.flush(s.now()), Some("abc"));
        assert!(!t.has_pending());

        // A new interval starts at the flush
        s.set_now(ms(150));
        assert_eq!(t.offer("abcd", &mut s), None);
        s.set_now(ms(200));
        assert_eq!(t.offer("abcde", &mut s), Some("abcde"));
    }

    #[test]
    fn test_throttle_drain_takes_held_value() {
        let mut s = Scheduler::new();
        let mut t = Throttle::new(ms(100));
        t.offer("a", &mut s);
        s.set_now(ms(10));
        t.offer("ab", &mut s);
        assert_eq!(t.drain(&mut s), Some("ab"));
        assert_eq!(s.pending_count(), 0);
        assert_eq!(t.drain(&mut s), None);
    }

    #[test]
    fn test_throttle_cancel_drops_flush() {
        let mut s = Scheduler::new();
        let mut t = Throttle::new(ms(100));
        t.offer(1, &mut s);
        s.set_now(ms(10));
        t.offer(2, &mut s);
        t.cancel(&mut s);
        assert_eq!(s.pending_count(), 0);
        assert_eq!(t.flush(s.now()), None);
    }
}

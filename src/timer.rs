//! Timer Module - Cancellable one-shot timers on a cooperative clock
//!
//! Every animation in this crate is driven by one-shot callbacks scheduled
//! on a [`Scheduler`]. The scheduler never sleeps on its own: the owner moves
//! its clock forward with [`Scheduler::advance_to`] and all due callbacks run
//! in deadline order on the calling thread.
//!
//! # Pattern
//!
//! - Tests drive virtual time directly (`advance(Duration::from_millis(80))`)
//! - A real-time loop calls `advance_to(start.elapsed())` and sleeps until
//!   `next_deadline()`
//! - Late delivery only delays callbacks, it never reorders them
//!
//! # Example
//!
//! ```
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use std::time::Duration;
//! use spark_typewriter::Scheduler;
//!
//! let scheduler = Scheduler::new();
//! let fired = Rc::new(Cell::new(false));
//! let flag = fired.clone();
//! scheduler.schedule(Duration::from_millis(10), move || flag.set(true));
//!
//! scheduler.advance(Duration::from_millis(9));
//! assert!(!fired.get());
//! scheduler.advance(Duration::from_millis(1));
//! assert!(fired.get());
//! ```

use std::cell::RefCell;
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};
use std::rc::Rc;
use std::time::Duration;

/// Handle to a scheduled timer, used for cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

type Callback = Box<dyn FnOnce()>;

#[derive(Default)]
struct SchedulerInner {
    now: Duration,
    next_id: u64,
    /// Min-heap of (deadline, id). Ids grow monotonically, so equal deadlines
    /// fire in the order they were scheduled.
    queue: BinaryHeap<Reverse<(Duration, TimerId)>>,
    /// Live callbacks. Cancelled timers are removed here and their heap
    /// entries are skipped when popped.
    callbacks: HashMap<TimerId, Callback>,
}

/// Heap entries allowed beyond the live callbacks before cancelled entries
/// are swept out.
const PRUNE_SLACK: usize = 64;

impl SchedulerInner {
    /// Drop heap entries of cancelled timers once they dominate the queue.
    fn prune(&mut self) {
        if self.queue.len() <= self.callbacks.len() * 2 + PRUNE_SLACK {
            return;
        }
        let callbacks = &self.callbacks;
        self.queue.retain(|Reverse((_, id))| callbacks.contains_key(id));
    }

    #[cfg(test)]
    fn queued(&self) -> usize {
        self.queue.len()
    }
}

/// Single-threaded timer source.
///
/// Cloning is cheap; all clones share the same clock and queue.
#[derive(Clone, Default)]
pub struct Scheduler {
    inner: Rc<RefCell<SchedulerInner>>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time.
    pub fn now(&self) -> Duration {
        self.inner.borrow().now
    }

    /// Schedule `callback` to run once, `delay` after the current time.
    pub fn schedule<F>(&self, delay: Duration, callback: F) -> TimerId
    where
        F: FnOnce() + 'static,
    {
        let mut inner = self.inner.borrow_mut();
        let id = TimerId(inner.next_id);
        inner.next_id += 1;
        let deadline = inner.now.saturating_add(delay);
        inner.queue.push(Reverse((deadline, id)));
        inner.callbacks.insert(id, Box::new(callback));
        id
    }

    /// Cancel a pending timer.
    ///
    /// Returns `true` if the timer was still pending. Cancelling a timer that
    /// already fired (or was already cancelled) is a no-op.
    pub fn cancel(&self, id: TimerId) -> bool {
        let mut inner = self.inner.borrow_mut();
        let removed = inner.callbacks.remove(&id).is_some();
        if removed {
            inner.prune();
        }
        removed
    }

    /// Whether `id` is still waiting to fire.
    pub fn is_pending(&self, id: TimerId) -> bool {
        self.inner.borrow().callbacks.contains_key(&id)
    }

    /// Number of timers waiting to fire.
    pub fn pending(&self) -> usize {
        self.inner.borrow().callbacks.len()
    }

    /// Deadline of the earliest live timer, if any.
    pub fn next_deadline(&self) -> Option<Duration> {
        let mut inner = self.inner.borrow_mut();
        while let Some(Reverse((deadline, id))) = inner.queue.peek().copied() {
            if inner.callbacks.contains_key(&id) {
                return Some(deadline);
            }
            inner.queue.pop();
        }
        None
    }

    /// Advance the clock by `by` and run everything that became due.
    pub fn advance(&self, by: Duration) -> usize {
        let target = self.now().saturating_add(by);
        self.advance_to(target)
    }

    /// Advance the clock to `target` and run every timer due at or before it.
    ///
    /// Timers scheduled by callbacks during the advance run in the same call
    /// if their deadline is also `<= target`. Targets in the past are
    /// clamped: time never moves backwards. Returns the number of callbacks
    /// that ran.
    pub fn advance_to(&self, target: Duration) -> usize {
        let mut fired = 0;
        loop {
            // The borrow must end before the callback runs so it can
            // schedule or cancel.
            let callback = {
                let mut inner = self.inner.borrow_mut();
                let Some(Reverse((deadline, id))) = inner.queue.peek().copied() else {
                    break;
                };
                if deadline > target {
                    break;
                }
                inner.queue.pop();
                let Some(callback) = inner.callbacks.remove(&id) else {
                    continue;
                };
                if deadline > inner.now {
                    inner.now = deadline;
                }
                callback
            };
            callback();
            fired += 1;
        }

        let mut inner = self.inner.borrow_mut();
        if target > inner.now {
            inner.now = target;
        }
        fired
    }

    /// Run timers until the queue is empty or `limit` callbacks have run.
    ///
    /// Useful for draining finite work in tests; animation loops never empty
    /// the queue, so the limit is mandatory.
    pub fn run_until_idle(&self, limit: usize) -> usize {
        let mut fired = 0;
        while fired < limit {
            let Some(deadline) = self.next_deadline() else {
                break;
            };
            fired += self.advance_to_single(deadline);
        }
        fired
    }

    /// Run exactly the earliest due timer at `deadline`.
    fn advance_to_single(&self, deadline: Duration) -> usize {
        let callback = {
            let mut inner = self.inner.borrow_mut();
            let Some(Reverse((_, id))) = inner.queue.pop() else {
                return 0;
            };
            let Some(callback) = inner.callbacks.remove(&id) else {
                return 0;
            };
            if deadline > inner.now {
                inner.now = deadline;
            }
            callback
        };
        callback();
        1
    }
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Scheduler")
            .field("now", &inner.now)
            .field("pending", &inner.callbacks.len())
            .finish()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_fires_at_deadline() {
        let scheduler = Scheduler::new();
        let fired = Rc::new(Cell::new(0));
        let count = fired.clone();
        scheduler.schedule(ms(100), move || count.set(count.get() + 1));

        assert_eq!(scheduler.advance(ms(99)), 0);
        assert_eq!(fired.get(), 0);
        assert_eq!(scheduler.advance(ms(1)), 1);
        assert_eq!(fired.get(), 1);
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn test_fires_in_deadline_then_schedule_order() {
        let scheduler = Scheduler::new();
        let order = Rc::new(RefCell::new(Vec::new()));

        for (label, delay) in [("c", 30), ("a", 10), ("b1", 20), ("b2", 20)] {
            let order = order.clone();
            scheduler.schedule(ms(delay), move || order.borrow_mut().push(label));
        }

        scheduler.advance(ms(1000));
        assert_eq!(*order.borrow(), vec!["a", "b1", "b2", "c"]);
    }

    #[test]
    fn test_cancel_prevents_firing() {
        let scheduler = Scheduler::new();
        let fired = Rc::new(Cell::new(false));
        let flag = fired.clone();
        let id = scheduler.schedule(ms(10), move || flag.set(true));

        assert!(scheduler.is_pending(id));
        assert!(scheduler.cancel(id));
        assert!(!scheduler.cancel(id));
        assert!(!scheduler.is_pending(id));

        scheduler.advance(ms(100));
        assert!(!fired.get());
        assert_eq!(scheduler.next_deadline(), None);
    }

    #[test]
    fn test_callback_can_reschedule() {
        let scheduler = Scheduler::new();
        let count = Rc::new(Cell::new(0));

        fn tick(scheduler: Scheduler, count: Rc<Cell<u32>>) {
            count.set(count.get() + 1);
            let next = scheduler.clone();
            scheduler.schedule(Duration::from_millis(10), move || tick(next, count));
        }

        let s = scheduler.clone();
        let c = count.clone();
        scheduler.schedule(ms(10), move || tick(s, c));

        // Late delivery: one big advance still runs every tick in order.
        scheduler.advance(ms(55));
        assert_eq!(count.get(), 5);
        assert_eq!(scheduler.next_deadline(), Some(ms(60)));
    }

    #[test]
    fn test_callback_can_cancel_other_timer() {
        let scheduler = Scheduler::new();
        let fired = Rc::new(Cell::new(false));
        let flag = fired.clone();
        let victim = scheduler.schedule(ms(20), move || flag.set(true));

        let s = scheduler.clone();
        scheduler.schedule(ms(10), move || {
            s.cancel(victim);
        });

        scheduler.advance(ms(50));
        assert!(!fired.get());
    }

    #[test]
    fn test_time_never_moves_backwards() {
        let scheduler = Scheduler::new();
        scheduler.advance_to(ms(500));
        scheduler.advance_to(ms(100));
        assert_eq!(scheduler.now(), ms(500));
    }

    #[test]
    fn test_huge_advance_saturates() {
        let scheduler = Scheduler::new();
        let fired = Rc::new(Cell::new(false));
        let flag = fired.clone();
        scheduler.schedule(ms(10), move || flag.set(true));

        scheduler.advance(ms(1));
        scheduler.advance(Duration::MAX);
        assert!(fired.get());
        assert_eq!(scheduler.now(), Duration::MAX);

        // Scheduling at the end of time must not overflow either.
        let id = scheduler.schedule(ms(5), || {});
        assert!(scheduler.is_pending(id));
        assert_eq!(scheduler.next_deadline(), Some(Duration::MAX));
    }

    #[test]
    fn test_cancelled_entries_are_pruned() {
        let scheduler = Scheduler::new();
        let keep = scheduler.schedule(ms(10), || {});
        for _ in 0..1000 {
            let id = scheduler.schedule(Duration::from_secs(3600), || {});
            scheduler.cancel(id);
        }

        let queued = scheduler.inner.borrow().queued();
        assert!(queued <= 2 + PRUNE_SLACK, "queue grew to {queued}");
        assert!(scheduler.is_pending(keep));
        assert_eq!(scheduler.next_deadline(), Some(ms(10)));
    }

    #[test]
    fn test_run_until_idle_respects_limit() {
        let scheduler = Scheduler::new();
        for delay in [5, 10, 15] {
            scheduler.schedule(ms(delay), || {});
        }

        assert_eq!(scheduler.run_until_idle(2), 2);
        assert_eq!(scheduler.now(), ms(10));
        assert_eq!(scheduler.run_until_idle(10), 1);
        assert_eq!(scheduler.pending(), 0);
    }
}

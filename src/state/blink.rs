//! Cursor Blink - Periodic visibility toggle
//!
//! Each blink owns one repeating timer on a [`Scheduler`]. The phase starts
//! visible and flips every `interval`. It is fully decoupled from whatever
//! the cursor is attached to.
//!
//! An interval of zero disables blinking: no timer is scheduled and the
//! cursor stays visible.

use std::cell::Cell;
use std::rc::{Rc, Weak};
use std::time::Duration;

use spark_signals::{signal, Signal};
use tracing::trace;

use crate::timer::{Scheduler, TimerId};

/// Default cursor blink toggle interval.
pub const DEFAULT_BLINK_INTERVAL: Duration = Duration::from_millis(530);

struct BlinkCore {
    scheduler: Scheduler,
    interval: Duration,
    /// Phase signal: true = visible
    phase: Signal<bool>,
    pending: Cell<Option<TimerId>>,
}

/// A blinking cursor phase.
pub struct CursorBlink {
    core: Rc<BlinkCore>,
}

impl CursorBlink {
    /// Start blinking on `scheduler`, toggling every `interval`.
    pub fn start(scheduler: &Scheduler, interval: Duration) -> Self {
        let core = Rc::new(BlinkCore {
            scheduler: scheduler.clone(),
            interval,
            phase: signal(true), // Start visible
            pending: Cell::new(None),
        });

        if !interval.is_zero() {
            schedule_toggle(&core);
        }
        Self { core }
    }

    /// Current phase: true = visible, false = hidden.
    pub fn visible(&self) -> bool {
        self.core.phase.get()
    }

    pub fn visible_signal(&self) -> Signal<bool> {
        self.core.phase.clone()
    }

    pub fn interval(&self) -> Duration {
        self.core.interval
    }

    /// Whether the blink timer is active.
    pub fn is_running(&self) -> bool {
        self.core.pending.get().is_some()
    }

    /// Stop blinking and reset to visible. Equivalent to dropping.
    pub fn stop(self) {}
}

impl Drop for CursorBlink {
    fn drop(&mut self) {
        if let Some(id) = self.core.pending.take() {
            self.core.scheduler.cancel(id);
        }
        self.core.phase.set(true); // Reset to visible
    }
}

fn schedule_toggle(core: &Rc<BlinkCore>) {
    let weak: Weak<BlinkCore> = Rc::downgrade(core);
    let id = core.scheduler.schedule(core.interval, move || {
        let Some(core) = weak.upgrade() else {
            return;
        };
        let next = !core.phase.get();
        trace!(visible = next, "cursor blink");
        core.phase.set(next);
        schedule_toggle(&core);
    });
    core.pending.set(Some(id));
}

// =============================================================================
// TESTS
// =============================================================================

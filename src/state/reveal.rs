//! Viewport Reveal - One-shot "has been seen" tracking
//!
//! A [`RevealTracker`] listens to intersection notifications for one target
//! element. The first time the target's visible fraction reaches the
//! threshold it flips `has_been_seen` to true and unsubscribes. The flag never
//! goes back to false.
//!
//! # Example
//!
//! ```
//! use spark_typewriter::{ElementId, EventSource, IntersectionEntry, RevealTracker};
//!
//! let viewport = EventSource::<IntersectionEntry>::new();
//! let about = ElementId::new(1);
//! let tracker = RevealTracker::observe(&viewport, Some(about), 0.1).unwrap();
//!
//! viewport.emit(&IntersectionEntry::new(about, 0.5));
//! assert!(tracker.has_been_seen());
//! assert!(!tracker.is_observing());
//! ```

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use spark_signals::{signal, Signal};
use tracing::debug;

use crate::error::ConfigError;
use crate::events::{EventSource, Subscription};

/// Default visible fraction needed to count as "entered".
pub const DEFAULT_REVEAL_THRESHOLD: f32 = 0.1;

/// Opaque handle to an observable element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementId(u64);

impl ElementId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// "This element's visible fraction is now `ratio`."
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntersectionEntry {
    pub target: ElementId,
    /// Visible fraction of the element's area, 0.0 to 1.0.
    pub ratio: f32,
}

impl IntersectionEntry {
    pub fn new(target: ElementId, ratio: f32) -> Self {
        Self { target, ratio }
    }

    /// Whether this entry counts as the element entering the viewport.
    ///
    /// The element must actually intersect (`ratio > 0`) and reach the
    /// threshold. NaN ratios never count.
    pub fn crosses(&self, threshold: f32) -> bool {
        self.ratio > 0.0 && self.ratio >= threshold
    }
}

struct RevealCore {
    threshold: f32,
    seen: Signal<bool>,
    subscription: RefCell<Option<Subscription>>,
}

impl RevealCore {
    fn mark_seen(&self) {
        if !self.seen.get() {
            debug!(threshold = self.threshold, "element revealed");
            self.seen.set(true);
        }
        // Take first, drop after the borrow ends.
        let subscription = self.subscription.borrow_mut().take();
        drop(subscription);
    }
}

/// One-shot viewport reveal flag for a single element.
pub struct RevealTracker {
    core: Rc<RevealCore>,
}

impl RevealTracker {
    /// Start observing `target` on `viewport`.
    ///
    /// A missing target is not an error: the tracker simply never fires.
    pub fn observe(
        viewport: &EventSource<IntersectionEntry>,
        target: Option<ElementId>,
        threshold: f32,
    ) -> Result<Self, ConfigError> {
        if !threshold.is_finite() || !(0.0..=1.0).contains(&threshold) {
            return Err(ConfigError::InvalidThreshold(threshold));
        }

        let core = Rc::new(RevealCore {
            threshold,
            seen: signal(false),
            subscription: RefCell::new(None),
        });

        if let Some(target) = target {
            let weak: Weak<RevealCore> = Rc::downgrade(&core);
            let subscription = viewport.subscribe(move |entry: &IntersectionEntry| {
                if entry.target != target || !entry.crosses(threshold) {
                    return;
                }
                if let Some(core) = weak.upgrade() {
                    core.mark_seen();
                }
            });
            *core.subscription.borrow_mut() = Some(subscription);
        }

        Ok(Self { core })
    }

    /// Observe with [`DEFAULT_REVEAL_THRESHOLD`].
    pub fn observe_default(
        viewport: &EventSource<IntersectionEntry>,
        target: Option<ElementId>,
    ) -> Result<Self, ConfigError> {
        Self::observe(viewport, target, DEFAULT_REVEAL_THRESHOLD)
    }

    pub fn has_been_seen(&self) -> bool {
        self.core.seen.get()
    }

    pub fn seen_signal(&self) -> Signal<bool> {
        self.core.seen.clone()
    }

    pub fn threshold(&self) -> f32 {
        self.core.threshold
    }

    /// Whether the tracker is still listening for intersections.
    pub fn is_observing(&self) -> bool {
        self.core.subscription.borrow().is_some()
    }

    /// Mark the element seen and stop observing. Idempotent.
    pub fn mark_seen(&self) {
        self.core.mark_seen();
    }
}

impl Drop for RevealTracker {
    fn drop(&mut self) {
        let subscription = self.core.subscription.borrow_mut().take();
        drop(subscription);
    }
}

// =============================================================================
// TESTS
// =============================================================================

//! Section Tracker - Scroll-linked navigation state
//!
//! Derives three values from the page scroll position:
//! - the active section (for nav highlighting)
//! - whether the page has scrolled past the header threshold
//! - overall scroll progress as a percentage
//!
//! The active section is the last one whose top, minus an activation offset,
//! has been scrolled past. When none qualifies the previous section stays
//! active.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use spark_signals::{signal, Signal};
use tracing::debug;

use crate::error::ConfigError;
use crate::events::{EventSource, Subscription};

/// Default distance above a section's top at which it becomes active.
pub const DEFAULT_ACTIVATION_OFFSET: f32 = 200.0;

/// Default scroll distance after which the page counts as scrolled.
pub const DEFAULT_SCROLLED_THRESHOLD: f32 = 50.0;

/// Page scroll snapshot delivered on every scroll event.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollMetrics {
    pub scroll_y: f32,
    pub document_height: f32,
    pub viewport_height: f32,
}

impl ScrollMetrics {
    pub fn new(scroll_y: f32, document_height: f32, viewport_height: f32) -> Self {
        Self {
            scroll_y,
            document_height,
            viewport_height,
        }
    }

    /// Scroll progress in percent, clamped to `0.0..=100.0`.
    ///
    /// Pages that cannot scroll, and non-finite scroll positions, report
    /// zero.
    pub fn progress(&self) -> f32 {
        let scrollable = self.document_height - self.viewport_height;
        if scrollable <= 0.0 || !scrollable.is_finite() {
            return 0.0;
        }
        let progress = self.scroll_y / scrollable * 100.0;
        if !progress.is_finite() {
            return 0.0;
        }
        progress.clamp(0.0, 100.0)
    }
}

/// A navigable section and its vertical position on the page.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub id: String,
    pub offset_top: f32,
}

impl Section {
    pub fn new(id: impl Into<String>, offset_top: f32) -> Self {
        Self {
            id: id.into(),
            offset_top,
        }
    }
}

/// Tuning for a [`SectionTracker`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SectionTrackerConfig {
    pub activation_offset: f32,
    pub scrolled_threshold: f32,
}

impl SectionTrackerConfig {
    /// Both distances must be finite; a NaN offset would never match.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("activation_offset", self.activation_offset),
            ("scrolled_threshold", self.scrolled_threshold),
        ] {
            if !value.is_finite() {
                return Err(ConfigError::NonFinite { field, value });
            }
        }
        Ok(())
    }
}

impl Default for SectionTrackerConfig {
    fn default() -> Self {
        Self {
            activation_offset: DEFAULT_ACTIVATION_OFFSET,
            scrolled_threshold: DEFAULT_SCROLLED_THRESHOLD,
        }
    }
}

struct SectionCore {
    sections: RefCell<Vec<Section>>,
    config: SectionTrackerConfig,
    active: Signal<String>,
    scrolled: Signal<bool>,
    progress: Signal<f32>,
}

impl SectionCore {
    fn apply(&self, metrics: &ScrollMetrics) {
        let scrolled = metrics.scroll_y > self.config.scrolled_threshold;
        if self.scrolled.get() != scrolled {
            self.scrolled.set(scrolled);
        }
        self.progress.set(metrics.progress());

        let found = active_section(
            &self.sections.borrow(),
            metrics.scroll_y,
            self.config.activation_offset,
        )
        .map(str::to_owned);

        if let Some(id) = found {
            if self.active.get() != id {
                debug!(section = %id, "active section changed");
                self.active.set(id);
            }
        }
    }
}

/// Last section (in page order) whose activation line has been scrolled past.
pub fn active_section(sections: &[Section], scroll_y: f32, activation_offset: f32) -> Option<&str> {
    sections
        .iter()
        .rev()
        .find(|section| scroll_y >= section.offset_top - activation_offset)
        .map(|section| section.id.as_str())
}

/// Scroll-driven navigation state, subscribed to a scroll event source.
pub struct SectionTracker {
    core: Rc<SectionCore>,
    subscription: Subscription,
}

impl SectionTracker {
    /// Subscribe to `scroll`. The first section starts active.
    pub fn attach(
        scroll: &EventSource<ScrollMetrics>,
        sections: Vec<Section>,
        config: SectionTrackerConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let Some(first) = sections.first() else {
            return Err(ConfigError::EmptySectionList);
        };

        let core = Rc::new(SectionCore {
            active: signal(first.id.clone()),
            scrolled: signal(false),
            progress: signal(0.0),
            sections: RefCell::new(sections),
            config,
        });

        let weak: Weak<SectionCore> = Rc::downgrade(&core);
        let subscription = scroll.subscribe(move |metrics: &ScrollMetrics| {
            if let Some(core) = weak.upgrade() {
                core.apply(metrics);
            }
        });

        Ok(Self { core, subscription })
    }

    /// Id of the highlighted section.
    pub fn active(&self) -> String {
        self.core.active.get()
    }

    pub fn is_scrolled(&self) -> bool {
        self.core.scrolled.get()
    }

    /// Scroll progress in percent.
    pub fn progress(&self) -> f32 {
        self.core.progress.get()
    }

    pub fn active_signal(&self) -> Signal<String> {
        self.core.active.clone()
    }

    pub fn scrolled_signal(&self) -> Signal<bool> {
        self.core.scrolled.clone()
    }

    pub fn progress_signal(&self) -> Signal<f32> {
        self.core.progress.clone()
    }

    /// Update a section's position after relayout.
    ///
    /// Returns `false` if no section has that id.
    pub fn set_offset(&self, id: &str, offset_top: f32) -> bool {
        let mut sections = self.core.sections.borrow_mut();
        match sections.iter_mut().find(|section| section.id == id) {
            Some(section) => {
                section.offset_top = offset_top;
                true
            }
            None => false,
        }
    }

    /// Feed a scroll snapshot directly, bypassing the event source.
    pub fn update(&self, metrics: &ScrollMetrics) {
        self.core.apply(metrics);
    }

    /// Whether the tracker is still subscribed.
    pub fn is_attached(&self) -> bool {
        self.subscription.is_active()
    }

    /// Unsubscribe from scroll events. Equivalent to dropping.
    pub fn detach(mut self) {
        self.subscription.cancel();
    }
}

// =============================================================================
// TESTS
// =============================================================================

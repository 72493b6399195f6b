//! Disclosure - Accordion and popup menu open/closed state
//!
//! - [`Accordion`]: at most one item expanded; toggling the expanded item
//!   collapses it, toggling another item moves expansion there
//! - [`MenuToggle`]: a popup (nav menu, search form) opened and closed by a
//!   trigger element, which also closes on any click outside both the trigger
//!   and the popup panel
//!
//! The menu listens to a click [`EventSource`] through a single subscription
//! held for its whole lifetime and released on drop.

use std::rc::{Rc, Weak};

use spark_signals::{signal, Signal};
use tracing::debug;

use crate::events::{EventSource, Subscription};
use crate::state::reveal::ElementId;

// =============================================================================
// ACCORDION
// =============================================================================

/// Single-open accordion over string item ids.
pub struct Accordion {
    expanded: Signal<Option<String>>,
}

impl Accordion {
    /// All items collapsed.
    pub fn new() -> Self {
        Self {
            expanded: signal(None),
        }
    }

    /// Expand `id`, or collapse it if it is already the expanded item.
    pub fn toggle(&self, id: &str) {
        let next = match self.expanded.get() {
            Some(current) if current == id => None,
            _ => Some(id.to_string()),
        };
        self.expanded.set(next);
    }

    /// Id of the expanded item, if any.
    pub fn expanded(&self) -> Option<String> {
        self.expanded.get()
    }

    pub fn is_expanded(&self, id: &str) -> bool {
        self.expanded.get().is_some_and(|current| current == id)
    }

    pub fn collapse(&self) {
        if self.expanded.get().is_some() {
            self.expanded.set(None);
        }
    }

    pub fn expanded_signal(&self) -> Signal<Option<String>> {
        self.expanded.clone()
    }
}

impl Default for Accordion {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// MENU TOGGLE
// =============================================================================

/// A click, with the elements it passed through from innermost outwards.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ClickEvent {
    pub path: Vec<ElementId>,
}

impl ClickEvent {
    pub fn new(path: impl Into<Vec<ElementId>>) -> Self {
        Self { path: path.into() }
    }

    /// Whether the click landed on `element` or one of its descendants.
    pub fn hits(&self, element: ElementId) -> bool {
        self.path.contains(&element)
    }
}

struct MenuCore {
    trigger: ElementId,
    panel: ElementId,
    open: Signal<bool>,
}

impl MenuCore {
    fn set_open(&self, open: bool) {
        if self.open.get() != open {
            debug!(panel = self.panel.raw(), open, "menu toggled");
            self.open.set(open);
        }
    }

    fn on_click(&self, click: &ClickEvent) {
        if click.hits(self.trigger) {
            self.set_open(!self.open.get());
        } else if !click.hits(self.panel) {
            self.set_open(false);
        }
    }
}

/// Open/closed state of a popup with outside-click dismissal.
pub struct MenuToggle {
    core: Rc<MenuCore>,
    subscription: Subscription,
}

impl MenuToggle {
    /// Start closed, listening to `clicks`.
    ///
    /// A click on `trigger` toggles the menu, a click inside `panel` leaves
    /// it alone, and any other click closes it.
    pub fn attach(clicks: &EventSource<ClickEvent>, trigger: ElementId, panel: ElementId) -> Self {
        let core = Rc::new(MenuCore {
            trigger,
            panel,
            open: signal(false),
        });

        let weak: Weak<MenuCore> = Rc::downgrade(&core);
        let subscription = clicks.subscribe(move |click: &ClickEvent| {
            if let Some(core) = weak.upgrade() {
                core.on_click(click);
            }
        });

        Self { core, subscription }
    }

    pub fn is_open(&self) -> bool {
        self.core.open.get()
    }

    pub fn toggle(&self) {
        self.core.set_open(!self.core.open.get());
    }

    pub fn open(&self) {
        self.core.set_open(true);
    }

    /// Close the menu, e.g. after a menu item was chosen.
    pub fn close(&self) {
        self.core.set_open(false);
    }

    pub fn open_signal(&self) -> Signal<bool> {
        self.core.open.clone()
    }

    /// Whether the menu still listens for clicks.
    pub fn is_attached(&self) -> bool {
        self.subscription.is_active()
    }

    /// Stop listening for clicks. Equivalent to dropping.
    pub fn detach(mut self) {
        self.subscription.cancel();
    }
}

// =============================================================================
// TESTS
// =============================================================================

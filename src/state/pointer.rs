//! Pointer Follower - Decorative dot that trails the pointer
//!
//! Tracks the last pointer position and whether the pointer is over an
//! interactive element. The follower grows while hovering.

use std::rc::{Rc, Weak};

use spark_signals::{signal, Signal};

use crate::events::{EventSource, Subscription};

/// Half the follower's size; the dot is centred on the pointer.
pub const FOLLOWER_HALF_SIZE: f32 = 4.0;

/// Scale applied while hovering an interactive element.
pub const HOVER_SCALE: f32 = 3.0;

/// Pointer moved or crossed into a new element.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PointerEvent {
    pub x: f32,
    pub y: f32,
    /// Whether the element under the pointer (or an ancestor) is a link,
    /// button or otherwise marked interactive.
    pub over_interactive: bool,
}

struct PointerCore {
    position: Signal<(f32, f32)>,
    hovering: Signal<bool>,
}

/// Pointer position and hover state.
pub struct PointerFollower {
    core: Rc<PointerCore>,
    _subscription: Subscription,
}

impl PointerFollower {
    pub fn attach(pointer: &EventSource<PointerEvent>) -> Self {
        let core = Rc::new(PointerCore {
            position: signal((0.0, 0.0)),
            hovering: signal(false),
        });

        let weak: Weak<PointerCore> = Rc::downgrade(&core);
        let subscription = pointer.subscribe(move |event: &PointerEvent| {
            let Some(core) = weak.upgrade() else {
                return;
            };
            core.position.set((event.x, event.y));
            if core.hovering.get() != event.over_interactive {
                core.hovering.set(event.over_interactive);
            }
        });

        Self {
            core,
            _subscription: subscription,
        }
    }

    /// Last pointer position.
    pub fn position(&self) -> (f32, f32) {
        self.core.position.get()
    }

    pub fn is_hovering(&self) -> bool {
        self.core.hovering.get()
    }

    /// Top-left corner of the follower dot.
    pub fn origin(&self) -> (f32, f32) {
        let (x, y) = self.position();
        (x - FOLLOWER_HALF_SIZE, y - FOLLOWER_HALF_SIZE)
    }

    pub fn scale(&self) -> f32 {
        if self.is_hovering() { HOVER_SCALE } else { 1.0 }
    }

    pub fn hovering_signal(&self) -> Signal<bool> {
        self.core.hovering.clone()
    }
}

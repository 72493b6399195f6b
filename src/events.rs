//! Event sources with explicit subscribe/unsubscribe pairs.
//!
//! Scroll positions, pointer moves and intersection notifications all reach
//! the state systems through an [`EventSource`]. Subscribing returns a
//! [`Subscription`] guard: dropping it (or calling [`Subscription::cancel`])
//! removes the listener, so teardown can never leave a dangling handler.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};

type Listener<E> = Box<dyn FnMut(&E)>;

struct SourceInner<E> {
    next_id: u64,
    /// `None` while the listener is being called by `emit`.
    listeners: BTreeMap<u64, Option<Listener<E>>>,
}

/// Broadcasts events of type `E` to subscribed listeners.
///
/// Listeners run in subscription order. Cloning yields another handle to
/// the same source.
pub struct EventSource<E> {
    inner: Rc<RefCell<SourceInner<E>>>,
}

impl<E: 'static> EventSource<E> {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(SourceInner {
                next_id: 0,
                listeners: BTreeMap::new(),
            })),
        }
    }

    /// Register a listener. It stays registered until the returned
    /// subscription is cancelled or dropped.
    #[must_use = "dropping the subscription unsubscribes immediately"]
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: FnMut(&E) + 'static,
    {
        let id = {
            let mut inner = self.inner.borrow_mut();
            let id = inner.next_id;
            inner.next_id += 1;
            inner.listeners.insert(id, Some(Box::new(listener)));
            id
        };

        let weak: Weak<RefCell<SourceInner<E>>> = Rc::downgrade(&self.inner);
        Subscription {
            unsubscribe: Some(Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.borrow_mut().listeners.remove(&id);
                }
            })),
        }
    }

    /// Deliver `event` to every listener registered when the call started.
    ///
    /// A listener may unsubscribe itself or others while running; removed
    /// listeners are not called afterwards. Listeners added during the emit
    /// first see the next event.
    pub fn emit(&self, event: &E) {
        let ids: Vec<u64> = self.inner.borrow().listeners.keys().copied().collect();

        for id in ids {
            let listener = {
                let mut inner = self.inner.borrow_mut();
                match inner.listeners.get_mut(&id) {
                    Some(slot) => slot.take(),
                    None => continue,
                }
            };
            let Some(mut listener) = listener else {
                // Re-entrant emit from inside this listener.
                continue;
            };

            listener(event);

            let mut inner = self.inner.borrow_mut();
            if let Some(slot) = inner.listeners.get_mut(&id) {
                *slot = Some(listener);
            }
        }
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.inner.borrow().listeners.len()
    }
}

impl<E: 'static> Default for EventSource<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Clone for EventSource<E> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

/// Keeps a listener registered. Unsubscribes on drop.
pub struct Subscription {
    unsubscribe: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    /// Unsubscribe now. Calling this more than once is a no-op.
    pub fn cancel(&mut self) {
        if let Some(unsubscribe) = self.unsubscribe.take() {
            unsubscribe();
        }
    }

    /// Whether this subscription is still registered with its source.
    pub fn is_active(&self) -> bool {
        self.unsubscribe.is_some()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_emit_reaches_listeners_in_order() {
        let source = EventSource::<u32>::new();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let a = seen.clone();
        let _s1 = source.subscribe(move |e| a.borrow_mut().push(("a", *e)));
        let b = seen.clone();
        let _s2 = source.subscribe(move |e| b.borrow_mut().push(("b", *e)));

        source.emit(&7);
        assert_eq!(*seen.borrow(), vec![("a", 7), ("b", 7)]);
    }

    #[test]
    fn test_drop_unsubscribes() {
        let source = EventSource::<()>::new();
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        let sub = source.subscribe(move |_| c.set(c.get() + 1));

        source.emit(&());
        assert_eq!(source.listener_count(), 1);

        drop(sub);
        assert_eq!(source.listener_count(), 0);
        source.emit(&());
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_cancel_is_idempotent() {
        let source = EventSource::<()>::new();
        let mut sub = source.subscribe(|_| {});
        assert!(sub.is_active());

        sub.cancel();
        sub.cancel();
        assert!(!sub.is_active());
        assert_eq!(source.listener_count(), 0);
    }

    #[test]
    fn test_listener_can_unsubscribe_itself() {
        let source = EventSource::<u8>::new();
        let slot: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));
        let count = Rc::new(Cell::new(0));

        let slot_in = slot.clone();
        let c = count.clone();
        let sub = source.subscribe(move |_| {
            c.set(c.get() + 1);
            slot_in.borrow_mut().take();
        });
        *slot.borrow_mut() = Some(sub);

        source.emit(&1);
        source.emit(&2);
        assert_eq!(count.get(), 1);
        assert_eq!(source.listener_count(), 0);
    }

    #[test]
    fn test_subscription_outliving_source() {
        let source = EventSource::<()>::new();
        let mut sub = source.subscribe(|_| {});
        drop(source);
        sub.cancel();
        assert!(!sub.is_active());
    }
}

//! In-process notification channels and subscription handles.
//!
//! All channels are single-threaded (`Rc`/`RefCell`) and deliver synchronously in publish order.
//! Publication iterates over a snapshot of the listener list, so listeners may subscribe or
//! unsubscribe from inside a callback.

use std::{cell::RefCell, fmt, rc::Rc};

use futures::channel::mpsc::{unbounded, UnboundedReceiver};

/// Handle that detaches a listener or external source when unsubscribed.
///
/// Dropping a handle does not unsubscribe; call [`Subscription::unsubscribe`] explicitly.
/// Unsubscribing more than once is a no-op.
#[derive(Default)]
pub struct Subscription {
    teardown: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    /// Creates a subscription that runs `teardown` once on unsubscribe.
    pub fn new(teardown: impl FnOnce() + 'static) -> Self {
        Self {
            teardown: Some(Box::new(teardown)),
        }
    }

    /// Creates an already-closed subscription.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Runs the teardown if it has not run yet.
    pub fn unsubscribe(&mut self) {
        if let Some(teardown) = self.teardown.take() {
            teardown();
        }
    }

    /// Returns whether the subscription has already been torn down.
    pub fn is_closed(&self) -> bool {
        self.teardown.is_none()
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("closed", &self.is_closed())
            .finish()
    }
}

type Listener<T> = Rc<dyn Fn(&T)>;

struct Listeners<T> {
    next_id: u64,
    entries: Vec<(u64, Listener<T>)>,
}

/// Stateless multi-subscriber broadcast. Late subscribers miss past values.
pub struct Broadcast<T> {
    inner: Rc<RefCell<Listeners<T>>>,
}

impl<T> Clone for Broadcast<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> Default for Broadcast<T> {
    fn default() -> Self {
        Self {
            inner: Rc::new(RefCell::new(Listeners {
                next_id: 0,
                entries: Vec::new(),
            })),
        }
    }
}

impl<T: 'static> Broadcast<T> {
    /// Creates a broadcast with no subscribers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `listener` for every future publication.
    pub fn subscribe(&self, listener: impl Fn(&T) + 'static) -> Subscription {
        let id = {
            let mut inner = self.inner.borrow_mut();
            let id = inner.next_id;
            inner.next_id += 1;
            inner.entries.push((id, Rc::new(listener)));
            id
        };
        let weak = Rc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.borrow_mut().entries.retain(|(entry, _)| *entry != id);
            }
        })
    }

    /// Delivers `value` to every current subscriber in registration order.
    pub fn publish(&self, value: &T) {
        let snapshot: Vec<Listener<T>> = self
            .inner
            .borrow()
            .entries
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect();
        for listener in snapshot {
            listener(value);
        }
    }

    /// Returns the number of attached subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().entries.len()
    }
}

impl<T: Clone + 'static> Broadcast<T> {
    /// Subscribes with an unbounded stream for async consumers.
    ///
    /// The returned subscription detaches the stream; the stream also ends once the channel is
    /// dropped.
    pub fn stream(&self) -> (UnboundedReceiver<T>, Subscription) {
        let (tx, rx) = unbounded();
        let subscription = self.subscribe(move |value: &T| {
            let _ = tx.unbounded_send(value.clone());
        });
        (rx, subscription)
    }
}

/// Stateful channel that replays its current value to each new subscriber.
///
/// Setting the value to what it already holds publishes nothing.
pub struct ReplayChannel<T> {
    current: Rc<RefCell<T>>,
    listeners: Broadcast<T>,
}

impl<T> Clone for ReplayChannel<T> {
    fn clone(&self) -> Self {
        Self {
            current: self.current.clone(),
            listeners: self.listeners.clone(),
        }
    }
}

impl<T: Clone + PartialEq + 'static> ReplayChannel<T> {
    /// Creates a channel holding `initial`.
    pub fn new(initial: T) -> Self {
        Self {
            current: Rc::new(RefCell::new(initial)),
            listeners: Broadcast::new(),
        }
    }

    /// Returns the current value.
    pub fn get(&self) -> T {
        self.current.borrow().clone()
    }

    /// Stores `value` and publishes it when it differs from the current value.
    ///
    /// Returns whether a publication happened.
    pub fn set(&self, value: T) -> bool {
        let changed = self.store(value);
        if changed {
            self.notify();
        }
        changed
    }

    /// Stores `value` without delivering it. Returns whether the value changed.
    ///
    /// Pair with [`Self::notify`] when delivery has to run in a different context.
    pub fn store(&self, value: T) -> bool {
        let mut current = self.current.borrow_mut();
        if *current == value {
            return false;
        }
        *current = value;
        true
    }

    /// Delivers the current value to every subscriber.
    pub fn notify(&self) {
        let current = self.get();
        self.listeners.publish(&current);
    }

    /// Delivers the current value to `listener` immediately, then every later change.
    pub fn subscribe(&self, listener: impl Fn(&T) + 'static) -> Subscription {
        let listener: Listener<T> = Rc::new(listener);
        let current = self.get();
        listener(&current);
        self.listeners.subscribe(move |value: &T| listener(value))
    }

    /// Returns the number of attached subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.listeners.subscriber_count()
    }
}

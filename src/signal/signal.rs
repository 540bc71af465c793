use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak};

type Listener<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// Listener table. Ids only grow, so iteration order is subscription order.
struct Listeners<T> {
    next_id: usize,
    entries: BTreeMap<usize, Listener<T>>,
}

impl<T> Listeners<T> {
    fn new() -> Self {
        Self {
            next_id: 0,
            entries: BTreeMap::new(),
        }
    }
}

/// A reactive cell that holds a value and notifies subscribers when it changes.
///
/// Cloning a signal is cheap and yields a handle to the same cell.
///
/// # Examples
///
/// ```
/// use keepsake::Signal;
/// use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
///
/// let count = Signal::new(0);
/// let seen = Arc::new(AtomicUsize::new(0));
/// let seen_clone = seen.clone();
///
/// let _sub = count.subscribe(move |value| {
///     seen_clone.store(*value, Ordering::SeqCst);
/// });
///
/// count.set(7);
/// assert_eq!(seen.load(Ordering::SeqCst), 7);
/// ```
pub struct Signal<T> {
    value: Arc<RwLock<T>>,
    listeners: Arc<RwLock<Listeners<T>>>,
}

impl<T: Clone + Send + Sync + 'static> Signal<T> {
    /// Create a new signal with the given initial value.
    pub fn new(initial: T) -> Self {
        Self {
            value: Arc::new(RwLock::new(initial)),
            listeners: Arc::new(RwLock::new(Listeners::new())),
        }
    }

    /// Get a clone of the current value.
    pub fn get(&self) -> T {
        self.read().clone()
    }

    /// Read the value with a function without cloning.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        let value = self.read();
        f(&*value)
    }

    /// Set a new value and notify subscribers.
    pub fn set(&self, new_value: T) {
        *self.write() = new_value;
        self.notify();
    }

    /// Update the value in place and notify subscribers.
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        {
            let mut value = self.write();
            f(&mut *value);
        }
        self.notify();
    }

    /// Subscribe to changes.
    ///
    /// The listener is called after every `set` or `update` with the new
    /// value. Dropping the returned [`Subscription`] unsubscribes it.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let id = {
            let mut listeners = self
                .listeners
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            let id = listeners.next_id;
            listeners.next_id += 1;
            listeners.entries.insert(id, Arc::new(listener));
            id
        };

        let table: Weak<RwLock<Listeners<T>>> = Arc::downgrade(&self.listeners);
        Subscription::new(move || {
            if let Some(table) = table.upgrade() {
                table
                    .write()
                    .unwrap_or_else(PoisonError::into_inner)
                    .entries
                    .remove(&id);
            }
        })
    }

    /// Subscribe to changes and call the listener immediately with the
    /// current value.
    pub fn watch<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let listener = Arc::new(listener);
        let listener_clone = Arc::clone(&listener);
        let subscription = self.subscribe(move |value| (*listener_clone)(value));
        let current = self.get();
        (*listener)(&current);
        subscription
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .len()
    }

    /// Notify all subscribers of a change.
    ///
    /// Listeners receive a snapshot taken after every lock is released, so a
    /// listener may read or write this signal.
    fn notify(&self) {
        let listeners: Vec<Listener<T>> = self
            .listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .values()
            .cloned()
            .collect();
        if listeners.is_empty() {
            return;
        }

        let snapshot = self.get();
        for listener in listeners {
            listener(&snapshot);
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, T> {
        self.value.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, T> {
        self.value.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T> Clone for Signal<T> {
    fn clone(&self) -> Self {
        Self {
            value: Arc::clone(&self.value),
            listeners: Arc::clone(&self.listeners),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value.try_read() {
            Ok(value) => f.debug_tuple("Signal").field(&*value).finish(),
            Err(_) => f.write_str("Signal(<locked>)"),
        }
    }
}

/// RAII guard for a listener registered with [`Signal::subscribe`].
///
/// The listener is removed when the guard is dropped. Dropping it after the
/// signal itself is gone does nothing.
#[must_use = "dropping a Subscription unsubscribes the listener immediately"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    /// Wrap an unsubscribe action.
    ///
    /// Implementors of [`Reactive`](super::Reactive) for other frameworks use
    /// this to hand back their own unsubscribe handle.
    pub fn new<F>(cancel: F) -> Self
    where
        F: FnOnce() + Send + Sync + 'static,
    {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Keep the listener registered for as long as the signal lives.
    pub fn detach(mut self) {
        self.cancel = None;
    }

    /// Unsubscribe now. Same as dropping the guard.
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

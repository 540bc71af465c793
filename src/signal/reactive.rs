use super::{Signal, Subscription};

/// An observable value cell that a UI layer can read, write and watch.
///
/// [`Persisted`](crate::Persisted) depends only on this trait, so any
/// framework's reactive primitive can back a persisted value by wrapping it
/// in an implementation. [`Signal`] is the bundled one.
pub trait Reactive<T>: Clone + Send + Sync + 'static {
    /// Create a cell holding `initial`.
    fn from_value(initial: T) -> Self;

    /// Get a clone of the current value.
    fn get(&self) -> T;

    /// Borrow the current value.
    fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R;

    /// Replace the value and notify observers.
    fn set(&self, value: T);

    /// Mutate the value in place and notify observers.
    fn update(&self, f: impl FnOnce(&mut T));

    /// Observe changes until the returned handle is dropped.
    fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static;
}

impl<T: Clone + Send + Sync + 'static> Reactive<T> for Signal<T> {
    fn from_value(initial: T) -> Self {
        Signal::new(initial)
    }

    fn get(&self) -> T {
        Signal::get(self)
    }

    fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        Signal::with(self, f)
    }

    fn set(&self, value: T) {
        Signal::set(self, value)
    }

    fn update(&self, f: impl FnOnce(&mut T)) {
        Signal::update(self, f)
    }

    fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        Signal::subscribe(self, listener)
    }
}

//! Reactive values mirrored to a key-value store.
//!
//! A `Persisted<T>` is rehydrated from its store entry once when created and
//! writes the entry back on every update. Storage failures never reach the
//! caller: the in-memory value always wins.

mod persisted;

pub use persisted::Persisted;

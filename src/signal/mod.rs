//! Reactive value containers.
//!
//! This module provides the observable cell that a persisted value lives in:
//! - `Reactive<T>`: the interface a UI layer's primitive has to offer
//! - `Signal<T>`: the bundled thread-safe implementation
//! - `Subscription`: RAII handle returned by `subscribe`

mod reactive;
mod signal;

pub use reactive::Reactive;
pub use signal::{Signal, Subscription};

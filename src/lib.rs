//! # Keepsake
//!
//! Reactive values that survive restarts.
//!
//! A [`Persisted<T>`] holds a value in a reactive cell and mirrors it to one
//! entry of a key-value store: it is rehydrated from the store when created
//! and written back on every update. It is meant for small settings such as
//! user preferences, where a database would be overkill.
//!
//! ## Signals
//!
//! - `Signal<T>` - thread-safe observable cell
//! - `Reactive<T>` - the interface `Persisted` needs from a cell, so a UI
//!   framework's own primitive can stand in for `Signal`
//! - `Subscription` - RAII handle that unsubscribes on drop
//!
//! ## Storage
//!
//! - `KeyValueStore` - synchronous string-keyed store of serialized text
//! - `MemoryStore`, `FileStore` (native) and `LocalStorage` (wasm32)
//!
//! ## Failure policy
//!
//! Storage never gets in the caller's way. A missing, unreadable or corrupt
//! entry yields the fallback value; a write that cannot be serialized or
//! stored leaves the update in memory only. Each case is logged through
//! `tracing` and otherwise dropped.
//!
//! ```
//! use keepsake::{MemoryStore, Persisted};
//!
//! let store = MemoryStore::new();
//! let volume = Persisted::new(store.clone(), "volume", 0.8_f64);
//! volume.update(0.25);
//!
//! let reopened = Persisted::new(store, "volume", 0.8_f64);
//! assert_eq!(reopened.get(), 0.25);
//! ```

pub mod error;
pub mod persisted;
pub mod signal;
pub mod storage;

// Re-export main types for convenience
pub use error::{PersistError, StoreError};
pub use persisted::Persisted;
pub use signal::{Reactive, Signal, Subscription};
#[cfg(not(target_arch = "wasm32"))]
pub use storage::FileStore;
#[cfg(target_arch = "wasm32")]
pub use storage::LocalStorage;
pub use storage::{KeyValueStore, MemoryStore};

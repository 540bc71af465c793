//! Key-value stores a persisted value can be mirrored to.
//!
//! Every backend speaks the same two operations over a flat namespace of
//! string keys and serialized-text values:
//! - `MemoryStore`: in-process map, shared between clones
//! - `FileStore`: a JSON document on the local disk (native only)
//! - `LocalStorage`: the browser's `window.localStorage` (wasm32 only)

#[cfg(not(target_arch = "wasm32"))]
mod file;
#[cfg(target_arch = "wasm32")]
mod local;
mod memory;

#[cfg(not(target_arch = "wasm32"))]
pub use file::FileStore;
#[cfg(target_arch = "wasm32")]
pub use local::LocalStorage;
pub use memory::MemoryStore;

use std::sync::Arc;

use crate::error::StoreError;

/// A synchronous key-value store with string keys and text values.
pub trait KeyValueStore: Send + Sync {
    /// Read the entry at `key`, `Ok(None)` when it does not exist.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Create or replace the entry at `key`.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Arc<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &S {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }
}

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use super::KeyValueStore;
use crate::error::StoreError;

/// An in-process store backed by a `HashMap`.
///
/// Clones share the same entries, so a test can hand one clone to a
/// [`Persisted`](crate::Persisted) and inspect another.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    entries: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with raw entries.
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let entries = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            entries: Arc::new(RwLock::new(entries)),
        }
    }

    /// The raw text stored at `key`.
    pub fn raw(&self, key: &str) -> Option<String> {
        self.read(|entries| entries.get(key).cloned())
    }

    /// Whether an entry exists at `key`.
    pub fn contains_key(&self, key: &str) -> bool {
        self.read(|entries| entries.contains_key(key))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.read(HashMap::len)
    }

    /// Whether the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read<R>(&self, f: impl FnOnce(&HashMap<String, String>) -> R) -> R {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        f(&entries)
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.raw(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{PersistError, Result};
use crate::signal::{Reactive, Signal, Subscription};
use crate::storage::KeyValueStore;

/// A reactive value mirrored to one entry of a key-value store.
///
/// On creation the entry at `key` is read once; if it holds a valid
/// serialized `T` that becomes the current value, otherwise `fallback` does.
/// Every [`update`](Self::update) or [`modify`](Self::modify) changes the
/// value in memory first and then writes it to the store.
///
/// No operation returns an error or panics because of the store. A failed
/// read leaves the fallback in place; a failed write leaves the store stale
/// while the in-memory value keeps the update. Both are logged with
/// `tracing` at `warn`.
///
/// Clones share the same reactive cell and store binding.
///
/// # Examples
///
/// ```
/// use keepsake::{MemoryStore, Persisted};
///
/// let store = MemoryStore::new();
///
/// let theme = Persisted::new(store.clone(), "theme", "light".to_string());
/// assert_eq!(theme.get(), "light");
///
/// theme.update("dark".to_string());
/// drop(theme);
///
/// // A new instance on the same key picks up the saved value.
/// let theme = Persisted::new(store, "theme", "light".to_string());
/// assert_eq!(theme.get(), "dark");
/// ```
pub struct Persisted<T, C = Signal<T>> {
    key: Arc<str>,
    cell: C,
    store: Arc<dyn KeyValueStore>,
    _value: PhantomData<fn() -> T>,
}

impl<T> Persisted<T, Signal<T>>
where
    T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
{
    /// Create a persisted value held in a [`Signal`].
    ///
    /// Reads `key` from `store` once. Creation never writes to the store.
    pub fn new(
        store: impl KeyValueStore + 'static,
        key: impl Into<String>,
        fallback: T,
    ) -> Self {
        Self::in_cell(store, key, fallback)
    }
}

impl<T, C> Persisted<T, C>
where
    T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
    C: Reactive<T>,
{
    /// Create a persisted value held in a reactive cell of type `C`.
    ///
    /// Same as [`Persisted::new`] for a caller-chosen [`Reactive`]
    /// implementation.
    pub fn in_cell(
        store: impl KeyValueStore + 'static,
        key: impl Into<String>,
        fallback: T,
    ) -> Self {
        let key: Arc<str> = Arc::from(key.into());
        let store: Arc<dyn KeyValueStore> = Arc::new(store);

        let initial = match read_stored::<T>(store.as_ref(), &key) {
            Ok(Some(value)) => {
                tracing::debug!(key = %key, "restored persisted value");
                value
            }
            Ok(None) => {
                tracing::trace!(key = %key, "no stored entry, using fallback");
                fallback
            }
            Err(e) => {
                tracing::warn!(
                    key = %key,
                    kind = e.kind(),
                    error = %e,
                    "could not restore persisted value, using fallback"
                );
                fallback
            }
        };

        Self {
            key,
            cell: C::from_value(initial),
            store,
            _value: PhantomData,
        }
    }

    /// Get a clone of the current value.
    pub fn get(&self) -> T {
        self.cell.get()
    }

    /// Read the current value with a function without cloning.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        self.cell.with(f)
    }

    /// Replace the value and write it to the store.
    ///
    /// The in-memory value and subscribers are updated unconditionally; a
    /// failed write is logged and otherwise ignored.
    pub fn update(&self, next: T) {
        self.cell.set(next);
        self.commit();
    }

    /// Mutate the value in place and write it to the store.
    ///
    /// Failure handling is the same as for [`update`](Self::update).
    pub fn modify(&self, f: impl FnOnce(&mut T)) {
        self.cell.update(f);
        self.commit();
    }

    /// Observe changes to the value until the returned handle is dropped.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.cell.subscribe(listener)
    }

    /// The store key this value is bound to.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The reactive cell holding the value, for binding into a UI layer.
    ///
    /// Writing through the cell directly changes the value without
    /// persisting it.
    pub fn cell(&self) -> &C {
        &self.cell
    }

    fn commit(&self) {
        // Write from a snapshot so the cell is not locked during store I/O.
        let value = self.cell.get();
        let written = write_stored(self.store.as_ref(), &self.key, &value);

        match written {
            Ok(()) => tracing::debug!(key = %self.key, "persisted value"),
            Err(e) => tracing::warn!(
                key = %self.key,
                kind = e.kind(),
                error = %e,
                "could not persist value, keeping it in memory only"
            ),
        }
    }
}

impl<T, C: Clone> Clone for Persisted<T, C> {
    fn clone(&self) -> Self {
        Self {
            key: Arc::clone(&self.key),
            cell: self.cell.clone(),
            store: Arc::clone(&self.store),
            _value: PhantomData,
        }
    }
}

impl<T, C: fmt::Debug> fmt::Debug for Persisted<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Persisted")
            .field("key", &self.key)
            .field("cell", &self.cell)
            .finish_non_exhaustive()
    }
}

/// Read and decode the entry at `key`. `Ok(None)` when there is no entry.
pub(crate) fn read_stored<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Option<T>> {
    let Some(text) = store.get(key).map_err(|source| PersistError::StoreRead {
        key: key.to_string(),
        source,
    })?
    else {
        return Ok(None);
    };

    serde_json::from_str(&text)
        .map(Some)
        .map_err(|source| PersistError::Deserialize {
            key: key.to_string(),
            source,
        })
}

/// Encode `value` and write it to the entry at `key`.
///
/// Text that would not decode back into a `T` is rejected as
/// [`PersistError::Serialize`] before the store is touched. serde_json writes
/// non-finite floats as `null`, which would otherwise replace a good entry
/// with one that can never be restored.
pub(crate) fn write_stored<T: Serialize + DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<()> {
    let serialize_error = |source| PersistError::Serialize {
        key: key.to_string(),
        source,
    };
    let text = serde_json::to_string(value).map_err(serialize_error)?;
    serde_json::from_str::<T>(&text).map_err(serialize_error)?;

    store
        .set(key, &text)
        .map_err(|source| PersistError::StoreWrite {
            key: key.to_string(),
            source,
        })
}

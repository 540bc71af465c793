use std::{io, path::PathBuf};

use thiserror::Error;

/// Failure reported by a [`KeyValueStore`](crate::storage::KeyValueStore)
/// backend.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The backend cannot be reached at all (no window, storage disabled).
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),

    /// The backend refused a write (quota exceeded, access denied).
    #[error("storage backend rejected the write: {0}")]
    Rejected(String),

    /// I/O error on the backing file.
    #[error("I/O error on '{path}': {source}")]
    Io {
        /// File the operation touched
        path: PathBuf,
        /// Underlying error
        #[source]
        source: io::Error,
    },

    /// The backing file exists but is not a valid key-value document.
    #[error("store file '{path}' is corrupt: {details}")]
    Corrupt {
        /// File that failed to parse
        path: PathBuf,
        /// Parse error details
        details: String,
    },
}

impl StoreError {
    #[cfg_attr(target_arch = "wasm32", allow(dead_code))]
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// The four ways mirroring a value to its store can fail.
///
/// These never reach callers of [`Persisted`](crate::Persisted); they are
/// logged and discarded at the public boundary.
#[derive(Error, Debug)]
pub enum PersistError {
    /// Reading the entry during creation failed.
    #[error("failed to read '{key}' from store: {source}")]
    StoreRead {
        /// Entry key
        key: String,
        /// Backend failure
        #[source]
        source: StoreError,
    },

    /// The stored text is not a valid serialized value.
    #[error("failed to deserialize stored '{key}': {source}")]
    Deserialize {
        /// Entry key
        key: String,
        /// Parse failure
        #[source]
        source: serde_json::Error,
    },

    /// The value could not be converted to text.
    #[error("failed to serialize '{key}': {source}")]
    Serialize {
        /// Entry key
        key: String,
        /// Serialization failure
        #[source]
        source: serde_json::Error,
    },

    /// Writing the entry during an update failed.
    #[error("failed to write '{key}' to store: {source}")]
    StoreWrite {
        /// Entry key
        key: String,
        /// Backend failure
        #[source]
        source: StoreError,
    },
}

impl PersistError {
    /// The key of the entry that failed.
    pub fn key(&self) -> &str {
        match self {
            Self::StoreRead { key, .. }
            | Self::Deserialize { key, .. }
            | Self::Serialize { key, .. }
            | Self::StoreWrite { key, .. } => key,
        }
    }

    /// Short label for the failure kind, used as a log field.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::StoreRead { .. } => "store_read",
            Self::Deserialize { .. } => "deserialize",
            Self::Serialize { .. } => "serialize",
            Self::StoreWrite { .. } => "store_write",
        }
    }
}

/// A specialized `Result` type for persistence attempts.
pub type Result<T> = std::result::Result<T, PersistError>;

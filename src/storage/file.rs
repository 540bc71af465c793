use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use tempfile::NamedTempFile;

use super::KeyValueStore;
use crate::error::StoreError;

type Entries = BTreeMap<String, String>;

/// A store kept in a single JSON object file on the local device.
///
/// Each entry is a member of the object whose value is the entry's text.
/// A missing file reads as an empty store; the file and its parent
/// directories are created on the first write.
///
/// Writes are atomic: the updated document goes to a temporary file in the
/// same directory which then replaces the target. A file that exists but does
/// not parse is reported as [`StoreError::Corrupt`] and is never overwritten,
/// so entries under other keys survive until someone repairs it.
///
/// # Examples
///
/// ```no_run
/// use keepsake::{FileStore, Persisted};
///
/// let store = FileStore::new("/tmp/my-app/settings.json");
/// let volume = Persisted::new(store, "volume", 0.8_f32);
/// volume.update(0.5);
/// ```
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStore {
    /// Create a store backed by the file at `path`. Nothing is touched on disk
    /// until the first read or write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Entries, StoreError> {
        let contents = match fs::read(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Entries::new()),
            Err(e) => return Err(StoreError::io(&self.path, e)),
        };

        serde_json::from_slice(&contents).map_err(|e| StoreError::Corrupt {
            path: self.path.clone(),
            details: e.to_string(),
        })
    }

    fn write_atomically(&self, entries: &Entries) -> Result<(), StoreError> {
        let dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir).map_err(|e| StoreError::io(dir, e))?;

        let mut temp = NamedTempFile::new_in(dir).map_err(|e| StoreError::io(dir, e))?;
        serde_json::to_writer_pretty(&mut temp, entries)
            .map_err(io::Error::from)
            .and_then(|()| temp.flush())
            .and_then(|()| temp.as_file().sync_all())
            .map_err(|e| StoreError::io(temp.path(), e))?;
        temp.persist(&self.path)
            .map_err(|e| StoreError::io(&self.path, e.error))?;

        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut entries = self.load()?;
        Ok(entries.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);

        let mut entries = self.load()?;
        entries.insert(key.to_string(), value.to_string());
        self.write_atomically(&entries)?;

        tracing::trace!(path = %self.path.display(), key, "wrote store file");
        Ok(())
    }
}

//! Key-value storage for gate state.
//!
//! The gate keeps three documents: the current todo snapshot, the previous
//! one, and the attempt ledger. [`KeyValueStore`] hides where they live so
//! orchestration can run against disk or memory.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

/// Logical documents persisted between invocations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreKey {
    CurrentTodos,
    PreviousTodos,
    Attempts,
}

impl StoreKey {
    pub const ALL: [StoreKey; 3] = [
        StoreKey::CurrentTodos,
        StoreKey::PreviousTodos,
        StoreKey::Attempts,
    ];

    /// Stable file name for the document.
    pub fn file_name(self) -> &'static str {
        match self {
            StoreKey::CurrentTodos => "todos.json",
            StoreKey::PreviousTodos => "todos.previous.json",
            StoreKey::Attempts => "attempts.json",
        }
    }
}

/// Get/set/delete of whole documents by key.
///
/// `get` returns `Ok(None)` for a missing key, which is distinct from an empty
/// value. Failures reading or writing the backend are errors.
pub trait KeyValueStore {
    fn get(&self, key: StoreKey) -> Result<Option<String>>;
    fn set(&self, key: StoreKey, value: &str) -> Result<()>;
    fn delete(&self, key: StoreKey) -> Result<()>;
}

/// One file per key under a state directory (e.g. `.gate/state/`).
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: StoreKey) -> PathBuf {
        self.dir.join(key.file_name())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: StoreKey) -> Result<Option<String>> {
        let path = self.path_for(key);
        match fs::read(&path) {
            // Invalid UTF-8 is left for the JSON parser to reject as malformed.
            Ok(bytes) => Ok(Some(String::from_utf8_lossy(&bytes).into_owned())),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err).with_context(|| format!("read {}", path.display())),
        }
    }

    fn set(&self, key: StoreKey, value: &str) -> Result<()> {
        let path = self.path_for(key);
        debug!(path = %path.display(), bytes = value.len(), "writing state document");
        write_atomic(&path, value)
    }

    fn delete(&self, key: StoreKey) -> Result<()> {
        let path = self.path_for(key);
        match fs::remove_file(&path) {
            Ok(()) => {
                debug!(path = %path.display(), "deleted state document");
                Ok(())
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err).with_context(|| format!("delete {}", path.display())),
        }
    }
}

/// Atomically write `contents` (temp file + rename).
pub(crate) fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let parent = path
        .parent()
        .with_context(|| format!("state path missing parent {}", path.display()))?;
    fs::create_dir_all(parent).with_context(|| format!("create directory {}", parent.display()))?;
    let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);
    fs::write(&tmp_path, contents)
        .with_context(|| format!("write temp file {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("replace {}", path.display()))?;
    Ok(())
}

/// In-memory store for tests and throwaway evaluations.
#[derive(Debug, Default)]
pub struct MemoryStore {
    docs: RefCell<HashMap<StoreKey, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(self, key: StoreKey, value: impl Into<String>) -> Self {
        self.docs.borrow_mut().insert(key, value.into());
        self
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: StoreKey) -> Result<Option<String>> {
        Ok(self.docs.borrow().get(&key).cloned())
    }

    fn set(&self, key: StoreKey, value: &str) -> Result<()> {
        self.docs.borrow_mut().insert(key, value.to_string());
        Ok(())
    }

    fn delete(&self, key: StoreKey) -> Result<()> {
        self.docs.borrow_mut().remove(&key);
        Ok(())
    }
}

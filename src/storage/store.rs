//! The configuration resource store
//!
//! Caches one [`Entry`] per [`ResourceKey`], each pairing the backing file's
//! path with the document parsed from it. A key is either absent or holds a
//! complete entry; there is no state with a path but no document.
//!
//! Lifecycle per key:
//!
//! ```text
//! Absent --build--> Present --delete--> Absent
//!                   |  ^
//!                   +--+ write / save / reload / build (replace)
//! ```
//!
//! `write` only touches memory, `save` writes through to disk and `reload`
//! reads from disk, discarding unsaved writes. Every failure is logged at
//! error level and returned; the cache is never left half-updated.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde_yaml::Value;
use thiserror::Error;
use tracing::{debug, error};

use super::locator::{LocatorError, Materialized, ResourceLocator};
use super::template::TemplateSource;
use crate::domain::{check_argument, Document, DocumentError, ResourceKey, DEFAULT_SEPARATOR};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Resource '{0}' is not loaded")]
    NotFound(ResourceKey),

    #[error("No bundled template named '{0}'")]
    ResourceMissing(String),

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: DocumentError,
    },

    #[error("Failed to serialize '{key}': {source}")]
    Serialize {
        key: ResourceKey,
        #[source]
        source: DocumentError,
    },
}

impl From<LocatorError> for StoreError {
    fn from(err: LocatorError) -> Self {
        match err {
            LocatorError::ResourceMissing(name) => Self::ResourceMissing(name),
            LocatorError::Io { path, source } => Self::Io { path, source },
        }
    }
}

/// A cached resource: its backing file and the document parsed from it
#[derive(Debug, Clone)]
pub struct Entry {
    path: PathBuf,
    document: Document,
}

impl Entry {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn document(&self) -> &Document {
        &self.document
    }
}

/// Operations that can be applied to a key, alone or in batches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Build { custom: bool },
    Save,
    Reload,
    Delete,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Build { .. } => "build",
            Action::Save => "save",
            Action::Reload => "reload",
            Action::Delete => "delete",
        }
    }
}

/// Outcome of applying one action to several keys
#[derive(Debug, Default)]
pub struct BatchReport {
    pub succeeded: Vec<ResourceKey>,
    pub failed: Vec<(ResourceKey, StoreError)>,
}

impl BatchReport {
    /// Returns true if no key failed
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Cache of configuration resources under one data root
#[derive(Debug)]
pub struct ConfigStore {
    locator: ResourceLocator,
    separator: char,
    entries: HashMap<ResourceKey, Entry>,
}

impl ConfigStore {
    /// Creates an empty store
    pub fn new(locator: ResourceLocator) -> Self {
        Self {
            locator,
            separator: DEFAULT_SEPARATOR,
            entries: HashMap::new(),
        }
    }

    /// Creates a store over `data_root` seeded from `templates`
    pub fn with_templates(data_root: impl Into<PathBuf>, templates: impl TemplateSource + 'static) -> Self {
        Self::new(ResourceLocator::new(data_root, templates))
    }

    /// Sets the path separator used by documents parsed from now on
    pub fn with_separator(mut self, separator: char) -> Self {
        self.separator = separator;
        self
    }

    pub fn locator(&self) -> &ResourceLocator {
        &self.locator
    }

    pub fn separator(&self) -> char {
        self.separator
    }

    /// Materializes the resource and caches its parsed document.
    ///
    /// Building a key that is already present replaces its entry with a
    /// fresh one read from disk, discarding unsaved writes. On failure the
    /// store is unchanged for that key.
    ///
    /// # Panics
    ///
    /// Panics if `file` is empty.
    #[track_caller]
    pub fn build(&mut self, folder: &str, file: &str, custom: bool) -> Result<Materialized, StoreError> {
        let key = ResourceKey::new(folder, file);
        self.build_key(&key, custom)
    }

    fn build_key(&mut self, key: &ResourceKey, custom: bool) -> Result<Materialized, StoreError> {
        let (entry, how) = self.load_entry(key, custom).inspect_err(|err| {
            error!(folder = key.folder(), file = key.file(), error = %err, "Cannot build the resource");
        })?;

        let replaced = self.entries.insert(key.clone(), entry).is_some();
        debug!(folder = key.folder(), file = key.file(), replaced, "built resource");
        Ok(how)
    }

    fn load_entry(&self, key: &ResourceKey, custom: bool) -> Result<(Entry, Materialized), StoreError> {
        let (path, how) = self.locator.locate(key, custom)?;
        let document = self.read_document(&path)?;
        Ok((Entry { path, document }, how))
    }

    fn read_document(&self, path: &Path) -> Result<Document, StoreError> {
        let content = fs::read_to_string(path).map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Document::parse(&content, self.separator).map_err(|source| StoreError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Returns true if the resource is cached
    #[track_caller]
    pub fn exists(&self, folder: &str, file: &str) -> bool {
        self.entries.contains_key(&ResourceKey::new(folder, file))
    }

    /// Returns the cached entry without logging when it is absent
    pub fn entry(&self, key: &ResourceKey) -> Option<&Entry> {
        self.entries.get(key)
    }

    /// Returns the cached document, logging an error if it isn't loaded
    #[track_caller]
    pub fn get(&self, folder: &str, file: &str) -> Option<&Document> {
        let key = ResourceKey::new(folder, file);
        match self.entries.get(&key) {
            Some(entry) => Some(&entry.document),
            None => {
                log_absent(&key, "get");
                None
            }
        }
    }

    /// Mutable access to the cached document, logging an error if it isn't loaded
    #[track_caller]
    pub fn get_mut(&mut self, folder: &str, file: &str) -> Option<&mut Document> {
        let key = ResourceKey::new(folder, file);
        match self.entries.get_mut(&key) {
            Some(entry) => Some(&mut entry.document),
            None => {
                log_absent(&key, "get");
                None
            }
        }
    }

    /// Returns the backing file of a cached resource
    #[track_caller]
    pub fn path(&self, folder: &str, file: &str) -> Option<&Path> {
        self.entries
            .get(&ResourceKey::new(folder, file))
            .map(|entry| entry.path.as_path())
    }

    fn present_mut(&mut self, key: &ResourceKey, action: &str) -> Result<&mut Entry, StoreError> {
        match self.entries.get_mut(key) {
            Some(entry) => Ok(entry),
            None => {
                log_absent(key, action);
                Err(StoreError::NotFound(key.clone()))
            }
        }
    }

    /// Sets `value` at `path` in memory. Call [`save`](Self::save) to persist.
    ///
    /// # Panics
    ///
    /// Panics if `file` or `path` is empty or `value` is null.
    #[track_caller]
    pub fn write(&mut self, folder: &str, file: &str, path: &str, value: impl Into<Value>) -> Result<(), StoreError> {
        let key = ResourceKey::new(folder, file);
        check_argument(!path.is_empty(), "The path for the value is empty.");
        let value = value.into();
        check_argument(!value.is_null(), "The object to set can't be null.");

        let entry = self.present_mut(&key, "write")?;
        entry.document.set(path, value);
        Ok(())
    }

    /// Removes `path` from the in-memory document, returning whether it existed
    #[track_caller]
    pub fn unset(&mut self, folder: &str, file: &str, path: &str) -> Result<bool, StoreError> {
        let key = ResourceKey::new(folder, file);
        check_argument(!path.is_empty(), "The path is empty.");

        let entry = self.present_mut(&key, "unset")?;
        Ok(entry.document.remove(path).is_some())
    }

    /// Re-reads the backing file. On failure the cached document is kept.
    #[track_caller]
    pub fn reload(&mut self, folder: &str, file: &str) -> Result<(), StoreError> {
        self.reload_key(&ResourceKey::new(folder, file))
    }

    fn reload_key(&mut self, key: &ResourceKey) -> Result<(), StoreError> {
        let separator = self.separator;
        let entry = self.present_mut(key, "reload")?;
        let path = entry.path.clone();

        let content = fs::read_to_string(&path).map_err(|source| StoreError::Io {
            path: path.clone(),
            source,
        });
        let parsed = content.and_then(|content| {
            Document::parse(&content, separator).map_err(|source| StoreError::Parse {
                path: path.clone(),
                source,
            })
        });

        match parsed {
            Ok(document) => {
                entry.document = document;
                debug!(folder = key.folder(), file = key.file(), "reloaded resource");
                Ok(())
            }
            Err(err) => {
                error!(folder = key.folder(), file = key.file(), error = %err, "Failed to reload the resource");
                Err(err)
            }
        }
    }

    /// Writes the cached document to its backing file.
    ///
    /// The file is truncated and rewritten in place, not replaced atomically:
    /// if the write fails midway the file may hold partial content.
    #[track_caller]
    pub fn save(&mut self, folder: &str, file: &str) -> Result<(), StoreError> {
        self.save_key(&ResourceKey::new(folder, file))
    }

    fn save_key(&mut self, key: &ResourceKey) -> Result<(), StoreError> {
        let entry = self.present_mut(key, "save")?;

        let result = entry
            .document
            .to_yaml()
            .map_err(|source| StoreError::Serialize {
                key: key.clone(),
                source,
            })
            .and_then(|content| {
                fs::write(&entry.path, content).map_err(|source| StoreError::Io {
                    path: entry.path.clone(),
                    source,
                })
            });

        match result {
            Ok(()) => {
                debug!(folder = key.folder(), file = key.file(), "saved resource");
                Ok(())
            }
            Err(err) => {
                error!(folder = key.folder(), file = key.file(), error = %err, "Failed to save the resource");
                Err(err)
            }
        }
    }

    /// Deletes the backing file, then drops the entry.
    ///
    /// If the file can't be deleted the entry stays cached so the store
    /// keeps matching what is on disk. A file that is already gone counts
    /// as deleted.
    #[track_caller]
    pub fn delete(&mut self, folder: &str, file: &str) -> Result<(), StoreError> {
        self.delete_key(&ResourceKey::new(folder, file))
    }

    fn delete_key(&mut self, key: &ResourceKey) -> Result<(), StoreError> {
        let entry = self.present_mut(key, "delete")?;

        match fs::remove_file(&entry.path) {
            Ok(()) => {}
            Err(source) if source.kind() == io::ErrorKind::NotFound => {
                debug!(folder = key.folder(), file = key.file(), "backing file was already gone");
            }
            Err(source) => {
                let err = StoreError::Io {
                    path: entry.path.clone(),
                    source,
                };
                error!(folder = key.folder(), file = key.file(), error = %err, "Cannot delete the resource");
                return Err(err);
            }
        }

        self.entries.remove(key);
        debug!(folder = key.folder(), file = key.file(), "deleted resource");
        Ok(())
    }

    /// Drops a cached entry without touching its file
    #[track_caller]
    pub fn forget(&mut self, folder: &str, file: &str) -> bool {
        self.entries.remove(&ResourceKey::new(folder, file)).is_some()
    }

    /// Drops every cached entry without touching the files
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Keys currently cached, in no particular order
    pub fn keys(&self) -> impl Iterator<Item = &ResourceKey> {
        self.entries.keys()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Applies one action to one key
    pub fn apply(&mut self, action: Action, key: &ResourceKey) -> Result<(), StoreError> {
        match action {
            Action::Build { custom } => self.build_key(key, custom).map(|_| ()),
            Action::Save => self.save_key(key),
            Action::Reload => self.reload_key(key),
            Action::Delete => self.delete_key(key),
        }
    }

    /// Applies `action` to each key in order. Failures don't stop the batch.
    pub fn apply_all<I>(&mut self, action: Action, keys: I) -> BatchReport
    where
        I: IntoIterator,
        I::Item: Into<ResourceKey>,
    {
        let mut report = BatchReport::default();

        for key in keys {
            let key = key.into();
            match self.apply(action, &key) {
                Ok(()) => report.succeeded.push(key),
                Err(err) => report.failed.push((key, err)),
            }
        }

        if !report.is_success() {
            debug!(
                action = action.as_str(),
                failed = report.failed.len(),
                succeeded = report.succeeded.len(),
                "batch finished with failures"
            );
        }
        report
    }

    fn sorted_keys(&self) -> Vec<ResourceKey> {
        let mut keys: Vec<_> = self.entries.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Saves every cached resource
    pub fn save_all(&mut self) -> BatchReport {
        let keys = self.sorted_keys();
        self.apply_all(Action::Save, keys)
    }

    /// Reloads every cached resource
    pub fn reload_all(&mut self) -> BatchReport {
        let keys = self.sorted_keys();
        self.apply_all(Action::Reload, keys)
    }
}

fn log_absent(key: &ResourceKey, action: &str) {
    error!(
        folder = key.folder(),
        file = key.file(),
        "Cannot {} the file '{}' because it doesn't exist.",
        action,
        key.file()
    );
}

//! Resource location and materialization
//!
//! Maps a [`ResourceKey`] to `<data_root>/[<folder>/]<file>` and makes sure
//! the file exists, either copied from a bundled template or created empty.
//! The locator never touches the store's cache.

use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, trace};

use super::template::TemplateSource;
use crate::domain::ResourceKey;

#[derive(Debug, Error)]
pub enum LocatorError {
    #[error("No bundled template named '{0}'")]
    ResourceMissing(String),

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl LocatorError {
    fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// How a resource file came to exist
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Materialized {
    /// The file was already on disk; nothing was written
    Existing,
    /// The file was copied from a bundled template
    FromTemplate,
    /// An empty custom file was created
    Created,
}

impl Materialized {
    pub fn as_str(&self) -> &'static str {
        match self {
            Materialized::Existing => "existing",
            Materialized::FromTemplate => "from_template",
            Materialized::Created => "created",
        }
    }
}

/// Resolves keys to files under a data root
pub struct ResourceLocator {
    data_root: PathBuf,
    templates: Box<dyn TemplateSource>,
}

impl std::fmt::Debug for ResourceLocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceLocator")
            .field("data_root", &self.data_root)
            .finish_non_exhaustive()
    }
}

impl ResourceLocator {
    pub fn new(data_root: impl Into<PathBuf>, templates: impl TemplateSource + 'static) -> Self {
        Self {
            data_root: data_root.into(),
            templates: Box::new(templates),
        }
    }

    /// Returns the plugin data root
    pub fn data_root(&self) -> &Path {
        &self.data_root
    }

    /// `data_root/file` for root keys, `data_root/folder/file` otherwise
    pub fn resolve_path(&self, key: &ResourceKey) -> PathBuf {
        if key.is_root() {
            self.data_root.join(key.file())
        } else {
            self.data_root.join(key.folder()).join(key.file())
        }
    }

    /// Ensures the file at `path` exists. Idempotent: an existing file is left as is.
    pub fn materialize(
        &self,
        path: &Path,
        key: &ResourceKey,
        custom: bool,
    ) -> Result<Materialized, LocatorError> {
        if path.exists() {
            trace!(path = %path.display(), "resource file already exists");
            return Ok(Materialized::Existing);
        }

        if custom {
            ensure_parent(path)?;
            return create_empty(path);
        }

        let name = key.template_name();
        let content = self
            .templates
            .fetch(&name)
            .map_err(|e| LocatorError::io(path, e))?
            .ok_or_else(|| LocatorError::ResourceMissing(name.clone()))?;

        ensure_parent(path)?;
        fs::write(path, &content).map_err(|e| LocatorError::io(path, e))?;
        debug!(template = %name, path = %path.display(), "copied bundled template");
        Ok(Materialized::FromTemplate)
    }

    /// Resolves and materializes in one step
    pub fn locate(&self, key: &ResourceKey, custom: bool) -> Result<(PathBuf, Materialized), LocatorError> {
        let path = self.resolve_path(key);
        let how = self.materialize(&path, key, custom)?;
        Ok((path, how))
    }
}

fn ensure_parent(path: &Path) -> Result<(), LocatorError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            fs::create_dir_all(parent).map_err(|e| LocatorError::io(parent, e))
        }
        _ => Ok(()),
    }
}

fn create_empty(path: &Path) -> Result<Materialized, LocatorError> {
    match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(_) => {
            debug!(path = %path.display(), "created empty custom file");
            Ok(Materialized::Created)
        }
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Ok(Materialized::Existing),
        Err(e) => Err(LocatorError::io(path, e)),
    }
}

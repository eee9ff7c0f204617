//! Resource keys
//!
//! A resource is addressed by a `(folder, file)` pair. An empty folder means
//! the file lives directly under the data root.

use std::fmt;

/// Panics with `message` when `condition` is false.
///
/// Used for programmer errors (empty names, empty paths) that must fail fast
/// instead of being logged and carried on.
#[track_caller]
pub(crate) fn check_argument(condition: bool, message: &str) {
    assert!(condition, "{}", message);
}

/// Identifies one configuration resource
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceKey {
    folder: String,
    file: String,
}

impl ResourceKey {
    /// Creates a key. `file` must be non-empty.
    ///
    /// # Panics
    ///
    /// Panics if `file` is empty.
    #[track_caller]
    pub fn new(folder: impl Into<String>, file: impl Into<String>) -> Self {
        let file = file.into();
        check_argument(!file.is_empty(), "The file name is empty.");

        Self {
            folder: folder.into(),
            file,
        }
    }

    /// Creates a key for a file directly under the data root
    #[track_caller]
    pub fn root(file: impl Into<String>) -> Self {
        Self::new("", file)
    }

    pub fn folder(&self) -> &str {
        &self.folder
    }

    pub fn file(&self) -> &str {
        &self.file
    }

    /// Returns true if the resource has no subfolder
    pub fn is_root(&self) -> bool {
        self.folder.is_empty()
    }

    /// Name of the bundled template for this key: `folder/file` or `file`.
    ///
    /// Always `/`-separated, independent of the host platform.
    pub fn template_name(&self) -> String {
        if self.is_root() {
            self.file.clone()
        } else {
            format!("{}/{}", self.folder.trim_end_matches(['/', '\\']), self.file)
        }
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.template_name())
    }
}

impl<F: Into<String>, N: Into<String>> From<(F, N)> for ResourceKey {
    #[track_caller]
    fn from((folder, file): (F, N)) -> Self {
        Self::new(folder, file)
    }
}

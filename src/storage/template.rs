//! Bundled templates
//!
//! Default content shipped with the host plugin. Templates are addressed by
//! `/`-separated names (`lang/en.yml`) no matter which platform runs the host.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// A source of bundled template content
pub trait TemplateSource {
    /// Returns the bytes of the template `name`, or `None` if it isn't bundled
    fn fetch(&self, name: &str) -> io::Result<Option<Vec<u8>>>;
}

/// Templates compiled into the host binary
///
/// ```
/// use xconfig::storage::EmbeddedTemplates;
///
/// let templates = EmbeddedTemplates::new()
///     .with("config.yml", "greeting: hello\n")
///     .with("lang/en.yml", "welcome: Hi\n");
/// assert_eq!(templates.len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct EmbeddedTemplates {
    files: HashMap<String, Vec<u8>>,
}

impl EmbeddedTemplates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a template, replacing any earlier one with the same name
    pub fn with(mut self, name: impl Into<String>, content: impl AsRef<[u8]>) -> Self {
        self.insert(name, content);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, content: impl AsRef<[u8]>) {
        self.files
            .insert(normalize(&name.into()), content.as_ref().to_vec());
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl TemplateSource for EmbeddedTemplates {
    fn fetch(&self, name: &str) -> io::Result<Option<Vec<u8>>> {
        Ok(self.files.get(&normalize(name)).cloned())
    }
}

/// Templates read from a directory that mirrors the bundled layout
#[derive(Debug, Clone)]
pub struct DirectoryTemplates {
    dir: PathBuf,
}

impl DirectoryTemplates {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn template_path(&self, name: &str) -> PathBuf {
        normalize(name)
            .split('/')
            .fold(self.dir.clone(), |path, part| path.join(part))
    }
}

impl TemplateSource for DirectoryTemplates {
    fn fetch(&self, name: &str) -> io::Result<Option<Vec<u8>>> {
        let path = self.template_path(name);
        if !path.is_file() {
            return Ok(None);
        }
        fs::read(&path).map(Some)
    }
}

/// A source with no templates at all
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTemplates;

impl TemplateSource for NoTemplates {
    fn fetch(&self, _name: &str) -> io::Result<Option<Vec<u8>>> {
        Ok(None)
    }
}

impl<T: TemplateSource + ?Sized> TemplateSource for Box<T> {
    fn fetch(&self, name: &str) -> io::Result<Option<Vec<u8>>> {
        (**self).fetch(name)
    }
}

/// Treats `\` as `/` and drops leading separators
fn normalize(name: &str) -> String {
    name.replace('\\', "/").trim_start_matches('/').to_string()
}

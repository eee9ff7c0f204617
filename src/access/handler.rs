//! Typed reads over a [`ConfigStore`]
//!
//! Every getter comes in two forms. The plain form (`text`, `number`, ...)
//! logs an error and returns `None` when the path is missing. The `_or`
//! form returns the given default instead and never logs, whether the path
//! or the whole resource is missing.

use serde_yaml::Value;
use tracing::error;

use super::colorize::{Colorizer, LegacyColorizer};
use crate::domain::{check_argument, Document, ResourceKey};
use crate::storage::ConfigStore;

/// Read-only façade over a store
pub struct ConfigHandler<'s, C = LegacyColorizer> {
    store: &'s ConfigStore,
    colorizer: C,
}

impl<'s> ConfigHandler<'s> {
    pub fn new(store: &'s ConfigStore) -> Self {
        Self::with_colorizer(store, LegacyColorizer::default())
    }
}

impl<'s, C: Colorizer> ConfigHandler<'s, C> {
    pub fn with_colorizer(store: &'s ConfigStore, colorizer: C) -> Self {
        Self { store, colorizer }
    }

    pub fn store(&self) -> &'s ConfigStore {
        self.store
    }

    #[track_caller]
    fn lookup<T>(
        &self,
        folder: &str,
        file: &str,
        path: &str,
        kind: &str,
        read: impl FnOnce(&Document, &str) -> Option<T>,
    ) -> Option<T> {
        check_argument(!path.is_empty(), "The path is empty.");
        let document = self.store.get(folder, file)?;

        let value = read(document, path);
        if value.is_none() {
            error!(
                folder,
                file,
                path,
                "Cannot get the {} from the path of file '{}' because it doesn't exist.",
                kind,
                file
            );
        }
        value
    }

    #[track_caller]
    fn lookup_or<T>(
        &self,
        folder: &str,
        file: &str,
        path: &str,
        default: T,
        read: impl FnOnce(&Document, &str) -> Option<T>,
    ) -> T {
        let key = ResourceKey::new(folder, file);
        check_argument(!path.is_empty(), "The path is empty.");
        self.store
            .entry(&key)
            .and_then(|entry| read(entry.document(), path))
            .unwrap_or(default)
    }

    fn paint(&self, text: String, colorize: bool) -> String {
        if colorize {
            self.colorizer.colorize(&text)
        } else {
            text
        }
    }

    fn paint_all(&self, lines: Vec<String>, colorize: bool) -> Vec<String> {
        if colorize {
            self.colorizer.colorize_all(&lines)
        } else {
            lines
        }
    }

    /// Returns true if `path` exists in the resource. Never logs.
    #[track_caller]
    pub fn contains(&self, folder: &str, file: &str, path: &str) -> bool {
        let key = ResourceKey::new(folder, file);
        check_argument(!path.is_empty(), "The path is empty.");

        self.store
            .entry(&key)
            .is_some_and(|entry| entry.document().contains(path))
    }

    #[track_caller]
    pub fn text(&self, folder: &str, file: &str, path: &str, colorize: bool) -> Option<String> {
        self.lookup(folder, file, path, "text", Document::get_string)
            .map(|text| self.paint(text, colorize))
    }

    #[track_caller]
    pub fn text_or(&self, folder: &str, file: &str, path: &str, default: &str, colorize: bool) -> String {
        let text = self.lookup_or(folder, file, path, default.to_string(), Document::get_string);
        self.paint(text, colorize)
    }

    #[track_caller]
    pub fn text_list(&self, folder: &str, file: &str, path: &str, colorize: bool) -> Option<Vec<String>> {
        self.lookup(folder, file, path, "text list", Document::get_string_list)
            .map(|lines| self.paint_all(lines, colorize))
    }

    #[track_caller]
    pub fn text_list_or(
        &self,
        folder: &str,
        file: &str,
        path: &str,
        default: Vec<String>,
        colorize: bool,
    ) -> Vec<String> {
        let lines = self.lookup_or(folder, file, path, default, Document::get_string_list);
        self.paint_all(lines, colorize)
    }

    #[track_caller]
    pub fn number(&self, folder: &str, file: &str, path: &str) -> Option<i64> {
        self.lookup(folder, file, path, "number", Document::get_i64)
    }

    #[track_caller]
    pub fn number_or(&self, folder: &str, file: &str, path: &str, default: i64) -> i64 {
        self.lookup_or(folder, file, path, default, Document::get_i64)
    }

    #[track_caller]
    pub fn double(&self, folder: &str, file: &str, path: &str) -> Option<f64> {
        self.lookup(folder, file, path, "double", Document::get_f64)
    }

    #[track_caller]
    pub fn double_or(&self, folder: &str, file: &str, path: &str, default: f64) -> f64 {
        self.lookup_or(folder, file, path, default, Document::get_f64)
    }

    #[track_caller]
    pub fn boolean(&self, folder: &str, file: &str, path: &str) -> Option<bool> {
        self.lookup(folder, file, path, "boolean", Document::get_bool)
    }

    #[track_caller]
    pub fn boolean_or(&self, folder: &str, file: &str, path: &str, default: bool) -> bool {
        self.lookup_or(folder, file, path, default, Document::get_bool)
    }

    #[track_caller]
    pub fn character(&self, folder: &str, file: &str, path: &str) -> Option<char> {
        self.lookup(folder, file, path, "character", Document::get_char)
    }

    #[track_caller]
    pub fn character_or(&self, folder: &str, file: &str, path: &str, default: char) -> char {
        self.lookup_or(folder, file, path, default, Document::get_char)
    }

    #[track_caller]
    pub fn list(&self, folder: &str, file: &str, path: &str) -> Option<Vec<Value>> {
        self.lookup(folder, file, path, "list", Document::get_list)
    }

    #[track_caller]
    pub fn list_or(&self, folder: &str, file: &str, path: &str, default: Vec<Value>) -> Vec<Value> {
        self.lookup_or(folder, file, path, default, Document::get_list)
    }

    #[track_caller]
    pub fn section(&self, folder: &str, file: &str, path: &str) -> Option<Document> {
        self.lookup(folder, file, path, "section", Document::section)
    }

    #[track_caller]
    pub fn section_or(&self, folder: &str, file: &str, path: &str, default: Document) -> Document {
        self.lookup_or(folder, file, path, default, Document::section)
    }

    /// Keys of the section at `path`; empty when there is no such section
    #[track_caller]
    pub fn section_keys(&self, folder: &str, file: &str, path: &str) -> Vec<String> {
        self.section(folder, file, path)
            .map(|section| section.keys())
            .unwrap_or_default()
    }

    /// Untyped value at `path`
    #[track_caller]
    pub fn any(&self, folder: &str, file: &str, path: &str) -> Option<Value> {
        self.lookup(folder, file, path, "object", |doc, path| doc.get(path).cloned())
    }

    #[track_caller]
    pub fn any_or(&self, folder: &str, file: &str, path: &str, default: Value) -> Value {
        self.lookup_or(folder, file, path, default, |doc, path| doc.get(path).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::PlainText;
    use crate::storage::EmbeddedTemplates;
    use std::io;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;
    use tracing_subscriber::fmt::MakeWriter;

    const CONFIG: &str = r#"
greeting: "&aHello"
max-players: 20
spawn-radius: 12.5
pvp: false
prefix: ">"
motd:
  - "&6Welcome"
  - "&7to the server"
ranks:
  admin:
    weight: 100
  member:
    weight: 1
"#;

    fn loaded(dir: &TempDir) -> ConfigStore {
        let templates = EmbeddedTemplates::new().with("config.yml", CONFIG);
        let mut store = ConfigStore::with_templates(dir.path(), templates);
        store.build("", "config.yml", false).unwrap();
        store
    }

    #[test]
    fn text_with_and_without_colors() {
        let dir = TempDir::new().unwrap();
        let store = loaded(&dir);
        let handler = ConfigHandler::new(&store);

        assert_eq!(handler.text("", "config.yml", "greeting", false).as_deref(), Some("&aHello"));
        assert_eq!(handler.text("", "config.yml", "greeting", true).as_deref(), Some("§aHello"));
    }

    #[test]
    fn missing_paths_return_none() {
        let dir = TempDir::new().unwrap();
        let store = loaded(&dir);
        let handler = ConfigHandler::new(&store);

        assert_eq!(handler.text("", "config.yml", "nope", false), None);
        assert_eq!(handler.number("", "config.yml", "nope"), None);
        assert_eq!(handler.double("", "config.yml", "nope"), None);
        assert_eq!(handler.boolean("", "config.yml", "nope"), None);
        assert_eq!(handler.character("", "config.yml", "nope"), None);
        assert_eq!(handler.list("", "config.yml", "nope"), None);
        assert_eq!(handler.text_list("", "config.yml", "nope", true), None);
        assert!(handler.section("", "config.yml", "nope").is_none());
        assert!(handler.any("", "config.yml", "nope").is_none());
    }

    #[test]
    fn unbuilt_resource_returns_none_and_defaults() {
        let dir = TempDir::new().unwrap();
        let store = loaded(&dir);
        let handler = ConfigHandler::new(&store);

        assert_eq!(handler.text("", "other.yml", "greeting", false), None);
        assert_eq!(handler.number("", "other.yml", "max-players"), None);
        assert_eq!(handler.number_or("", "other.yml", "max-players", 5), 5);
        assert!(!handler.contains("", "other.yml", "greeting"));
    }

    #[test]
    fn typed_values() {
        let dir = TempDir::new().unwrap();
        let store = loaded(&dir);
        let handler = ConfigHandler::new(&store);

        assert_eq!(handler.number("", "config.yml", "max-players"), Some(20));
        assert_eq!(handler.double("", "config.yml", "spawn-radius"), Some(12.5));
        assert_eq!(handler.boolean("", "config.yml", "pvp"), Some(false));
        assert_eq!(handler.character("", "config.yml", "prefix"), Some('>'));
        assert_eq!(handler.list("", "config.yml", "motd").map(|l| l.len()), Some(2));
        assert_eq!(
            handler.any("", "config.yml", "max-players"),
            Some(Value::from(20))
        );
    }

    #[test]
    fn defaults_apply_only_when_missing() {
        let dir = TempDir::new().unwrap();
        let store = loaded(&dir);
        let handler = ConfigHandler::new(&store);

        assert_eq!(handler.number_or("", "config.yml", "max-players", 5), 20);
        assert_eq!(handler.number_or("", "config.yml", "min-players", 5), 5);
        assert_eq!(handler.double_or("", "config.yml", "gravity", 9.8), 9.8);
        assert!(handler.boolean_or("", "config.yml", "whitelist", true));
        assert_eq!(handler.character_or("", "config.yml", "suffix", '<'), '<');
        assert_eq!(handler.text_or("", "config.yml", "farewell", "&cBye", true), "§cBye");
        assert_eq!(handler.text_or("", "config.yml", "greeting", "&cBye", false), "&aHello");
        assert_eq!(handler.list_or("", "config.yml", "nope", vec![Value::from(1)]), vec![Value::from(1)]);
        assert_eq!(handler.any_or("", "config.yml", "nope", Value::from("x")), Value::from("x"));
        assert!(handler.section_or("", "config.yml", "nope", Document::default()).is_empty());
    }

    #[test]
    fn text_list_colorized() {
        let dir = TempDir::new().unwrap();
        let store = loaded(&dir);
        let handler = ConfigHandler::new(&store);

        assert_eq!(
            handler.text_list("", "config.yml", "motd", true),
            Some(vec!["§6Welcome".to_string(), "§7to the server".to_string()])
        );
        assert_eq!(
            handler.text_list_or("", "config.yml", "footer", vec!["&8--".to_string()], true),
            vec!["§8--".to_string()]
        );
    }

    #[test]
    fn sections_and_keys() {
        let dir = TempDir::new().unwrap();
        let store = loaded(&dir);
        let handler = ConfigHandler::new(&store);

        let ranks = handler.section("", "config.yml", "ranks").unwrap();
        assert_eq!(ranks.get_i64("admin.weight"), Some(100));
        assert_eq!(handler.section_keys("", "config.yml", "ranks"), vec!["admin", "member"]);
        assert!(handler.section_keys("", "config.yml", "missing").is_empty());
    }

    #[test]
    fn contains_probe() {
        let dir = TempDir::new().unwrap();
        let store = loaded(&dir);
        let handler = ConfigHandler::new(&store);

        assert!(handler.contains("", "config.yml", "ranks.admin.weight"));
        assert!(!handler.contains("", "config.yml", "ranks.owner"));
    }

    #[test]
    fn custom_colorizer() {
        let dir = TempDir::new().unwrap();
        let store = loaded(&dir);
        let handler = ConfigHandler::with_colorizer(&store, PlainText);

        assert_eq!(handler.text("", "config.yml", "greeting", true).as_deref(), Some("&aHello"));
    }

    /// Collects formatted log output for the duration of a test
    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for Captured {
        type Writer = Captured;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    fn logged_while(run: impl FnOnce()) -> String {
        let logs = Captured::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(logs.clone())
            .with_ansi(false)
            .finish();
        tracing::subscriber::with_default(subscriber, run);
        let bytes = logs.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn defaults_on_unbuilt_resource_are_silent() {
        let dir = TempDir::new().unwrap();
        let store = loaded(&dir);
        let handler = ConfigHandler::new(&store);

        let logs = logged_while(|| {
            assert_eq!(handler.number_or("", "other.yml", "max-players", 5), 5);
            assert_eq!(handler.text_or("", "other.yml", "greeting", "hi", false), "hi");
            assert_eq!(handler.text_or("", "config.yml", "farewell", "bye", false), "bye");
        });
        assert_eq!(logs, "");

        let logs = logged_while(|| {
            assert_eq!(handler.number("", "other.yml", "max-players"), None);
        });
        assert!(logs.contains("Cannot get the file 'other.yml' because it doesn't exist."));
    }

    #[test]
    #[should_panic(expected = "The path is empty.")]
    fn empty_path_panics() {
        let dir = TempDir::new().unwrap();
        let store = loaded(&dir);
        let _ = ConfigHandler::new(&store).text("", "config.yml", "", false);
    }

    #[test]
    #[should_panic(expected = "The file name is empty.")]
    fn empty_file_name_panics() {
        let dir = TempDir::new().unwrap();
        let store = loaded(&dir);
        let _ = ConfigHandler::new(&store).contains("", "", "greeting");
    }
}

//! Hierarchical YAML documents
//!
//! A [`Document`] is the parsed content of one resource: a YAML mapping
//! addressed by separator-joined paths (`messages.join.title`). Typed reads
//! follow the conventions plugin authors expect from server config APIs:
//! scalars read as text, floats truncate when read as integers, and string
//! lists skip nested structures.

use serde::Serialize;
use serde_yaml::{Mapping, Value};
use thiserror::Error;

/// Separator used when none is configured
pub const DEFAULT_SEPARATOR: char = '.';

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Failed to parse document: {0}")]
    Parse(#[source] serde_yaml::Error),

    #[error("Document root must be a mapping, found {0}")]
    NotAMapping(&'static str),

    #[error("Failed to serialize document: {0}")]
    Serialize(#[source] serde_yaml::Error),
}

/// In-memory content of a configuration resource
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    root: Mapping,
    separator: char,
}

impl Default for Document {
    fn default() -> Self {
        Self::new(DEFAULT_SEPARATOR)
    }
}

impl Document {
    /// Creates an empty document
    pub fn new(separator: char) -> Self {
        Self {
            root: Mapping::new(),
            separator,
        }
    }

    /// Wraps an existing mapping
    pub fn from_mapping(root: Mapping, separator: char) -> Self {
        Self { root, separator }
    }

    /// Parses YAML text. Blank or comment-only text is an empty document.
    pub fn parse(content: &str, separator: char) -> Result<Self, DocumentError> {
        if is_blank(content) {
            return Ok(Self::new(separator));
        }

        let value: Value = serde_yaml::from_str(content).map_err(DocumentError::Parse)?;
        match value {
            Value::Null => Ok(Self::new(separator)),
            Value::Mapping(root) => Ok(Self { root, separator }),
            other => Err(DocumentError::NotAMapping(kind(&other))),
        }
    }

    /// Serializes the document back to YAML text
    pub fn to_yaml(&self) -> Result<String, DocumentError> {
        if self.root.is_empty() {
            return Ok(String::new());
        }
        serde_yaml::to_string(&self.root).map_err(DocumentError::Serialize)
    }

    pub fn separator(&self) -> char {
        self.separator
    }

    pub fn as_mapping(&self) -> &Mapping {
        &self.root
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// Top-level keys in document order
    pub fn keys(&self) -> Vec<String> {
        self.root.keys().filter_map(scalar_text).collect()
    }

    fn segments<'p>(&self, path: &'p str) -> Vec<&'p str> {
        path.split(self.separator).collect()
    }

    /// Returns the raw value at `path`
    pub fn get(&self, path: &str) -> Option<&Value> {
        let segments = self.segments(path);
        let (last, parents) = segments.split_last()?;

        let mut current = &self.root;
        for segment in parents {
            current = lookup(current, segment)?.as_mapping()?;
        }
        lookup(current, last)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    /// Sets `value` at `path`, creating intermediate sections as needed.
    ///
    /// An intermediate that exists but is not a section is replaced by one.
    pub fn set(&mut self, path: &str, value: impl Into<Value>) {
        let segments: Vec<&str> = path.split(self.separator).collect();
        insert_at(&mut self.root, &segments, value.into());
    }

    /// Serializes `value` and sets it at `path`
    pub fn set_serialized<T: Serialize>(&mut self, path: &str, value: &T) -> Result<(), DocumentError> {
        let value = serde_yaml::to_value(value).map_err(DocumentError::Serialize)?;
        self.set(path, value);
        Ok(())
    }

    /// Removes the value at `path`, returning it if present
    pub fn remove(&mut self, path: &str) -> Option<Value> {
        let segments: Vec<&str> = path.split(self.separator).collect();
        remove_at(&mut self.root, &segments)
    }

    /// Text at `path`; numbers and booleans are stringified
    pub fn get_string(&self, path: &str) -> Option<String> {
        self.get(path).and_then(scalar_text)
    }

    pub fn get_i64(&self, path: &str) -> Option<i64> {
        match untag(self.get(path)?) {
            Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_u64().map(|u| u.min(i64::MAX as u64) as i64))
                .or_else(|| n.as_f64().map(|f| f as i64)),
            _ => None,
        }
    }

    pub fn get_f64(&self, path: &str) -> Option<f64> {
        match untag(self.get(path)?) {
            Value::Number(n) => n.as_f64(),
            _ => None,
        }
    }

    pub fn get_bool(&self, path: &str) -> Option<bool> {
        match untag(self.get(path)?) {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn get_list(&self, path: &str) -> Option<Vec<Value>> {
        match untag(self.get(path)?) {
            Value::Sequence(items) => Some(items.clone()),
            _ => None,
        }
    }

    /// Scalar items of the list at `path` as text; nested items are skipped
    pub fn get_string_list(&self, path: &str) -> Option<Vec<String>> {
        match untag(self.get(path)?) {
            Value::Sequence(items) => Some(items.iter().filter_map(scalar_text).collect()),
            _ => None,
        }
    }

    /// A single character stored as a one-character string
    pub fn get_char(&self, path: &str) -> Option<char> {
        let text = match untag(self.get(path)?) {
            Value::String(s) => s,
            _ => return None,
        };
        let mut chars = text.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Some(c),
            _ => None,
        }
    }

    /// Owned copy of the section at `path`
    pub fn section(&self, path: &str) -> Option<Document> {
        match untag(self.get(path)?) {
            Value::Mapping(map) => Some(Document::from_mapping(map.clone(), self.separator)),
            _ => None,
        }
    }
}

fn is_blank(content: &str) -> bool {
    content.lines().all(|line| {
        let line = line.trim();
        line.is_empty() || line.starts_with('#') || line == "---"
    })
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Sequence(_) => "sequence",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged value",
    }
}

fn untag(value: &Value) -> &Value {
    match value {
        Value::Tagged(tagged) => untag(&tagged.value),
        other => other,
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match untag(value) {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Finds the key matching `segment`, including keys YAML parsed as numbers or booleans
fn resolve_key(map: &Mapping, segment: &str) -> Value {
    if map.contains_key(segment) {
        return Value::String(segment.to_string());
    }
    map.keys()
        .find(|key| scalar_text(key).as_deref() == Some(segment))
        .cloned()
        .unwrap_or_else(|| Value::String(segment.to_string()))
}

fn lookup<'a>(map: &'a Mapping, segment: &str) -> Option<&'a Value> {
    map.get(segment).or_else(|| {
        map.iter()
            .find(|(key, _)| scalar_text(key).as_deref() == Some(segment))
            .map(|(_, value)| value)
    })
}

fn insert_at(map: &mut Mapping, segments: &[&str], value: Value) {
    match segments {
        [] => {}
        [last] => {
            let key = resolve_key(map, last);
            map.insert(key, value);
        }
        [head, rest @ ..] => {
            let key = resolve_key(map, head);
            if !matches!(map.get(&key), Some(Value::Mapping(_))) {
                map.insert(key.clone(), Value::Mapping(Mapping::new()));
            }
            if let Some(Value::Mapping(child)) = map.get_mut(&key) {
                insert_at(child, rest, value);
            }
        }
    }
}

fn remove_at(map: &mut Mapping, segments: &[&str]) -> Option<Value> {
    match segments {
        [] => None,
        [last] => {
            let key = resolve_key(map, last);
            map.remove(&key)
        }
        [head, rest @ ..] => {
            let key = resolve_key(map, head);
            match map.get_mut(&key) {
                Some(Value::Mapping(child)) => remove_at(child, rest),
                _ => None,
            }
        }
    }
}

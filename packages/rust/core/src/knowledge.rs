//! Knowledge file loader.
//!
//! The knowledge file is a flat JSON object mapping lowercase keywords to
//! free-text descriptions. It is read once at startup and never modified.
//! Entry order is the order keys appear in the file.

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{info, instrument};

use tecnobot_shared::{ChatbotError, Result};

/// Immutable keyword → text mapping in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KnowledgeBase {
    entries: Vec<(String, String)>,
    source: Option<PathBuf>,
}

impl KnowledgeBase {
    /// Build a mapping from in-memory pairs. Later duplicates replace the
    /// earlier value but keep the earlier position.
    pub fn from_entries<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let mut kb = Self::default();
        for (key, text) in entries {
            kb.insert(key.into(), text.into());
        }
        kb
    }

    /// Read and parse the knowledge file at `path`.
    ///
    /// A missing file and a file that is not a JSON object of strings are
    /// reported as distinct errors; both are fatal for the caller.
    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ChatbotError::KnowledgeNotFound {
                path: path.to_path_buf(),
            },
            std::io::ErrorKind::InvalidData => {
                ChatbotError::malformed(path, format!("not valid UTF-8: {e}"))
            }
            _ => ChatbotError::io(path, e),
        })?;

        let mut kb = Self::parse(&content, path)?;
        kb.source = Some(path.to_path_buf());

        info!(entries = kb.len(), "knowledge base loaded");
        Ok(kb)
    }

    /// Parse knowledge JSON. `origin` is only used in error messages.
    pub fn parse(content: &str, origin: &Path) -> Result<Self> {
        let value: Value = serde_json::from_str(content)
            .map_err(|e| ChatbotError::malformed(origin, format!("invalid JSON: {e}")))?;

        let Value::Object(map) = value else {
            return Err(ChatbotError::malformed(
                origin,
                "top level must be a JSON object of keyword → text",
            ));
        };

        let mut kb = Self::default();
        for (key, value) in map {
            match value {
                Value::String(text) => kb.insert(key, text),
                other => {
                    return Err(ChatbotError::malformed(
                        origin,
                        format!("value for key '{key}' must be a string, found {}", kind(&other)),
                    ));
                }
            }
        }
        Ok(kb)
    }

    fn insert(&mut self, key: String, text: String) {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = text,
            None => self.entries.push((key, text)),
        }
    }

    /// Exact-key lookup.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, text)| text.as_str())
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Keywords in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// File this mapping was loaded from, if any.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

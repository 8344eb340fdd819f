#![allow(clippy::module_name_repetitions)]
//! Variables for build routines: YAML/JSON sources merged in order.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::errors::VarsError;
use crate::logging::Logger;

pub type Mapping = Map<String, Value>;

/// Merged variables; a later source replaces earlier values key by key
/// (top level only).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Variables(Mapping);

impl Variables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn merge(&mut self, mapping: Mapping) {
        for (k, v) in mapping {
            self.0.insert(k, v);
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.0.insert(key.into(), value);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn as_map(&self) -> &Mapping {
        &self.0
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl From<Mapping> for Variables {
    fn from(m: Mapping) -> Self {
        Self(m)
    }
}

/// Parses YAML/JSON text into mappings. File contents are cached per path.
pub struct DataLoader {
    cache: HashMap<PathBuf, Vec<Mapping>>,
    log: Logger,
}

impl DataLoader {
    pub fn new(log: &Logger) -> Self {
        Self {
            cache: HashMap::new(),
            log: log.component("vars"),
        }
    }

    /// JSON first (an object, or an array of objects), then YAML with one
    /// mapping per non-null document. Empty input yields no mappings.
    pub fn parse(&self, text: &str) -> Result<Vec<Mapping>, String> {
        if text.trim().is_empty() {
            self.log
                .in_scope(|| warn!("empty data passed to the variables loader"));
            return Ok(Vec::new());
        }

        if let Ok(v) = serde_json::from_str::<Value>(text) {
            return match v {
                Value::Object(m) => Ok(vec![m]),
                Value::Array(items) => items
                    .into_iter()
                    .map(|item| match item {
                        Value::Object(m) => Ok(m),
                        other => Err(format!("expected a mapping, found {}", kind(&other))),
                    })
                    .collect(),
                other => Err(format!("expected a mapping, found {}", kind(&other))),
            };
        }

        let mut out = Vec::new();
        for doc in serde_yaml::Deserializer::from_str(text) {
            let v = Value::deserialize(doc).map_err(|e| e.to_string())?;
            match v {
                Value::Null => continue,
                Value::Object(m) => out.push(m),
                other => return Err(format!("expected a mapping, found {}", kind(&other))),
            }
        }
        Ok(out)
    }

    pub fn load_inline(&self, text: &str) -> Result<Vec<Mapping>, VarsError> {
        self.parse(text)
            .map_err(|detail| VarsError::Inline { detail })
    }

    pub fn load_file(&mut self, path: &Path) -> Result<Vec<Mapping>, VarsError> {
        if !path.is_file() {
            return Err(VarsError::Missing {
                path: path.to_path_buf(),
            });
        }
        if let Some(cached) = self.cache.get(path) {
            return Ok(cached.clone());
        }
        let text = fs::read_to_string(path).map_err(|source| VarsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let parsed = self.parse(&text).map_err(|detail| VarsError::File {
            path: path.to_path_buf(),
            detail,
        })?;
        self.log
            .in_scope(|| debug!(path = %path.display(), documents = parsed.len(), "variables file loaded"));
        self.cache.insert(path.to_path_buf(), parsed.clone());
        Ok(parsed)
    }

    /// A source naming an existing file is read from disk; anything else is
    /// parsed as inline YAML/JSON.
    pub fn load_source(&mut self, source: &str) -> Result<Vec<Mapping>, VarsError> {
        let path = Path::new(source);
        if path.is_file() {
            self.load_file(path)
        } else {
            self.load_inline(source)
        }
    }

    /// Load and merge every source in order.
    pub fn load_all<S: AsRef<str>>(&mut self, sources: &[S]) -> Result<Variables, VarsError> {
        let mut vars = Variables::new();
        for s in sources {
            for m in self.load_source(s.as_ref())? {
                vars.merge(m);
            }
        }
        Ok(vars)
    }
}

fn kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a sequence",
        Value::Object(_) => "a mapping",
    }
}

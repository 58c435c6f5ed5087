//! Flattening of nested documents into a flat path space
//!
//! Every node of the document becomes one entry of a [`ConfigMap`]:
//!
//! - scalars are stored at their path in string form
//! - mappings and sequences get an empty entry at their own path so interior
//!   nodes stay addressable
//! - a sequence at `p` also records its length at `p.#` and stores element
//!   `i` at `p.#i`
//!
//! ```text
//! app:                 app          = ""
//!   name: svc    =>    app.name     = "svc"
//!   ports: [80]        app.ports    = ""
//!                      app.ports.#  = "1"
//!                      app.ports.#0 = "80"
//! ```

use std::collections::btree_map;
use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::path::Path;
use crate::value::Value;

/// Flat mapping from configuration path to string value
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ConfigMap {
    entries: BTreeMap<Path, String>,
}

impl ConfigMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the value at `path`, returning the previous value
    pub fn insert(&mut self, path: Path, value: impl Into<String>) -> Option<String> {
        self.entries.insert(path, value.into())
    }

    pub fn get(&self, path: &Path) -> Option<&str> {
        self.entries.get(path).map(String::as_str)
    }

    /// Case-insensitive membership test
    pub fn contains(&self, path: &Path) -> bool {
        self.entries.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in path order
    pub fn iter(&self) -> btree_map::Iter<'_, Path, String> {
        self.entries.iter()
    }

    pub fn keys(&self) -> btree_map::Keys<'_, Path, String> {
        self.entries.keys()
    }

    pub fn values_mut(&mut self) -> btree_map::ValuesMut<'_, Path, String> {
        self.entries.values_mut()
    }

    /// Distinct first segments of all keys, in path order.
    ///
    /// Segments that differ only in case count once; blank segments are skipped.
    pub fn top_level_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = Vec::new();
        for path in self.entries.keys() {
            let first = path.first().trim();
            if first.is_empty() {
                continue;
            }
            if !keys.iter().any(|k| Path::new(k) == Path::new(first)) {
                keys.push(first.to_string());
            }
        }
        keys
    }

    /// Pretty JSON rendering, used in diagnostics
    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|e| format!("<unprintable: {}>", e))
    }
}

impl<'a> IntoIterator for &'a ConfigMap {
    type Item = (&'a Path, &'a String);
    type IntoIter = btree_map::Iter<'a, Path, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Flatten a document's top-level mapping.
///
/// Top-level keys become first segments; no entry is written for the
/// (nameless) document itself.
pub fn flatten(document: &IndexMap<String, Value>) -> Result<ConfigMap> {
    let mut map = ConfigMap::new();
    for (key, value) in document {
        flatten_value(&Path::new(key), value, &mut map)?;
    }
    Ok(map)
}

/// Flatten `value` into `map` under `prefix`
pub fn flatten_value(prefix: &Path, value: &Value, map: &mut ConfigMap) -> Result<()> {
    let encoded = match value {
        Value::Bool(b) => b.to_string(),
        Value::Integer(i) => i.to_string(),
        Value::Unsigned(u) => u.to_string(),
        Value::Float(f) => f.to_string(),
        Value::String(s) => s.clone(),
        Value::Mapping(children) => {
            for (key, child) in children {
                flatten_value(&prefix.join(key.as_str()), child, map)?;
            }
            String::new()
        }
        Value::Sequence(items) => {
            map.insert(prefix.collection_marker(), items.len().to_string());
            for (i, item) in items.iter().enumerate() {
                flatten_value(&prefix.element(i), item, map)?;
            }
            String::new()
        }
        Value::Null => {
            return Err(Error::unsupported_leaf(
                prefix.as_str(),
                value.type_name(),
                map.to_json_pretty(),
            ))
        }
    };

    map.insert(prefix.clone(), encoded);
    Ok(())
}

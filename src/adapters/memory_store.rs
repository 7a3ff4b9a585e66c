// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory layered store.
//!
//! This is the default [`ConfigStore`] used by `Configuration`. It keeps each
//! source as a separate layer so precedence is decided at read time.

use crate::domain::tree::{insert_path, lookup, merge_under};
use crate::domain::{ConfigError, ConfigKey, Result};
use crate::ports::ConfigStore;
use serde_json::{Map, Value};

#[derive(Debug, Clone)]
struct Layer {
    name: String,
    contents: Map<String, Value>,
}

/// Layered store backed by JSON objects.
///
/// # Examples
///
/// ```rust
/// use tiercfg::adapters::MemoryStore;
/// use tiercfg::domain::ConfigKey;
/// use tiercfg::ports::ConfigStore;
/// use serde_json::json;
///
/// let mut store = MemoryStore::new();
/// store.add_layer("env", json!({"port": "8080"})).unwrap();
/// store.set(&ConfigKey::from("port"), json!(9090));
/// assert_eq!(store.get(&ConfigKey::from("port")), Some(json!(9090)));
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    memory: Map<String, Value>,
    layers: Vec<Layer>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn tiers(&self) -> impl Iterator<Item = &Map<String, Value>> {
        std::iter::once(&self.memory).chain(self.layers.iter().map(|layer| &layer.contents))
    }
}

impl ConfigStore for MemoryStore {
    fn set(&mut self, key: &ConfigKey, value: Value) {
        if key.is_root() {
            if let Value::Object(map) = value {
                self.memory = map;
            }
            return;
        }
        insert_path(&mut self.memory, &key.segments(), value);
    }

    fn get(&self, key: &ConfigKey) -> Option<Value> {
        if key.is_root() {
            return Some(self.load_all());
        }
        let segments = key.segments();
        let mut merged: Option<Map<String, Value>> = None;
        for tier in self.tiers() {
            match lookup(tier, &segments) {
                None => {}
                Some(Value::Object(found)) => {
                    if let Some(acc) = merged.as_mut() {
                        merge_under(acc, found);
                    } else {
                        merged = Some(found.clone());
                    }
                }
                // A scalar below an object that was already found is shadowed.
                Some(scalar) => {
                    if merged.is_none() {
                        return Some(scalar.clone());
                    }
                }
            }
        }
        merged.map(Value::Object)
    }

    fn add_layer(&mut self, name: &str, contents: Value) -> Result<()> {
        let Value::Object(contents) = contents else {
            return Err(ConfigError::invalid_settings(format!(
                "layer '{}' must be an object",
                name
            )));
        };
        match self.layers.iter_mut().find(|layer| layer.name == name) {
            Some(layer) => layer.contents = contents,
            None => self.layers.push(Layer {
                name: name.to_string(),
                contents,
            }),
        }
        tracing::debug!("Added store layer '{}'", name);
        Ok(())
    }

    fn layer_names(&self) -> Vec<String> {
        self.layers.iter().map(|layer| layer.name.clone()).collect()
    }

    fn load_all(&self) -> Value {
        let mut merged = Map::new();
        for tier in self.tiers() {
            merge_under(&mut merged, tier);
        }
        Value::Object(merged)
    }

    fn clear(&mut self) {
        self.memory.clear();
        self.layers.clear();
    }
}

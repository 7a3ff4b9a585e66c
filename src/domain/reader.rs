// SPDX-License-Identifier: MIT OR Apache-2.0

//! Read-only accessors over a resolved store.
//!
//! [`ConfigReader`] is the interface handed to anything that consumes
//! configuration without taking part in resolution: model projectors, web
//! framework glue, application code. Implementors only provide
//! [`ConfigReader::store`]; every accessor is derived from it.

use crate::domain::model::ModelShape;
use crate::domain::tree::lookup;
use crate::domain::{ConfigError, ConfigKey, ConfigValue, Result};
use crate::ports::ConfigStore;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_json::{Map, Value};

static PLACEHOLDER: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"\$\{\s*([^}\s]+)\s*\}").ok());

/// A key to read and the name to expose it under in [`ConfigReader::get_object`].
#[derive(Clone, Debug, PartialEq)]
pub struct KeyMapping {
    from: ConfigKey,
    to: String,
}

impl KeyMapping {
    /// Maps `from` to the output field `to`.
    pub fn new(from: impl Into<ConfigKey>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

impl From<&str> for KeyMapping {
    fn from(key: &str) -> Self {
        KeyMapping::new(key, key)
    }
}

impl From<(&str, &str)> for KeyMapping {
    fn from((from, to): (&str, &str)) -> Self {
        KeyMapping::new(from, to)
    }
}

/// Read-only access to resolved configuration.
///
/// # Examples
///
/// ```rust
/// use tiercfg::adapters::MemoryStore;
/// use tiercfg::domain::{ConfigReader, Getter};
/// use tiercfg::ports::ConfigStore;
/// use serde_json::json;
///
/// let mut store = MemoryStore::new();
/// store.add_layer("defaults", json!({"server": {"host": "localhost", "port": 3000}})).unwrap();
///
/// let get = Getter::new(&store);
/// assert_eq!(get.get("server.host"), Some(json!("localhost")));
/// assert_eq!(get.get_or("server:tls", json!(false)), json!(false));
/// assert_eq!(get.template("${server:host}:${server:port}"), "localhost:3000");
/// ```
pub trait ConfigReader {
    /// The store the accessors read from.
    fn store(&self) -> &dyn ConfigStore;

    /// Reads a value.
    fn get<K: Into<ConfigKey>>(&self, key: K) -> Option<Value> {
        self.store().get(&key.into())
    }

    /// Reads a value, falling back to `default` when absent.
    fn get_or<K: Into<ConfigKey>>(&self, key: K, default: Value) -> Value {
        self.get(key).unwrap_or(default)
    }

    /// Returns the value of the first key that is defined.
    fn get_first<I, K>(&self, keys: I) -> Option<Value>
    where
        I: IntoIterator<Item = K>,
        K: Into<ConfigKey>,
    {
        keys.into_iter().find_map(|key| self.get(key))
    }

    /// Like [`ConfigReader::get_first`], with a fallback.
    fn get_first_or<I, K>(&self, keys: I, default: Value) -> Value
    where
        I: IntoIterator<Item = K>,
        K: Into<ConfigKey>,
    {
        self.get_first(keys).unwrap_or(default)
    }

    /// Reads every key, keeping the order.
    fn get_all<I, K>(&self, keys: I) -> Vec<Option<Value>>
    where
        I: IntoIterator<Item = K>,
        K: Into<ConfigKey>,
    {
        keys.into_iter().map(|key| self.get(key)).collect()
    }

    /// Builds an object from the given keys. Absent keys are omitted.
    ///
    /// ```rust
    /// # use tiercfg::adapters::MemoryStore;
    /// # use tiercfg::domain::{ConfigReader, Getter};
    /// # use tiercfg::ports::ConfigStore;
    /// # use serde_json::json;
    /// # let mut store = MemoryStore::new();
    /// # store.add_layer("defaults", json!({"a": 1, "b": {"c": 2}})).unwrap();
    /// let get = Getter::new(&store);
    /// let obj = get.get_object(["a", "missing"].into_iter().chain(std::iter::once("b:c")));
    /// assert_eq!(serde_json::Value::Object(obj), json!({"a": 1, "b:c": 2}));
    ///
    /// let renamed = get.get_object([("b:c", "c")]);
    /// assert_eq!(serde_json::Value::Object(renamed), json!({"c": 2}));
    /// ```
    fn get_object<I, M>(&self, mappings: I) -> Map<String, Value>
    where
        I: IntoIterator<Item = M>,
        M: Into<KeyMapping>,
    {
        mappings
            .into_iter()
            .filter_map(|mapping| {
                let mapping = mapping.into();
                self.get(&mapping.from).map(|value| (mapping.to, value))
            })
            .collect()
    }

    /// Returns the whole merged configuration.
    fn load(&self) -> Value {
        self.store().load_all()
    }

    /// Projects a declarative model shape.
    fn load_model(&self, shape: &ModelShape) -> Value
    where
        Self: Sized,
    {
        shape.project(self)
    }

    /// Substitutes every `${key}` placeholder. Absent keys render empty,
    /// strings render raw and other values render as JSON.
    fn template(&self, text: &str) -> String {
        self.template_with(text, &Value::Null)
    }

    /// Like [`ConfigReader::template`], reading absent keys from `defaults`
    /// (an object addressed with the same key paths).
    fn template_with(&self, text: &str, defaults: &Value) -> String {
        let Some(re) = PLACEHOLDER.as_ref() else {
            return text.to_string();
        };
        re.replace_all(text, |caps: &Captures<'_>| {
            let key = ConfigKey::from(&caps[1]);
            let fallback = || match defaults {
                Value::Object(map) => lookup(map, &key.segments()).cloned(),
                _ => None,
            };
            match self.get(&key).or_else(fallback) {
                Some(Value::String(s)) => s,
                Some(Value::Null) | None => String::new(),
                Some(other) => other.to_string(),
            }
        })
        .into_owned()
    }

    /// Reads a value as a [`ConfigValue`] for typed conversion.
    ///
    /// # Errors
    ///
    /// Returns `ConfigKeyNotFound` when the key is absent.
    fn value<K: Into<ConfigKey>>(&self, key: K) -> Result<ConfigValue> {
        let key = key.into();
        self.get(&key)
            .map(ConfigValue::new)
            .ok_or_else(|| ConfigError::ConfigKeyNotFound {
                key: key.into_string(),
            })
    }
}

/// A borrowed reader over any store, handed to model projectors.
#[derive(Clone, Copy)]
pub struct Getter<'a> {
    store: &'a dyn ConfigStore,
}

impl<'a> Getter<'a> {
    /// Wraps a store.
    pub fn new(store: &'a dyn ConfigStore) -> Self {
        Self { store }
    }
}

impl ConfigReader for Getter<'_> {
    fn store(&self) -> &dyn ConfigStore {
        self.store
    }
}

impl std::fmt::Debug for Getter<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Getter")
            .field("layers", &self.store.layer_names())
            .finish()
    }
}

// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration store trait definition.
//!
//! A store holds one named layer per configuration source plus a writable
//! memory tier. Reads consult the memory tier first, then the layers in the
//! order they were added, so the first source that defines a key wins.

use crate::domain::{ConfigError, ConfigKey, Result};
use serde_json::Value;

/// A trait for the nested key/value store that resolution writes into.
///
/// Keys are [`ConfigKey`] paths (`database:host`). Object values found on
/// several tiers are merged on read, scalars are taken from the first tier
/// that defines them.
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
/// store.add_layer("files", json!({"db": {"host": "file-host", "port": 5432}})).unwrap();
/// store.add_layer("defaults", json!({"db": {"host": "default-host", "user": "app"}})).unwrap();
///
/// assert_eq!(store.get(&ConfigKey::from("db:host")), Some(json!("file-host")));
/// assert_eq!(
///     store.get(&ConfigKey::from("db")),
///     Some(json!({"host": "file-host", "port": 5432, "user": "app"}))
/// );
/// ```
pub trait ConfigStore: Send + Sync {
    /// Writes a value into the memory tier, above every layer.
    fn set(&mut self, key: &ConfigKey, value: Value);

    /// Reads a value. Returns `None` when no tier defines the key.
    fn get(&self, key: &ConfigKey) -> Option<Value>;

    /// Adds a named layer below the existing ones. When a layer with the same
    /// name already exists its contents are replaced in place.
    ///
    /// # Errors
    ///
    /// Returns `InvalidSettings` when `contents` is not an object.
    fn add_layer(&mut self, name: &str, contents: Value) -> Result<()>;

    /// Names of the layers, highest precedence first.
    fn layer_names(&self) -> Vec<String>;

    /// Returns the merged view of every tier as one object.
    fn load_all(&self) -> Value;

    /// Removes the memory tier and every layer.
    fn clear(&mut self);

    /// Checks that every key resolves. A key holding `null` counts as present.
    ///
    /// # Errors
    ///
    /// Returns `MissingRequiredKeys` listing the absent keys in order.
    fn require_keys(&self, keys: &[ConfigKey]) -> Result<()> {
        let missing: Vec<String> = keys
            .iter()
            .filter(|key| self.get(key).is_none())
            .map(|key| key.to_string())
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::MissingRequiredKeys { keys: missing })
        }
    }
}

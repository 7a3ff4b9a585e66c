// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration key newtype for type-safe key handling.
//!
//! Keys address a path in the nested configuration tree. Path segments are
//! joined with `:` (for example `database:host`). For convenience, a key
//! written with `.` and no `:` is read as a path as well, so `database.host`
//! and `database:host` name the same value.

use std::fmt;
use std::hash::{Hash, Hasher};

/// A type-safe wrapper for configuration key paths.
///
/// # Examples
///
/// ```
/// use tiercfg::domain::config_key::ConfigKey;
///
/// let key = ConfigKey::from("database.host");
/// assert_eq!(key.as_str(), "database:host");
/// assert_eq!(key.segments(), vec!["database", "host"]);
///
/// let key = ConfigKey::from(["server", "port"].as_slice());
/// assert_eq!(key.as_str(), "server:port");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct ConfigKey(String);

impl ConfigKey {
    /// Separator between path segments in the canonical key form.
    pub const SEPARATOR: char = ':';

    /// Creates a new `ConfigKey` from a `String`, keeping it exactly as given.
    ///
    /// Unlike the `From` conversions, dots are not turned into path separators.
    ///
    /// # Examples
    ///
    /// ```
    /// use tiercfg::domain::config_key::ConfigKey;
    ///
    /// let key = ConfigKey::new("app.name".to_string());
    /// assert_eq!(key.segments(), vec!["app.name"]);
    /// ```
    pub fn new(key: String) -> Self {
        ConfigKey(key)
    }

    /// Builds a key by joining path segments with `:`.
    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let joined = segments
            .into_iter()
            .map(|s| s.as_ref().to_string())
            .collect::<Vec<_>>()
            .join(":");
        ConfigKey(joined)
    }

    /// Returns the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the path segments of the key. The empty key has no segments
    /// and addresses the whole tree.
    pub fn segments(&self) -> Vec<&str> {
        if self.0.is_empty() {
            Vec::new()
        } else {
            self.0.split(Self::SEPARATOR).collect()
        }
    }

    /// Returns true for the empty key.
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Converts the `ConfigKey` into its inner `String`.
    pub fn into_string(self) -> String {
        self.0
    }
}

/// Rewrites user facing keys into the canonical `:` path form.
///
/// A key without `:` has every `.` turned into a separator, so `a.b.c` is the
/// path `a:b:c` rather than `a:b.c`. Keys that already contain `:` are kept.
fn format_key(key: &str) -> String {
    if key.contains('.') && !key.contains(ConfigKey::SEPARATOR) {
        key.replace('.', ":")
    } else {
        key.to_string()
    }
}

impl From<String> for ConfigKey {
    fn from(s: String) -> Self {
        ConfigKey(format_key(&s))
    }
}

impl From<&String> for ConfigKey {
    fn from(s: &String) -> Self {
        ConfigKey(format_key(s))
    }
}

impl From<&str> for ConfigKey {
    fn from(s: &str) -> Self {
        ConfigKey(format_key(s))
    }
}

impl From<&[&str]> for ConfigKey {
    fn from(segments: &[&str]) -> Self {
        ConfigKey::from_segments(segments)
    }
}

impl From<Vec<String>> for ConfigKey {
    fn from(segments: Vec<String>) -> Self {
        ConfigKey::from_segments(segments)
    }
}

impl From<&ConfigKey> for ConfigKey {
    fn from(key: &ConfigKey) -> Self {
        key.clone()
    }
}

impl From<ConfigKey> for String {
    fn from(key: ConfigKey) -> Self {
        key.0
    }
}

impl AsRef<str> for ConfigKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Hash for ConfigKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_config_key_new_is_literal() {
        let key = ConfigKey::new("test.key".to_string());
        assert_eq!(key.as_str(), "test.key");
        assert_eq!(key.segments(), vec!["test.key"]);
    }

    #[test]
    fn test_plain_keys_are_untouched() {
        assert_eq!(ConfigKey::from("toto").as_str(), "toto");
        assert_eq!(ConfigKey::from("titi-toto").as_str(), "titi-toto");
    }

    #[test]
    fn test_colon_keys_are_untouched() {
        assert_eq!(ConfigKey::from("toto:titi").as_str(), "toto:titi");
        assert_eq!(ConfigKey::from("a.b:c").as_str(), "a.b:c");
    }

    #[test]
    fn test_dotted_keys_become_paths() {
        assert_eq!(ConfigKey::from("toto.titi").as_str(), "toto:titi");
        assert_eq!(
            ConfigKey::from("database.connection.host".to_string()).as_str(),
            "database:connection:host"
        );
    }

    #[test]
    fn test_segment_arrays_are_joined() {
        let key = ConfigKey::from(["toto", "titi"].as_slice());
        assert_eq!(key.as_str(), "toto:titi");

        let key = ConfigKey::from(vec!["a".to_string(), "b".to_string()]);
        assert_eq!(key.segments(), vec!["a", "b"]);
    }

    #[test]
    fn test_config_key_into_string() {
        let key = ConfigKey::from("test:key");
        assert_eq!(key.into_string(), "test:key");
    }

    #[test]
    fn test_config_key_display() {
        let key = ConfigKey::from("test:key");
        assert_eq!(format!("{}", key), "test:key");
    }

    #[test]
    fn test_config_key_hash() {
        let key1 = ConfigKey::from("test.key");
        let key2 = ConfigKey::from("test:key");
        let key3 = ConfigKey::from("other:key");

        let mut map = HashMap::new();
        map.insert(key1.clone(), "value1");

        assert_eq!(map.get(&key2), Some(&"value1"));
        assert_eq!(map.get(&key3), None);
    }

    #[test]
    fn test_config_key_empty_is_root() {
        let key = ConfigKey::from("");
        assert!(key.is_root());
        assert!(key.segments().is_empty());
    }
}

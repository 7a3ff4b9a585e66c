// SPDX-License-Identifier: MIT OR Apache-2.0

//! Java properties / INI codec.
//!
//! The format is line based:
//!
//! ```text
//! # comment
//! ; comment
//! ! comment
//! [server]
//! host = localhost
//! tls.enabled: true
//! ```
//!
//! A `[section]` header nests the following keys under `section`, and dots in
//! keys and section names nest further. Values are kept as strings.

use crate::domain::tree::insert_path;
use crate::domain::{ConfigError, Result};
use crate::ports::ConfigParser;
use serde_json::{Map, Value};

/// Properties parser implementation, registered for `.properties` and `.ini`.
///
/// # Examples
///
/// ```rust
/// use tiercfg::adapters::PropertiesParser;
/// use tiercfg::ports::ConfigParser;
///
/// let tree = PropertiesParser::new().parse("[db]\nhost = localhost\n").unwrap();
/// assert_eq!(tree["db"]["host"], "localhost");
/// ```
#[derive(Debug, Clone, Default)]
pub struct PropertiesParser;

impl PropertiesParser {
    /// Creates a new properties parser.
    pub fn new() -> Self {
        PropertiesParser
    }

    fn split_entry(line: &str) -> Option<(&str, &str)> {
        let at = line.find(['=', ':'])?;
        Some((line[..at].trim(), line[at + 1..].trim()))
    }

    fn flatten(value: &Value, prefix: &str, out: &mut Vec<(String, String)>) {
        match value {
            Value::Object(map) => {
                for (key, child) in map {
                    let path = if prefix.is_empty() {
                        key.clone()
                    } else {
                        format!("{}.{}", prefix, key)
                    };
                    Self::flatten(child, &path, out);
                }
            }
            Value::String(s) => out.push((prefix.to_string(), s.clone())),
            Value::Null => out.push((prefix.to_string(), String::new())),
            other => out.push((prefix.to_string(), other.to_string())),
        }
    }
}

impl ConfigParser for PropertiesParser {
    fn parse(&self, content: &str) -> Result<Value> {
        let mut root = Map::new();
        let mut section: Vec<String> = Vec::new();

        for (index, raw) in content.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with(['#', ';', '!']) {
                continue;
            }
            if let Some(name) = line.strip_prefix('[') {
                let name = name.strip_suffix(']').ok_or_else(|| ConfigError::ParseError {
                    message: format!("Unterminated section header on line {}", index + 1),
                    source: None,
                })?;
                section = name
                    .split('.')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect();
                continue;
            }
            let (key, value) = Self::split_entry(line).ok_or_else(|| ConfigError::ParseError {
                message: format!("Expected 'key = value' on line {}", index + 1),
                source: None,
            })?;
            if key.is_empty() {
                return Err(ConfigError::ParseError {
                    message: format!("Empty key on line {}", index + 1),
                    source: None,
                });
            }
            let path: Vec<&str> = section
                .iter()
                .map(String::as_str)
                .chain(key.split('.'))
                .collect();
            insert_path(&mut root, &path, Value::String(value.to_string()));
        }

        Ok(Value::Object(root))
    }

    fn stringify(&self, value: &Value) -> Result<String> {
        let mut entries = Vec::new();
        Self::flatten(value, "", &mut entries);
        Ok(entries
            .into_iter()
            .map(|(key, value)| format!("{} = {}\n", key, value))
            .collect())
    }

    fn supported_extensions(&self) -> &[&str] {
        &["properties", "ini"]
    }
}

// SPDX-License-Identifier: MIT OR Apache-2.0

//! JSON codec.

use crate::domain::{ConfigError, Result};
use crate::ports::ConfigParser;
use serde_json::Value;

/// JSON parser implementation, also used for unknown extensions.
///
/// # Examples
///
/// ```rust
/// use tiercfg::adapters::JsonParser;
/// use tiercfg::ports::ConfigParser;
///
/// let parser = JsonParser::new();
/// let tree = parser.parse(r#"{"database": {"port": 5432}}"#).unwrap();
/// assert_eq!(tree["database"]["port"], 5432);
/// ```
#[derive(Debug, Clone, Default)]
pub struct JsonParser;

impl JsonParser {
    /// Creates a new JSON parser.
    pub fn new() -> Self {
        JsonParser
    }
}

impl ConfigParser for JsonParser {
    fn parse(&self, content: &str) -> Result<Value> {
        serde_json::from_str(content).map_err(|e| ConfigError::ParseError {
            message: format!("Failed to parse JSON: {}", e),
            source: Some(Box::new(e)),
        })
    }

    fn stringify(&self, value: &Value) -> Result<String> {
        serde_json::to_string_pretty(value).map_err(|e| ConfigError::ParseError {
            message: format!("Failed to render JSON: {}", e),
            source: Some(Box::new(e)),
        })
    }

    fn supported_extensions(&self) -> &[&str] {
        &["json"]
    }
}

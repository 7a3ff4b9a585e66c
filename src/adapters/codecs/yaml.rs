// SPDX-License-Identifier: MIT OR Apache-2.0

//! YAML codec.

use crate::domain::{ConfigError, Result};
use crate::ports::ConfigParser;
use serde_json::Value;

/// YAML parser implementation.
///
/// YAML documents are read straight into the JSON tree type, so mappings with
/// non-string keys are rejected.
///
/// # Examples
///
/// ```rust
/// use tiercfg::adapters::YamlParser;
/// use tiercfg::ports::ConfigParser;
///
/// let parser = YamlParser::new();
/// let yaml_content = "database:\n  host: localhost\n  port: 5432";
/// let tree = parser.parse(yaml_content).unwrap();
/// assert_eq!(tree["database"]["host"], "localhost");
/// assert_eq!(tree["database"]["port"], 5432);
/// ```
#[derive(Debug, Clone, Default)]
pub struct YamlParser;

impl YamlParser {
    /// Creates a new YAML parser.
    pub fn new() -> Self {
        YamlParser
    }
}

impl ConfigParser for YamlParser {
    fn parse(&self, content: &str) -> Result<Value> {
        serde_yaml::from_str(content).map_err(|e| ConfigError::ParseError {
            message: format!("Failed to parse YAML: {}", e),
            source: Some(Box::new(e)),
        })
    }

    fn stringify(&self, value: &Value) -> Result<String> {
        serde_yaml::to_string(value).map_err(|e| ConfigError::ParseError {
            message: format!("Failed to render YAML: {}", e),
            source: Some(Box::new(e)),
        })
    }

    fn supported_extensions(&self) -> &[&str] {
        &["yaml", "yml"]
    }
}

// SPDX-License-Identifier: MIT OR Apache-2.0

//! JSON5 codec.

use crate::domain::{ConfigError, Result};
use crate::ports::ConfigParser;
use serde_json::Value;

/// JSON5 parser implementation: comments, trailing commas, unquoted keys.
///
/// # Examples
///
/// ```rust
/// use tiercfg::adapters::Json5Parser;
/// use tiercfg::ports::ConfigParser;
///
/// let tree = Json5Parser::new().parse("{ port: 80, /* web */ }").unwrap();
/// assert_eq!(tree["port"], 80);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Json5Parser;

impl Json5Parser {
    /// Creates a new JSON5 parser.
    pub fn new() -> Self {
        Json5Parser
    }
}

impl ConfigParser for Json5Parser {
    fn parse(&self, content: &str) -> Result<Value> {
        json5::from_str(content).map_err(|e| ConfigError::ParseError {
            message: format!("Failed to parse JSON5: {}", e),
            source: Some(Box::new(e)),
        })
    }

    fn stringify(&self, value: &Value) -> Result<String> {
        json5::to_string(value).map_err(|e| ConfigError::ParseError {
            message: format!("Failed to render JSON5: {}", e),
            source: Some(Box::new(e)),
        })
    }

    fn supported_extensions(&self) -> &[&str] {
        &["json5"]
    }
}

// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration file codec trait definition.
//!
//! This module defines the `ConfigParser` trait, which provides an interface for
//! reading and writing configuration files in different formats (JSON, YAML,
//! Java properties, JSON5).

use crate::domain::Result;
use serde_json::Value;
use std::fmt::Debug;

/// A trait for configuration file codecs.
///
/// A codec turns file text into a nested JSON tree and back. The file loader
/// selects a codec by matching the file extension against
/// [`ConfigParser::supported_extensions`], unless the file names one explicitly.
///
/// # Examples
///
/// ```rust
/// use tiercfg::ports::ConfigParser;
/// use tiercfg::domain::Result;
/// use serde_json::{json, Value};
///
/// #[derive(Debug)]
/// struct LineParser;
///
/// impl ConfigParser for LineParser {
///     fn parse(&self, content: &str) -> Result<Value> {
///         let lines: Vec<Value> = content.lines().map(|l| json!(l)).collect();
///         Ok(json!({ "lines": lines }))
///     }
///
///     fn stringify(&self, value: &Value) -> Result<String> {
///         Ok(value.to_string())
///     }
///
///     fn supported_extensions(&self) -> &[&str] {
///         &["lines"]
///     }
/// }
///
/// let tree = LineParser.parse("a\nb").unwrap();
/// assert_eq!(tree["lines"][1], "b");
/// ```
pub trait ConfigParser: Send + Sync + Debug {
    /// Parses file content into a tree.
    ///
    /// # Errors
    ///
    /// Returns `ParseError` when the content is not valid for the format.
    fn parse(&self, content: &str) -> Result<Value>;

    /// Renders a tree back into the format.
    fn stringify(&self, value: &Value) -> Result<String>;

    /// File extensions, without the leading dot, handled by this codec.
    fn supported_extensions(&self) -> &[&str];
}

// SPDX-License-Identifier: MIT OR Apache-2.0

//! Command-line argument parser trait definition.
//!
//! The argv loader hands the raw argument list (program name excluded) to an
//! `ArgumentParser` and receives a flat object of option names to values.
//! Positional arguments are reported under the `_` key.

use crate::domain::Result;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::fmt::Debug;

/// A trait for turning raw command-line arguments into a flat object.
///
/// # Examples
///
/// ```rust
/// use tiercfg::ports::ArgumentParser;
/// use tiercfg::domain::Result;
/// use serde_json::{json, Map, Value};
///
/// /// Treats every argument as a flag set to true.
/// #[derive(Debug)]
/// struct FlagsOnly;
///
/// impl ArgumentParser for FlagsOnly {
///     fn parse(&self, args: &[String]) -> Result<Map<String, Value>> {
///         Ok(args.iter().map(|a| (a.trim_start_matches('-').to_string(), json!(true))).collect())
///     }
/// }
///
/// let parsed = FlagsOnly.parse(&["--verbose".to_string()]).unwrap();
/// assert_eq!(parsed["verbose"], json!(true));
/// ```
pub trait ArgumentParser: Send + Sync + Debug {
    /// Parses the arguments.
    ///
    /// # Errors
    ///
    /// Returns `SourceError` when the arguments are rejected.
    fn parse(&self, args: &[String]) -> Result<Map<String, Value>>;
}

/// Value kind of a declared option.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArgKind {
    /// Kept as text.
    #[default]
    String,
    /// Parsed as a JSON number.
    Number,
    /// A flag; takes no value unless written `--flag=value`.
    Boolean,
}

/// Declaration of one option for the schema driven argv parser.
///
/// Undeclared options are still accepted; a declaration only adds aliases, a
/// value kind and a default.
///
/// ```rust
/// use tiercfg::ports::{ArgKind, ArgSpec};
/// use serde_json::json;
///
/// let spec = ArgSpec::new("port").alias("p").kind(ArgKind::Number).default_value(json!(8080));
/// assert_eq!(spec.name(), "port");
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct ArgSpec {
    name: String,
    aliases: Vec<String>,
    kind: ArgKind,
    default: Option<Value>,
}

impl ArgSpec {
    /// Declares an option of kind string with no alias or default.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            aliases: Vec::new(),
            kind: ArgKind::default(),
            default: None,
        }
    }

    /// Adds an alias, typically a single letter used as `-p`.
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    /// Sets the value kind.
    pub fn kind(mut self, kind: ArgKind) -> Self {
        self.kind = kind;
        self
    }

    /// Sets the value used when the option is absent.
    pub fn default_value(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    /// The canonical option name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The aliases.
    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    /// The value kind.
    pub fn value_kind(&self) -> ArgKind {
        self.kind
    }

    /// The default value.
    pub fn default(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    pub(crate) fn answers_to(&self, name: &str) -> bool {
        self.name == name || self.aliases.iter().any(|alias| alias == name)
    }
}

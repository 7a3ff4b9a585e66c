// SPDX-License-Identifier: MIT OR Apache-2.0

//! Key transformation pipeline.
//!
//! Keys read from the command line and from environment variables rarely match
//! the shape applications want to query (`MY_APP_DB_HOST` vs `db:host`). The
//! pipeline rewrites every key/value pair from those sources through a fixed
//! sequence of stages:
//!
//! 1. strip each configured prefix (`ignore_prefix`),
//! 2. run the user transforms, in order,
//! 3. normalize the key case, segment by segment when a separator is set.
//!
//! The key `_`, which holds positional arguments, bypasses the whole pipeline.
//!
//! # Examples
//!
//! ```
//! use tiercfg::domain::transform::{Case, KeyPipeline, KeyTransformSettings, KeyValue};
//! use serde_json::json;
//!
//! let settings = KeyTransformSettings {
//!     ignore_prefix: vec!["MY_APP_".to_string()],
//!     normalize: Some(Case::CamelCase),
//!     ..Default::default()
//! };
//! let pipeline = KeyPipeline::from(&settings);
//! let out = pipeline.apply(KeyValue::new("MY_APP_one-two", json!("val")));
//! assert_eq!(out.key, "oneTwo");
//! ```

use heck::{ToKebabCase, ToLowerCamelCase, ToSnakeCase, ToTitleCase};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Key of the positional-arguments entry; never transformed.
pub const REST_KEY: &str = "_";

/// A key and its value, as seen by transform stages.
#[derive(Clone, Debug, PartialEq)]
pub struct KeyValue {
    /// The source key.
    pub key: String,
    /// The raw value.
    pub value: Value,
}

impl KeyValue {
    /// Creates a new pair.
    pub fn new(key: impl Into<String>, value: Value) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}

/// A user supplied rewrite of a key/value pair.
///
/// ```
/// use tiercfg::domain::transform::{KeyValue, Transform};
///
/// let upper = Transform::new(|kv: KeyValue| KeyValue::new(kv.key.to_uppercase(), kv.value));
/// assert_eq!(upper.apply(KeyValue::new("a", serde_json::Value::Null)).key, "A");
/// ```
#[derive(Clone)]
pub struct Transform(Arc<dyn Fn(KeyValue) -> KeyValue + Send + Sync>);

impl Transform {
    /// Wraps a closure.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(KeyValue) -> KeyValue + Send + Sync + 'static,
    {
        Transform(Arc::new(f))
    }

    /// Runs the transform.
    pub fn apply(&self, kv: KeyValue) -> KeyValue {
        (self.0)(kv)
    }
}

impl fmt::Debug for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Transform(<fn>)")
    }
}

/// Case conventions available for key normalization.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Case {
    /// `fooBar`
    CamelCase,
    /// `foo-bar`
    KebabCase,
    /// `Foo Bar`
    StartCase,
    /// `foo_bar`
    SnakeCase,
    /// `FOO BAR`
    UpperCase,
    /// `foo bar`
    LowerCase,
}

impl Case {
    /// Converts a single word group to this case.
    pub fn convert(&self, input: &str) -> String {
        match self {
            Case::CamelCase => input.to_lower_camel_case(),
            Case::KebabCase => input.to_kebab_case(),
            Case::StartCase => input.to_title_case(),
            Case::SnakeCase => input.to_snake_case(),
            Case::UpperCase => input.to_title_case().to_uppercase(),
            Case::LowerCase => input.to_title_case().to_lowercase(),
        }
    }
}

/// Separator between nesting levels in argv and env keys.
#[derive(Clone, Debug)]
pub enum Separator {
    /// A literal string such as `__`.
    Literal(String),
    /// A regular expression such as `_+`.
    Pattern(Regex),
}

impl Separator {
    /// Splits a key into its segments.
    pub fn split<'a>(&self, key: &'a str) -> Vec<&'a str> {
        match self {
            Separator::Literal(sep) => key.split(sep.as_str()).collect(),
            Separator::Pattern(re) => re.split(key).collect(),
        }
    }

    /// Returns the first separator text found in `key`.
    pub fn find<'a>(&'a self, key: &'a str) -> Option<&'a str> {
        match self {
            Separator::Literal(sep) => key.contains(sep.as_str()).then_some(sep.as_str()),
            Separator::Pattern(re) => re.find(key).map(|m| m.as_str()),
        }
    }

    /// Returns true for an empty literal or a pattern that matches the empty string.
    pub fn is_empty(&self) -> bool {
        match self {
            Separator::Literal(sep) => sep.is_empty(),
            Separator::Pattern(re) => re.is_match(""),
        }
    }
}

impl From<&str> for Separator {
    fn from(sep: &str) -> Self {
        Separator::Literal(sep.to_string())
    }
}

impl From<Regex> for Separator {
    fn from(re: Regex) -> Self {
        Separator::Pattern(re)
    }
}

/// Options describing the key pipeline.
#[derive(Clone, Debug, Default)]
pub struct KeyTransformSettings {
    /// Prefixes stripped from keys that start with them.
    pub ignore_prefix: Vec<String>,
    /// User transforms, applied in order after prefix stripping.
    pub transforms: Vec<Transform>,
    /// Case applied last.
    pub normalize: Option<Case>,
    /// Nesting separator for argv and env keys.
    pub separator: Option<Separator>,
}

#[derive(Clone, Debug)]
enum Stage {
    StripPrefix(String),
    User(Transform),
    Normalize(Case, Option<Separator>),
}

impl Stage {
    fn run(&self, kv: KeyValue) -> KeyValue {
        match self {
            Stage::StripPrefix(prefix) => match kv.key.strip_prefix(prefix.as_str()) {
                Some(rest) => KeyValue::new(rest, kv.value),
                None => kv,
            },
            Stage::User(transform) => transform.apply(kv),
            Stage::Normalize(case, separator) => {
                let key = normalize_key(&kv.key, *case, separator.as_ref());
                KeyValue::new(key, kv.value)
            }
        }
    }
}

// Dots mark argv nesting and survive normalization.
fn normalize_key(key: &str, case: Case, separator: Option<&Separator>) -> String {
    key.split('.')
        .map(|part| normalize_part(part, case, separator))
        .collect::<Vec<_>>()
        .join(".")
}

fn normalize_part(key: &str, case: Case, separator: Option<&Separator>) -> String {
    let Some(separator) = separator else {
        return case.convert(key);
    };
    let Some(joiner) = separator.find(key) else {
        return case.convert(key);
    };
    separator
        .split(key)
        .into_iter()
        .map(|segment| case.convert(segment))
        .collect::<Vec<_>>()
        .join(joiner)
}

/// The composed pipeline built from [`KeyTransformSettings`].
#[derive(Clone, Debug, Default)]
pub struct KeyPipeline {
    stages: Vec<Stage>,
    separator: Option<Separator>,
}

impl KeyPipeline {
    /// Runs every stage over the pair. The `_` key is returned unchanged.
    pub fn apply(&self, kv: KeyValue) -> KeyValue {
        if kv.key == REST_KEY {
            return kv;
        }
        self.stages.iter().fold(kv, |kv, stage| stage.run(kv))
    }

    /// Runs the pipeline over a bare key.
    pub fn apply_key(&self, key: &str) -> String {
        self.apply(KeyValue::new(key, Value::Null)).key
    }

    /// The nesting separator, if any.
    pub fn separator(&self) -> Option<&Separator> {
        self.separator.as_ref()
    }

    /// Returns true when the pipeline has no stage.
    pub fn is_identity(&self) -> bool {
        self.stages.is_empty()
    }
}

impl From<&KeyTransformSettings> for KeyPipeline {
    fn from(settings: &KeyTransformSettings) -> Self {
        let mut stages: Vec<Stage> = settings
            .ignore_prefix
            .iter()
            .cloned()
            .map(Stage::StripPrefix)
            .collect();
        stages.extend(settings.transforms.iter().cloned().map(Stage::User));
        if let Some(case) = settings.normalize {
            stages.push(Stage::Normalize(case, settings.separator.clone()));
        }
        Self {
            stages,
            separator: settings.separator.clone(),
        }
    }
}

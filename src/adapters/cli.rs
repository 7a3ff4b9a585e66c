// SPDX-License-Identifier: MIT OR Apache-2.0

//! Command-line argument parser adapter.
//!
//! This module provides the default [`ArgumentParser`], driven by an optional
//! list of [`ArgSpec`] declarations.

use crate::domain::transform::REST_KEY;
use crate::domain::{ConfigError, Result};
use crate::ports::{ArgKind, ArgSpec, ArgumentParser};
use serde_json::{Map, Number, Value};

/// Schema driven command-line parser.
///
/// It supports multiple argument formats:
/// - `--key=value`: Long form with equals sign
/// - `--key value`: Long form with space-separated value
/// - `--flag`: A flag set to `true` when no value follows
/// - `--no-flag`: A flag set to `false`
/// - `-k value` and `-abc`: Short forms, the latter setting three flags
/// - `--`: Everything after it is positional
///
/// Positional arguments are collected under `_`. A declared option is stored
/// under its canonical name whichever alias was used, and its default is
/// applied when it does not appear. When an option is repeated the last value
/// wins.
///
/// # Examples
///
/// ```rust
/// use tiercfg::adapters::ArgvParser;
/// use tiercfg::ports::{ArgKind, ArgSpec, ArgumentParser};
/// use serde_json::json;
///
/// let parser = ArgvParser::new()
///     .spec(ArgSpec::new("port").alias("p").kind(ArgKind::Number))
///     .spec(ArgSpec::new("verbose").alias("v").kind(ArgKind::Boolean));
///
/// let args: Vec<String> = ["-p", "8080", "-v", "--database.host=db", "serve"]
///     .iter().map(|s| s.to_string()).collect();
/// let parsed = parser.parse(&args).unwrap();
/// assert_eq!(parsed["port"], json!(8080));
/// assert_eq!(parsed["verbose"], json!(true));
/// assert_eq!(parsed["database.host"], json!("db"));
/// assert_eq!(parsed["_"], json!(["serve"]));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ArgvParser {
    specs: Vec<ArgSpec>,
}

impl ArgvParser {
    /// Creates a parser without declarations.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a parser from a list of declarations.
    pub fn with_specs(specs: Vec<ArgSpec>) -> Self {
        Self { specs }
    }

    /// Adds a declaration.
    pub fn spec(mut self, spec: ArgSpec) -> Self {
        self.specs.push(spec);
        self
    }

    fn find_spec(&self, name: &str) -> Option<&ArgSpec> {
        self.specs.iter().find(|spec| spec.answers_to(name))
    }

    fn kind_of(&self, name: &str) -> ArgKind {
        self.find_spec(name)
            .map(ArgSpec::value_kind)
            .unwrap_or_default()
    }

    fn canonical<'a>(&'a self, name: &'a str) -> &'a str {
        self.find_spec(name).map(ArgSpec::name).unwrap_or(name)
    }

    fn convert(&self, name: &str, raw: &str) -> Result<Value> {
        match self.kind_of(name) {
            ArgKind::String => Ok(Value::String(raw.to_string())),
            ArgKind::Number => parse_number(raw).ok_or_else(|| ConfigError::SourceError {
                source_name: "argv".to_string(),
                message: format!("option --{} expects a number, got '{}'", name, raw),
                source: None,
            }),
            ArgKind::Boolean => match raw {
                "true" => Ok(Value::Bool(true)),
                "false" => Ok(Value::Bool(false)),
                _ => Err(ConfigError::SourceError {
                    source_name: "argv".to_string(),
                    message: format!("option --{} expects true or false, got '{}'", name, raw),
                    source: None,
                }),
            },
        }
    }

    fn insert(&self, out: &mut Map<String, Value>, name: &str, value: Value) {
        out.insert(self.canonical(name).to_string(), value);
    }
}

fn parse_number(raw: &str) -> Option<Value> {
    if let Ok(n) = raw.parse::<i64>() {
        return Some(Value::Number(n.into()));
    }
    raw.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
}

fn takes_value(next: Option<&String>) -> bool {
    match next {
        Some(next) => !next.starts_with('-') || parse_number(next).is_some(),
        None => false,
    }
}

impl ArgumentParser for ArgvParser {
    fn parse(&self, args: &[String]) -> Result<Map<String, Value>> {
        let mut out = Map::new();
        let mut rest: Vec<Value> = Vec::new();
        let mut i = 0;

        while i < args.len() {
            let arg = args[i].as_str();

            if arg == "--" {
                rest.extend(args[i + 1..].iter().cloned().map(Value::String));
                break;
            }

            let body = if let Some(long) = arg.strip_prefix("--") {
                long
            } else if let Some(short) = arg.strip_prefix('-').filter(|s| !s.is_empty()) {
                if parse_number(arg).is_some() {
                    rest.push(Value::String(arg.to_string()));
                    i += 1;
                    continue;
                }
                // -abc sets three flags, -k=v and -k v behave like long options.
                if short.chars().count() > 1 && !short.contains('=') {
                    for flag in short.chars() {
                        self.insert(&mut out, &flag.to_string(), Value::Bool(true));
                    }
                    i += 1;
                    continue;
                }
                short
            } else {
                rest.push(Value::String(arg.to_string()));
                i += 1;
                continue;
            };

            if let Some((name, raw)) = body.split_once('=') {
                let value = self.convert(name, raw)?;
                self.insert(&mut out, name, value);
                i += 1;
                continue;
            }

            if let Some(negated) = body.strip_prefix("no-") {
                if self.find_spec(body).is_none() {
                    self.insert(&mut out, negated, Value::Bool(false));
                    i += 1;
                    continue;
                }
            }

            let next = args.get(i + 1);
            if self.kind_of(body) != ArgKind::Boolean && takes_value(next) {
                let raw = next.map(String::as_str).unwrap_or_default();
                let value = self.convert(body, raw)?;
                self.insert(&mut out, body, value);
                i += 2;
            } else {
                self.insert(&mut out, body, Value::Bool(true));
                i += 1;
            }
        }

        for spec in &self.specs {
            if let Some(default) = spec.default() {
                out.entry(spec.name().to_string())
                    .or_insert_with(|| default.clone());
            }
        }
        if !rest.is_empty() {
            out.insert(REST_KEY.to_string(), Value::Array(rest));
        }

        tracing::debug!("Parsed {} command-line entries", out.len());
        Ok(out)
    }
}

// SPDX-License-Identifier: MIT OR Apache-2.0

//! `clap` pass-through argument parser.
//!
//! Applications that already describe their command line with `clap` can hand
//! the `Command` to the argv loader. Only arguments that were actually given
//! (or that carry a clap default) contribute to the argv layer.

use crate::domain::{ConfigError, Result};
use crate::ports::ArgumentParser;
use clap::parser::ValueSource;
use clap::{ArgAction, ArgMatches, Command};
use serde_json::{Map, Value};

/// Adapts a caller-built [`clap::Command`] into an [`ArgumentParser`].
///
/// Flags become booleans, counters become numbers; all other arguments are
/// reported as their raw text, and as an array when they occur several times.
/// Subcommands are not descended into.
///
/// # Examples
///
/// ```rust
/// use clap::{Arg, ArgAction, Command};
/// use tiercfg::adapters::ClapArgvParser;
/// use tiercfg::ports::ArgumentParser;
/// use serde_json::json;
///
/// let cmd = Command::new("app")
///     .arg(Arg::new("port").long("port"))
///     .arg(Arg::new("verbose").short('v').action(ArgAction::SetTrue));
/// let parser = ClapArgvParser::new(cmd);
///
/// let parsed = parser.parse(&["--port".to_string(), "80".to_string(), "-v".to_string()]).unwrap();
/// assert_eq!(parsed["port"], json!("80"));
/// assert_eq!(parsed["verbose"], json!(true));
/// ```
#[derive(Debug, Clone)]
pub struct ClapArgvParser {
    command: Command,
}

impl ClapArgvParser {
    /// Wraps a command.
    pub fn new(command: Command) -> Self {
        Self { command }
    }

    fn value_of(matches: &ArgMatches, id: &str, action: &ArgAction) -> Option<Value> {
        match action {
            ArgAction::SetTrue | ArgAction::SetFalse => matches
                .try_get_one::<bool>(id)
                .ok()
                .flatten()
                .map(|b| Value::Bool(*b)),
            ArgAction::Count => matches
                .try_get_one::<u8>(id)
                .ok()
                .flatten()
                .map(|n| Value::from(*n)),
            ArgAction::Help | ArgAction::Version => None,
            _ => {
                let raw = matches.try_get_raw(id).ok().flatten()?;
                let mut values: Vec<Value> = raw
                    .map(|os| Value::String(os.to_string_lossy().into_owned()))
                    .collect();
                match values.len() {
                    0 => None,
                    1 => values.pop(),
                    _ => Some(Value::Array(values)),
                }
            }
        }
    }
}

impl ArgumentParser for ClapArgvParser {
    fn parse(&self, args: &[String]) -> Result<Map<String, Value>> {
        let argv = std::iter::once(self.command.get_name().to_string()).chain(args.iter().cloned());
        let matches = self
            .command
            .clone()
            .try_get_matches_from(argv)
            .map_err(|e| ConfigError::SourceError {
                source_name: "argv".to_string(),
                message: e.to_string(),
                source: Some(Box::new(e)),
            })?;

        let mut out = Map::new();
        for arg in self.command.get_arguments() {
            let id = arg.get_id().as_str();
            let implicit = matches!(
                arg.get_action(),
                ArgAction::SetTrue | ArgAction::SetFalse | ArgAction::Count
            );
            match matches.value_source(id) {
                None => continue,
                // An absent flag must not shadow lower tiers.
                Some(ValueSource::DefaultValue) if implicit => continue,
                Some(_) => {}
            }
            if let Some(value) = Self::value_of(&matches, id, arg.get_action()) {
                out.insert(id.to_string(), value);
            }
        }

        tracing::debug!("Parsed {} command-line entries through clap", out.len());
        Ok(out)
    }
}

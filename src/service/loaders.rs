// SPDX-License-Identifier: MIT OR Apache-2.0

//! Source loaders.
//!
//! Each [`Step`] has exactly one loader. A loader reads its source, turns it
//! into a tree and adds it to the store as a named layer. Layers are added in
//! step order, so the store's first-layer-wins lookup yields the precedence
//! overrides > argv > env > files > defaults.

use crate::adapters::{ArgvParser, EnvVarAdapter, FileSpec};
use crate::domain::transform::REST_KEY;
use crate::domain::tree::{insert_path, merge_under};
use crate::domain::{ConfigKey, KeyPipeline, KeyValue, Result, Separator, Step};
use crate::ports::{ArgumentParser, ConfigStore};
use crate::service::settings::Settings;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};

/// Layer holding the overrides.
pub const OVERRIDES_LAYER: &str = "overrides";
/// Layer holding parsed command-line arguments.
pub const ARGV_LAYER: &str = "argv";
/// Layer holding the file named on the command line.
pub const ARGV_FILE_LAYER: &str = "argv-file";
/// Layer holding environment variables.
pub const ENV_LAYER: &str = "env";
/// Layer holding the folded defaults.
pub const DEFAULTS_LAYER: &str = "defaults";

/// State shared by the loaders of one resolution run.
#[derive(Debug)]
pub(crate) struct LoadContext<'a> {
    pub(crate) settings: &'a Settings,
    pub(crate) pipeline: KeyPipeline,
    /// Raw parsed arguments, captured by the argv loader.
    pub(crate) argv: Option<Map<String, Value>>,
    /// Environment snapshot, captured by the env loader.
    pub(crate) env: Option<BTreeMap<String, String>>,
}

impl<'a> LoadContext<'a> {
    pub(crate) fn new(settings: &'a Settings) -> Self {
        Self {
            settings,
            pipeline: KeyPipeline::from(&settings.key_transform),
            argv: None,
            env: None,
        }
    }
}

pub(crate) type Loader = fn(&mut dyn ConfigStore, &mut LoadContext<'_>) -> Result<()>;

/// Returns the loader of a step.
pub(crate) fn loader_for(step: Step) -> Loader {
    match step {
        Step::Overrides => load_overrides,
        Step::Argv => load_argv,
        Step::Env => load_env,
        Step::Files => load_files,
        Step::Defaults => load_defaults,
    }
}

fn load_overrides(store: &mut dyn ConfigStore, ctx: &mut LoadContext<'_>) -> Result<()> {
    let overrides = ctx
        .settings
        .overrides
        .clone()
        .unwrap_or_else(|| Value::Object(Map::new()));
    store.add_layer(OVERRIDES_LAYER, overrides)
}

fn load_argv(store: &mut dyn ConfigStore, ctx: &mut LoadContext<'_>) -> Result<()> {
    let settings = ctx.settings;
    if settings.disable_argv {
        tracing::debug!("argv source disabled");
        return Ok(());
    }
    let args: Vec<String> = match &settings.argv.args {
        Some(args) => args.clone(),
        None => std::env::args_os()
            .skip(1)
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect(),
    };
    let parsed = match &settings.argv.parser {
        Some(parser) => parser.parse(&args)?,
        None => ArgvParser::with_specs(settings.argv.specs.clone()).parse(&args)?,
    };

    let tree = build_tree(
        parsed.iter().map(|(k, v)| (k.clone(), v.clone())),
        &ctx.pipeline,
        settings.parse_values,
        true,
    );
    ctx.argv = Some(parsed);
    store.add_layer(ARGV_LAYER, Value::Object(tree))
}

fn load_env(store: &mut dyn ConfigStore, ctx: &mut LoadContext<'_>) -> Result<()> {
    let settings = ctx.settings;
    if settings.disable_env {
        tracing::debug!("env source disabled");
        return Ok(());
    }
    let snapshot = env_adapter(settings).snapshot();

    let whitelist = &settings.env.whitelist;
    let normalized: BTreeSet<String> = whitelist
        .iter()
        .map(|name| ctx.pipeline.apply_key(name))
        .collect();
    let pipeline = &ctx.pipeline;
    let mut tree = Map::new();
    for (name, raw) in &snapshot {
        let value = maybe_parse(Value::String(raw.clone()), settings.parse_values);
        let kv = pipeline.apply(KeyValue::new(name.clone(), value));
        if !whitelist.is_empty() && !whitelist.contains(name) && !normalized.contains(&kv.key) {
            continue;
        }
        let segments = split_key(&kv.key, pipeline.separator(), false);
        insert_path(&mut tree, &segments, kv.value);
    }

    tracing::debug!("Loaded {} environment entries", tree.len());
    ctx.env = Some(snapshot);
    store.add_layer(ENV_LAYER, Value::Object(tree))
}

fn load_files(store: &mut dyn ConfigStore, ctx: &mut LoadContext<'_>) -> Result<()> {
    for spec in &ctx.settings.files {
        let contents = spec.load()?;
        store.add_layer(&spec.layer_name(), Value::Object(contents))?;
    }
    Ok(())
}

fn load_defaults(store: &mut dyn ConfigStore, ctx: &mut LoadContext<'_>) -> Result<()> {
    let mut folded = Map::new();
    for defaults in &ctx.settings.defaults {
        if let Value::Object(map) = defaults {
            merge_under(&mut folded, map);
        }
    }
    store.add_layer(DEFAULTS_LAYER, Value::Object(folded))
}

/// Loads the file named by the argv file key, if the store now has one.
pub(crate) fn load_argv_file(store: &mut dyn ConfigStore, ctx: &mut LoadContext<'_>) -> Result<()> {
    let key_name = ctx.settings.argv_file_key.as_str();
    if key_name.is_empty() {
        return Ok(());
    }
    let key = ConfigKey::from(ctx.pipeline.apply_key(key_name));
    let path = match store.get(&key) {
        Some(Value::String(path)) if !path.is_empty() => path,
        _ => return Ok(()),
    };
    tracing::debug!("Loading extra configuration file {} from '{}'", path, key);
    let contents = FileSpec::new(path).load()?;
    store.add_layer(ARGV_FILE_LAYER, Value::Object(contents))
}

/// The env snapshot source for these settings.
pub(crate) fn env_adapter(settings: &Settings) -> EnvVarAdapter {
    match &settings.env.vars {
        Some(vars) => EnvVarAdapter::with_values(vars.clone()),
        None => EnvVarAdapter::new(),
    }
}

fn maybe_parse(value: Value, parse_values: bool) -> Value {
    match value {
        Value::String(text) if parse_values => serde_json::from_str(&text).unwrap_or(Value::String(text)),
        other => other,
    }
}

fn split_key(key: &str, separator: Option<&Separator>, dots: bool) -> Vec<String> {
    if key == REST_KEY {
        return vec![key.to_string()];
    }
    let by_separator: Vec<&str> = match separator {
        Some(separator) => separator.split(key),
        None => vec![key],
    };
    let segments: Vec<String> = by_separator
        .into_iter()
        .flat_map(|part| {
            if dots {
                part.split('.').collect::<Vec<_>>()
            } else {
                vec![part]
            }
        })
        .map(str::to_string)
        .collect();
    if segments.iter().any(String::is_empty) {
        vec![key.to_string()]
    } else {
        segments
    }
}

fn build_tree<I>(entries: I, pipeline: &KeyPipeline, parse_values: bool, dots: bool) -> Map<String, Value>
where
    I: IntoIterator<Item = (String, Value)>,
{
    let mut tree = Map::new();
    for (key, value) in entries {
        let kv = pipeline.apply(KeyValue::new(key, maybe_parse(value, parse_values)));
        let segments = split_key(&kv.key, pipeline.separator(), dots);
        insert_path(&mut tree, &segments, kv.value);
    }
    tree
}

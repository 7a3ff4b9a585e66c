// SPDX-License-Identifier: MIT OR Apache-2.0

//! Resolution settings and their builder.
//!
//! [`Settings`] describes everything one `Configuration` resolves from: which
//! sources are enabled, their options, hooks, key transforms, indirection and
//! models. It can only be obtained from [`SettingsBuilder::build`], which
//! validates it, and is never modified afterwards.

use crate::adapters::codecs::codec_for_extension;
use crate::adapters::FileSpec;
use crate::domain::{
    Case, ConfigError, ConfigKey, Hook, HookPoint, KeyTransformSettings, Model, Result, Separator,
    Transform,
};
use crate::ports::{ArgKind, ArgSpec, ArgumentParser, ProtocolHandler};
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Default argv option naming an extra file to load.
pub const DEFAULT_ARGV_FILE_KEY: &str = "configue";

/// Execution mode of the resolution workflow.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Mode {
    /// Blocking resolution; only blocking hooks, no indirection.
    #[default]
    Sync,
    /// Awaited resolution; deferred hooks and indirection allowed.
    Async,
}

/// Options of the argv source.
#[derive(Clone, Debug, Default)]
pub struct ArgvSettings {
    pub(crate) args: Option<Vec<String>>,
    pub(crate) specs: Vec<ArgSpec>,
    pub(crate) parser: Option<Arc<dyn ArgumentParser>>,
}

/// Options of the env source.
#[derive(Clone, Debug, Default)]
pub struct EnvSettings {
    pub(crate) whitelist: Vec<String>,
    pub(crate) vars: Option<BTreeMap<String, String>>,
}

/// Options of the indirection pass.
///
/// ```rust
/// use tiercfg::ports::{FnHandler, Resolved};
/// use tiercfg::service::IndirectionSettings;
///
/// let indirection = IndirectionSettings::new()
///     .protocol("upper", FnHandler::new(|input, _| Ok(Resolved::Text(input.to_uppercase()))))
///     .preserve_buffer(true);
/// assert!(indirection.is_preserving_buffers());
/// ```
#[derive(Clone, Debug, Default)]
pub struct IndirectionSettings {
    pub(crate) protocols: BTreeMap<String, Arc<dyn ProtocolHandler>>,
    pub(crate) preserve_buffer: bool,
    pub(crate) no_default_protocols: bool,
    pub(crate) base_dir: Option<PathBuf>,
}

impl IndirectionSettings {
    /// Indirection with the default protocols, based in the current directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler; it replaces a default protocol of the same name.
    pub fn protocol(mut self, name: impl Into<String>, handler: impl ProtocolHandler + 'static) -> Self {
        self.protocols.insert(name.into(), Arc::new(handler));
        self
    }

    /// Keeps byte results as arrays of numbers instead of text.
    pub fn preserve_buffer(mut self, enabled: bool) -> Self {
        self.preserve_buffer = enabled;
        self
    }

    /// Registers only the protocols given with [`IndirectionSettings::protocol`].
    pub fn no_default_protocols(mut self, enabled: bool) -> Self {
        self.no_default_protocols = enabled;
        self
    }

    /// Directory relative references are resolved against.
    pub fn base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(dir.into());
        self
    }

    /// Returns true when byte results are kept as arrays.
    pub fn is_preserving_buffers(&self) -> bool {
        self.preserve_buffer
    }
}

/// Validated resolution settings.
#[derive(Clone, Debug)]
pub struct Settings {
    pub(crate) mode: Mode,
    pub(crate) defer: bool,
    pub(crate) disable_argv: bool,
    pub(crate) disable_env: bool,
    pub(crate) argv: ArgvSettings,
    pub(crate) env: EnvSettings,
    pub(crate) files: Vec<FileSpec>,
    pub(crate) defaults: Vec<Value>,
    pub(crate) overrides: Option<Value>,
    pub(crate) required: Vec<ConfigKey>,
    pub(crate) hooks: BTreeMap<HookPoint, Hook>,
    pub(crate) custom_workflow: Option<Hook>,
    pub(crate) key_transform: KeyTransformSettings,
    pub(crate) parse_values: bool,
    pub(crate) indirection: Option<IndirectionSettings>,
    pub(crate) models: Vec<(String, Model)>,
    pub(crate) argv_file_key: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            mode: Mode::Sync,
            defer: false,
            disable_argv: false,
            disable_env: false,
            argv: ArgvSettings::default(),
            env: EnvSettings::default(),
            files: Vec::new(),
            defaults: Vec::new(),
            overrides: None,
            required: Vec::new(),
            hooks: BTreeMap::new(),
            custom_workflow: None,
            key_transform: KeyTransformSettings::default(),
            parse_values: false,
            indirection: None,
            models: Vec::new(),
            argv_file_key: DEFAULT_ARGV_FILE_KEY.to_string(),
        }
    }
}

impl Settings {
    /// Starts a builder.
    pub fn builder() -> SettingsBuilder {
        SettingsBuilder::new()
    }

    /// The execution mode.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Returns true when construction must not resolve eagerly.
    pub fn is_deferred(&self) -> bool {
        self.defer
    }

    /// The files, in precedence order.
    pub fn files(&self) -> &[FileSpec] {
        &self.files
    }

    /// Keys that must resolve.
    pub fn required(&self) -> &[ConfigKey] {
        &self.required
    }

    /// The hook at a point, if any.
    pub fn hook(&self, point: HookPoint) -> Option<&Hook> {
        self.hooks.get(&point)
    }

    /// Returns true when a custom workflow replaces the default plan.
    pub fn has_custom_workflow(&self) -> bool {
        self.custom_workflow.is_some()
    }

    /// The indirection options, when the pass is enabled.
    pub fn indirection(&self) -> Option<&IndirectionSettings> {
        self.indirection.as_ref()
    }

    /// Name of the argv option that loads an extra file; empty when disabled.
    pub fn argv_file_key(&self) -> &str {
        &self.argv_file_key
    }

    /// Model names, in declaration order.
    pub fn model_names(&self) -> impl Iterator<Item = &str> {
        self.models.iter().map(|(name, _)| name.as_str())
    }

    fn validate(&self) -> Result<()> {
        if self.mode == Mode::Sync {
            if self.indirection.is_some() {
                return Err(ConfigError::invalid_settings(
                    "indirection requires async mode",
                ));
            }
            if let Some(point) = self.hooks.iter().find(|(_, h)| h.is_deferred()).map(|(p, _)| p) {
                return Err(ConfigError::invalid_settings(format!(
                    "hook '{}' is deferred and requires async mode",
                    point
                )));
            }
            if self.custom_workflow.as_ref().is_some_and(Hook::is_deferred) {
                return Err(ConfigError::invalid_settings(
                    "a deferred custom workflow requires async mode",
                ));
            }
        }
        if self.files.iter().any(|f| f.path().as_os_str().is_empty()) {
            return Err(ConfigError::invalid_settings("file paths must not be empty"));
        }
        if let Some(separator) = &self.key_transform.separator {
            if separator.is_empty() {
                return Err(ConfigError::invalid_settings(
                    "separator must not match the empty string",
                ));
            }
        }
        if self.required.iter().any(ConfigKey::is_root) {
            return Err(ConfigError::invalid_settings("required keys must not be empty"));
        }
        if let Some(overrides) = &self.overrides {
            if !overrides.is_object() {
                return Err(ConfigError::invalid_settings("overrides must be an object"));
            }
        }
        if self.defaults.iter().any(|d| !d.is_object()) {
            return Err(ConfigError::invalid_settings(
                "defaults must be objects or a list of objects",
            ));
        }
        let mut names = BTreeSet::new();
        for (name, _) in &self.models {
            if !names.insert(name.as_str()) {
                return Err(ConfigError::invalid_settings(format!(
                    "model '{}' is declared twice",
                    name
                )));
            }
        }
        Ok(())
    }
}

/// Builder for [`Settings`].
///
/// # Examples
///
/// ```rust
/// use tiercfg::domain::{Case, ConfigKey, Hook, HookPoint, Step};
/// use tiercfg::service::{Mode, Settings};
/// use serde_json::json;
///
/// let settings = Settings::builder()
///     .args(["--port=8080"])
///     .env_vars([("APP_HOST", "example.org")])
///     .ignore_prefix("APP_")
///     .normalize(Case::CamelCase)
///     .file("config/app.json")
///     .defaults(json!({"port": 3000, "host": "localhost"}))
///     .required(["port"])
///     .hook(Step::Defaults, Hook::blocking(|store| {
///         store.set(&ConfigKey::from("ready"), json!(true));
///         Ok(())
///     }))
///     .build()
///     .unwrap();
/// assert_eq!(settings.mode(), Mode::Sync);
/// assert!(settings.hook(HookPoint::After(Step::Defaults)).is_some());
/// ```
#[derive(Clone, Debug, Default)]
pub struct SettingsBuilder {
    settings: Settings,
}

impl SettingsBuilder {
    /// Creates a builder with every source enabled and nothing configured.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the execution mode.
    pub fn mode(mut self, mode: Mode) -> Self {
        self.settings.mode = mode;
        self
    }

    /// Prevents `Configuration::new` from resolving eagerly in sync mode.
    pub fn defer(mut self, defer: bool) -> Self {
        self.settings.defer = defer;
        self
    }

    /// Disables the argv source.
    pub fn disable_argv(mut self, disabled: bool) -> Self {
        self.settings.disable_argv = disabled;
        self
    }

    /// Disables the env source.
    pub fn disable_env(mut self, disabled: bool) -> Self {
        self.settings.disable_env = disabled;
        self
    }

    /// Uses these arguments instead of the process arguments. The program
    /// name must not be included.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.settings.argv.args = Some(args.into_iter().map(Into::into).collect());
        self
    }

    /// Declares an option for the default argv parser.
    pub fn arg(mut self, spec: ArgSpec) -> Self {
        self.settings.argv.specs.push(spec);
        self
    }

    /// Replaces the default argv parser.
    pub fn argument_parser(mut self, parser: impl ArgumentParser + 'static) -> Self {
        self.settings.argv.parser = Some(Arc::new(parser));
        self
    }

    /// Restricts the env source to these names.
    pub fn env_whitelist<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.settings.env.whitelist.extend(names.into_iter().map(Into::into));
        self
    }

    /// Uses these variables instead of the process environment.
    pub fn env_vars<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.settings.env.vars = Some(vars.into_iter().map(|(k, v)| (k.into(), v.into())).collect());
        self
    }

    /// Appends a file. Earlier files take precedence over later ones.
    pub fn file(mut self, file: impl Into<FileSpec>) -> Self {
        self.settings.files.push(file.into());
        self
    }

    /// Appends a defaults object. Earlier objects take precedence.
    pub fn defaults(mut self, defaults: Value) -> Self {
        self.settings.defaults.push(defaults);
        self
    }

    /// Sets the overrides object.
    pub fn overrides(mut self, overrides: Value) -> Self {
        self.settings.overrides = Some(overrides);
        self
    }

    /// Adds keys that must resolve.
    pub fn required<I, K>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<ConfigKey>,
    {
        self.settings.required.extend(keys.into_iter().map(Into::into));
        self
    }

    /// Sets the hook for a point, replacing any previous one.
    pub fn hook(mut self, point: impl Into<HookPoint>, hook: Hook) -> Self {
        self.settings.hooks.insert(point.into(), hook);
        self
    }

    /// Replaces the default plan with a single function.
    pub fn custom_workflow(mut self, workflow: Hook) -> Self {
        self.settings.custom_workflow = Some(workflow);
        self
    }

    /// Normalizes argv and env keys to a case.
    pub fn normalize(mut self, case: Case) -> Self {
        self.settings.key_transform.normalize = Some(case);
        self
    }

    /// Sets the nesting separator for argv and env keys.
    pub fn separator(mut self, separator: impl Into<Separator>) -> Self {
        self.settings.key_transform.separator = Some(separator.into());
        self
    }

    /// Adds a prefix stripped from argv and env keys.
    pub fn ignore_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.settings.key_transform.ignore_prefix.push(prefix.into());
        self
    }

    /// Adds a user transform.
    pub fn transform(mut self, transform: Transform) -> Self {
        self.settings.key_transform.transforms.push(transform);
        self
    }

    /// Parses argv and env string values as JSON scalars when possible.
    pub fn parse_values(mut self, enabled: bool) -> Self {
        self.settings.parse_values = enabled;
        self
    }

    /// Enables the indirection pass (async mode only).
    pub fn indirection(mut self, indirection: IndirectionSettings) -> Self {
        self.settings.indirection = Some(indirection);
        self
    }

    /// Declares a model.
    pub fn model(mut self, name: impl Into<String>, model: impl Into<Model>) -> Self {
        self.settings.models.push((name.into(), model.into()));
        self
    }

    /// Renames the argv option that loads an extra file. An empty name
    /// disables the feature.
    pub fn argv_file_key(mut self, key: impl Into<String>) -> Self {
        self.settings.argv_file_key = key.into();
        self
    }

    /// Validates and returns the settings.
    ///
    /// # Errors
    ///
    /// Returns `InvalidSettings` when:
    /// - indirection, a deferred hook or a deferred custom workflow is used in sync mode
    /// - a file path or a required key is empty
    /// - the separator matches the empty string
    /// - overrides or defaults are not objects
    /// - a model name is declared twice
    pub fn build(self) -> Result<Settings> {
        self.settings.validate()?;
        Ok(self.settings)
    }

    /// Reads a JSON settings document. Unknown fields are rejected.
    ///
    /// Functions (hooks, transforms, projectors, custom parsers and protocol
    /// handlers) cannot be expressed in a document; add them to the returned
    /// builder.
    ///
    /// ```rust
    /// use tiercfg::service::{Mode, SettingsBuilder};
    /// use serde_json::json;
    ///
    /// let builder = SettingsBuilder::from_document(json!({
    ///     "async": true,
    ///     "disable": {"argv": true},
    ///     "env": {"whitelist": ["PORT"]},
    ///     "files": ["config.json", {"file": "extra.conf", "format": "ini"}],
    ///     "defaults": [{"port": 80}, {"host": "localhost"}],
    ///     "required": ["port"],
    ///     "normalize": "camelCase",
    ///     "separator": "__",
    ///     "indirection": {"preserveBuffer": false},
    ///     "models": {"listen": {"port": ["port", "PORT"]}}
    /// }))
    /// .unwrap();
    /// let settings = builder.build().unwrap();
    /// assert_eq!(settings.mode(), Mode::Async);
    /// assert_eq!(settings.files().len(), 2);
    ///
    /// assert!(SettingsBuilder::from_document(json!({"asink": true})).is_err());
    /// ```
    pub fn from_document(document: Value) -> Result<Self> {
        let doc: SettingsDocument = serde_json::from_value(document)
            .map_err(|e| ConfigError::invalid_settings(e.to_string()))?;
        doc.into_builder()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> OneOrMany<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::Many(items) => items,
            OneOrMany::One(item) => vec![item],
        }
    }
}

#[derive(Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
struct DisableDocument {
    argv: bool,
    env: bool,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ArgOptionDocument {
    #[serde(default)]
    alias: Option<OneOrMany<String>>,
    #[serde(default, rename = "type")]
    kind: ArgKind,
    #[serde(default)]
    default: Option<Value>,
}

#[derive(Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
struct ArgvDocument {
    args: Option<Vec<String>>,
    options: BTreeMap<String, ArgOptionDocument>,
}

#[derive(Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
struct EnvOptionsDocument {
    whitelist: Vec<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum EnvDocument {
    Names(Vec<String>),
    Options(EnvOptionsDocument),
}

impl Default for EnvDocument {
    fn default() -> Self {
        EnvDocument::Names(Vec::new())
    }
}

impl EnvDocument {
    fn into_whitelist(self) -> Vec<String> {
        match self {
            EnvDocument::Names(names) => names,
            EnvDocument::Options(options) => options.whitelist,
        }
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct FileObjectDocument {
    file: PathBuf,
    #[serde(default)]
    format: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FileDocument {
    Path(PathBuf),
    Object(FileObjectDocument),
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct PatternDocument {
    pattern: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SeparatorDocument {
    Literal(String),
    Pattern(PatternDocument),
}

#[derive(Deserialize, Default)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
struct IndirectionOptionsDocument {
    preserve_buffer: bool,
    no_default_protocols: bool,
    base_dir: Option<PathBuf>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum IndirectionDocument {
    Enabled(bool),
    Options(IndirectionOptionsDocument),
}

#[derive(Deserialize, Default)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
struct SettingsDocument {
    #[serde(rename = "async")]
    async_mode: bool,
    defer: bool,
    disable: DisableDocument,
    argv: ArgvDocument,
    env: EnvDocument,
    files: Option<OneOrMany<FileDocument>>,
    defaults: Option<OneOrMany<Value>>,
    overrides: Option<Value>,
    required: Vec<String>,
    normalize: Option<Case>,
    separator: Option<SeparatorDocument>,
    ignore_prefix: Option<OneOrMany<String>>,
    parse: bool,
    indirection: Option<IndirectionDocument>,
    models: BTreeMap<String, Value>,
    argv_file_key: Option<String>,
}

fn file_spec(path: &Path, format: Option<&str>) -> Result<FileSpec> {
    let spec = FileSpec::new(path);
    match format {
        None => Ok(spec),
        Some(name) => codec_for_extension(name)
            .map(|codec| spec.with_format(codec))
            .ok_or_else(|| ConfigError::invalid_settings(format!("unknown file format '{}'", name))),
    }
}

impl SettingsDocument {
    fn into_builder(self) -> Result<SettingsBuilder> {
        let mut builder = SettingsBuilder::new()
            .mode(if self.async_mode { Mode::Async } else { Mode::Sync })
            .defer(self.defer)
            .disable_argv(self.disable.argv)
            .disable_env(self.disable.env)
            .env_whitelist(self.env.into_whitelist())
            .required(self.required)
            .parse_values(self.parse);

        if let Some(args) = self.argv.args {
            builder = builder.args(args);
        }
        for (name, option) in self.argv.options {
            let mut spec = ArgSpec::new(name).kind(option.kind);
            for alias in option.alias.map(OneOrMany::into_vec).unwrap_or_default() {
                spec = spec.alias(alias);
            }
            if let Some(default) = option.default {
                spec = spec.default_value(default);
            }
            builder = builder.arg(spec);
        }
        for file in self.files.map(OneOrMany::into_vec).unwrap_or_default() {
            let spec = match file {
                FileDocument::Path(path) => file_spec(&path, None)?,
                FileDocument::Object(obj) => file_spec(&obj.file, obj.format.as_deref())?,
            };
            builder = builder.file(spec);
        }
        for defaults in self.defaults.map(OneOrMany::into_vec).unwrap_or_default() {
            builder = builder.defaults(defaults);
        }
        if let Some(overrides) = self.overrides {
            builder = builder.overrides(overrides);
        }
        if let Some(case) = self.normalize {
            builder = builder.normalize(case);
        }
        match self.separator {
            None => {}
            Some(SeparatorDocument::Literal(sep)) => builder = builder.separator(sep.as_str()),
            Some(SeparatorDocument::Pattern(doc)) => {
                let re = Regex::new(&doc.pattern).map_err(|e| {
                    ConfigError::invalid_settings(format!("invalid separator pattern: {}", e))
                })?;
                builder = builder.separator(re);
            }
        }
        for prefix in self.ignore_prefix.map(OneOrMany::into_vec).unwrap_or_default() {
            builder = builder.ignore_prefix(prefix);
        }
        match self.indirection {
            None | Some(IndirectionDocument::Enabled(false)) => {}
            Some(IndirectionDocument::Enabled(true)) => {
                builder = builder.indirection(IndirectionSettings::new());
            }
            Some(IndirectionDocument::Options(doc)) => {
                let mut indirection = IndirectionSettings::new()
                    .preserve_buffer(doc.preserve_buffer)
                    .no_default_protocols(doc.no_default_protocols);
                if let Some(dir) = doc.base_dir {
                    indirection = indirection.base_dir(dir);
                }
                builder = builder.indirection(indirection);
            }
        }
        for (name, shape) in self.models {
            builder = builder.model(name, Model::try_from(shape)?);
        }
        if let Some(key) = self.argv_file_key {
            builder = builder.argv_file_key(key);
        }
        Ok(builder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Step;
    use serde_json::json;

    fn deferred_hook() -> Hook {
        Hook::deferred(|_store| Box::pin(async { Ok::<(), ConfigError>(()) }))
    }

    fn message(result: Result<Settings>) -> String {
        match result {
            Err(ConfigError::InvalidSettings { message }) => message,
            other => panic!("expected InvalidSettings, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::builder().build().unwrap();
        assert_eq!(settings.mode(), Mode::Sync);
        assert!(!settings.is_deferred());
        assert_eq!(settings.argv_file_key(), "configue");
        assert!(settings.indirection().is_none());
    }

    #[test]
    fn test_indirection_requires_async() {
        let result = Settings::builder().indirection(IndirectionSettings::new()).build();
        assert_eq!(message(result), "indirection requires async mode");
        assert!(Settings::builder()
            .mode(Mode::Async)
            .indirection(IndirectionSettings::new())
            .build()
            .is_ok());
    }

    #[test]
    fn test_deferred_hooks_require_async() {
        let result = Settings::builder().hook(Step::Env, deferred_hook()).build();
        assert!(message(result).contains("'env'"));
        let result = Settings::builder().custom_workflow(deferred_hook()).build();
        assert!(message(result).contains("custom workflow"));
        assert!(Settings::builder()
            .mode(Mode::Async)
            .hook(HookPoint::First, deferred_hook())
            .custom_workflow(deferred_hook())
            .build()
            .is_ok());
    }

    #[test]
    fn test_shape_errors() {
        assert!(Settings::builder().file("").build().is_err());
        assert!(Settings::builder().separator("").build().is_err());
        assert!(Settings::builder().required([""]).build().is_err());
        assert!(Settings::builder().overrides(json!([1])).build().is_err());
        assert!(Settings::builder().defaults(json!("x")).build().is_err());
        let shape = crate::domain::ModelShape::try_from(json!("a")).unwrap();
        assert!(Settings::builder()
            .model("m", shape.clone())
            .model("m", shape)
            .build()
            .is_err());
    }

    #[test]
    fn test_document_full() {
        let settings = SettingsBuilder::from_document(json!({
            "async": true,
            "defer": true,
            "disable": {"env": true},
            "argv": {
                "args": ["-p", "81"],
                "options": {"port": {"alias": "p", "type": "number", "default": 80}}
            },
            "files": ["a.json", {"file": "b.conf", "format": "properties"}],
            "defaults": {"x": 1},
            "overrides": {"y": 2},
            "required": ["x", "y.z"],
            "normalize": "snakeCase",
            "separator": {"pattern": "_{2,}"},
            "ignorePrefix": ["APP_", "MY_"],
            "parse": true,
            "indirection": true,
            "models": {"m": ["x", "y"]},
            "argvFileKey": "config-file"
        }))
        .unwrap()
        .build()
        .unwrap();

        assert_eq!(settings.mode(), Mode::Async);
        assert!(settings.is_deferred());
        assert!(settings.disable_env && !settings.disable_argv);
        assert_eq!(settings.argv.args.as_deref(), Some(&["-p".to_string(), "81".to_string()][..]));
        assert_eq!(settings.argv.specs[0].aliases(), &["p".to_string()]);
        assert_eq!(settings.argv.specs[0].value_kind(), ArgKind::Number);
        assert!(settings.files()[1].format().is_some());
        assert_eq!(settings.required()[1], ConfigKey::from("y:z"));
        assert_eq!(settings.key_transform.ignore_prefix, vec!["APP_", "MY_"]);
        assert!(settings.parse_values);
        assert!(settings.indirection().is_some());
        assert_eq!(settings.model_names().collect::<Vec<_>>(), vec!["m"]);
        assert_eq!(settings.argv_file_key(), "config-file");
    }

    #[test]
    fn test_document_short_forms() {
        let settings = SettingsBuilder::from_document(json!({
            "env": ["PORT", "HOST"],
            "files": "config.json"
        }))
        .unwrap()
        .build()
        .unwrap();
        assert_eq!(settings.env.whitelist, vec!["PORT", "HOST"]);
        assert_eq!(settings.files().len(), 1);
        assert_eq!(settings.files()[0].path(), Path::new("config.json"));

        let settings = SettingsBuilder::from_document(json!({
            "env": {"whitelist": ["PORT"]},
            "files": {"file": "b.conf", "format": "properties"}
        }))
        .unwrap()
        .build()
        .unwrap();
        assert_eq!(settings.env.whitelist, vec!["PORT"]);
        assert!(settings.files()[0].format().is_some());
    }

    #[test]
    fn test_document_rejects_unknown_fields() {
        assert!(SettingsBuilder::from_document(json!({"bogus": 1})).is_err());
        assert!(SettingsBuilder::from_document(json!({"disable": {"files": true}})).is_err());
        assert!(SettingsBuilder::from_document(json!({"normalize": "shout"})).is_err());
        assert!(SettingsBuilder::from_document(json!({"files": [{"file": "a", "fmt": "x"}]})).is_err());
    }

    #[test]
    fn test_document_rejects_unknown_format() {
        let err = SettingsBuilder::from_document(json!({"files": [{"file": "a", "format": "toml"}]}))
            .unwrap_err();
        assert!(err.to_string().contains("unknown file format"));
    }

    #[test]
    fn test_document_validation_still_applies() {
        let builder = SettingsBuilder::from_document(json!({"indirection": true})).unwrap();
        assert!(builder.build().is_err());
    }
}

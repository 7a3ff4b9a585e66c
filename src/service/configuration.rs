// SPDX-License-Identifier: MIT OR Apache-2.0

//! The configuration object.
//!
//! [`Configuration`] owns the settings and the store. Resolution clears the
//! store, runs the workflow, runs the indirection pass when enabled, projects
//! the declared models and captures the argv and env snapshots. Reads go
//! through [`ConfigReader`], which `Configuration` implements.

use crate::adapters::MemoryStore;
use crate::domain::{ConfigError, ConfigReader, Getter, Result};
use crate::ports::ConfigStore;
use crate::service::indirection::ProtocolResolver;
use crate::service::settings::{Mode, Settings, SettingsBuilder};
use crate::service::workflow::{self, Outcome};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// Layered configuration built from [`Settings`].
///
/// # Examples
///
/// ```
/// use tiercfg::prelude::*;
/// use serde_json::json;
///
/// let config = Settings::builder()
///     .args(["--port=9000"])
///     .env_vars([("HOST", "example.org")])
///     .defaults(json!({"port": 80, "HOST": "localhost", "debug": false}))
///     .configure()
///     .unwrap();
///
/// assert_eq!(config.get("port"), Some(json!("9000")));
/// assert_eq!(config.get("HOST"), Some(json!("example.org")));
/// assert_eq!(config.get("debug"), Some(json!(false)));
/// ```
pub struct Configuration {
    settings: Settings,
    store: Box<dyn ConfigStore>,
    resolved: bool,
    argv: Option<Map<String, Value>>,
    env: Option<BTreeMap<String, String>>,
    models: Map<String, Value>,
}

impl Configuration {
    /// Creates a configuration over a fresh [`MemoryStore`].
    ///
    /// In sync mode the configuration resolves immediately unless the
    /// settings defer it.
    ///
    /// # Errors
    ///
    /// Returns any error of the immediate resolution.
    pub fn new(settings: Settings) -> Result<Self> {
        Self::with_store(settings, Box::new(MemoryStore::new()))
    }

    /// Creates a configuration over the given store.
    ///
    /// # Errors
    ///
    /// Returns any error of the immediate resolution.
    pub fn with_store(settings: Settings, store: Box<dyn ConfigStore>) -> Result<Self> {
        let mut config = Self {
            settings,
            store,
            resolved: false,
            argv: None,
            env: None,
            models: Map::new(),
        };
        if config.settings.mode() == Mode::Sync && !config.settings.is_deferred() {
            config.resolve()?;
        }
        Ok(config)
    }

    /// Resolves a sync-mode configuration. Does nothing once resolved.
    ///
    /// # Errors
    ///
    /// Returns `InvalidSettings` in async mode, and any loader, hook or
    /// required-key error otherwise. A failed resolution can be retried.
    pub fn resolve(&mut self) -> Result<()> {
        if self.resolved {
            return Ok(());
        }
        if self.settings.mode() == Mode::Async {
            return Err(ConfigError::invalid_settings(
                "async configurations must be resolved with resolve_async",
            ));
        }
        tracing::debug!("Resolving configuration");
        self.store.clear();
        let outcome = workflow::run_blocking(&self.settings, self.store.as_mut())?;
        self.complete(outcome);
        Ok(())
    }

    /// Resolves the configuration, awaiting deferred hooks and running the
    /// indirection pass. Does nothing once resolved. Works in both modes.
    ///
    /// # Errors
    ///
    /// Returns any loader, hook, required-key or indirection error.
    pub async fn resolve_async(&mut self) -> Result<&mut Self> {
        if self.resolved {
            return Ok(self);
        }
        tracing::debug!("Resolving configuration asynchronously");
        self.store.clear();
        let outcome = workflow::run(&self.settings, self.store.as_mut()).await?;
        if let Some(indirection) = &self.settings.indirection {
            let resolver = ProtocolResolver::from_settings(indirection)?;
            resolver.resolve_store(self.store.as_mut()).await?;
        }
        self.complete(outcome);
        Ok(self)
    }

    fn complete(&mut self, outcome: Outcome) {
        let getter = Getter::new(self.store.as_ref());
        let models: Map<String, Value> = self
            .settings
            .models
            .iter()
            .map(|(name, model)| (name.clone(), model.evaluate(&getter)))
            .collect();
        self.models = models;
        self.argv = outcome.argv;
        self.env = Some(outcome.env);
        self.resolved = true;
        tracing::debug!(
            "Configuration resolved with layers {:?}",
            self.store.layer_names()
        );
    }

    /// Returns true once a resolution has completed.
    pub fn is_resolved(&self) -> bool {
        self.resolved
    }

    /// The resolution mode.
    pub fn mode(&self) -> Mode {
        self.settings.mode()
    }

    /// The raw parsed arguments. `None` before resolution, when argv is
    /// disabled, or after a custom workflow.
    pub fn argv(&self) -> Option<&Map<String, Value>> {
        self.argv.as_ref()
    }

    /// The environment snapshot taken by the last resolution.
    pub fn env(&self) -> Option<&BTreeMap<String, String>> {
        self.env.as_ref()
    }

    /// A projected model.
    pub fn model(&self, name: &str) -> Option<&Value> {
        self.models.get(name)
    }

    /// Every projected model, by name.
    pub fn models(&self) -> &Map<String, Value> {
        &self.models
    }

    /// The underlying store.
    pub fn store_mut(&mut self) -> &mut dyn ConfigStore {
        self.store.as_mut()
    }

    /// The settings this configuration was built from.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }
}

impl ConfigReader for Configuration {
    fn store(&self) -> &dyn ConfigStore {
        self.store.as_ref()
    }
}

impl fmt::Debug for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Configuration")
            .field("mode", &self.settings.mode())
            .field("resolved", &self.resolved)
            .field("layers", &self.store.layer_names())
            .field("models", &self.models.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl SettingsBuilder {
    /// Builds the settings and creates a sync configuration.
    ///
    /// # Errors
    ///
    /// Returns settings validation errors and resolution errors.
    pub fn configure(self) -> Result<Configuration> {
        Configuration::new(self.build()?)
    }

    /// Builds the settings in async mode and resolves them.
    ///
    /// Any mode set on the builder is replaced by [`Mode::Async`].
    ///
    /// # Errors
    ///
    /// Returns settings validation errors and resolution errors.
    pub async fn resolve(self) -> Result<Configuration> {
        let settings = self.defer(true).mode(Mode::Async).build()?;
        let mut config = Configuration::new(settings)?;
        config.resolve_async().await?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ConfigKey, Hook, ModelShape, Step};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn isolated() -> SettingsBuilder {
        Settings::builder()
            .args(Vec::<String>::new())
            .env_vars(Vec::<(String, String)>::new())
    }

    #[test]
    fn test_sync_resolves_on_creation() {
        let config = isolated().defaults(json!({"a": 1})).configure().unwrap();
        assert!(config.is_resolved());
        assert_eq!(config.get("a"), Some(json!(1)));
    }

    #[test]
    fn test_deferred_sync_resolution() {
        let mut config = isolated()
            .defer(true)
            .defaults(json!({"a": 1}))
            .configure()
            .unwrap();
        assert!(!config.is_resolved());
        assert_eq!(config.get("a"), None);
        config.resolve().unwrap();
        assert_eq!(config.get("a"), Some(json!(1)));
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&runs);
        let mut config = isolated()
            .defer(true)
            .hook(
                Step::Defaults,
                Hook::blocking(move |_| {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                }),
            )
            .configure()
            .unwrap();
        config.resolve().unwrap();
        config.resolve().unwrap();
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_sync_resolve_rejected_in_async_mode() {
        let mut config = Configuration::new(isolated().mode(Mode::Async).build().unwrap()).unwrap();
        assert!(!config.is_resolved());
        assert!(matches!(
            config.resolve(),
            Err(ConfigError::InvalidSettings { .. })
        ));
    }

    #[test]
    fn test_failed_resolution_can_be_retried() {
        let mut config = isolated()
            .defer(true)
            .required(["needed"])
            .configure()
            .unwrap();
        assert!(config.resolve().is_err());
        assert!(!config.is_resolved());
        config.store_mut().set(&ConfigKey::from("needed"), json!(1));
        // Resolution clears the store, so the key set above is gone again.
        assert!(config.resolve().is_err());
    }

    #[test]
    fn test_snapshots_and_models() {
        let config = isolated()
            .args(["--name=x"])
            .env_vars([("E", "1")])
            .model("m", ModelShape::Key(ConfigKey::from("name")))
            .configure()
            .unwrap();
        assert_eq!(config.argv().unwrap()["name"], json!("x"));
        assert_eq!(config.env().unwrap()["E"], "1");
        assert_eq!(config.model("m"), Some(&json!("x")));
        assert_eq!(config.models().len(), 1);
    }

    #[test]
    fn test_memory_tier_beats_overrides() {
        let mut config = isolated().overrides(json!({"k": "o"})).configure().unwrap();
        config.store_mut().set(&ConfigKey::from("k"), json!("m"));
        assert_eq!(config.get("k"), Some(json!("m")));
    }

    #[tokio::test]
    async fn test_async_resolution_runs_indirection() {
        let config = isolated()
            .mode(Mode::Async)
            .defaults(json!({"secret": "base64:aGVsbG8=", "list": ["base64:YQ=="]}))
            .indirection(crate::service::IndirectionSettings::new())
            .resolve()
            .await
            .unwrap();
        assert_eq!(config.get("secret"), Some(json!("hello")));
        assert_eq!(config.get("list"), Some(json!(["a"])));
    }

    #[tokio::test]
    async fn test_builder_resolve_forces_async_mode() {
        let config = isolated()
            .defaults(json!({"token": "base64:aGk="}))
            .indirection(crate::service::IndirectionSettings::new())
            .resolve()
            .await
            .unwrap();
        assert_eq!(config.mode(), Mode::Async);
        assert_eq!(config.get("token"), Some(json!("hi")));
    }

    #[tokio::test]
    async fn test_resolve_async_returns_self_for_chaining() {
        let mut config = Configuration::new(isolated().mode(Mode::Async).build().unwrap()).unwrap();
        let value = config
            .resolve_async()
            .await
            .unwrap()
            .get("missing");
        assert_eq!(value, None);
        assert!(config.is_resolved());
    }
}

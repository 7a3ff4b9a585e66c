// SPDX-License-Identifier: MIT OR Apache-2.0

//! Protocol indirection.
//!
//! After the workflow, every string value of the form `<protocol>:<rest>`
//! whose protocol is registered is replaced by what the handler returns for
//! `rest`. Strings inside objects and arrays are both visited. Handlers run
//! one at a time in document order, and the store is only written once the
//! whole tree has resolved, so a failing handler leaves the store untouched.

use crate::adapters::default_handlers;
use crate::domain::tree::{leaf_paths, lookup};
use crate::domain::{ConfigError, ConfigKey, Result};
use crate::ports::{ConfigStore, ProtocolContext, ProtocolHandler, Resolved};
use crate::service::settings::IndirectionSettings;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Clone, Debug, PartialEq, Eq)]
enum Segment {
    Key(String),
    Index(usize),
}

/// Resolves protocol strings against a set of handlers.
///
/// # Examples
///
/// ```
/// use tiercfg::service::ProtocolResolver;
/// use serde_json::json;
///
/// # tokio_test::block_on(async {
/// let resolver = ProtocolResolver::with_defaults(".");
/// let tree = json!({"greeting": "base64:aGVsbG8=", "plain": "text"});
/// let resolved = resolver.resolve(&tree).await.unwrap();
/// assert_eq!(resolved, json!({"greeting": "hello", "plain": "text"}));
/// # });
/// ```
#[derive(Clone)]
pub struct ProtocolResolver {
    handlers: BTreeMap<String, Arc<dyn ProtocolHandler>>,
    context: ProtocolContext,
    preserve_buffer: bool,
}

impl ProtocolResolver {
    /// Creates a resolver with no handler.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            handlers: BTreeMap::new(),
            context: ProtocolContext::new(base_dir),
            preserve_buffer: false,
        }
    }

    /// Creates a resolver with the default handlers.
    pub fn with_defaults(base_dir: impl Into<PathBuf>) -> Self {
        let mut resolver = Self::new(base_dir);
        resolver.handlers = default_handlers();
        resolver
    }

    /// Builds a resolver from indirection settings. Without an explicit base
    /// directory, relative paths resolve against the working directory.
    ///
    /// # Errors
    ///
    /// Returns `IoError` if the working directory cannot be read.
    pub fn from_settings(settings: &IndirectionSettings) -> Result<Self> {
        let base_dir = match &settings.base_dir {
            Some(dir) => dir.clone(),
            None => std::env::current_dir()?,
        };
        let mut resolver = if settings.no_default_protocols {
            Self::new(base_dir)
        } else {
            Self::with_defaults(base_dir)
        };
        for (name, handler) in &settings.protocols {
            resolver.handlers.insert(name.clone(), Arc::clone(handler));
        }
        resolver.preserve_buffer = settings.preserve_buffer;
        Ok(resolver)
    }

    /// Registers a handler, replacing any handler of the same name.
    pub fn use_handler(mut self, name: impl Into<String>, handler: Arc<dyn ProtocolHandler>) -> Self {
        self.handlers.insert(name.into(), handler);
        self
    }

    /// Keeps byte results as arrays of numbers instead of text.
    pub fn preserve_buffer(mut self, enabled: bool) -> Self {
        self.preserve_buffer = enabled;
        self
    }

    /// Names of the registered protocols.
    pub fn protocols(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }

    /// Splits a string into a registered protocol and its input.
    pub fn protocol_of<'s>(&self, value: &'s str) -> Option<(&'s str, &'s str)> {
        let (name, rest) = value.split_once(':')?;
        if self.handlers.contains_key(name) {
            Some((name, rest))
        } else {
            None
        }
    }

    /// Returns a copy of the tree with every protocol string resolved.
    ///
    /// # Errors
    ///
    /// Returns the first handler error, as an `IndirectionError`.
    pub async fn resolve(&self, tree: &Value) -> Result<Value> {
        let mut pending = Vec::new();
        collect_strings(tree, &mut Vec::new(), &mut pending);

        let mut resolved = tree.clone();
        for (path, text) in pending {
            let Some((name, input)) = self.protocol_of(&text) else {
                continue;
            };
            let Some(handler) = self.handlers.get(name) else {
                continue;
            };
            tracing::debug!("Resolving {} indirection", name);
            let value = handler
                .resolve(input, &self.context)
                .await
                .map_err(|e| match e {
                    ConfigError::IndirectionError { .. } => e,
                    other => ConfigError::indirection(name, input, other),
                })?;
            if let Some(slot) = slot_mut(&mut resolved, &path) {
                *slot = self.to_value(value);
            }
        }
        Ok(resolved)
    }

    /// Resolves the full view of a store and writes changed leaves back.
    /// Arrays count as leaves. Returns the number of keys written.
    ///
    /// # Errors
    ///
    /// Returns the first handler error. Nothing is written in that case.
    pub async fn resolve_store(&self, store: &mut dyn ConfigStore) -> Result<usize> {
        let before = store.load_all();
        let after = self.resolve(&before).await?;
        let (Value::Object(before), Value::Object(after)) = (&before, &after) else {
            return Ok(0);
        };

        let mut written = 0;
        for path in leaf_paths(after) {
            let new = lookup(after, &path);
            if new == lookup(before, &path) {
                continue;
            }
            if let Some(new) = new {
                store.set(&ConfigKey::from_segments(&path), new.clone());
                written += 1;
            }
        }
        tracing::debug!("Indirection rewrote {} keys", written);
        Ok(written)
    }

    fn to_value(&self, resolved: Resolved) -> Value {
        match resolved {
            Resolved::Value(value) => value,
            Resolved::Text(text) => Value::String(text),
            Resolved::Bytes(bytes) if self.preserve_buffer => {
                Value::Array(bytes.into_iter().map(Value::from).collect())
            }
            Resolved::Bytes(bytes) => Value::String(String::from_utf8_lossy(&bytes).into_owned()),
        }
    }
}

impl fmt::Debug for ProtocolResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProtocolResolver")
            .field("protocols", &self.handlers.keys().collect::<Vec<_>>())
            .field("base_dir", &self.context.base_dir)
            .field("preserve_buffer", &self.preserve_buffer)
            .finish()
    }
}

fn collect_strings(value: &Value, path: &mut Vec<Segment>, out: &mut Vec<(Vec<Segment>, String)>) {
    match value {
        Value::String(text) => out.push((path.clone(), text.clone())),
        Value::Object(map) => {
            for (key, child) in map {
                path.push(Segment::Key(key.clone()));
                collect_strings(child, path, out);
                path.pop();
            }
        }
        Value::Array(items) => {
            for (index, child) in items.iter().enumerate() {
                path.push(Segment::Index(index));
                collect_strings(child, path, out);
                path.pop();
            }
        }
        _ => {}
    }
}

fn slot_mut<'v>(root: &'v mut Value, path: &[Segment]) -> Option<&'v mut Value> {
    path.iter().try_fold(root, |node, segment| match segment {
        Segment::Key(key) => node.as_object_mut()?.get_mut(key),
        Segment::Index(index) => node.as_array_mut()?.get_mut(*index),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::MemoryStore;
    use crate::ports::FnHandler;
    use serde_json::json;

    fn upper() -> Arc<dyn ProtocolHandler> {
        Arc::new(FnHandler::new(|input, _| Ok(Resolved::Text(input.to_uppercase()))))
    }

    #[test]
    fn test_protocol_of_only_matches_registered_names() {
        let resolver = ProtocolResolver::new(".").use_handler("up", upper());
        assert_eq!(resolver.protocol_of("up:abc"), Some(("up", "abc")));
        assert_eq!(resolver.protocol_of("up:a:b"), Some(("up", "a:b")));
        assert_eq!(resolver.protocol_of("http://host"), None);
        assert_eq!(resolver.protocol_of("plain"), None);
    }

    #[tokio::test]
    async fn test_resolve_visits_objects_and_arrays() {
        let resolver = ProtocolResolver::new(".").use_handler("up", upper());
        let tree = json!({
            "a": "up:x",
            "list": ["up:y", 1, {"deep": "up:z"}],
            "n": 3,
            "keep": "other:thing"
        });
        let resolved = resolver.resolve(&tree).await.unwrap();
        assert_eq!(
            resolved,
            json!({
                "a": "X",
                "list": ["Y", 1, {"deep": "Z"}],
                "n": 3,
                "keep": "other:thing"
            })
        );
    }

    #[tokio::test]
    async fn test_bytes_become_text_or_numbers() {
        let tree = json!({"v": "base64:AAE="});
        let text = ProtocolResolver::with_defaults(".").resolve(&tree).await.unwrap();
        assert_eq!(text, json!({"v": "\u{0}\u{1}"}));
        let raw = ProtocolResolver::with_defaults(".")
            .preserve_buffer(true)
            .resolve(&tree)
            .await
            .unwrap();
        assert_eq!(raw, json!({"v": [0, 1]}));
    }

    #[tokio::test]
    async fn test_handler_failure_names_protocol() {
        let failing: Arc<dyn ProtocolHandler> =
            Arc::new(FnHandler::new(|_, _| Err(ConfigError::hook("nope"))));
        let resolver = ProtocolResolver::new(".").use_handler("bad", failing);
        let err = resolver.resolve(&json!({"k": "bad:input"})).await.unwrap_err();
        assert!(matches!(
            err,
            ConfigError::IndirectionError { ref protocol, ref value, .. }
                if protocol == "bad" && value == "input"
        ));
    }

    #[tokio::test]
    async fn test_resolve_store_writes_only_changed_leaves() {
        let mut store = MemoryStore::new();
        store
            .add_layer("defaults", json!({"a": "up:x", "b": "same", "list": ["up:y"]}))
            .unwrap();
        let resolver = ProtocolResolver::new(".").use_handler("up", upper());
        let written = resolver.resolve_store(&mut store).await.unwrap();
        assert_eq!(written, 2);
        assert_eq!(store.get(&ConfigKey::from("a")), Some(json!("X")));
        assert_eq!(store.get(&ConfigKey::from("list")), Some(json!(["Y"])));
        assert_eq!(store.get(&ConfigKey::from("b")), Some(json!("same")));
    }

    #[tokio::test]
    async fn test_resolve_store_leaves_store_untouched_on_error() {
        let mut store = MemoryStore::new();
        store
            .add_layer("defaults", json!({"a": "up:x", "z": "env:TIERCFG_SURELY_UNSET_VARIABLE"}))
            .unwrap();
        let resolver = ProtocolResolver::with_defaults(".").use_handler("up", upper());
        assert!(resolver.resolve_store(&mut store).await.is_err());
        assert_eq!(store.get(&ConfigKey::from("a")), Some(json!("up:x")));
    }

    #[test]
    fn test_from_settings_merges_custom_protocols() {
        let settings = IndirectionSettings::new()
            .no_default_protocols(true)
            .protocol("up", FnHandler::new(|input, _| Ok(Resolved::Text(input.into()))))
            .base_dir("/srv");
        let resolver = ProtocolResolver::from_settings(&settings).unwrap();
        assert_eq!(resolver.protocols().collect::<Vec<_>>(), vec!["up"]);

        let defaults = ProtocolResolver::from_settings(&IndirectionSettings::new()).unwrap();
        assert!(defaults.protocols().any(|name| name == "require"));
    }
}

// SPDX-License-Identifier: MIT OR Apache-2.0

//! Derived models.
//!
//! A model projects the resolved configuration into a smaller object, for
//! example the listen options of a server. It is either a declarative
//! [`ModelShape`] or a projector function receiving a [`Getter`].

use crate::domain::errors::{ConfigError, Result};
use crate::domain::reader::{ConfigReader, Getter};
use crate::domain::ConfigKey;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// A declarative model shape.
///
/// # Examples
///
/// ```
/// use tiercfg::domain::model::ModelShape;
/// use serde_json::json;
///
/// let shape = ModelShape::try_from(json!({
///     "host": "server:host",
///     "port": ["server:port", "PORT"],
/// }))
/// .unwrap();
/// assert!(matches!(shape, ModelShape::Object(_)));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum ModelShape {
    /// A single key, read with a plain get.
    Key(ConfigKey),
    /// Candidate keys; the first one defined wins.
    FirstOf(Vec<ConfigKey>),
    /// Nested shape.
    Object(BTreeMap<String, ModelShape>),
}

impl ModelShape {
    /// Projects the shape through a reader. Leaves that resolve to nothing
    /// become `null` so the output keeps the shape's structure.
    pub fn project<R: ConfigReader>(&self, reader: &R) -> Value {
        match self {
            ModelShape::Key(key) => reader.get(key).unwrap_or(Value::Null),
            ModelShape::FirstOf(keys) => reader.get_first(keys).unwrap_or(Value::Null),
            ModelShape::Object(fields) => Value::Object(
                fields
                    .iter()
                    .map(|(name, shape)| (name.clone(), shape.project(reader)))
                    .collect::<Map<String, Value>>(),
            ),
        }
    }
}

impl TryFrom<Value> for ModelShape {
    type Error = ConfigError;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::String(key) => Ok(ModelShape::Key(ConfigKey::from(key))),
            Value::Array(items) => items
                .into_iter()
                .map(|item| match item {
                    Value::String(key) => Ok(ConfigKey::from(key)),
                    other => Err(ConfigError::invalid_settings(format!(
                        "model candidate keys must be strings, got {}",
                        other
                    ))),
                })
                .collect::<Result<Vec<_>>>()
                .map(ModelShape::FirstOf),
            Value::Object(fields) => fields
                .into_iter()
                .map(|(name, shape)| ModelShape::try_from(shape).map(|shape| (name, shape)))
                .collect::<Result<BTreeMap<_, _>>>()
                .map(ModelShape::Object),
            other => Err(ConfigError::invalid_settings(format!(
                "model leaves must be keys or key lists, got {}",
                other
            ))),
        }
    }
}

type ProjectorFn = dyn Fn(&Getter<'_>) -> Value + Send + Sync;

/// A model: a shape, or a function computing the model from a getter.
#[derive(Clone)]
pub enum Model {
    /// Declarative shape.
    Shape(ModelShape),
    /// Arbitrary projection.
    Projector(Arc<ProjectorFn>),
}

impl Model {
    /// Wraps a projector closure.
    ///
    /// ```
    /// use tiercfg::domain::{ConfigReader, Model};
    /// use serde_json::json;
    ///
    /// let model = Model::projector(|get| json!({ "url": get.template("http://${host}:${port}") }));
    /// # let _ = model;
    /// ```
    pub fn projector<F>(f: F) -> Self
    where
        F: Fn(&Getter<'_>) -> Value + Send + Sync + 'static,
    {
        Model::Projector(Arc::new(f))
    }

    /// Computes the model.
    pub fn evaluate(&self, getter: &Getter<'_>) -> Value {
        match self {
            Model::Shape(shape) => shape.project(getter),
            Model::Projector(f) => f(getter),
        }
    }
}

impl From<ModelShape> for Model {
    fn from(shape: ModelShape) -> Self {
        Model::Shape(shape)
    }
}

impl TryFrom<Value> for Model {
    type Error = ConfigError;

    fn try_from(value: Value) -> Result<Self> {
        ModelShape::try_from(value).map(Model::Shape)
    }
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Model::Shape(shape) => f.debug_tuple("Model::Shape").field(shape).finish(),
            Model::Projector(_) => f.write_str("Model::Projector(<fn>)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::MemoryStore;
    use crate::ports::ConfigStore;
    use serde_json::json;

    fn store() -> MemoryStore {
        let mut store = MemoryStore::new();
        store
            .add_layer("defaults", json!({"A": {"a": 1, "b": 2}, "B": 42}))
            .unwrap();
        store
    }

    #[test]
    fn test_shape_first_defined_wins() {
        let store = store();
        let shape = ModelShape::try_from(json!({"a": ["a:a", "A:a"], "b": {"b": ["B", "A"]}})).unwrap();
        assert_eq!(shape.project(&Getter::new(&store)), json!({"a": 1, "b": {"b": 42}}));
    }

    #[test]
    fn test_undefined_leaves_become_null() {
        let store = store();
        let shape = ModelShape::try_from(json!({"x": "nope", "y": ["no", "neither"]})).unwrap();
        assert_eq!(shape.project(&Getter::new(&store)), json!({"x": null, "y": null}));
    }

    #[test]
    fn test_shape_rejects_numbers() {
        assert!(ModelShape::try_from(json!({"a": 1})).is_err());
        assert!(ModelShape::try_from(json!({"a": ["ok", 2]})).is_err());
    }

    #[test]
    fn test_projector_gets_a_getter() {
        let store = store();
        let model = Model::projector(|get| json!({"sum": get.get("A:a").and_then(|v| v.as_i64()).unwrap_or(0) + 1}));
        assert_eq!(model.evaluate(&Getter::new(&store)), json!({"sum": 2}));
    }
}

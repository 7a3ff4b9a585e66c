// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain layer containing core types.
//!
//! This module contains the types shared by every other layer: keys and
//! values, the resolution steps, hooks, the key transform pipeline, models
//! and the read-only accessor trait. It does not perform any I/O.

pub mod config_key;
pub mod config_value;
pub mod errors;
pub mod hook;
pub mod model;
pub mod reader;
pub mod step;
pub mod transform;
pub mod tree;

// Re-export commonly used types
pub use config_key::ConfigKey;
pub use config_value::ConfigValue;
pub use errors::{ConfigError, Result};
pub use hook::Hook;
pub use model::{Model, ModelShape};
pub use reader::{ConfigReader, Getter, KeyMapping};
pub use step::{HookPoint, Step};
pub use transform::{Case, KeyPipeline, KeyTransformSettings, KeyValue, Separator, Transform};

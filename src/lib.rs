// SPDX-License-Identifier: MIT OR Apache-2.0

//! A layered configuration resolver.
//!
//! Configuration is gathered from several sources into a tiered store. Every
//! source becomes a named layer, and a lookup returns the first layer that
//! defines the key, merging objects across layers.
//!
//! # Precedence
//!
//! From highest to lowest:
//!
//! 1. values written with `set` (the memory tier)
//! 2. overrides
//! 3. command-line arguments, then the file named by `--configue`
//! 4. environment variables
//! 5. configuration files, in declaration order
//! 6. defaults, in declaration order
//!
//! # Architecture
//!
//! The crate follows hexagonal architecture principles:
//!
//! - **Domain Layer**: keys, values, errors, hooks, models, key transforms
//!   and the [`ConfigReader`](domain::ConfigReader) accessor trait
//! - **Ports**: the store, codec, argument parser and protocol handler traits
//! - **Adapters**: the in-memory store, JSON/YAML/JSON5/properties codecs, the
//!   file loader, argv parsers, the environment snapshot and the default
//!   protocol handlers
//! - **Service**: settings, the resolution workflow, the indirection pass and
//!   the [`Configuration`](service::Configuration) object
//!
//! # Feature Flags
//!
//! - `yaml`: YAML codec (default)
//! - `json5`: JSON5 codec (default)
//! - `cli`: clap-backed argument parser (default)
//! - `full`: all of the above
//!
//! # Quick Start
//!
//! ```rust
//! use tiercfg::prelude::*;
//! use serde_json::json;
//!
//! # fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
//! let config = Settings::builder()
//!     .args(["--server.port=8080"])
//!     .env_vars([("LOG_LEVEL", "debug")])
//!     .normalize(Case::CamelCase)
//!     .defaults(json!({"server": {"host": "localhost", "port": 80}}))
//!     .configure()?;
//!
//! assert_eq!(config.get("server:port"), Some(json!("8080")));
//! assert_eq!(config.get("server:host"), Some(json!("localhost")));
//! assert_eq!(config.get("logLevel"), Some(json!("debug")));
//! # Ok(())
//! # }
//! ```
//!
//! Indirection and deferred hooks need the async workflow:
//!
//! ```rust
//! use tiercfg::prelude::*;
//! use serde_json::json;
//!
//! # tokio_test::block_on(async {
//! let config = Settings::builder()
//!     .mode(Mode::Async)
//!     .args(Vec::<String>::new())
//!     .disable_env(true)
//!     .defaults(json!({"token": "base64:czNjcjN0"}))
//!     .indirection(IndirectionSettings::new())
//!     .resolve()
//!     .await
//!     .unwrap();
//! assert_eq!(config.get("token"), Some(json!("s3cr3t")));
//! # });
//! ```

#![warn(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![warn(clippy::all)]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

/// Commonly used types and traits.
///
/// This module re-exports the most commonly used types and traits for convenient access.
pub mod prelude {
    pub use crate::domain::{
        Case, ConfigError, ConfigKey, ConfigReader, ConfigValue, Hook, HookPoint, Model,
        ModelShape, Result, Step, Transform,
    };
    pub use crate::ports::{ArgKind, ArgSpec, ConfigStore, ProtocolHandler, Resolved};

    pub use crate::adapters::{FileSpec, MemoryStore};
    pub use crate::service::{
        Configuration, IndirectionSettings, Mode, ProtocolResolver, Settings, SettingsBuilder,
    };
}

// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapters layer containing implementations of the ports.
//!
//! This module contains the concrete store, the file codecs and file loader,
//! the argument parsers, the environment snapshot and the default indirection
//! protocol handlers.

#[cfg(feature = "cli")]
pub mod clap_args;
pub mod cli;
pub mod codecs;
pub mod env_var;
pub mod file;
pub mod memory_store;
pub mod protocols;

// Re-export adapters based on feature flags
#[cfg(feature = "cli")]
pub use clap_args::ClapArgvParser;
pub use cli::ArgvParser;
#[cfg(feature = "json5")]
pub use codecs::Json5Parser;
#[cfg(feature = "yaml")]
pub use codecs::YamlParser;
pub use codecs::{JsonParser, PropertiesParser};
pub use env_var::EnvVarAdapter;
pub use file::FileSpec;
pub use memory_store::MemoryStore;
pub use protocols::default_handlers;

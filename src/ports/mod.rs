// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ports layer containing trait definitions.
//!
//! This module contains the trait definitions (ports) that define the interfaces
//! between the resolution workflow and its collaborators: the store, the file
//! codecs, the argument parser and the indirection protocol handlers. These
//! traits are implemented by adapters in the adapters layer.

pub mod argv;
pub mod parser;
pub mod protocol;
pub mod store;

// Re-export commonly used types
pub use argv::{ArgKind, ArgSpec, ArgumentParser};
pub use parser::ConfigParser;
pub use protocol::{FnHandler, ProtocolContext, ProtocolHandler, Resolved};
pub use store::ConfigStore;

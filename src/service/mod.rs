// SPDX-License-Identifier: MIT OR Apache-2.0

//! Service layer: settings, the resolution workflow and the configuration
//! object built on top of the ports.

pub mod configuration;
pub mod indirection;
pub mod loaders;
pub mod settings;
mod workflow;

pub use configuration::Configuration;
pub use indirection::ProtocolResolver;
pub use settings::{IndirectionSettings, Mode, Settings, SettingsBuilder, DEFAULT_ARGV_FILE_KEY};

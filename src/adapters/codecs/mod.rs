// SPDX-License-Identifier: MIT OR Apache-2.0

//! File-format codecs and the extension registry.
//!
//! The file loader picks a codec from the file extension. JSON and
//! properties/INI are always available; YAML and JSON5 follow the `yaml` and
//! `json5` features. An unknown extension falls back to JSON.

pub mod json;
#[cfg(feature = "json5")]
pub mod json5;
pub mod properties;
#[cfg(feature = "yaml")]
pub mod yaml;

pub use json::JsonParser;
#[cfg(feature = "json5")]
pub use self::json5::Json5Parser;
pub use properties::PropertiesParser;
#[cfg(feature = "yaml")]
pub use yaml::YamlParser;

use crate::ports::ConfigParser;
use once_cell::sync::Lazy;
use std::path::Path;
use std::sync::Arc;

static BUILTIN_CODECS: Lazy<Vec<Arc<dyn ConfigParser>>> = Lazy::new(|| {
    let mut codecs: Vec<Arc<dyn ConfigParser>> = vec![Arc::new(JsonParser::new())];
    #[cfg(feature = "yaml")]
    codecs.push(Arc::new(YamlParser::new()));
    codecs.push(Arc::new(PropertiesParser::new()));
    #[cfg(feature = "json5")]
    codecs.push(Arc::new(Json5Parser::new()));
    codecs
});

/// Returns the built-in codec registered for an extension (without the dot,
/// case-insensitive).
///
/// ```rust
/// use tiercfg::adapters::codecs::codec_for_extension;
///
/// assert!(codec_for_extension("JSON").is_some());
/// assert!(codec_for_extension("toml").is_none());
/// ```
pub fn codec_for_extension(extension: &str) -> Option<Arc<dyn ConfigParser>> {
    let extension = extension.to_ascii_lowercase();
    BUILTIN_CODECS
        .iter()
        .find(|codec| codec.supported_extensions().contains(&extension.as_str()))
        .cloned()
}

/// Returns the codec for a file path, falling back to JSON.
pub fn codec_for_path(path: &Path) -> Arc<dyn ConfigParser> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(codec_for_extension)
        .unwrap_or_else(|| Arc::new(JsonParser::new()))
}

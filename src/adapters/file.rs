// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration file source adapter.
//!
//! This module reads one configuration file into a tree, using either the
//! codec named by the [`FileSpec`] or the one registered for the file
//! extension.

use crate::adapters::codecs::codec_for_path;
use crate::domain::{ConfigError, Result};
use crate::ports::ConfigParser;
use serde_json::{Map, Value};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Maximum allowed file size for configuration files (10MB)
/// This prevents denial of service attacks via extremely large files
pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// A configuration file to load, with an optional explicit codec.
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
/// use tiercfg::adapters::{FileSpec, PropertiesParser};
///
/// let inferred = FileSpec::from("config/app.yaml");
/// let explicit = FileSpec::new("config/app.conf").with_format(Arc::new(PropertiesParser::new()));
/// assert!(inferred.format().is_none());
/// assert!(explicit.format().is_some());
/// ```
#[derive(Debug, Clone)]
pub struct FileSpec {
    path: PathBuf,
    format: Option<Arc<dyn ConfigParser>>,
}

impl FileSpec {
    /// Creates a spec whose codec is inferred from the extension.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            format: None,
        }
    }

    /// Forces a codec.
    pub fn with_format(mut self, format: Arc<dyn ConfigParser>) -> Self {
        self.format = Some(format);
        self
    }

    /// The file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The explicit codec, if any.
    pub fn format(&self) -> Option<&Arc<dyn ConfigParser>> {
        self.format.as_ref()
    }

    /// Name of the store layer holding this file.
    pub fn layer_name(&self) -> String {
        self.path.display().to_string()
    }

    /// Reads and parses the file.
    ///
    /// A missing file yields an empty object. Whitespace-only files do too.
    ///
    /// # Errors
    ///
    /// - `SourceError` if the file cannot be read or exceeds [`MAX_FILE_SIZE`]
    /// - `ParseError` if the content is invalid or not an object
    pub fn load(&self) -> Result<Map<String, Value>> {
        let name = self.layer_name();
        let metadata = match fs::metadata(&self.path) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!("Configuration file {} not found, loading it as empty", name);
                return Ok(Map::new());
            }
            Err(e) => {
                return Err(ConfigError::SourceError {
                    source_name: name.clone(),
                    message: "Failed to read file metadata".to_string(),
                    source: Some(Box::new(e)),
                })
            }
        };

        if metadata.len() > MAX_FILE_SIZE {
            return Err(ConfigError::SourceError {
                source_name: name,
                message: format!(
                    "Configuration file too large: {} bytes (max {} bytes)",
                    metadata.len(),
                    MAX_FILE_SIZE
                ),
                source: None,
            });
        }

        let content = fs::read_to_string(&self.path).map_err(|e| ConfigError::SourceError {
            source_name: name.clone(),
            message: "Failed to read configuration file".to_string(),
            source: Some(Box::new(e)),
        })?;
        if content.trim().is_empty() {
            return Ok(Map::new());
        }

        let codec = match &self.format {
            Some(codec) => Arc::clone(codec),
            None => codec_for_path(&self.path),
        };
        let tree = codec.parse(&content).map_err(|e| ConfigError::ParseError {
            message: format!("{}: {}", name, e),
            source: Some(Box::new(e)),
        })?;

        match tree {
            Value::Object(map) => {
                tracing::debug!("Loaded {} top-level keys from {}", map.len(), name);
                Ok(map)
            }
            Value::Null => Ok(Map::new()),
            _ => Err(ConfigError::ParseError {
                message: format!("{}: top-level value must be an object", name),
                source: None,
            }),
        }
    }
}

impl From<&str> for FileSpec {
    fn from(path: &str) -> Self {
        FileSpec::new(path)
    }
}

impl From<String> for FileSpec {
    fn from(path: String) -> Self {
        FileSpec::new(path)
    }
}

impl From<PathBuf> for FileSpec {
    fn from(path: PathBuf) -> Self {
        FileSpec::new(path)
    }
}

impl From<&Path> for FileSpec {
    fn from(path: &Path) -> Self {
        FileSpec::new(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::codecs::PropertiesParser;
    use serde_json::json;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn temp_file(suffix: &str, content: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn test_missing_file_loads_empty() {
        let spec = FileSpec::from("/definitely/not/here.json");
        assert!(spec.load().unwrap().is_empty());
    }

    #[test]
    fn test_json_inferred_from_extension() {
        let file = temp_file(".json", r#"{"a": {"b": 1}}"#);
        let map = FileSpec::from(file.path()).load().unwrap();
        assert_eq!(Value::Object(map), json!({"a": {"b": 1}}));
    }

    #[test]
    fn test_unknown_extension_parsed_as_json() {
        let file = temp_file(".cfg", r#"{"k": "v"}"#);
        let map = FileSpec::from(file.path()).load().unwrap();
        assert_eq!(map["k"], "v");
    }

    #[test]
    fn test_explicit_format_wins_over_extension() {
        let file = temp_file(".json", "k = v\n");
        let map = FileSpec::new(file.path())
            .with_format(Arc::new(PropertiesParser::new()))
            .load()
            .unwrap();
        assert_eq!(map["k"], "v");
    }

    #[test]
    fn test_blank_file_is_empty() {
        let file = temp_file(".json", "  \n");
        assert!(FileSpec::from(file.path()).load().unwrap().is_empty());
    }

    #[test]
    fn test_invalid_content_is_parse_error() {
        let file = temp_file(".json", "{broken");
        let err = FileSpec::from(file.path()).load().unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn test_non_object_root_is_rejected() {
        let file = temp_file(".json", "[1, 2]");
        assert!(FileSpec::from(file.path()).load().is_err());
    }

    #[test]
    fn test_file_too_large() {
        let file = NamedTempFile::new().unwrap();
        file.as_file().set_len(MAX_FILE_SIZE + 1).unwrap();
        let err = FileSpec::from(file.path()).load().unwrap_err();
        assert!(err.to_string().contains("too large"));
    }
}

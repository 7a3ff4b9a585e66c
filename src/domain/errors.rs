// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the configuration crate.
//!
//! This module defines the error types that can occur while building settings,
//! resolving configuration from its sources, or reading resolved values.
//! All errors use `thiserror` for proper error handling and conversion.

use std::num::{ParseFloatError, ParseIntError};
use std::str::ParseBoolError;
use thiserror::Error;

/// The main error type for configuration operations.
///
/// This enum represents all possible errors that can occur when validating
/// settings, running the resolution workflow, or accessing configuration values.
/// It is marked as `#[non_exhaustive]` to allow for future additions without
/// breaking backwards compatibility.
///
/// # Examples
///
/// ```
/// use tiercfg::domain::errors::ConfigError;
///
/// fn get_config_value() -> Result<String, ConfigError> {
///     Err(ConfigError::ConfigKeyNotFound {
///         key: "database:host".to_string(),
///     })
/// }
///
/// assert!(get_config_value().is_err());
/// ```
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// The requested configuration key was not found in the store.
    #[error("Configuration key not found: {key}")]
    ConfigKeyNotFound {
        /// The key that was not found
        key: String,
    },

    /// Failed to convert a configuration value to the requested type.
    #[error(
        "Failed to convert configuration value for key '{key}' to type {target_type}: {source}"
    )]
    TypeConversionError {
        /// The key being converted
        key: String,
        /// The target type name
        target_type: String,
        /// The underlying conversion error
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The settings describing how to resolve the configuration are malformed.
    #[error("Invalid settings: {message}")]
    InvalidSettings {
        /// What is wrong with the settings
        message: String,
    },

    /// Keys listed as required did not resolve to a value.
    #[error("Missing required keys: {}", .keys.join(", "))]
    MissingRequiredKeys {
        /// The keys that are missing, in the order they were required
        keys: Vec<String>,
    },

    /// A user supplied hook or custom workflow reported a failure.
    #[error("Hook failed: {message}")]
    HookError {
        /// The error message
        message: String,
    },

    /// An error occurred in a configuration source.
    #[error("Configuration source '{source_name}' error: {message}")]
    SourceError {
        /// The name of the source that encountered the error
        source_name: String,
        /// The error message
        message: String,
        /// The underlying error, if any
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Failed to parse a configuration file or value.
    #[error("Failed to parse configuration: {message}")]
    ParseError {
        /// The error message
        message: String,
        /// The underlying parsing error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A protocol handler failed to substitute an indirection.
    #[error("Failed to resolve '{protocol}:{value}': {message}")]
    IndirectionError {
        /// The protocol of the failing reference
        protocol: String,
        /// The reference that was handed to the protocol handler
        value: String,
        /// The error message
        message: String,
        /// The underlying error, if any
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// An I/O error occurred while reading configuration.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl ConfigError {
    /// Creates a TypeConversionError from a ParseIntError.
    pub fn from_parse_int_error(key: String, err: ParseIntError) -> Self {
        ConfigError::TypeConversionError {
            key,
            target_type: "integer".to_string(),
            source: Box::new(err),
        }
    }

    /// Creates a TypeConversionError from a ParseFloatError.
    pub fn from_parse_float_error(key: String, err: ParseFloatError) -> Self {
        ConfigError::TypeConversionError {
            key,
            target_type: "float".to_string(),
            source: Box::new(err),
        }
    }

    /// Creates a TypeConversionError from a ParseBoolError.
    pub fn from_parse_bool_error(key: String, err: ParseBoolError) -> Self {
        ConfigError::TypeConversionError {
            key,
            target_type: "boolean".to_string(),
            source: Box::new(err),
        }
    }

    /// Creates an InvalidSettings error.
    pub fn invalid_settings(message: impl Into<String>) -> Self {
        ConfigError::InvalidSettings {
            message: message.into(),
        }
    }

    /// Creates a HookError, for use inside hooks and custom workflows.
    ///
    /// ```
    /// use tiercfg::domain::ConfigError;
    ///
    /// let error = ConfigError::hook("database is unreachable");
    /// assert_eq!(error.to_string(), "Hook failed: database is unreachable");
    /// ```
    pub fn hook(message: impl Into<String>) -> Self {
        ConfigError::HookError {
            message: message.into(),
        }
    }

    /// Creates an IndirectionError wrapping an underlying error.
    pub fn indirection(
        protocol: &str,
        value: &str,
        err: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        ConfigError::IndirectionError {
            protocol: protocol.to_string(),
            value: value.to_string(),
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

/// A specialized Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_key_not_found_error() {
        let error = ConfigError::ConfigKeyNotFound {
            key: "test:key".to_string(),
        };
        assert_eq!(error.to_string(), "Configuration key not found: test:key");
    }

    #[test]
    fn test_type_conversion_error() {
        let source_error = "invalid value".parse::<i32>().unwrap_err();
        let error = ConfigError::TypeConversionError {
            key: "test:key".to_string(),
            target_type: "i32".to_string(),
            source: Box::new(source_error),
        };
        assert!(error.to_string().contains("test:key"));
        assert!(error.to_string().contains("i32"));
    }

    #[test]
    fn test_missing_required_keys_lists_every_key() {
        let error = ConfigError::MissingRequiredKeys {
            keys: vec!["B".to_string(), "C:d".to_string()],
        };
        assert_eq!(error.to_string(), "Missing required keys: B, C:d");
    }

    #[test]
    fn test_invalid_settings_error() {
        let error = ConfigError::invalid_settings("indirection requires async mode");
        assert_eq!(
            error.to_string(),
            "Invalid settings: indirection requires async mode"
        );
    }

    #[test]
    fn test_source_error() {
        let error = ConfigError::SourceError {
            source_name: "env".to_string(),
            message: "Failed to read environment".to_string(),
            source: None,
        };
        assert_eq!(
            error.to_string(),
            "Configuration source 'env' error: Failed to read environment"
        );
    }

    #[test]
    fn test_parse_error() {
        let error = ConfigError::ParseError {
            message: "Invalid YAML".to_string(),
            source: None,
        };
        assert_eq!(
            error.to_string(),
            "Failed to parse configuration: Invalid YAML"
        );
    }

    #[test]
    fn test_indirection_error_keeps_source() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let error = ConfigError::indirection("file", "/does/not/exist", io_error);
        assert!(error.to_string().contains("file:/does/not/exist"));
        assert!(std::error::Error::source(&error).is_some());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error = ConfigError::from(io_error);
        assert!(matches!(error, ConfigError::IoError(_)));
    }

    #[test]
    fn test_from_parse_int_error() {
        let parse_err = "not_a_number".parse::<i32>().unwrap_err();
        let error = ConfigError::from_parse_int_error("test:key".to_string(), parse_err);
        assert!(matches!(error, ConfigError::TypeConversionError { .. }));
        assert!(error.to_string().contains("integer"));
    }

    #[test]
    fn test_from_parse_bool_error() {
        let parse_err = "not_a_bool".parse::<bool>().unwrap_err();
        let error = ConfigError::from_parse_bool_error("test:key".to_string(), parse_err);
        assert!(error.to_string().contains("boolean"));
    }
}
